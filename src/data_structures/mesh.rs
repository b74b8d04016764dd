//! CPU-side mesh data and the GPU vertex type.
//!
//! All geometry in this engine is procedural (see
//! [`primitives`](crate::data_structures::primitives)); a [`MeshData`] holds
//! the vertices and indices on the CPU until the viewer uploads them once at
//! mount time. Colour comes from the material, so vertices only carry
//! position and normal.

/// Trait for types with a GPU vertex buffer layout.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Procedurally generated triangle mesh, not yet uploaded to the GPU.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: &'static str,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3]) {
        let base = self.vertices.len() as u32;
        for position in corners {
            self.vertices.push(MeshVertex { position, normal });
        }
        self.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
