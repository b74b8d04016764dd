//! GPU mirror of a [`SceneGraph`].
//!
//! The graph itself is plain CPU state so it stays testable without a
//! device; this module uploads it once at mount time and then keeps the
//! buffers in sync each frame by consuming the graph's dirty flags.
//! Topology is frozen, so mesh buffers are immutable and only instance
//! and material uniforms are ever re-written.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        material::MaterialKind,
        scene_graph::{NodeId, NodeKind, SceneGraph},
    },
    pipelines::basic::material_layout,
};

#[derive(Debug)]
struct GpuMaterial {
    kind: MaterialKind,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
struct GpuDrawable {
    node: NodeId,
    material: usize,
    casts_shadow: bool,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    /// One instance per drawable, re-written when the world transform moves.
    instance_buffer: wgpu::Buffer,
}

#[derive(Debug)]
pub struct GpuScene {
    materials: Vec<GpuMaterial>,
    drawables: Vec<GpuDrawable>,
}

impl GpuScene {
    pub fn new(device: &wgpu::Device, scene: &mut SceneGraph) -> Self {
        let layout = material_layout(device);

        let materials = scene
            .materials()
            .map(|(_, material)| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(material.name),
                    contents: bytemuck::cast_slice(&[material.to_uniform()]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some(material.name),
                });
                GpuMaterial {
                    kind: material.kind,
                    buffer,
                    bind_group,
                }
            })
            .collect();

        let worlds = scene.world_transforms();
        let drawables = scene
            .drawables()
            .map(|(id, node)| {
                let NodeKind::Drawable {
                    mesh,
                    material,
                    casts_shadow,
                } = &node.kind
                else {
                    unreachable!("drawables() yields drawable nodes only");
                };
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(mesh.name),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(mesh.name),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(mesh.name),
                    contents: bytemuck::cast_slice(&[worlds[id.0].to_raw()]),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                GpuDrawable {
                    node: id,
                    material: material.0,
                    casts_shadow: *casts_shadow,
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    instance_buffer,
                }
            })
            .collect();

        // mirror starts in sync
        scene.take_transforms_dirty();
        for (_, material) in scene.materials_mut() {
            material.take_dirty();
        }

        Self {
            materials,
            drawables,
        }
    }

    /// Push pending scene changes into the GPU buffers.
    pub fn sync(&self, queue: &wgpu::Queue, scene: &mut SceneGraph) {
        if scene.take_transforms_dirty() {
            let worlds = scene.world_transforms();
            for drawable in &self.drawables {
                queue.write_buffer(
                    &drawable.instance_buffer,
                    0,
                    bytemuck::cast_slice(&[worlds[drawable.node.0].to_raw()]),
                );
            }
        }
        for (id, material) in scene.materials_mut() {
            if material.take_dirty() {
                queue.write_buffer(
                    &self.materials[id.0].buffer,
                    0,
                    bytemuck::cast_slice(&[material.to_uniform()]),
                );
            }
        }
    }

    /// Record the shadow casters into a depth-only pass.
    pub fn draw_shadow(&self, pass: &mut wgpu::RenderPass<'_>, scene: &SceneGraph) {
        for drawable in self.shown(scene) {
            if !drawable.casts_shadow {
                continue;
            }
            pass.set_vertex_buffer(0, drawable.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, drawable.instance_buffer.slice(..));
            pass.set_index_buffer(drawable.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..drawable.index_count, 0, 0..1);
        }
    }

    /// Record the drawables of one material kind, binding each material at
    /// group 0. The caller has already set the pipeline and groups 1..n.
    pub fn draw_kind(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        scene: &SceneGraph,
        kind: MaterialKind,
    ) {
        for drawable in self.shown(scene) {
            let material = &self.materials[drawable.material];
            if material.kind != kind {
                continue;
            }
            pass.set_bind_group(0, &material.bind_group, &[]);
            pass.set_vertex_buffer(0, drawable.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, drawable.instance_buffer.slice(..));
            pass.set_index_buffer(drawable.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..drawable.index_count, 0, 0..1);
        }
    }

    fn shown<'a>(&'a self, scene: &'a SceneGraph) -> impl Iterator<Item = &'a GpuDrawable> {
        self.drawables
            .iter()
            .filter(|drawable| scene.is_shown(drawable.node))
    }
}
