use crate::{
    data_structures::{
        instance::InstanceRaw,
        mesh::{MeshVertex, Vertex},
    },
    pipelines::{
        basic::{material_layout, mk_render_pipeline},
        DEPTH_FORMAT,
    },
};

/// Alpha-blended variant of the lit pipeline for the cabin glass. Depth
/// writes stay on so the glass still occludes itself correctly; glass
/// drawables are rendered after everything opaque.
pub fn mk_glass_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    light_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Glass Pipeline Layout"),
        bind_group_layouts: &[
            &material_layout(device),
            camera_bind_group_layout,
            light_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Glass Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(DEPTH_FORMAT),
        &[MeshVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
