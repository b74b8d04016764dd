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

/// Unlit additive-feeling accent pipeline for the interior glow volume.
/// The light group is not bound; the material colour is emitted directly.
pub fn mk_glow_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Glow Pipeline Layout"),
        bind_group_layouts: &[&material_layout(device), camera_bind_group_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Glow Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("glow.wgsl").into()),
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
