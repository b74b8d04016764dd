pub mod basic;
pub mod glass;
pub mod glow;
pub mod light;
pub mod shadow;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The fixed set of render pipelines used by the showroom. All four are
/// created once at startup; parameter changes never rebuild them.
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub glass: wgpu::RenderPipeline,
    pub glow: wgpu::RenderPipeline,
    pub shadow: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        light: &light::LightResources,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                config,
                &light.bind_group_layout,
                camera_bind_group_layout,
            ),
            glass: glass::mk_glass_pipeline(
                device,
                config,
                &light.bind_group_layout,
                camera_bind_group_layout,
            ),
            glow: glow::mk_glow_pipeline(device, config, camera_bind_group_layout),
            shadow: shadow::mk_shadow_pipeline(device, &light.shadow_bind_group_layout),
        }
    }
}
