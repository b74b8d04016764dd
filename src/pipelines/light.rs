//! Lighting rig: one hemispheric fill plus one shadow-casting directional light.
//!
//! The directional light renders the scene into a depth-only shadow map each
//! frame; the main pass samples it with a comparison sampler. The rig is
//! static and parameter changes never touch it.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};
use wgpu::util::DeviceExt;

use crate::camera::OPENGL_TO_WGPU_MATRIX;

pub const SHADOW_MAP_SIZE: u32 = 1024;
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    view_proj: [[f32; 4]; 4],
    direction: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use padding fields here
    _padding0: f32,
    color: [f32; 3],
    _padding1: f32,
    sky_color: [f32; 3],
    _padding2: f32,
    ground_color: [f32; 3],
    hemisphere_intensity: f32,
}

impl LightUniform {
    /// White key light from above-front, hemispheric fill between a white sky
    /// and a deep blue ground bounce.
    pub fn showroom(light_position: Point3<f32>) -> Self {
        let direction = (Point3::origin() - light_position).normalize();
        Self {
            view_proj: Self::shadow_view_proj(light_position).into(),
            direction: direction.into(),
            _padding0: 0.0,
            color: [1.0, 1.0, 1.0],
            _padding1: 0.0,
            sky_color: [1.0, 1.0, 1.0],
            _padding2: 0.0,
            ground_color: [0.031, 0.031, 0.125],
            hemisphere_intensity: 0.7,
        }
    }

    /// Orthographic projection from the light, sized to cover the vehicle
    /// and the shadowed part of the ground.
    fn shadow_view_proj(light_position: Point3<f32>) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(light_position, Point3::origin(), Vector3::unit_y());
        let proj = cgmath::ortho(-10.0, 10.0, -10.0, 10.0, 0.1, 40.0);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

/// GPU resources of the lighting rig, including the shadow map target.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    /// Main-pass group: light uniform + shadow map + comparison sampler.
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
    /// Shadow-pass group: the light uniform alone.
    pub shadow_bind_group: wgpu::BindGroup,
    pub shadow_bind_group_layout: wgpu::BindGroupLayout,
    pub shadow_view: wgpu::TextureView,
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
            label: Some("light_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
            label: Some("light_bind_group"),
        });

        let shadow_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("shadow_bind_group_layout"),
            });

        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shadow_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("shadow_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
            shadow_bind_group,
            shadow_bind_group_layout,
            shadow_view,
        }
    }
}
