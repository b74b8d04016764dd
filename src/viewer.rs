//! The viewer: window, event loop and the continuous render cycle.
//!
//! The viewer owns the scene for its whole lifetime. Hosts talk to it
//! through a [`ViewerHandle`]: restyle requests mutate the mounted scene in
//! place, capture requests read back the last presented frame, and shutdown
//! tears the loop down deterministically.
//!
//! # Frame cycle
//!
//! 1. Sync pending scene changes into the GPU mirrors
//! 2. Render the shadow map from the light's point of view
//! 3. Render the main pass: opaque, then glow, then glass
//! 4. Copy the frame into the capture texture and present
//! 5. Advance the damped orbit and request the next repaint

use std::{fmt::Debug, iter, sync::Arc};

use anyhow::{anyhow, Context as _};
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    capture::CapturedFrame,
    config::{StyleConfig, VehicleIdentity},
    context::{Context, CLEAR_COLOUR},
    data_structures::{material::MaterialKind, scene_graph::SceneGraph},
    gpu_scene::GpuScene,
    scene::{apply_style, build_stage, build_vehicle, BindingTable},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Requests a host can post into the running viewer.
pub enum ViewerEvent {
    /// Replace the appearance parameters; applied before the next frame.
    Restyle(StyleConfig),
    /// Read back the current frame. Answered with `None` when capture is
    /// unavailable on the platform or the readback fails.
    Capture(std::sync::mpsc::Sender<Option<CapturedFrame>>),
    /// Tear down the viewer and end the event loop.
    Shutdown,
    /// Init handoff from the async setup on the web.
    #[allow(dead_code)]
    Initialized(ViewerState),
}

impl Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restyle(config) => f.debug_tuple("Restyle").field(config).finish(),
            Self::Capture(_) => f.write_str("Capture"),
            Self::Shutdown => f.write_str("Shutdown"),
            Self::Initialized(_) => f.write_str("Initialized"),
        }
    }
}

/// Cloneable host-side handle to a running viewer.
///
/// Updates are synchronous from the host's point of view: once a method
/// returns, the request is queued and will be applied before the next
/// frame. Rapid successive restyles coalesce to last-write-wins.
#[derive(Clone, Debug)]
pub struct ViewerHandle {
    proxy: EventLoopProxy<ViewerEvent>,
}

impl ViewerHandle {
    pub fn restyle(&self, config: StyleConfig) -> anyhow::Result<()> {
        self.proxy
            .send_event(ViewerEvent::Restyle(config))
            .map_err(|_| anyhow!("viewer closed"))
    }

    /// Request a capture of the current frame and wait for the answer.
    pub fn capture(&self) -> anyhow::Result<Option<CapturedFrame>> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.proxy
            .send_event(ViewerEvent::Capture(tx))
            .map_err(|_| anyhow!("viewer closed"))?;
        rx.recv().context("viewer closed before answering capture")
    }

    pub fn close(&self) -> anyhow::Result<()> {
        self.proxy
            .send_event(ViewerEvent::Shutdown)
            .map_err(|_| anyhow!("viewer closed"))
    }
}

/// Everything the mounted viewer owns: GPU context, the scene graphs and
/// their GPU mirrors.
#[derive(Debug)]
pub struct ViewerState {
    ctx: Context,
    vehicle: SceneGraph,
    bindings: BindingTable,
    stage: SceneGraph,
    gpu_vehicle: GpuScene,
    gpu_stage: GpuScene,
    is_surface_configured: bool,
    /// Whether the capture texture holds a presented frame. False until the
    /// first present and again after every resize, which recreates the
    /// texture; captures in that window report the frame as absent.
    frame_presented: bool,
}

impl ViewerState {
    async fn new(window: Arc<Window>, config: StyleConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;

        let (mut vehicle, bindings) = build_vehicle(&config);
        let mut stage = build_stage();
        let gpu_vehicle = GpuScene::new(&ctx.device, &mut vehicle);
        let gpu_stage = GpuScene::new(&ctx.device, &mut stage);

        Ok(Self {
            ctx,
            vehicle,
            bindings,
            stage,
            gpu_vehicle,
            gpu_stage,
            is_surface_configured: false,
            frame_presented: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.is_surface_configured = true;
            // the recreated capture texture is blank until the next present
            self.frame_presented = false;
            self.ctx.resize(width, height);
        }
    }

    fn restyle(&mut self, config: &StyleConfig) {
        apply_style(&mut self.vehicle, &self.bindings, config);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // keep the continuous loop going
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.gpu_vehicle.sync(&self.ctx.queue, &mut self.vehicle);
        self.gpu_stage.sync(&self.ctx.queue, &mut self.stage);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.light.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            shadow_pass.set_pipeline(&self.ctx.pipelines.shadow);
            shadow_pass.set_bind_group(0, &self.ctx.light.shadow_bind_group, &[]);
            self.gpu_vehicle.draw_shadow(&mut shadow_pass, &self.vehicle);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(1, &self.ctx.camera.bind_group, &[]);
            render_pass.set_bind_group(2, &self.ctx.light.bind_group, &[]);

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            self.gpu_stage
                .draw_kind(&mut render_pass, &self.stage, MaterialKind::Lit);
            self.gpu_vehicle
                .draw_kind(&mut render_pass, &self.vehicle, MaterialKind::Lit);

            render_pass.set_pipeline(&self.ctx.pipelines.glow);
            self.gpu_vehicle
                .draw_kind(&mut render_pass, &self.vehicle, MaterialKind::Emissive);

            // glass last so the accent volume shows through the cabin
            render_pass.set_pipeline(&self.ctx.pipelines.glass);
            self.gpu_vehicle
                .draw_kind(&mut render_pass, &self.vehicle, MaterialKind::Glass);
        }

        // Retain the frame for capture requests; the surface itself cannot
        // be read back after present.
        encoder.copy_texture_to_texture(
            output.texture.as_image_copy(),
            self.ctx.capture_texture.as_image_copy(),
            wgpu::Extent3d {
                width: self.ctx.config.width,
                height: self.ctx.config.height,
                depth_or_array_layers: 1,
            },
        );

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        self.frame_presented = true;
        Ok(())
    }
}

pub struct Viewer {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: EventLoopProxy<ViewerEvent>,
    identity: VehicleIdentity,
    initial_config: StyleConfig,
    state: Option<ViewerState>,
    right_pressed: bool,
    last_time: Instant,
}

impl Viewer {
    fn new(
        event_loop: &EventLoop<ViewerEvent>,
        identity: VehicleIdentity,
        initial_config: StyleConfig,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            identity,
            initial_config,
            state: None,
            right_pressed: false,
            last_time: Instant::now(),
        })
    }
}

impl ApplicationHandler<ViewerEvent> for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes =
            Window::default_attributes().with_title(self.identity.to_string());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("unable to create the viewer window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let config = self.initial_config;
        let init_future = ViewerState::new(window, config);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut state = match self.async_runtime.block_on(init_future) {
                Ok(state) => state,
                Err(e) => {
                    log::error!("viewer initialization failed: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            let size = state.ctx.window.inner_size();
            state.resize(size.width, size.height);
            state.ctx.window.request_redraw();
            self.state = Some(state);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = init_future
                    .await
                    .expect_throw("viewer initialization failed");
                assert!(proxy.send_event(ViewerEvent::Initialized(state)).is_ok());
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Initialized(mut state) => {
                // This is the message from our wasm `spawn_local`. A restyle
                // may have arrived while init was in flight; re-apply the
                // latest config (idempotent when nothing changed).
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.restyle(&self.initial_config);
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            ViewerEvent::Restyle(config) => {
                if let Some(state) = &mut self.state {
                    state.restyle(&config);
                } else {
                    // arrived before init finished; apply at mount instead
                    self.initial_config = config;
                }
            }
            ViewerEvent::Capture(reply) => {
                let frame = self.capture();
                // a dropped receiver means the host gave up waiting
                let _ = reply.send(frame);
            }
            ViewerEvent::Shutdown => {
                self.state = None;
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.right_pressed {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Right,
                ..
            } => {
                self.right_pressed = button_state.is_pressed();
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render() {
                    Ok(_) => {
                        state
                            .ctx
                            .camera
                            .controller
                            .update(&mut state.ctx.camera.camera, dt);
                        state
                            .ctx
                            .camera
                            .uniform
                            .update_view_proj(&state.ctx.camera.camera, &state.ctx.projection);
                        state.ctx.queue.write_buffer(
                            &state.ctx.camera.buffer,
                            0,
                            bytemuck::cast_slice(&[state.ctx.camera.uniform]),
                        );
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("unable to render: {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

impl Viewer {
    #[cfg(not(target_arch = "wasm32"))]
    fn capture(&mut self) -> Option<CapturedFrame> {
        let state = self.state.as_ref()?;
        if !state.frame_presented {
            return None;
        }
        match self
            .async_runtime
            .block_on(crate::capture::capture_frame(&state.ctx, &self.identity))
        {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::warn!("frame capture failed: {}", e);
                None
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn capture(&mut self) -> Option<CapturedFrame> {
        log::warn!("frame capture is not available on the web build");
        None
    }
}

/// Run the viewer until the window closes or a shutdown is requested.
///
/// `host` receives the [`ViewerHandle`] before the loop starts; move it to
/// another thread to drive restyles and captures while the loop runs.
pub fn run_with<F>(
    identity: VehicleIdentity,
    config: StyleConfig,
    host: F,
) -> anyhow::Result<()>
where
    F: FnOnce(ViewerHandle),
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<ViewerEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::with_user_event()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<ViewerEvent> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::with_user_event()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(not(feature = "integration-tests"))]
    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;

    let mut viewer = Viewer::new(&event_loop, identity, config)?;
    host(ViewerHandle {
        proxy: event_loop.create_proxy(),
    });
    event_loop.run_app(&mut viewer)?;
    Ok(())
}

/// Run the viewer without a host connection.
pub fn run(identity: VehicleIdentity, config: StyleConfig) -> anyhow::Result<()> {
    run_with(identity, config, |_| {})
}
