//! Camera, projection and the damped orbit controller.
//!
//! The view is always aimed at the vehicle: the controller orbits the camera
//! around a fixed target on drag input and zooms on scroll, with damped
//! motion that keeps gliding briefly after the input stops. Resizes only
//! touch the projection's aspect ratio.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use winit::event::{MouseScrollDelta, WindowEvent};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }
}

#[derive(Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Track the drawing surface: aspect follows width/height on every resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Orbits the camera around its target with damped motion.
///
/// Drag deltas and scroll ticks feed velocities; [`update`](Self::update)
/// integrates them each frame and bleeds them off so releasing the mouse
/// lets the view settle instead of stopping dead.
#[derive(Debug)]
pub struct OrbitController {
    yaw: f32,
    pitch: f32,
    distance: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
    rotate_sensitivity: f32,
    zoom_sensitivity: f32,
    damping: f32,
}

impl OrbitController {
    pub const MIN_DISTANCE: f32 = 2.0;
    pub const MAX_DISTANCE: f32 = 40.0;
    // Just shy of straight up/down to keep look_at well-defined.
    const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.05;
    const MIN_PITCH: f32 = 0.02;

    pub fn new(rotate_sensitivity: f32, zoom_sensitivity: f32, damping: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: 8.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            rotate_sensitivity,
            zoom_sensitivity,
            damping,
        }
    }

    /// Start the orbit from an explicit camera position relative to `camera.target`.
    pub fn align_to(&mut self, camera: &Camera) {
        let offset = camera.position - camera.target;
        self.distance = offset
            .magnitude()
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
        self.yaw = offset.z.atan2(offset.x);
        self.pitch = (offset.y / self.distance)
            .asin()
            .clamp(Self::MIN_PITCH, Self::PITCH_LIMIT);
    }

    /// Feed a mouse drag delta (pixels).
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.yaw_velocity += dx as f32 * self.rotate_sensitivity;
        self.pitch_velocity += dy as f32 * self.rotate_sensitivity;
    }

    /// Pick the scroll events out of the window event stream.
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            let amount = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
            };
            self.handle_scroll(amount);
        }
    }

    /// Feed a scroll amount in lines; positive zooms in.
    pub fn handle_scroll(&mut self, amount: f32) {
        self.zoom_velocity -= amount * self.zoom_sensitivity;
    }

    /// Advance the damped state and place the camera on its orbit.
    pub fn update(&mut self, camera: &mut Camera, dt: instant::Duration) {
        let dt = dt.as_secs_f32();

        self.yaw += self.yaw_velocity * dt;
        self.pitch = (self.pitch + self.pitch_velocity * dt)
            .clamp(Self::MIN_PITCH, Self::PITCH_LIMIT);
        self.distance = (self.distance + self.zoom_velocity * dt)
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);

        let decay = (-self.damping * dt).exp();
        self.yaw_velocity *= decay;
        self.pitch_velocity *= decay;
        self.zoom_velocity *= decay;

        let offset = Vector3::new(
            self.distance * self.pitch.cos() * self.yaw.cos(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.yaw.sin(),
        );
        camera.position = camera.target + offset;
    }

    pub fn is_settled(&self) -> bool {
        self.yaw_velocity.abs() < 1e-4
            && self.pitch_velocity.abs() < 1e-4
            && self.zoom_velocity.abs() < 1e-4
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.matrix() * camera.view_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera state bundled with its GPU resources.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use instant::Duration;

    #[test]
    fn resize_sets_aspect_to_width_over_height() {
        let mut projection = Projection::new(800, 600, cgmath::Deg(50.0), 0.1, 100.0);
        projection.resize(1920, 1080);
        assert_eq!(projection.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut camera = Camera::new([5.0, 3.0, 6.0], [0.0, 0.0, 0.0]);
        let mut controller = OrbitController::new(0.005, 1.0, 6.0);
        controller.align_to(&camera);
        controller.handle_mouse(120.0, 0.0);
        let expected = (camera.position - camera.target).magnitude();
        for _ in 0..30 {
            controller.update(&mut camera, Duration::from_millis(16));
        }
        let actual = (camera.position - camera.target).magnitude();
        assert!((actual - expected).abs() < 1e-3);
    }

    #[test]
    fn damping_settles_the_orbit() {
        let mut camera = Camera::new([5.0, 3.0, 6.0], [0.0, 0.0, 0.0]);
        let mut controller = OrbitController::new(0.005, 1.0, 6.0);
        controller.align_to(&camera);
        controller.handle_mouse(200.0, 80.0);
        assert!(!controller.is_settled());
        for _ in 0..600 {
            controller.update(&mut camera, Duration::from_millis(16));
        }
        assert!(controller.is_settled());
    }

    #[test]
    fn zoom_is_clamped_to_the_orbit_range() {
        let mut camera = Camera::new([5.0, 3.0, 6.0], [0.0, 0.0, 0.0]);
        let mut controller = OrbitController::new(0.005, 100.0, 0.5);
        controller.align_to(&camera);
        for _ in 0..100 {
            controller.handle_scroll(-3.0);
            controller.update(&mut camera, Duration::from_millis(16));
        }
        let distance = (camera.position - camera.target).magnitude();
        assert!(distance <= OrbitController::MAX_DISTANCE + 1e-3);
    }
}
