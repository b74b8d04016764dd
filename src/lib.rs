//! showroom-ngin
//!
//! A parametric 3D vehicle showroom built on wgpu, for native targets and
//! the web. The crate procedurally builds a stylized car from an appearance
//! config, renders it continuously with orbit controls, and applies later
//! config edits to the mounted scene in place: no geometry rebuild, no
//! remount, no frame hitch. The current frame can be captured as a PNG at
//! any time for export collaborators.
//!
//! High-level modules
//! - `config`: the appearance parameter set handed over by the host
//! - `scene`: procedural vehicle construction and live restyling
//! - `data_structures`: scene graph, meshes, materials, transforms
//! - `camera`: projection and the damped orbit controller
//! - `context`: central GPU and window context owning device/queue/pipelines
//! - `pipelines`: render pipeline definitions (lit, glass, glow, shadow)
//! - `gpu_scene`: GPU mirror that keeps buffers in sync with the graph
//! - `viewer`: window, event loop, and the host-facing handle
//! - `capture`: frame readback and PNG encoding

pub mod camera;
pub mod capture;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod gpu_scene;
pub mod pipelines;
pub mod scene;
pub mod viewer;

pub use capture::CapturedFrame;
pub use config::{Color, StyleConfig, VehicleIdentity};
pub use scene::{apply_style, build_stage, build_vehicle, BindingTable};
pub use viewer::{run, run_with, ViewerHandle};
