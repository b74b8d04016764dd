//! Vehicle scene construction and live restyling.
//!
//! - `vehicle` builds the car scene graph and its binding table once
//! - `apply` mutates bound materials/transforms when the style config changes

pub mod apply;
pub mod vehicle;

pub use apply::apply_style;
pub use vehicle::{BindingTable, WheelBinding, build_stage, build_vehicle};
