//! Engine data structures: meshes, materials, scene graphs, and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `mesh` contains CPU mesh data and the GPU vertex type
//! - `primitives` generates procedural box/cylinder/plane meshes
//! - `material` holds surface parameters with mutable colours
//! - `instance` holds node transforms and their raw GPU layout
//! - `scene_graph` is the arena-based hierarchical scene

pub mod instance;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod scene_graph;
