//! Procedural construction of the vehicle scene graph.
//!
//! The vehicle template is fixed: chassis body, cabin shell, interior-glow
//! volume, four wheel assemblies (tire + rim each) and a spoiler assembly
//! that is always built and only toggled visible. [`build_vehicle`] returns
//! the graph together with its [`BindingTable`] so later restyles can reach
//! the mutable handles without traversing the graph again.

use cgmath::{Deg, Rotation3, Vector3};

use crate::config::{Color, StyleConfig};
use crate::data_structures::{
    instance::Instance,
    material::Material,
    primitives::{box_mesh, cylinder_mesh, plane_mesh},
    scene_graph::{MaterialId, NodeId, SceneGraph},
};
use crate::scene::apply::apply_style;

/// Handles to one wheel assembly and its two cylinder parts.
#[derive(Clone, Copy, Debug)]
pub struct WheelBinding {
    pub assembly: NodeId,
    pub tire: NodeId,
    pub rim: NodeId,
}

/// Role-keyed index into the mutable parts of the vehicle graph.
///
/// Built once alongside the graph; every role exists exactly once and the
/// table lives and dies with the graph it points into.
#[derive(Clone, Copy, Debug)]
pub struct BindingTable {
    pub body: NodeId,
    pub cabin: NodeId,
    pub interior_glow: NodeId,
    /// Order: front-left, front-right, rear-left, rear-right.
    pub wheels: [WheelBinding; 4],
    pub spoiler: NodeId,
    pub body_material: MaterialId,
    pub glow_material: MaterialId,
}

/// Build the vehicle graph for a style config.
///
/// Pure with respect to global state and called exactly once per viewer
/// lifetime; restyles go through [`apply_style`] instead of a rebuild. The
/// geometry is built at neutral scale and the initial config is applied
/// through the same code path as every later edit.
pub fn build_vehicle(config: &StyleConfig) -> (SceneGraph, BindingTable) {
    let mut scene = SceneGraph::new();
    let root = scene.root();

    let body_material = scene.add_material(Material::lit("body", config.body_color, 0.6, 0.35));
    let glass_material =
        scene.add_material(Material::glass("glass", Color::new(0x11, 0x11, 0x11), 0.9));
    let tire_material = scene.add_material(Material::lit("tire", Color::new(0x11, 0x11, 0x11), 0.0, 0.9));
    let rim_material = scene.add_material(Material::lit("rim", Color::new(0xc0, 0xc0, 0xc0), 1.0, 0.2));
    let glow_material =
        scene.add_material(Material::emissive("glow", config.interior_accent, 0.7));

    // Chassis sits above the ground plane; x is the longitudinal axis.
    let body = scene.add_drawable(
        root,
        "body",
        Instance::at(Vector3::new(0.0, 0.6, 0.0)),
        box_mesh("body", 3.2, 0.7, 1.6),
        body_material,
        true,
    );
    let cabin = scene.add_drawable(
        root,
        "cabin",
        Instance::at(Vector3::new(0.1, 1.05, 0.0)),
        box_mesh("cabin", 1.6, 0.5, 1.4),
        glass_material,
        true,
    );
    let interior_glow = scene.add_drawable(
        root,
        "interior_glow",
        Instance::at(Vector3::new(0.1, 0.85, 0.0)),
        box_mesh("interior_glow", 1.2, 0.2, 1.2),
        glow_material,
        false,
    );

    let wheel_positions = [
        ("wheel_front_left", 1.2, 0.75),
        ("wheel_front_right", 1.2, -0.75),
        ("wheel_rear_left", -1.2, 0.75),
        ("wheel_rear_right", -1.2, -0.75),
    ];
    let wheels = wheel_positions.map(|(name, x, z)| {
        let assembly = scene.add_group(root, name, Instance::at(Vector3::new(x, 0.4, z)));
        // The cylinders' y axis is turned onto the longitudinal axis, so the
        // wheel's rotation axis runs along x.
        let lying = Instance {
            rotation: cgmath::Quaternion::from_angle_z(Deg(90.0)),
            ..Instance::new()
        };
        let tire = scene.add_drawable(
            assembly,
            "tire",
            lying.clone(),
            cylinder_mesh("tire", 0.4, 0.3, 24),
            tire_material,
            false,
        );
        let rim = scene.add_drawable(
            assembly,
            "rim",
            lying,
            cylinder_mesh("rim", 0.28, 0.32, 12),
            rim_material,
            false,
        );
        WheelBinding {
            assembly,
            tire,
            rim,
        }
    });

    // The spoiler shares the body material and is always present in the
    // graph; only its visibility flag reacts to the config.
    let spoiler = scene.add_group(root, "spoiler", Instance::new());
    scene.add_drawable(
        spoiler,
        "spoiler_support_left",
        Instance::at(Vector3::new(-1.5, 1.0, 0.4)),
        box_mesh("spoiler_support", 0.1, 0.2, 0.1),
        body_material,
        false,
    );
    scene.add_drawable(
        spoiler,
        "spoiler_support_right",
        Instance::at(Vector3::new(-1.5, 1.0, -0.4)),
        box_mesh("spoiler_support", 0.1, 0.2, 0.1),
        body_material,
        false,
    );
    scene.add_drawable(
        spoiler,
        "spoiler_wing",
        Instance::at(Vector3::new(-1.5, 1.15, 0.0)),
        box_mesh("spoiler_wing", 0.9, 0.07, 0.6),
        body_material,
        false,
    );

    let bindings = BindingTable {
        body,
        cabin,
        interior_glow,
        wheels,
        spoiler,
        body_material,
        glow_material,
    };

    apply_style(&mut scene, &bindings, config);
    (scene, bindings)
}

/// Build the static stage around the vehicle: a large, dark ground plane
/// that receives the directional light's shadow. Owned by the viewer and
/// deliberately outside the vehicle graph and its binding table.
pub fn build_stage() -> SceneGraph {
    let mut stage = SceneGraph::new();
    let ground_material =
        stage.add_material(Material::lit("ground", Color::new(0x11, 0x11, 0x11), 0.2, 0.9));
    stage.add_drawable(
        stage.root(),
        "ground",
        Instance::new(),
        plane_mesh("ground", 200.0),
        ground_material,
        false,
    );
    stage
}
