//! The vehicle builder runs without a GPU, so its output can be checked
//! directly: part inventory, binding table wiring, and the initial config
//! flowing through the same path as every later restyle.

use cgmath::Vector3;
use showroom_ngin::{
    build_stage, build_vehicle,
    data_structures::scene_graph::NodeKind,
    Color, StyleConfig,
};

#[test]
fn default_build_contains_the_full_part_inventory() {
    let (scene, _) = build_vehicle(&StyleConfig::default());

    // body + cabin + glow, four wheels of two parts each, three spoiler parts
    assert_eq!(scene.drawables().count(), 14);
    // plus the root, four wheel assemblies and the spoiler group
    assert_eq!(scene.node_count(), 20);
}

#[test]
fn binding_table_points_at_distinct_nodes() {
    let (scene, bindings) = build_vehicle(&StyleConfig::default());

    let mut handles = vec![bindings.body, bindings.cabin, bindings.interior_glow];
    for wheel in &bindings.wheels {
        handles.extend([wheel.assembly, wheel.tire, wheel.rim]);
    }
    handles.push(bindings.spoiler);

    for (i, a) in handles.iter().enumerate() {
        for b in &handles[i + 1..] {
            assert_ne!(a, b);
        }
    }

    assert!(scene.node(bindings.body).is_drawable());
    assert!(!scene.node(bindings.spoiler).is_drawable());
    assert_eq!(scene.node(bindings.spoiler).children().len(), 3);
}

#[test]
fn initial_config_is_applied_at_build_time() {
    let config = StyleConfig {
        body_color: Color::new(0x12, 0x34, 0x56),
        interior_accent: Color::new(0x00, 0xff, 0x00),
        wheel_scale: 1.3,
        spoiler_visible: false,
    };
    let (scene, bindings) = build_vehicle(&config);

    assert_eq!(
        scene.material(bindings.body_material).color(),
        config.body_color
    );
    assert_eq!(
        scene.material(bindings.glow_material).color(),
        config.interior_accent
    );
    for wheel in &bindings.wheels {
        assert_eq!(scene.local(wheel.tire).scale, Vector3::new(1.3, 1.0, 1.3));
        assert_eq!(scene.local(wheel.rim).scale, Vector3::new(1.3, 1.0, 1.3));
    }
    assert!(!scene.is_shown(bindings.spoiler));
}

#[test]
fn default_build_shows_the_spoiler_at_neutral_wheel_scale() {
    let (scene, bindings) = build_vehicle(&StyleConfig::default());

    assert!(scene.is_shown(bindings.spoiler));
    for wheel in &bindings.wheels {
        assert_eq!(scene.local(wheel.tire).scale, Vector3::new(1.0, 1.0, 1.0));
    }
    assert_eq!(
        scene.material(bindings.body_material).color(),
        Color::new(0x2b, 0x2b, 0x2b)
    );
}

#[test]
fn wheels_are_placed_symmetrically() {
    let (scene, bindings) = build_vehicle(&StyleConfig::default());

    let positions: Vec<Vector3<f32>> = bindings
        .wheels
        .iter()
        .map(|wheel| scene.local(wheel.assembly).position)
        .collect();

    // front pair mirrors across the x axis, rear pair likewise
    assert_eq!(positions[0], Vector3::new(1.2, 0.4, 0.75));
    assert_eq!(positions[1], Vector3::new(1.2, 0.4, -0.75));
    assert_eq!(positions[2], Vector3::new(-1.2, 0.4, 0.75));
    assert_eq!(positions[3], Vector3::new(-1.2, 0.4, -0.75));
}

#[test]
fn only_body_and_cabin_cast_shadows() {
    let (scene, bindings) = build_vehicle(&StyleConfig::default());

    let casts = |id| match &scene.node(id).kind {
        NodeKind::Drawable { casts_shadow, .. } => *casts_shadow,
        NodeKind::Group => panic!("expected a drawable"),
    };
    assert!(casts(bindings.body));
    assert!(casts(bindings.cabin));
    assert!(!casts(bindings.interior_glow));
    for wheel in &bindings.wheels {
        assert!(!casts(wheel.tire));
    }
}

#[test]
fn stage_is_a_single_ground_plane() {
    let stage = build_stage();
    assert_eq!(stage.drawables().count(), 1);
    let (_, ground) = stage.drawables().next().unwrap();
    match &ground.kind {
        NodeKind::Drawable {
            mesh, casts_shadow, ..
        } => {
            assert_eq!(mesh.triangle_count(), 2);
            assert!(!casts_shadow);
        }
        NodeKind::Group => panic!("expected a drawable"),
    }
}
