//! Restyling a mounted vehicle: applied through the binding table, in place,
//! idempotent, and never touching the graph's topology or geometry.

use cgmath::Vector3;
use showroom_ngin::{apply_style, build_vehicle, Color, StyleConfig};

fn drain_dirty(scene: &mut showroom_ngin::data_structures::scene_graph::SceneGraph) {
    scene.take_transforms_dirty();
    let ids: Vec<_> = scene.materials().map(|(id, _)| id).collect();
    for id in ids {
        scene.material_mut(id).take_dirty();
    }
}

#[test]
fn restyle_changes_colours_scale_and_visibility() {
    let (mut scene, bindings) = build_vehicle(&StyleConfig::default());

    let config = StyleConfig {
        body_color: Color::new(0xc0, 0x00, 0x10),
        interior_accent: Color::new(0x00, 0xaa, 0xff),
        wheel_scale: 1.2,
        spoiler_visible: false,
    };
    apply_style(&mut scene, &bindings, &config);

    assert_eq!(
        scene.material(bindings.body_material).color(),
        config.body_color
    );
    assert_eq!(
        scene.material(bindings.glow_material).color(),
        config.interior_accent
    );
    for wheel in &bindings.wheels {
        assert_eq!(scene.local(wheel.tire).scale, Vector3::new(1.2, 1.0, 1.2));
        assert_eq!(scene.local(wheel.rim).scale, Vector3::new(1.2, 1.0, 1.2));
    }
    assert!(!scene.is_shown(bindings.spoiler));
}

#[test]
fn restyle_preserves_topology_and_geometry() {
    let (mut scene, bindings) = build_vehicle(&StyleConfig::default());
    let nodes_before = scene.node_count();
    let drawables_before = scene.drawables().count();

    for wheel_scale in [0.8, 1.5, 1.0, 1.23] {
        apply_style(
            &mut scene,
            &bindings,
            &StyleConfig {
                wheel_scale,
                spoiler_visible: wheel_scale > 1.0,
                ..StyleConfig::default()
            },
        );
    }

    assert_eq!(scene.node_count(), nodes_before);
    assert_eq!(scene.drawables().count(), drawables_before);
}

#[test]
fn applying_the_same_config_twice_leaves_nothing_dirty() {
    let config = StyleConfig {
        body_color: Color::new(0x88, 0x11, 0x22),
        wheel_scale: 1.1,
        ..StyleConfig::default()
    };
    let (mut scene, bindings) = build_vehicle(&config);
    drain_dirty(&mut scene);

    apply_style(&mut scene, &bindings, &config);

    assert!(!scene.take_transforms_dirty());
    let ids: Vec<_> = scene.materials().map(|(id, _)| id).collect();
    for id in ids {
        assert!(!scene.material_mut(id).take_dirty());
    }
}

#[test]
fn a_colour_only_edit_does_not_dirty_transforms() {
    let (mut scene, bindings) = build_vehicle(&StyleConfig::default());
    drain_dirty(&mut scene);

    apply_style(
        &mut scene,
        &bindings,
        &StyleConfig {
            body_color: Color::new(0xff, 0xff, 0xff),
            ..StyleConfig::default()
        },
    );

    assert!(!scene.take_transforms_dirty());
    assert!(scene.material_mut(bindings.body_material).take_dirty());
}

#[test]
fn out_of_range_wheel_scale_is_clamped_not_rejected() {
    let (mut scene, bindings) = build_vehicle(&StyleConfig::default());

    apply_style(
        &mut scene,
        &bindings,
        &StyleConfig {
            wheel_scale: 9.0,
            ..StyleConfig::default()
        },
    );
    assert_eq!(
        scene.local(bindings.wheels[0].tire).scale,
        Vector3::new(1.5, 1.0, 1.5)
    );

    apply_style(
        &mut scene,
        &bindings,
        &StyleConfig {
            wheel_scale: 0.1,
            ..StyleConfig::default()
        },
    );
    assert_eq!(
        scene.local(bindings.wheels[0].tire).scale,
        Vector3::new(0.8, 1.0, 0.8)
    );
}

#[test]
fn toggling_the_spoiler_restores_its_parts() {
    let (mut scene, bindings) = build_vehicle(&StyleConfig::default());
    let parts: Vec<_> = scene.node(bindings.spoiler).children().to_vec();
    assert!(parts.iter().all(|&part| scene.is_shown(part)));

    apply_style(
        &mut scene,
        &bindings,
        &StyleConfig {
            spoiler_visible: false,
            ..StyleConfig::default()
        },
    );
    assert!(parts.iter().all(|&part| !scene.is_shown(part)));

    apply_style(&mut scene, &bindings, &StyleConfig::default());
    assert!(parts.iter().all(|&part| scene.is_shown(part)));
}

#[test]
fn a_burst_of_edits_lands_on_the_last_one() {
    let (mut scene, bindings) = build_vehicle(&StyleConfig::default());

    let last = StyleConfig {
        body_color: Color::new(0x00, 0x00, 0xff),
        interior_accent: Color::new(0xff, 0xff, 0x00),
        wheel_scale: 0.9,
        spoiler_visible: true,
    };
    for config in [
        StyleConfig {
            body_color: Color::new(0xff, 0x00, 0x00),
            ..StyleConfig::default()
        },
        StyleConfig {
            wheel_scale: 1.4,
            spoiler_visible: false,
            ..StyleConfig::default()
        },
        last,
    ] {
        apply_style(&mut scene, &bindings, &config);
    }

    assert_eq!(scene.material(bindings.body_material).color(), last.body_color);
    assert_eq!(
        scene.material(bindings.glow_material).color(),
        last.interior_accent
    );
    assert_eq!(
        scene.local(bindings.wheels[3].rim).scale,
        Vector3::new(0.9, 1.0, 0.9)
    );
    assert!(scene.is_shown(bindings.spoiler));
}
