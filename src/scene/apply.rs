//! Live restyling of a built vehicle scene.
//!
//! On every config change the host hands over a complete [`StyleConfig`];
//! applying it touches only the handles in the [`BindingTable`], with no
//! graph traversal and no geometry rebuild. Applying the same config twice is a no-op
//! the second time.

use cgmath::Vector3;

use crate::config::StyleConfig;
use crate::data_structures::scene_graph::SceneGraph;
use crate::scene::vehicle::BindingTable;

/// Mutate the bound materials and transforms to match `config`.
///
/// - body material colour <- `body_color` (also recolours the spoiler, which
///   shares the material)
/// - glow material colour <- `interior_accent`
/// - each wheel's tire and rim scale to `(s, 1, s)` in cylinder-local space:
///   the local y axis is the wheel's rotation axis and never scales
/// - spoiler assembly visibility <- `spoiler_visible`
///
/// `wheel_scale` is clamped to the documented range; everything else is
/// applied verbatim. Scale is set, not multiplied, so repeated application
/// is idempotent.
pub fn apply_style(scene: &mut SceneGraph, bindings: &BindingTable, config: &StyleConfig) {
    scene
        .material_mut(bindings.body_material)
        .set_color(config.body_color);
    scene
        .material_mut(bindings.glow_material)
        .set_color(config.interior_accent);

    let s = config.clamped_wheel_scale();
    let radial = Vector3::new(s, 1.0, s);
    for wheel in &bindings.wheels {
        scene.set_local_scale(wheel.tire, radial);
        scene.set_local_scale(wheel.rim, radial);
    }

    scene.set_visible(bindings.spoiler, config.spoiler_visible);
}
