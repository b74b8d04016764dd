//! Procedural primitive meshes.
//!
//! Flat-shaded boxes, cylinders and planes cover everything the vehicle
//! template needs; each face gets its own vertices so hard edges keep their
//! normals.

use crate::data_structures::mesh::{MeshData, MeshVertex};

/// An axis-aligned box centered on the origin with the given full extents.
pub fn box_mesh(name: &'static str, width: f32, height: f32, depth: f32) -> MeshData {
    let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
    let mut mesh = MeshData::new(name);

    // All quads are wound counter-clockwise seen from outside the box.
    mesh.push_quad(
        [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]],
        [0.0, 0.0, 1.0],
    );
    mesh.push_quad(
        [[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]],
        [0.0, 0.0, -1.0],
    );
    mesh.push_quad(
        [[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]],
        [1.0, 0.0, 0.0],
    );
    mesh.push_quad(
        [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]],
        [-1.0, 0.0, 0.0],
    );
    mesh.push_quad(
        [[-x, y, -z], [-x, y, z], [x, y, z], [x, y, -z]],
        [0.0, 1.0, 0.0],
    );
    mesh.push_quad(
        [[-x, -y, z], [-x, -y, -z], [x, -y, -z], [x, -y, z]],
        [0.0, -1.0, 0.0],
    );
    mesh
}

/// A closed cylinder along the y axis, centered on the origin.
pub fn cylinder_mesh(name: &'static str, radius: f32, height: f32, segments: u32) -> MeshData {
    assert!(segments >= 3, "a cylinder needs at least 3 segments");
    let h = height / 2.0;
    let mut mesh = MeshData::new(name);

    let ring: Vec<(f32, f32)> = (0..segments)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / segments as f32;
            (angle.cos(), angle.sin())
        })
        .collect();

    // Side wall, one quad per segment with an outward-facing flat normal.
    for i in 0..segments as usize {
        let (c0, s0) = ring[i];
        let (c1, s1) = ring[(i + 1) % segments as usize];
        let normal = [(c0 + c1) / 2.0, 0.0, (s0 + s1) / 2.0];
        let len = (normal[0] * normal[0] + normal[2] * normal[2]).sqrt();
        let normal = [normal[0] / len, 0.0, normal[2] / len];
        mesh.push_quad(
            [
                [radius * c1, -h, radius * s1],
                [radius * c0, -h, radius * s0],
                [radius * c0, h, radius * s0],
                [radius * c1, h, radius * s1],
            ],
            normal,
        );
    }

    // Caps as triangle fans around the axis.
    for (y, normal, flip) in [(h, [0.0, 1.0, 0.0], true), (-h, [0.0, -1.0, 0.0], false)] {
        let center = mesh.vertices.len() as u32;
        mesh.vertices.push(MeshVertex {
            position: [0.0, y, 0.0],
            normal,
        });
        let first_rim = mesh.vertices.len() as u32;
        for &(c, s) in &ring {
            mesh.vertices.push(MeshVertex {
                position: [radius * c, y, radius * s],
                normal,
            });
        }
        for i in 0..segments {
            let a = first_rim + i;
            let b = first_rim + (i + 1) % segments;
            if flip {
                mesh.indices.extend([center, b, a]);
            } else {
                mesh.indices.extend([center, a, b]);
            }
        }
    }
    mesh
}

/// A square plane in the xz plane facing +y.
pub fn plane_mesh(name: &'static str, size: f32) -> MeshData {
    let h = size / 2.0;
    let mut mesh = MeshData::new(name);
    mesh.push_quad(
        [[-h, 0.0, -h], [-h, 0.0, h], [h, 0.0, h], [h, 0.0, -h]],
        [0.0, 1.0, 0.0],
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_six_faces() {
        let mesh = box_mesh("body", 3.2, 0.7, 1.6);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn box_extents_match_dimensions() {
        let mesh = box_mesh("body", 3.2, 0.7, 1.6);
        let max_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert_eq!(max_x, 1.6);
    }

    #[test]
    fn cylinder_is_closed() {
        let segments = 24;
        let mesh = cylinder_mesh("tire", 0.4, 0.3, segments);
        // side quads + two fans
        assert_eq!(mesh.triangle_count() as u32, segments * 2 + segments * 2);
        let indexed_max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(indexed_max < mesh.vertices.len());
    }

    #[test]
    fn cylinder_side_normals_are_radial() {
        let mesh = cylinder_mesh("tire", 0.4, 0.3, 24);
        for v in mesh.vertices.iter().take(4) {
            assert_eq!(v.normal[1], 0.0);
            let len = (v.normal[0].powi(2) + v.normal[2].powi(2)).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }
}
