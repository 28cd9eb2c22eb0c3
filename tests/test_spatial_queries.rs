//! Integration tests: ray picking against registered meshes
//!
//! Drives the registry the way a host does: flat buffers in, world-space
//! rays and per-instance model matrices per query.

mod common;

use std::f32::consts::TAU;

use common::*;
use geokern::core::types::{Mat4, Vec3};
use geokern::geometry::{ArcTubeParams, CurveBuilder};
use geokern::spatial::SpatialRegistry;

#[test]
fn test_cube_face_pick() {
    let mut registry = SpatialRegistry::new();
    let (positions, indices) = unit_cube();
    registry.create(1, &positions, &indices).unwrap();

    let hit = registry
        .query(1, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
        .expect("ray down the z axis should hit the +z face");
    assert_close(hit.distance, 4.5, 1e-6);
    assert_vec3_close(hit.point, [0.0, 0.0, 0.5], 1e-6);
    assert_vec3_close(hit.normal, [0.0, 0.0, 1.0], 1e-6);
}

#[test]
fn test_ray_beside_cube_misses() {
    let mut registry = SpatialRegistry::new();
    let (positions, indices) = unit_cube();
    registry.create(1, &positions, &indices).unwrap();

    assert!(
        registry
            .query(1, Vec3::new(0.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
            .is_none()
    );
}

#[test]
fn test_translated_instance_shifts_the_hit() {
    let mut registry = SpatialRegistry::new();
    let (positions, indices) = unit_cube();
    registry.create(1, &positions, &indices).unwrap();

    let model = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
    let hit = registry
        .query(1, Vec3::new(3.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), &model)
        .expect("ray through the moved instance should hit");
    assert_close(hit.distance, 4.5, 1e-6);
    assert_vec3_close(hit.point, [3.0, 0.0, 0.5], 1e-6);
    assert_vec3_close(hit.normal, [0.0, 0.0, 1.0], 1e-6);
}

#[test]
fn test_scaled_instance_reports_world_distance() {
    let mut registry = SpatialRegistry::new();
    let (positions, indices) = unit_cube();
    registry.create(1, &positions, &indices).unwrap();

    // Doubled cube: the +z face moves out to z=1.
    let model = Mat4::from_scale(Vec3::splat(2.0));
    let hit = registry
        .query(1, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), &model)
        .expect("ray should hit the scaled instance");
    assert_close(hit.distance, 4.0, 1e-5);
    assert_vec3_close(hit.point, [0.0, 0.0, 1.0], 1e-5);
}

#[test]
fn test_degenerate_model_falls_back_to_identity() {
    let mut registry = SpatialRegistry::new();
    let (positions, indices) = unit_cube();
    registry.create(1, &positions, &indices).unwrap();

    let origin = Vec3::new(0.0, 0.0, 5.0);
    let direction = Vec3::new(0.0, 0.0, -1.0);
    let with_identity = registry.query(1, origin, direction, &Mat4::IDENTITY).unwrap();
    let with_singular = registry.query(1, origin, direction, &Mat4::ZERO).unwrap();

    assert_close(with_singular.distance, with_identity.distance, 1e-6);
    assert_vec3_close(
        with_singular.point,
        [with_identity.point.x, with_identity.point.y, with_identity.point.z],
        1e-6,
    );
}

#[test]
fn test_triangle_pick_reports_surface_data() {
    let mut registry = SpatialRegistry::new();
    let (positions, indices) = single_triangle();
    registry.create(2, &positions, &indices).unwrap();

    let hit = registry
        .query(2, Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
        .expect("ray should hit the triangle interior");
    assert_close(hit.distance, 1.0, 1e-6);
    assert_vec3_close(hit.point, [0.25, 0.25, 0.0], 1e-6);
    assert_vec3_close(hit.normal, [0.0, 0.0, 1.0], 1e-6);
}

#[test]
fn test_generated_tube_is_pickable() {
    // Full torus in the xz plane, ring radius 2, tube radius 0.25.
    let mut builder = CurveBuilder::new(2048);
    let mesh = builder
        .arc_tube(&ArcTubeParams {
            radius: 2.0,
            tube_radius: 0.25,
            start_angle: 0.0,
            end_angle: TAU,
            arc_segments: 64,
            tube_segments: 16,
        })
        .unwrap();

    let mut registry = SpatialRegistry::new();
    registry.create(5, &mesh.positions, &mesh.indices).unwrap();

    // Inbound along -x, slightly off the equator so the hit lands on a
    // face rather than a lattice vertex. The continuous surface sits at
    // x ~= 2.243; tessellation pulls the hit a few thousandths closer.
    let hit = registry
        .query(5, Vec3::new(8.0, 0.05, 0.1), Vec3::new(-1.0, 0.0, 0.0), &Mat4::IDENTITY)
        .expect("ray should hit the outer tube wall");
    assert!(hit.distance > 5.70 && hit.distance < 5.80, "distance {}", hit.distance);
    assert!(hit.normal.x > 0.9, "normal {:?}", hit.normal);
    assert_close(hit.point.y, 0.05, 1e-6);

    // A ray through the hole clears the tube entirely.
    assert!(
        registry
            .query(5, Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0), &Mat4::IDENTITY)
            .is_none()
    );
}

#[test]
fn test_instances_are_independent() {
    let mut registry = SpatialRegistry::new();
    let (cube_positions, cube_indices) = unit_cube();
    let (tri_positions, tri_indices) = single_triangle();
    registry.create(1, &cube_positions, &cube_indices).unwrap();
    registry.create(2, &tri_positions, &tri_indices).unwrap();
    assert_eq!(registry.len(), 2);

    assert!(registry.dispose(1));
    assert!(registry.contains(2));
    assert!(
        registry
            .query(1, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
            .is_none()
    );
    assert!(
        registry
            .query(2, Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0), &Mat4::IDENTITY)
            .is_some()
    );
}
