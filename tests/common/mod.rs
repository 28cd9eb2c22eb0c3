//! Shared fixtures for the integration tests

// Not every test binary uses every helper.
#![allow(dead_code)]

use geokern::core::types::Vec3;

/// Axis-aligned unit cube centered at the origin, wound outward
pub fn unit_cube() -> (Vec<f32>, Vec<u32>) {
    let h = 0.5;
    let positions = vec![
        -h, -h, -h, // 0
        h, -h, -h, // 1
        h, h, -h, // 2
        -h, h, -h, // 3
        -h, -h, h, // 4
        h, -h, h, // 5
        h, h, h, // 6
        -h, h, h, // 7
    ];
    let indices = vec![
        4, 5, 6, 4, 6, 7, // +z
        0, 3, 2, 0, 2, 1, // -z
        1, 2, 6, 1, 6, 5, // +x
        0, 4, 7, 0, 7, 3, // -x
        2, 3, 7, 2, 7, 6, // +y
        0, 1, 5, 0, 5, 4, // -y
    ];
    (positions, indices)
}

/// Right triangle in the z=0 plane with its normal up the z axis
pub fn single_triangle() -> (Vec<f32>, Vec<u32>) {
    (
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        vec![0, 1, 2],
    )
}

pub fn assert_close(a: f32, b: f32, tol: f32) {
    assert!(
        (a - b).abs() < tol,
        "{} vs {} (diff={}, tol={})",
        a,
        b,
        (a - b).abs(),
        tol
    );
}

pub fn assert_vec3_close(v: Vec3, expected: [f32; 3], tol: f32) {
    assert!(
        (v - Vec3::from_array(expected)).length() < tol,
        "{:?} vs {:?} (tol={})",
        v,
        expected,
        tol
    );
}
