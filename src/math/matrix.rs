//! 4x4 matrix kernels with an explicit degenerate-input policy

use crate::core::error::Error;
use crate::core::types::{Mat3, Mat4, Result};

/// Determinant magnitude below which a matrix is treated as singular.
///
/// Uniform scale s shrinks the determinant by s^3, so this must sit well
/// below the smallest scale a host plausibly feeds us (0.001 gives 1e-9)
/// while still catching rank-deficient inputs, whose determinants land at
/// or near zero.
pub const DET_EPSILON: f32 = 1e-12;

/// Floats in one column-major 4x4 matrix buffer.
pub const MAT4_FLOATS: usize = 16;

/// Outcome of a checked matrix computation.
///
/// When `degenerate` is set the input was singular and `matrix` holds the
/// identity substitute; the result is always finite either way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inversion {
    pub matrix: Mat4,
    pub degenerate: bool,
}

impl Inversion {
    fn degenerate() -> Self {
        Self { matrix: Mat4::IDENTITY, degenerate: true }
    }
}

/// Invert a matrix, substituting the identity for singular inputs.
///
/// A collapsed transform (zero scale, duplicated axes) therefore yields a
/// well-defined fallback instead of NaN/Inf poisoning everything
/// downstream.
pub fn invert(m: &Mat4) -> Inversion {
    let det = m.determinant();
    if !det.is_finite() || det.abs() < DET_EPSILON {
        return Inversion::degenerate();
    }
    let inverse = m.inverse();
    if !inverse.is_finite() {
        return Inversion::degenerate();
    }
    Inversion { matrix: inverse, degenerate: false }
}

/// Normal matrix: inverse-transpose with the translation stripped.
///
/// Transforming surface normals by this keeps them perpendicular to the
/// surface under non-uniform scale, where the model matrix itself would
/// skew them.
pub fn normal_matrix(m: &Mat4) -> Inversion {
    let inv = invert(m);
    Inversion {
        matrix: Mat4::from_mat3(Mat3::from_mat4(inv.matrix).transpose()),
        degenerate: inv.degenerate,
    }
}

/// Model-view-projection composite, column-vector convention.
pub fn mvp(model: &Mat4, view: &Mat4, projection: &Mat4) -> Mat4 {
    *projection * *view * *model
}

/// Reinterpret a flat slice as one column-major matrix.
pub fn mat4_from_slice(slice: &[f32]) -> Result<Mat4> {
    let array: &[f32; MAT4_FLOATS] = slice.try_into().map_err(|_| {
        Error::BufferLayout(format!(
            "matrix slice must hold {} floats, got {}",
            MAT4_FLOATS,
            slice.len()
        ))
    })?;
    Ok(Mat4::from_cols_array(array))
}

/// Invert a packed batch of column-major matrices.
///
/// `input` and `output` are flat buffers of N*16 floats each. Returns how
/// many inputs were degenerate (each of those slots holds the identity).
pub fn batch_invert(input: &[f32], output: &mut [f32]) -> Result<usize> {
    if input.len() % MAT4_FLOATS != 0 {
        return Err(Error::BufferLayout(format!(
            "batch input of {} floats is not a whole number of matrices",
            input.len()
        )));
    }
    if output.len() != input.len() {
        return Err(Error::BufferLayout(format!(
            "batch output holds {} floats, input holds {}",
            output.len(),
            input.len()
        )));
    }

    let matrices: &[[f32; MAT4_FLOATS]] = bytemuck::cast_slice(input);
    let results: &mut [[f32; MAT4_FLOATS]] = bytemuck::cast_slice_mut(output);

    let mut degenerate = 0;
    for (source, result) in matrices.iter().zip(results.iter_mut()) {
        let inv = invert(&Mat4::from_cols_array(source));
        if inv.degenerate {
            degenerate += 1;
        }
        *result = inv.matrix.to_cols_array();
    }
    Ok(degenerate)
}
