//! Staging-buffer protocol between the kernel and its host
//!
//! Matrix results never cross the boundary by value. The kernel owns
//! fixed input and output slots; a host writes inputs (either by handing
//! a slice to the by-value entry points or, on the full zero-copy tier,
//! directly into the staging slots), triggers a compute, and reads the
//! result through a borrowed view or raw pointer into the same slot.
//!
//! Views are invalidated whenever the kernel's memory may have moved.
//! [`MatrixBridge::generation`] changes every time a growable output slot
//! reallocates; a host that caches raw pointers must re-resolve them when
//! the generation it saw last no longer matches.

use crate::core::error::Error;
use crate::core::types::{Mat4, Result};
use crate::math::matrix::{self, MAT4_FLOATS};

/// Protocol tier negotiated once at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeTier {
    /// Inputs cross by value, outputs are read through views
    OutputZeroCopy,
    /// Inputs are written straight into staging slots, outputs are read
    /// through views, nothing crosses by value
    FullZeroCopy,
}

/// What the embedding lets the protocol rely on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Host can safely write kernel staging memory in place
    pub shared_input: bool,
}

impl Capabilities {
    /// In-process hosts always share memory with the kernel
    pub fn native() -> Self {
        Self { shared_input: true }
    }

    pub fn tier(&self) -> BridgeTier {
        if self.shared_input {
            BridgeTier::FullZeroCopy
        } else {
            BridgeTier::OutputZeroCopy
        }
    }
}

/// Staging slots and result views for the matrix kernels
///
/// All slots start as the identity. Single-matrix outputs live in fixed
/// arrays whose addresses never change for the life of the bridge; the
/// batch output grows on demand and bumps the generation counter when it
/// moves.
pub struct MatrixBridge {
    model_slot: [f32; MAT4_FLOATS],
    view_slot: [f32; MAT4_FLOATS],
    projection_slot: [f32; MAT4_FLOATS],
    inverse_out: [f32; MAT4_FLOATS],
    normal_out: [f32; MAT4_FLOATS],
    mvp_out: [f32; MAT4_FLOATS],
    batch_out: Vec<f32>,
    generation: u32,
    last_degenerate: bool,
}

impl Default for MatrixBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixBridge {
    pub fn new() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array();
        Self {
            model_slot: identity,
            view_slot: identity,
            projection_slot: identity,
            inverse_out: identity,
            normal_out: identity,
            mvp_out: identity,
            batch_out: Vec::new(),
            generation: 0,
            last_degenerate: false,
        }
    }

    // --- Staging slots (host writes, kernel reads) ---

    pub fn model_slot(&mut self) -> &mut [f32; MAT4_FLOATS] {
        &mut self.model_slot
    }

    pub fn view_slot(&mut self) -> &mut [f32; MAT4_FLOATS] {
        &mut self.view_slot
    }

    pub fn projection_slot(&mut self) -> &mut [f32; MAT4_FLOATS] {
        &mut self.projection_slot
    }

    pub fn model_slot_ptr(&mut self) -> *mut f32 {
        self.model_slot.as_mut_ptr()
    }

    pub fn view_slot_ptr(&mut self) -> *mut f32 {
        self.view_slot.as_mut_ptr()
    }

    pub fn projection_slot_ptr(&mut self) -> *mut f32 {
        self.projection_slot.as_mut_ptr()
    }

    // --- Result views (kernel writes, host reads) ---

    pub fn inverse_view(&self) -> &[f32; MAT4_FLOATS] {
        &self.inverse_out
    }

    pub fn normal_view(&self) -> &[f32; MAT4_FLOATS] {
        &self.normal_out
    }

    pub fn mvp_view(&self) -> &[f32; MAT4_FLOATS] {
        &self.mvp_out
    }

    pub fn inverse_ptr(&self) -> *const f32 {
        self.inverse_out.as_ptr()
    }

    pub fn normal_ptr(&self) -> *const f32 {
        self.normal_out.as_ptr()
    }

    pub fn mvp_ptr(&self) -> *const f32 {
        self.mvp_out.as_ptr()
    }

    pub fn batch_view(&self) -> &[f32] {
        &self.batch_out
    }

    pub fn batch_ptr(&self) -> *const f32 {
        self.batch_out.as_ptr()
    }

    pub fn batch_len(&self) -> usize {
        self.batch_out.len()
    }

    /// Bumped whenever a growable output slot reallocates
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether the most recent inverse-dependent compute saw a singular
    /// input and substituted the identity
    pub fn last_degenerate(&self) -> bool {
        self.last_degenerate
    }

    // --- By-value compute (works on every tier) ---

    /// Invert `matrix` into the inverse view
    pub fn invert(&mut self, matrix: &[f32]) -> Result<&[f32; MAT4_FLOATS]> {
        let m = matrix::mat4_from_slice(matrix)?;
        Ok(self.write_inverse(&m))
    }

    /// Compute the normal matrix of `matrix` into the normal view
    pub fn normal(&mut self, matrix: &[f32]) -> Result<&[f32; MAT4_FLOATS]> {
        let m = matrix::mat4_from_slice(matrix)?;
        Ok(self.write_normal(&m))
    }

    /// Compose projection * view * model into the mvp view
    pub fn mvp(
        &mut self,
        model: &[f32],
        view: &[f32],
        projection: &[f32],
    ) -> Result<&[f32; MAT4_FLOATS]> {
        let m = matrix::mat4_from_slice(model)?;
        let v = matrix::mat4_from_slice(view)?;
        let p = matrix::mat4_from_slice(projection)?;
        Ok(self.write_mvp(&m, &v, &p))
    }

    /// Invert a packed batch into the growable batch view. Returns how
    /// many inputs were degenerate.
    pub fn batch_invert(&mut self, input: &[f32]) -> Result<usize> {
        if input.len() % MAT4_FLOATS != 0 {
            return Err(Error::BufferLayout(format!(
                "batch input of {} floats is not a whole number of matrices",
                input.len()
            )));
        }
        if self.batch_out.len() != input.len() {
            let before = self.batch_out.as_ptr();
            self.batch_out.resize(input.len(), 0.0);
            if self.batch_out.as_ptr() != before {
                self.generation = self.generation.wrapping_add(1);
            }
        }
        let degenerate = matrix::batch_invert(input, &mut self.batch_out)?;
        self.last_degenerate = degenerate > 0;
        Ok(degenerate)
    }

    // --- Staged compute (full zero-copy tier reads the staging slots) ---

    /// Invert the model slot into the inverse view
    pub fn invert_staged(&mut self) -> &[f32; MAT4_FLOATS] {
        let m = Mat4::from_cols_array(&self.model_slot);
        self.write_inverse(&m)
    }

    /// Compute the normal matrix of the model slot into the normal view
    pub fn normal_staged(&mut self) -> &[f32; MAT4_FLOATS] {
        let m = Mat4::from_cols_array(&self.model_slot);
        self.write_normal(&m)
    }

    /// Compose the three staging slots into the mvp view
    pub fn mvp_staged(&mut self) -> &[f32; MAT4_FLOATS] {
        let m = Mat4::from_cols_array(&self.model_slot);
        let v = Mat4::from_cols_array(&self.view_slot);
        let p = Mat4::from_cols_array(&self.projection_slot);
        self.write_mvp(&m, &v, &p)
    }

    fn write_inverse(&mut self, m: &Mat4) -> &[f32; MAT4_FLOATS] {
        let inv = matrix::invert(m);
        self.last_degenerate = inv.degenerate;
        self.inverse_out = inv.matrix.to_cols_array();
        &self.inverse_out
    }

    fn write_normal(&mut self, m: &Mat4) -> &[f32; MAT4_FLOATS] {
        let normal = matrix::normal_matrix(m);
        self.last_degenerate = normal.degenerate;
        self.normal_out = normal.matrix.to_cols_array();
        &self.normal_out
    }

    fn write_mvp(&mut self, m: &Mat4, v: &Mat4, p: &Mat4) -> &[f32; MAT4_FLOATS] {
        self.mvp_out = matrix::mvp(m, v, p).to_cols_array();
        &self.mvp_out
    }
}
