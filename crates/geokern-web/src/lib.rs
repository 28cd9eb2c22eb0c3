//! WebAssembly bindings for the geokern kernel
//!
//! Thin wrappers that flatten the kernel API to the numeric buffer types
//! wasm-bindgen can marshal. Pointer accessors return offsets into wasm
//! linear memory; the host builds typed-array views over them and must
//! rebuild any cached view after linear memory grows.

use wasm_bindgen::prelude::*;

use geokern::bridge::{Capabilities, MatrixBridge as CoreMatrixBridge};
use geokern::core::types::Vec3;
use geokern::displace::{RippleField as CoreRippleField, RippleKind};
use geokern::geometry::{
    ArcTubeParams, CurveBuilder as CoreCurveBuilder, TubeGeometry as CoreTubeGeometry,
};
use geokern::math::matrix;
use geokern::spatial::SpatialRegistry as CoreSpatialRegistry;
use geokern::texture::{self, LutParams};

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

// --- Capability probe ---

/// Protocol tier the host should use, decided once at startup
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeTier {
    /// Inputs cross by value, outputs are read through memory views
    OutputZeroCopy = 0,
    /// Inputs are written into staging slots too
    FullZeroCopy = 1,
}

/// True when the embedding exposes SharedArrayBuffer on a cross-origin
/// isolated page, i.e. staging memory can be shared with workers safely
#[wasm_bindgen]
pub fn shared_input_available() -> bool {
    probe_shared_input()
}

/// Probe the embedding once and pick the protocol tier
#[wasm_bindgen]
pub fn probe_tier() -> BridgeTier {
    let capabilities = Capabilities { shared_input: probe_shared_input() };
    match capabilities.tier() {
        geokern::bridge::BridgeTier::OutputZeroCopy => BridgeTier::OutputZeroCopy,
        geokern::bridge::BridgeTier::FullZeroCopy => BridgeTier::FullZeroCopy,
    }
}

#[cfg(target_arch = "wasm32")]
fn probe_shared_input() -> bool {
    let global = js_sys::global();
    let has_shared_buffer = js_sys::Reflect::get(&global, &JsValue::from_str("SharedArrayBuffer"))
        .map(|v| !v.is_undefined())
        .unwrap_or(false);
    let isolated = js_sys::Reflect::get(&global, &JsValue::from_str("crossOriginIsolated"))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    has_shared_buffer && isolated
}

#[cfg(not(target_arch = "wasm32"))]
fn probe_shared_input() -> bool {
    false
}

// --- Matrix kernels ---

/// Staging-buffer matrix kernel
#[wasm_bindgen]
pub struct MatrixBridge {
    inner: CoreMatrixBridge,
}

impl Default for MatrixBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl MatrixBridge {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { inner: CoreMatrixBridge::new() }
    }

    // Staging slot pointers, 16 floats each (host writes, kernel reads).

    pub fn model_ptr(&mut self) -> *mut f32 {
        self.inner.model_slot_ptr()
    }

    pub fn view_ptr(&mut self) -> *mut f32 {
        self.inner.view_slot_ptr()
    }

    pub fn projection_ptr(&mut self) -> *mut f32 {
        self.inner.projection_slot_ptr()
    }

    // Output view pointers, 16 floats each (kernel writes, host reads).

    pub fn inverse_ptr(&self) -> *const f32 {
        self.inner.inverse_ptr()
    }

    pub fn normal_ptr(&self) -> *const f32 {
        self.inner.normal_ptr()
    }

    pub fn mvp_ptr(&self) -> *const f32 {
        self.inner.mvp_ptr()
    }

    /// Changes whenever the batch output may have moved; re-resolve any
    /// cached batch view when it does
    pub fn generation(&self) -> u32 {
        self.inner.generation()
    }

    /// Whether the last inverse-dependent compute substituted the identity
    pub fn last_degenerate(&self) -> bool {
        self.inner.last_degenerate()
    }

    // By-value tier.

    pub fn invert(&mut self, matrix: &[f32]) -> Result<(), JsError> {
        self.inner.invert(matrix).map(|_| ()).map_err(JsError::from)
    }

    pub fn normal(&mut self, matrix: &[f32]) -> Result<(), JsError> {
        self.inner.normal(matrix).map(|_| ()).map_err(JsError::from)
    }

    pub fn mvp(&mut self, model: &[f32], view: &[f32], projection: &[f32]) -> Result<(), JsError> {
        self.inner.mvp(model, view, projection).map(|_| ()).map_err(JsError::from)
    }

    // Full zero-copy tier, reading the staging slots.

    pub fn invert_staged(&mut self) {
        self.inner.invert_staged();
    }

    pub fn normal_staged(&mut self) {
        self.inner.normal_staged();
    }

    pub fn mvp_staged(&mut self) {
        self.inner.mvp_staged();
    }

    // Batch inversion into a growable output slot.

    /// Returns the number of degenerate inputs replaced by the identity
    pub fn batch_invert(&mut self, input: &[f32]) -> Result<usize, JsError> {
        self.inner.batch_invert(input).map_err(JsError::from)
    }

    pub fn batch_ptr(&self) -> *const f32 {
        self.inner.batch_ptr()
    }

    pub fn batch_len(&self) -> usize {
        self.inner.batch_len()
    }
}

// --- Spatial index ---

/// Registry of ray-queryable triangle indexes, keyed by caller ids
#[wasm_bindgen]
pub struct SpatialRegistry {
    inner: CoreSpatialRegistry,
}

impl Default for SpatialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SpatialRegistry {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { inner: CoreSpatialRegistry::new() }
    }

    /// Build (or rebuild) the index for `id` from flat buffers
    pub fn create(&mut self, id: u32, positions: &[f32], indices: &[u32]) -> Result<(), JsError> {
        self.inner.create(id, positions, indices).map_err(JsError::from)
    }

    /// Cast a world-space ray against instance `id`.
    ///
    /// Returns `[px, py, pz, nx, ny, nz, distance]`, or undefined on a
    /// miss (including unknown ids).
    pub fn query(
        &self,
        id: u32,
        ox: f32,
        oy: f32,
        oz: f32,
        dx: f32,
        dy: f32,
        dz: f32,
        model: &[f32],
    ) -> Result<Option<Vec<f32>>, JsError> {
        let model = matrix::mat4_from_slice(model).map_err(JsError::from)?;
        let hit = self
            .inner
            .query(id, Vec3::new(ox, oy, oz), Vec3::new(dx, dy, dz), &model);
        Ok(hit.map(|h| {
            vec![h.point.x, h.point.y, h.point.z, h.normal.x, h.normal.y, h.normal.z, h.distance]
        }))
    }

    /// Drop the index for `id`; unknown ids are a no-op
    pub fn dispose(&mut self, id: u32) -> bool {
        self.inner.dispose(id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.inner.contains(id)
    }
}

// --- Ripple displacement ---

/// Ripple simulation writing into a reused displacement buffer
#[wasm_bindgen]
pub struct RippleField {
    inner: CoreRippleField,
}

#[wasm_bindgen]
impl RippleField {
    #[wasm_bindgen(constructor)]
    pub fn new(vertex_count: usize) -> Self {
        Self { inner: CoreRippleField::new(vertex_count) }
    }

    /// Start a ripple; returns the slot to use for `move_to`/`release`
    pub fn spawn(&mut self, x: f32, y: f32, z: f32, strength: f32, is_pull: bool) -> usize {
        let kind = if is_pull { RippleKind::Pull } else { RippleKind::Wave };
        self.inner.spawn(Vec3::new(x, y, z), strength, kind)
    }

    pub fn move_to(&mut self, slot: usize, x: f32, y: f32, z: f32) {
        self.inner.move_to(slot, Vec3::new(x, y, z));
    }

    pub fn release(&mut self, slot: usize) {
        self.inner.release(slot);
    }

    /// Advance the simulation; read results through the displacement view
    pub fn step(&mut self, dt: f32, positions: &[f32], normals: &[f32]) -> Result<(), JsError> {
        self.inner.step(dt, positions, normals).map(|_| ()).map_err(JsError::from)
    }

    /// Pointer to xyz displacements, `displacement_len` floats
    pub fn displacement_ptr(&self) -> *const f32 {
        self.inner.displacements().as_ptr()
    }

    pub fn displacement_len(&self) -> usize {
        self.inner.displacements().len()
    }

    /// Fixed-layout uniform block, 5 floats per ripple slot
    pub fn shader_uniforms(&self) -> Vec<f32> {
        self.inner.shader_uniforms()
    }

    pub fn active_count(&self) -> usize {
        self.inner.active_count()
    }
}

// --- Curve geometry ---

/// One generated mesh; getters copy out of wasm memory
#[wasm_bindgen]
pub struct TubeGeometry {
    inner: CoreTubeGeometry,
}

#[wasm_bindgen]
impl TubeGeometry {
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> Vec<f32> {
        self.inner.positions.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> Vec<f32> {
        self.inner.normals.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> Vec<f32> {
        self.inner.uvs.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> Vec<u32> {
        self.inner.indices.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.inner.vertex_count()
    }
}

/// Curve mesh builder with reusable scratch buffers
#[wasm_bindgen]
pub struct CurveBuilder {
    inner: CoreCurveBuilder,
}

#[wasm_bindgen]
impl CurveBuilder {
    #[wasm_bindgen(constructor)]
    pub fn new(max_vertices: usize) -> Self {
        Self { inner: CoreCurveBuilder::new(max_vertices) }
    }

    pub fn arc_tube(
        &mut self,
        radius: f32,
        tube_radius: f32,
        start_angle: f32,
        end_angle: f32,
        arc_segments: u32,
        tube_segments: u32,
    ) -> Result<TubeGeometry, JsError> {
        let params = ArcTubeParams {
            radius,
            tube_radius,
            start_angle,
            end_angle,
            arc_segments,
            tube_segments,
        };
        let mesh = self.inner.arc_tube(&params).map_err(JsError::from)?;
        Ok(TubeGeometry { inner: mesh })
    }

    /// 7 floats per character: position xyz, euler rotation xyz, scale
    pub fn text_anchors(
        &self,
        text: &str,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        letter_spacing: f32,
    ) -> Vec<f32> {
        self.inner.text_anchors(text, radius, start_angle, end_angle, letter_spacing)
    }
}

// --- Procedural textures ---

/// Tileable grayscale value noise, RGBA bytes
#[wasm_bindgen]
pub fn generate_noise(size: u32, seed: u32) -> Vec<u8> {
    texture::noise(size, seed)
}

/// Multi-octave grain noise, RGBA bytes
#[wasm_bindgen]
pub fn generate_blue_noise(size: u32, seed: u32) -> Vec<u8> {
    texture::blue_noise(size, seed)
}

/// Color grading LUT strip, (size*size) x size RGBA bytes
#[wasm_bindgen]
pub fn generate_color_lut(size: u32, contrast: f32, saturation: f32) -> Result<Vec<u8>, JsError> {
    texture::color_lut(size, &LutParams { contrast, saturation }).map_err(JsError::from)
}
