//! 3D color grading LUT baked into a 2D strip

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// Resolution cap keeping the strip inside sane texture limits.
const MAX_LUT_SIZE: u32 = 256;

/// Color grade applied while baking the LUT.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LutParams {
    /// Scale around mid-gray; 1.0 is a no-op.
    pub contrast: f32,
    /// Lerp between luma and the original color; 1.0 is a no-op.
    pub saturation: f32,
}

impl Default for LutParams {
    fn default() -> Self {
        Self { contrast: 1.0, saturation: 1.0 }
    }
}

/// Bake a `size`^3 color cube as a `(size*size) x size` RGBA strip.
///
/// Texel (x, y) holds the graded color for lattice coordinate
/// (r, g, b) = (x % size, y, x / size), so a shader can address the cube
/// with two integer divisions. Sizes outside 2..=256 are rejected: a
/// one-texel axis cannot even represent black and white.
pub fn color_lut(size: u32, params: &LutParams) -> Result<Vec<u8>> {
    if size < 2 || size > MAX_LUT_SIZE {
        return Err(Error::Config(format!(
            "LUT size {} outside supported range 2..={}",
            size, MAX_LUT_SIZE
        )));
    }

    let width = size as usize * size as usize;
    let height = size as usize;
    let step = 1.0 / (size - 1) as f32;
    let mut data = Vec::with_capacity(width * height * 4);

    for y in 0..height {
        for x in 0..width {
            let b = x / size as usize;
            let r = x % size as usize;
            let g = y;

            let rf = grade(r as f32 * step, params);
            let gf = grade(g as f32 * step, params);
            let bf = grade(b as f32 * step, params);

            // Rec. 601 luma, matching the grading shader this feeds.
            let luma = rf * 0.299 + gf * 0.587 + bf * 0.114;
            push_channel(&mut data, luma + (rf - luma) * params.saturation);
            push_channel(&mut data, luma + (gf - luma) * params.saturation);
            push_channel(&mut data, luma + (bf - luma) * params.saturation);
            data.push(255);
        }
    }

    Ok(data)
}

fn grade(value: f32, params: &LutParams) -> f32 {
    ((value - 0.5) * params.contrast + 0.5).clamp(0.0, 1.0)
}

fn push_channel(data: &mut Vec<u8>, value: f32) {
    data.push((value.clamp(0.0, 1.0) * 255.0) as u8);
}
