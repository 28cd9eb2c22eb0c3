//! Tileable value noise from integer hashing
//!
//! No float trig, no lattice interpolation: every texel is a pure function
//! of (x, y, size, seed), so the same inputs produce the same bytes on
//! every platform.

/// Octaves accumulated by [`blue_noise`].
const OCTAVES: u32 = 4;

/// Fast integer hash with full avalanche on the low bits.
fn hash2d(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h ^= x.wrapping_mul(0x45d9f3b);
    h = h.wrapping_mul(0x45d9f3b);
    h ^= y.wrapping_mul(0x119de1f3);
    h = h.wrapping_mul(0x119de1f3);
    h ^= h >> 16;
    h
}

/// Sample the noise lattice in [0, 1]; coordinates wrap modulo `size`.
fn texel(x: u32, y: u32, size: u32, seed: u32) -> f32 {
    let h = hash2d(x % size, y % size, seed);
    h as f32 / u32::MAX as f32
}

/// Grayscale value noise, tileable in both axes.
///
/// Returns row-major RGBA texels with the value duplicated across the
/// color channels and alpha forced opaque. A size of zero yields an
/// empty buffer.
pub fn noise(size: u32, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            push_gray(&mut data, texel(x, y, size, seed));
        }
    }
    data
}

/// Multi-octave noise with the low-frequency bias of plain value noise
/// suppressed, a cheap stand-in for true blue noise in grain shaders.
///
/// Each octave doubles the sampling frequency and shifts the lattice by a
/// per-octave offset so the layers decorrelate; amplitudes halve per
/// octave and the sum is normalized back to [0, 1]. Same RGBA layout as
/// [`noise`].
pub fn blue_noise(size: u32, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let mut value = 0.0;
            let mut amplitude = 1.0;
            let mut total_amplitude = 0.0;

            for octave in 0..OCTAVES {
                let freq = 1 << octave;
                let offset = octave * 17;
                value += texel(
                    (x * freq + offset) % size,
                    (y * freq + offset * 3) % size,
                    size,
                    seed,
                ) * amplitude;
                total_amplitude += amplitude;
                amplitude *= 0.5;
            }

            push_gray(&mut data, value / total_amplitude);
        }
    }
    data
}

fn push_gray(data: &mut Vec<u8>, value: f32) {
    let byte = (value * 255.0) as u8;
    data.push(byte);
    data.push(byte);
    data.push(byte);
    data.push(255);
}
