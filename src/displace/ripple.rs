//! Ripple simulation producing per-vertex displacements
//!
//! Hosts drive this from pointer events: spawn a pull while the surface is
//! held, move it while dragging, release it into an expanding wave. Each
//! frame, [`RippleField::step`] folds every live ripple into one reused
//! displacement buffer.

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};

/// Concurrent ripple cap, also the fixed slot count in the uniform layout
pub const MAX_RIPPLES: usize = 8;

/// Floats per ripple in [`RippleField::shader_uniforms`]: position, age,
/// kind tag
pub const UNIFORM_STRIDE: usize = 5;

/// How a ripple displaces the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RippleKind {
    /// Surface pulled toward the contact point while held
    #[default]
    Pull,
    /// Expanding ring released from a pull
    Wave,
}

#[derive(Clone, Copy, Default)]
struct Ripple {
    position: Vec3,
    age: f32,
    strength: f32,
    active: bool,
    kind: RippleKind,
}

/// Tuning for the displacement field
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RippleConfig {
    /// World units the wave front travels per second
    pub wave_speed: f32,
    /// Radial thickness of the wave band
    pub wave_width: f32,
    /// Seconds before a released wave expires
    pub wave_lifetime: f32,
    /// Pull displacement per unit strength
    pub pull_gain: f32,
    /// Wave displacement per unit strength
    pub wave_gain: f32,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            wave_speed: 5.0,
            wave_width: 1.0,
            wave_lifetime: 1.5,
            pull_gain: 1.2,
            wave_gain: 0.4,
        }
    }
}

/// Fixed pool of ripples and the displacement buffer they write
pub struct RippleField {
    ripples: [Ripple; MAX_RIPPLES],
    /// Reused every frame, xyz per vertex
    displacements: Vec<f32>,
    vertex_count: usize,
    config: RippleConfig,
}

impl RippleField {
    pub fn new(vertex_count: usize) -> Self {
        Self::with_config(vertex_count, RippleConfig::default())
    }

    pub fn with_config(vertex_count: usize, config: RippleConfig) -> Self {
        Self {
            ripples: [Ripple::default(); MAX_RIPPLES],
            displacements: vec![0.0; vertex_count * 3],
            vertex_count,
            config,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn active_count(&self) -> usize {
        self.ripples.iter().filter(|r| r.active).count()
    }

    /// Start a ripple, reusing a free slot or recycling the oldest one.
    /// Returns the slot index for later `move_to`/`release` calls.
    pub fn spawn(&mut self, position: Vec3, strength: f32, kind: RippleKind) -> usize {
        let slot = self
            .ripples
            .iter()
            .position(|r| !r.active)
            .unwrap_or_else(|| self.oldest_slot());
        self.ripples[slot] = Ripple { position, age: 0.0, strength, active: true, kind };
        slot
    }

    fn oldest_slot(&self) -> usize {
        let mut oldest = 0;
        let mut oldest_age = f32::NEG_INFINITY;
        for (i, r) in self.ripples.iter().enumerate() {
            if r.age > oldest_age {
                oldest_age = r.age;
                oldest = i;
            }
        }
        oldest
    }

    /// Follow a drag. Inactive or out-of-range slots are a no-op.
    pub fn move_to(&mut self, slot: usize, position: Vec3) {
        if slot < MAX_RIPPLES && self.ripples[slot].active {
            self.ripples[slot].position = position;
        }
    }

    /// Let go of a pull: it becomes a wave expanding from the release
    /// point, with its age restarted for the wave envelope.
    pub fn release(&mut self, slot: usize) {
        if slot < MAX_RIPPLES && self.ripples[slot].active {
            self.ripples[slot].kind = RippleKind::Wave;
            self.ripples[slot].age = 0.0;
        }
    }

    /// Advance the simulation and recompute vertex displacements.
    ///
    /// `positions` and `normals` are xyz-interleaved and must match the
    /// vertex count the field was built for. The returned slice aliases
    /// the internal buffer and stays valid until the next call.
    pub fn step(&mut self, dt: f32, positions: &[f32], normals: &[f32]) -> Result<&[f32]> {
        let expected = self.vertex_count * 3;
        if positions.len() != expected || normals.len() != expected {
            return Err(Error::BufferLayout(format!(
                "expected {} floats for {} vertices, got {} positions and {} normals",
                expected,
                self.vertex_count,
                positions.len(),
                normals.len()
            )));
        }

        let positions: &[Vec3] = bytemuck::cast_slice(positions);
        let normals: &[Vec3] = bytemuck::cast_slice(normals);
        let displacements: &mut [Vec3] = bytemuck::cast_slice_mut(&mut self.displacements);

        for ((out, &position), &normal) in
            displacements.iter_mut().zip(positions).zip(normals)
        {
            let mut total = Vec3::ZERO;
            for ripple in self.ripples.iter().filter(|r| r.active) {
                let to_ripple = ripple.position - position;
                let dist = to_ripple.length();

                match ripple.kind {
                    RippleKind::Pull => {
                        // Rubber-like pull toward the contact point.
                        let falloff = (-dist * 0.5).exp();
                        total += to_ripple.normalize_or_zero()
                            * (ripple.strength * falloff * self.config.pull_gain);
                    }
                    RippleKind::Wave => {
                        let front = ripple.age * self.config.wave_speed;
                        let band = (dist - front).abs();
                        if band < self.config.wave_width {
                            // Ring envelope, damped with distance and age.
                            let envelope = (1.0 - band / self.config.wave_width)
                                * (-dist * 0.3).exp()
                                * (-ripple.age * 2.0).exp();
                            let swing = (dist * 8.0 - front * 10.0).sin() * envelope;
                            total += normal * (swing * ripple.strength * self.config.wave_gain);
                        }
                    }
                }
            }
            *out = total;
        }

        for ripple in &mut self.ripples {
            if ripple.active {
                ripple.age += dt;
                if ripple.kind == RippleKind::Wave && ripple.age > self.config.wave_lifetime {
                    ripple.active = false;
                }
            }
        }

        Ok(&self.displacements)
    }

    /// Last computed displacements, xyz per vertex
    pub fn displacements(&self) -> &[f32] {
        &self.displacements
    }

    /// Fixed-layout uniform block: [`UNIFORM_STRIDE`] floats per slot for
    /// all [`MAX_RIPPLES`] slots. Kind tag is 1.0 for pulls, 0.0 for
    /// waves, -1.0 for inactive slots.
    pub fn shader_uniforms(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(MAX_RIPPLES * UNIFORM_STRIDE);
        for ripple in &self.ripples {
            data.push(ripple.position.x);
            data.push(ripple.position.y);
            data.push(ripple.position.z);
            data.push(ripple.age);
            data.push(if ripple.active {
                match ripple.kind {
                    RippleKind::Pull => 1.0,
                    RippleKind::Wave => 0.0,
                }
            } else {
                -1.0
            });
        }
        data
    }
}
