//! Deterministic procedural textures

pub mod lut;
pub mod noise;

pub use lut::{LutParams, color_lut};
pub use noise::{blue_noise, noise};
