//! geokern - accelerated geometry and numerics kernel for web renderers
//!
//! Matrix kernels, a triangle spatial index, deterministic procedural
//! textures, and the staging-buffer protocol that moves their results to a
//! host without copies.

pub mod bridge;
pub mod core;
pub mod displace;
pub mod geometry;
pub mod math;
pub mod spatial;
pub mod texture;
