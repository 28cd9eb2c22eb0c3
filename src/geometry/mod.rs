//! Procedural curve geometry

pub mod curve;

pub use curve::{ArcTubeParams, CurveBuilder, TubeGeometry};
