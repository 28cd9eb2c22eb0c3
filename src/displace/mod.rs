//! Interactive ripple displacement field

pub mod ripple;

pub use ripple::{MAX_RIPPLES, RippleConfig, RippleField, RippleKind, UNIFORM_STRIDE};
