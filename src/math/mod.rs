//! Mathematical utilities and data structures

pub mod aabb;
pub mod matrix;
pub mod ray;

pub use aabb::Aabb;
pub use matrix::Inversion;
pub use ray::Ray;
