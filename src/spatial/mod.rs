//! Ray-queryable triangle indexes

pub mod bvh;
pub mod registry;
pub mod triangle;

pub use bvh::{BvhConfig, Hit, SpatialIndex};
pub use registry::SpatialRegistry;
pub use triangle::Triangle;
