//! Keyed storage for spatial indexes

use std::collections::HashMap;

use super::bvh::{BvhConfig, Hit, SpatialIndex};
use crate::core::types::{Mat4, Result, Vec3};

/// Owns every spatial index a host has built, keyed by caller-chosen ids
///
/// Plain owned state rather than a process-global table: two hosts in one
/// process get two independent registries.
#[derive(Default)]
pub struct SpatialRegistry {
    indexes: HashMap<u32, SpatialIndex>,
    config: BvhConfig,
}

impl SpatialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose builds use a caller-tuned config
    pub fn with_config(config: BvhConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { indexes: HashMap::new(), config })
    }

    /// Build (or rebuild) the index for `id`; the last build wins
    pub fn create(&mut self, id: u32, positions: &[f32], indices: &[u32]) -> Result<()> {
        let index = SpatialIndex::build(positions, indices, &self.config)?;
        log::info!(
            "spatial index {}: {} triangles, {} nodes",
            id,
            index.triangle_count(),
            index.node_count()
        );
        if self.indexes.insert(id, index).is_some() {
            log::debug!("spatial index {} replaced", id);
        }
        Ok(())
    }

    /// Cast a ray against the index registered under `id`
    ///
    /// Unknown ids report a miss.
    pub fn query(&self, id: u32, origin: Vec3, direction: Vec3, model: &Mat4) -> Option<Hit> {
        self.indexes.get(&id)?.intersect(origin, direction, model)
    }

    /// Drop the index for `id`; unknown ids are a no-op
    pub fn dispose(&mut self, id: u32) -> bool {
        self.indexes.remove(&id).is_some()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.indexes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
