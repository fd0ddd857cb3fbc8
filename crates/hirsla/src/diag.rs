//! Diagnostics snapshots of a [`Store`].
//!
//! Enabled by the `diagnostics` feature flag. [`Store::stats`] gathers entity
//! pool and per-archetype numbers into a [`StoreStats`], which serializes to
//! JSON for external inspectors.

use serde::Serialize;

use crate::ecs::{ArchetypeId, Store};

/// Point-in-time statistics for a store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub entity_count: usize,
    pub archetype_count: usize,
    pub resource_count: usize,
    pub entity_pool: EntityPoolStats,
    pub archetypes: Vec<ArchetypeStats>,
}

/// Location table occupancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPoolStats {
    pub total_slots: usize,
    pub free_count: usize,
    pub alive_count: usize,
    /// Share of slots sitting on the free list, in percent.
    pub fragmentation_pct: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeStats {
    pub id: ArchetypeId,
    pub rows: usize,
    pub component_names: Vec<String>,
}

impl StoreStats {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Store {
    /// Gather a [`StoreStats`] snapshot.
    pub fn stats(&self) -> StoreStats {
        let locations = self.locations();
        let total_slots = locations.total_slots();
        let free_count = locations.free_count();
        let fragmentation_pct = if total_slots == 0 {
            0.0
        } else {
            free_count as f32 / total_slots as f32 * 100.0
        };

        StoreStats {
            entity_count: self.entity_count(),
            archetype_count: self.archetype_count(),
            resource_count: self.resources().len(),
            entity_pool: EntityPoolStats {
                total_slots,
                free_count,
                alive_count: locations.len(),
                fragmentation_pct,
            },
            archetypes: self
                .archetypes()
                .iter()
                .map(|archetype| ArchetypeStats {
                    id: archetype.id(),
                    rows: archetype.len(),
                    component_names: archetype.components().to_vec(),
                })
                .collect(),
        }
    }
}
