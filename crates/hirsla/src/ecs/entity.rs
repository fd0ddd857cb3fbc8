//! # Entity — Handles and the Location Table
//!
//! An [`Entity`] is just a number pair. It doesn't "contain" anything; the
//! [`EntityLocationTable`] maps it to the archetype and row that currently hold
//! its components. Because archetypes compact themselves with swap-remove,
//! row indices move around, so the table (not the archetype) is the authority
//! for "where does entity E live right now".
//!
//! ## Design: Generational Indices
//!
//! Slots are recycled through a free list. Pairing every index with a
//! **generation** that is bumped on delete means a handle captured before a
//! delete/reuse cycle stops resolving instead of aliasing the new occupant:
//!
//! ```text
//! Entity { index: 5, generation: 0 }  ← original
//! Entity { index: 5, generation: 1 }  ← after recycle
//! ```
//!
//! ## Memory Layout
//!
//! ```text
//! slots: [ (A0,r0,g0) (FREE,NIL,g1) (A2,r1,g0) (FREE,1,g3) ]
//!                           ▲                        │
//!                           └────────────────────────┘
//! free_head = 3            (a freed slot's row field links to the next free slot)
//! ```
//!
//! Every index below `slots.len()` is either live or on the free list. Freed
//! slots are reused LIFO. Capacity doubles when exhausted.
//!
//! ## Comparison
//!
//! - **hecs**: Same generational scheme, with a separate `Vec` of free indices.
//! - **bevy_ecs**: `Entities` also threads a free list, but reserves ids
//!   atomically for commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::archetype::ArchetypeId;

/// Archetype marker written into a freed slot.
const FREE: u32 = u32::MAX;
/// End of the free list.
const NIL: u32 = u32::MAX;
/// Slots reserved the first time the table grows.
const MIN_CAPACITY: usize = 16;

/// A lightweight handle to a record in a [`Store`](super::store::Store).
///
/// Only valid for the store that minted it, and only while its generation
/// matches the slot's.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot in the location table. Recycled after delete, so it does not
    /// identify an entity on its own.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Bumped each time the slot is freed. A handle resolves only while it
    /// matches the slot's.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    /// `index:generation`, e.g. `5:1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.generation)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity[{self}]")
    }
}

/// Where an entity's data lives: an archetype and a row inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityLocation {
    pub archetype: ArchetypeId,
    pub row: u32,
}

#[derive(Clone, Copy)]
struct Slot {
    /// Owning archetype, or [`FREE`].
    archetype: u32,
    /// Row in the archetype while live, next free slot (or [`NIL`]) while free.
    row: u32,
    generation: u32,
}

/// Maps entities to their [`EntityLocation`], with O(1) create/update/delete.
pub(crate) struct EntityLocationTable {
    slots: Vec<Slot>,
    free_head: u32,
    free_count: usize,
}

impl EntityLocationTable {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: NIL,
            free_count: 0,
        }
    }

    /// Mint a handle for `location`. Reuses the most recently freed slot if
    /// there is one.
    pub fn create(&mut self, location: EntityLocation) -> Entity {
        if self.free_head != NIL {
            let index = self.free_head;
            let slot = &mut self.slots[index as usize];
            self.free_head = slot.row;
            self.free_count -= 1;
            slot.archetype = location.archetype.0;
            slot.row = location.row;
            return Entity::new(index, slot.generation);
        }

        if self.slots.len() == self.slots.capacity() {
            let grow = self.slots.capacity().max(MIN_CAPACITY);
            self.slots.reserve_exact(grow);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            archetype: location.archetype.0,
            row: location.row,
            generation: 0,
        });
        Entity::new(index, 0)
    }

    /// Overwrite a live entity's location.
    ///
    /// The handle must be live; this is only checked in debug builds.
    pub fn update(&mut self, entity: Entity, location: EntityLocation) {
        debug_assert!(self.is_alive(entity), "update of dead entity {entity:?}");
        let slot = &mut self.slots[entity.index as usize];
        slot.archetype = location.archetype.0;
        slot.row = location.row;
    }

    /// Free an entity's slot and push it onto the free list.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn delete(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.slots[entity.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.archetype = FREE;
        slot.row = self.free_head;
        self.free_head = entity.index;
        self.free_count += 1;
        true
    }

    /// Bring a freed handle back to life at `location`, under its original
    /// generation. Used by rollback, so the slot is normally at the head of
    /// the free list; otherwise the list is walked to unlink it.
    ///
    /// Returns `false` if the slot is live or was never minted.
    pub fn restore(&mut self, entity: Entity, location: EntityLocation) -> bool {
        let index = entity.index;
        match self.slots.get(index as usize) {
            Some(slot) if slot.archetype == FREE => {}
            _ => return false,
        }

        if self.free_head == index {
            self.free_head = self.slots[index as usize].row;
        } else {
            let mut cursor = self.free_head;
            while cursor != NIL {
                let next = self.slots[cursor as usize].row;
                if next == index {
                    self.slots[cursor as usize].row = self.slots[index as usize].row;
                    break;
                }
                cursor = next;
            }
        }
        self.free_count -= 1;

        let slot = &mut self.slots[index as usize];
        slot.archetype = location.archetype.0;
        slot.row = location.row;
        slot.generation = entity.generation;
        true
    }

    /// Where `entity` lives, or `None` for freed, stale or never-minted handles.
    pub fn locate(&self, entity: Entity) -> Option<EntityLocation> {
        let slot = self.slots.get(entity.index as usize)?;
        if slot.archetype == FREE || slot.generation != entity.generation {
            return None;
        }
        Some(EntityLocation {
            archetype: ArchetypeId(slot.archetype),
            row: slot.row,
        })
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.locate(entity).is_some()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_count
    }

    /// Number of slots waiting on the free list.
    #[cfg(any(feature = "diagnostics", test))]
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    /// Total number of slots ever minted.
    #[cfg(any(feature = "diagnostics", test))]
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.slots.capacity()
    }
}

impl Default for EntityLocationTable {
    fn default() -> Self {
        Self::new()
    }
}
