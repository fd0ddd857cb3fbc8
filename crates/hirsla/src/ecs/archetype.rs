//! # Archetype — Grouping Entities by Component Signature
//!
//! An archetype is a table holding every entity with exactly the same set of
//! components. Each component is a separate dense [`Column`], so a row index
//! addresses one logical record across all of them.
//!
//! ## Memory Layout
//!
//! ```text
//! Archetype { components: [id, mass, position] }
//!
//! columns:
//!   mass:     [m0, m1, m2, m3]
//!   position: [x0 y0 z0, x1 y1 z1, ...]    ← flat vector column
//! entities:   [e0, e1, e2, e3]             ← the `id` column
//!
//! All columns have the same length. Index `i` everywhere is the same entity.
//! ```
//!
//! ## Deletion: swap-remove
//!
//! ```text
//! delete_row(1):  [e0, e1, e2, e3]  →  [e0, e3, e2]
//!                                           ▲
//!                        e3's location is re-pointed to row 1
//! ```
//!
//! Columns never have holes, at the cost of unstable row indices. That's why
//! [`delete_row`](Archetype::delete_row) takes the location table and fixes up
//! the displaced entity itself.
//!
//! ## Comparison
//!
//! - **hecs**: Very similar archetype design, keyed by `TypeId`.
//! - **bevy_ecs**: Splits tables from archetypes and adds change ticks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::component::Column;
use super::entity::{Entity, EntityLocation, EntityLocationTable};
use super::schema::{EntityValues, Schema, Value};

/// The component every archetype carries: the entity's own handle.
pub const ID: &str = "id";

/// Stable identifier of an archetype within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArchetypeId(pub(crate) u32);

impl ArchetypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "archetype#{}", self.0)
    }
}

/// A sorted, deduplicated list of component names (always including `id`)
/// that uniquely identifies an archetype.
pub(crate) type ArchetypeKey = Vec<String>;

/// Compute the canonical key for a set of component names.
pub(crate) fn archetype_key<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> ArchetypeKey {
    let mut key: Vec<String> = names.into_iter().map(|n| n.as_ref().to_owned()).collect();
    key.push(ID.to_owned());
    key.sort();
    key.dedup();
    key
}

/// A columnar table of all entities sharing one component set.
pub struct Archetype {
    id: ArchetypeId,
    /// Sorted component names, `id` included.
    components: ArchetypeKey,
    /// One column per component except `id`.
    columns: BTreeMap<String, Column>,
    schemas: BTreeMap<String, Schema>,
    /// The `id` column.
    entities: Vec<Entity>,
}

impl Archetype {
    /// Create an empty table. `schemas` must not contain `id`.
    pub(crate) fn new(id: ArchetypeId, schemas: BTreeMap<String, Schema>) -> Self {
        debug_assert!(!schemas.contains_key(ID));
        let columns = schemas
            .iter()
            .map(|(name, schema)| (name.clone(), Column::new(schema)))
            .collect();
        Self {
            id,
            components: archetype_key(schemas.keys()),
            columns,
            schemas,
            entities: Vec::new(),
        }
    }

    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    /// Sorted component names, `id` included.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.components.binary_search_by(|c| c.as_str().cmp(name)).is_ok()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The `id` column: row `i` holds the entity stored at row `i`.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// A data column. `id` is exposed through [`entities`](Self::entities).
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    /// True iff this archetype has every `include` component and none of the
    /// `exclude` ones.
    pub fn matches<S: AsRef<str>>(&self, include: &[S], exclude: &[S]) -> bool {
        include.iter().all(|c| self.has_component(c.as_ref()))
            && !exclude.iter().any(|c| self.has_component(c.as_ref()))
    }

    /// Read one cell. Returns `None` for components this archetype lacks.
    ///
    /// # Panics
    ///
    /// If `row` is out of range.
    pub fn get(&self, row: usize, name: &str) -> Option<Value> {
        debug_assert!(row < self.len(), "row {row} out of range for {}", self.id);
        if name == ID {
            return Some(Value::Entity(self.entities[row]));
        }
        self.columns.get(name).map(|column| column.get(row))
    }

    /// Reconstruct the full record at `row`, `id` included.
    pub fn read_row(&self, row: usize) -> EntityValues {
        debug_assert!(row < self.len(), "row {row} out of range for {}", self.id);
        let mut values: EntityValues = self
            .columns
            .iter()
            .map(|(name, column)| (name.clone(), column.get(row)))
            .collect();
        values.insert(ID.to_owned(), Value::Entity(self.entities[row]));
        values
    }

    // ── Mutation (store-internal) ────────────────────────────────────────

    /// Overwrite one cell. The value must already be validated.
    pub(crate) fn set(&mut self, row: usize, name: &str, value: Value) {
        debug_assert!(row < self.len(), "row {row} out of range for {}", self.id);
        match self.columns.get_mut(name) {
            Some(column) => column.set(row, value),
            None => panic!("{} has no component `{name}`", self.id),
        }
    }

    /// Append a row for a brand-new entity: push the values (defaults for
    /// missing components), mint the handle, then stamp it into `id`.
    pub(crate) fn insert(
        &mut self,
        locations: &mut EntityLocationTable,
        values: EntityValues,
    ) -> Entity {
        let row = self.push_columns(values);
        let entity = locations.create(EntityLocation {
            archetype: self.id,
            row: row as u32,
        });
        self.entities.push(entity);
        entity
    }

    /// Append a row for an entity moving in from another archetype. The
    /// caller updates its location.
    pub(crate) fn push_row(&mut self, entity: Entity, values: EntityValues) -> usize {
        let row = self.push_columns(values);
        self.entities.push(entity);
        row
    }

    fn push_columns(&mut self, mut values: EntityValues) -> usize {
        values.remove(ID);
        for (name, column) in &mut self.columns {
            let value = values
                .remove(name)
                .unwrap_or_else(|| self.schemas[name].default_value());
            column.push(value);
        }
        debug_assert!(values.is_empty(), "{} has no component(s) {:?}", self.id, values.keys());
        self.entities.len()
    }

    /// Swap-remove `row`. The entity that used to be last is moved into
    /// `row` and its location is re-pointed; it is returned.
    ///
    /// The entity previously at `row` must already have been freed or
    /// relocated by the caller.
    pub(crate) fn delete_row(
        &mut self,
        row: usize,
        locations: &mut EntityLocationTable,
    ) -> Option<Entity> {
        debug_assert!(row < self.len(), "row {row} out of range for {}", self.id);
        for column in self.columns.values_mut() {
            column.swap_remove(row);
        }
        self.entities.swap_remove(row);
        let displaced = *self.entities.get(row)?;
        locations.update(
            displaced,
            EntityLocation {
                archetype: self.id,
                row: row as u32,
            },
        );
        Some(displaced)
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("components", &self.components)
            .field("rows", &self.len())
            .finish()
    }
}
