//! # Resources — Store-Wide Singletons
//!
//! Resources are named values that don't belong to any entity: the active
//! tool, the camera, the selected voxel color. Each is declared with a default
//! value (and optionally a schema) when the store is built, and assignment is
//! checked against that schema.
//!
//! Resources sit outside the transaction machinery. Setting one is a plain
//! assignment; it never shows up in a redo/undo log.

use std::collections::BTreeMap;

use super::schema::{Schema, Value};
use crate::error::StoreError;

struct ResourceSlot {
    schema: Schema,
    value: Value,
}

/// Name → value map of declared resources.
#[derive(Default)]
pub struct Resources {
    slots: BTreeMap<String, ResourceSlot>,
}

impl Resources {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Declare a resource. Redeclaring replaces it.
    pub(crate) fn declare(&mut self, name: String, schema: Schema, value: Value) {
        self.slots.insert(name, ResourceSlot { schema, value });
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.value)
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.slots.get(name).map(|slot| &slot.schema)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Assign a declared resource, returning the previous value.
    pub(crate) fn set(&mut self, name: &str, value: Value) -> Result<Value, StoreError> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownResource(name.to_owned()))?;
        if !slot.schema.accepts(&value) {
            return Err(StoreError::TypeMismatch {
                name: name.to_owned(),
                expected: slot.schema.clone(),
            });
        }
        Ok(std::mem::replace(&mut slot.value, value))
    }
}
