//! # Store — The Central Container
//!
//! The [`Store`] owns every archetype, the entity location table and the
//! resources. It is the single source of truth for the data model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Store                                                    │
//! │                                                          │
//! │  components: name → Schema                               │
//! │                                                          │
//! │  archetypes: Vec<Archetype>   (indexed by ArchetypeId)   │
//! │  archetype_index: sorted component names → ArchetypeId   │
//! │                                                          │
//! │  locations: EntityLocationTable                          │
//! │    entity → (archetype, row)                             │
//! │                                                          │
//! │  resources: name → Value                                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reads vs. writes
//!
//! Reads (`get`, `read`, `query_archetypes`, `select`) are public and never
//! fail: dead or unknown entities read as `None`. Writes are crate-private and
//! only reachable through a [`Transaction`](crate::Transaction), which records
//! them for undo/redo.
//!
//! ## Structural changes
//!
//! An update that adds or removes a component moves the entity:
//!
//! ```text
//! 1. read the full row from the source archetype
//! 2. swap-remove the row from the source (re-points the displaced entity)
//! 3. push the merged row into the destination archetype
//! 4. point the entity's location at the new row
//! ```
//!
//! Columns are never resized in place.

use std::collections::{BTreeMap, HashMap};

use super::archetype::{Archetype, ArchetypeId, ArchetypeKey, ID, archetype_key};
use super::entity::{Entity, EntityLocation, EntityLocationTable};
use super::query::QueryArchetypes;
use super::resource::Resources;
use super::schema::{EntityUpdate, EntityValues, Schema, Value};
use crate::error::StoreError;

static ID_SCHEMA: Schema = Schema::Entity;

/// Declarative configuration for a [`Store`].
///
/// ```
/// use hirsla::{Schema, Store, Value};
///
/// let store = Store::builder()
///     .component("position", Schema::VEC3)
///     .component("mass", Schema::F32)
///     .archetype("body", &["position", "mass"])
///     .resource("gravity", Schema::F32, -9.81f32)
///     .build()
///     .unwrap();
/// assert!(store.archetype_named("body").is_some());
/// assert_eq!(store.resource("gravity"), Some(&Value::F32(-9.81)));
/// ```
#[derive(Default)]
pub struct StoreBuilder {
    components: BTreeMap<String, Schema>,
    archetypes: Vec<(String, Vec<String>)>,
    resources: Vec<(String, Schema, Value)>,
    entity_capacity: usize,
}

impl StoreBuilder {
    /// Declare a component.
    pub fn component(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.components.insert(name.into(), schema);
        self
    }

    /// Declare a named archetype. Its table is created up front.
    pub fn archetype<S: AsRef<str>>(mut self, name: impl Into<String>, components: &[S]) -> Self {
        let components = components.iter().map(|c| c.as_ref().to_owned()).collect();
        self.archetypes.push((name.into(), components));
        self
    }

    /// Declare a resource with its default value.
    pub fn resource(
        mut self,
        name: impl Into<String>,
        schema: Schema,
        default: impl Into<Value>,
    ) -> Self {
        self.resources.push((name.into(), schema, default.into()));
        self
    }

    /// Pre-size the entity location table.
    pub fn entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Store, StoreError> {
        for (name, schema) in &self.components {
            if name == ID {
                return Err(StoreError::ReservedComponent);
            }
            if *schema == Schema::Vector(0) {
                return Err(StoreError::InvalidSchema {
                    name: name.clone(),
                    reason: "vector columns need at least one lane",
                });
            }
        }

        let mut store = Store {
            components: self.components,
            locations: EntityLocationTable::with_capacity(self.entity_capacity),
            archetypes: Vec::new(),
            archetype_index: HashMap::new(),
            named_archetypes: HashMap::new(),
            resources: Resources::new(),
        };

        for (name, schema, default) in self.resources {
            if !schema.accepts(&default) {
                return Err(StoreError::TypeMismatch {
                    name,
                    expected: schema,
                });
            }
            store.resources.declare(name, schema, default);
        }

        for (name, components) in self.archetypes {
            let id = store.ensure_archetype(&components)?;
            store.named_archetypes.insert(name, id);
        }

        log::debug!(
            "store built: {} components, {} archetypes, {} resources",
            store.components.len(),
            store.archetypes.len(),
            store.resources.len()
        );
        Ok(store)
    }
}

/// Archetype-based columnar entity store.
pub struct Store {
    components: BTreeMap<String, Schema>,
    locations: EntityLocationTable,
    archetypes: Vec<Archetype>,
    archetype_index: HashMap<ArchetypeKey, ArchetypeId>,
    named_archetypes: HashMap<String, ArchetypeId>,
    resources: Resources,
}

impl Store {
    /// An empty store with no components declared.
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
            locations: EntityLocationTable::new(),
            archetypes: Vec::new(),
            archetype_index: HashMap::new(),
            named_archetypes: HashMap::new(),
            resources: Resources::new(),
        }
    }

    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    // ── Schema ───────────────────────────────────────────────────────

    /// Declared components (without `id`).
    pub fn components(&self) -> &BTreeMap<String, Schema> {
        &self.components
    }

    pub fn schema(&self, component: &str) -> Option<&Schema> {
        if component == ID {
            return Some(&ID_SCHEMA);
        }
        self.components.get(component)
    }

    // ── Archetypes ───────────────────────────────────────────────────

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id.index())
    }

    /// Look up an archetype declared with [`StoreBuilder::archetype`].
    pub fn archetype_named(&self, name: &str) -> Option<ArchetypeId> {
        self.named_archetypes.get(name).copied()
    }

    /// The archetype with exactly these components (`id` implied), if it
    /// exists.
    pub fn find_archetype<S: AsRef<str>>(&self, components: &[S]) -> Option<ArchetypeId> {
        self.archetype_index
            .get(&archetype_key(components))
            .copied()
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.locations.len()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.locations.is_alive(entity)
    }

    pub fn locate(&self, entity: Entity) -> Option<EntityLocation> {
        self.locations.locate(entity)
    }

    /// One component of one entity.
    pub fn get(&self, entity: Entity, component: &str) -> Option<Value> {
        let location = self.locations.locate(entity)?;
        self.archetypes[location.archetype.index()].get(location.row as usize, component)
    }

    /// The entity's full record, `id` included.
    pub fn read(&self, entity: Entity) -> Option<EntityValues> {
        let location = self.locations.locate(entity)?;
        Some(self.archetypes[location.archetype.index()].read_row(location.row as usize))
    }

    /// The entity's record projected onto `archetype`'s components, or
    /// `None` if the entity lacks any of them.
    pub fn read_as(&self, entity: Entity, archetype: ArchetypeId) -> Option<EntityValues> {
        let shape = self.archetype(archetype)?;
        let location = self.locations.locate(entity)?;
        let source = &self.archetypes[location.archetype.index()];
        let row = location.row as usize;
        shape
            .components()
            .iter()
            .map(|name| Some((name.clone(), source.get(row, name)?)))
            .collect()
    }

    /// Archetypes having every `include` component and no `exclude` one.
    pub fn query_archetypes<'a, S: AsRef<str>>(
        &'a self,
        include: &'a [S],
        exclude: &'a [S],
    ) -> QueryArchetypes<'a, S> {
        QueryArchetypes::new(&self.archetypes, include, exclude)
    }

    /// Entities of every archetype matching the query.
    pub fn select<S: AsRef<str>>(&self, include: &[S], exclude: &[S]) -> Vec<Entity> {
        self.query_archetypes(include, exclude).entities().collect()
    }

    // ── Resources ────────────────────────────────────────────────────

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resource(&self, name: &str) -> Option<&Value> {
        self.resources.get(name)
    }

    pub(crate) fn set_resource(&mut self, name: &str, value: Value) -> Result<Value, StoreError> {
        self.resources.set(name, value)
    }

    // ── Writes ───────────────────────────────────────────────────────

    fn validate(&self, name: &str, value: &Value) -> Result<(), StoreError> {
        if name == ID {
            return Err(StoreError::ReservedComponent);
        }
        let schema = self
            .components
            .get(name)
            .ok_or_else(|| StoreError::UnknownComponent(name.to_owned()))?;
        if !schema.accepts(value) {
            return Err(StoreError::TypeMismatch {
                name: name.to_owned(),
                expected: schema.clone(),
            });
        }
        Ok(())
    }

    /// The archetype for exactly `components` (plus `id`), creating it on
    /// first use.
    pub(crate) fn ensure_archetype<S: AsRef<str>>(
        &mut self,
        components: &[S],
    ) -> Result<ArchetypeId, StoreError> {
        let key = archetype_key(components);
        if let Some(&id) = self.archetype_index.get(&key) {
            return Ok(id);
        }

        let mut schemas = BTreeMap::new();
        for name in key.iter().filter(|name| *name != ID) {
            let schema = self
                .components
                .get(name)
                .ok_or_else(|| StoreError::UnknownComponent(name.clone()))?;
            schemas.insert(name.clone(), schema.clone());
        }

        let id = ArchetypeId(self.archetypes.len() as u32);
        log::debug!("creating {id} with components {key:?}");
        self.archetypes.push(Archetype::new(id, schemas));
        self.archetype_index.insert(key, id);
        Ok(id)
    }

    /// Append a new entity to `archetype`. Components not in `values` take
    /// their schema default.
    pub(crate) fn insert(
        &mut self,
        archetype: ArchetypeId,
        values: EntityValues,
    ) -> Result<Entity, StoreError> {
        let table = self
            .archetypes
            .get(archetype.index())
            .ok_or(StoreError::UnknownArchetype(archetype))?;
        for (name, value) in &values {
            self.validate(name, value)?;
            if !table.has_component(name) {
                return Err(StoreError::NotInArchetype {
                    archetype,
                    component: name.clone(),
                });
            }
        }
        let entity = self.archetypes[archetype.index()].insert(&mut self.locations, values);
        log::trace!("insert {entity} into {archetype}");
        Ok(entity)
    }

    /// Re-insert a deleted entity under its original handle, into the
    /// archetype matching exactly the components in `values`.
    ///
    /// Fails with `EntityNotFound` if the handle's slot is live or was never
    /// minted.
    pub(crate) fn restore(&mut self, entity: Entity, values: EntityValues) -> Result<(), StoreError> {
        for (name, value) in &values {
            self.validate(name, value)?;
        }
        let archetype = {
            let names: Vec<&str> = values.keys().map(String::as_str).collect();
            self.ensure_archetype(&names)?
        };
        let row = self.archetypes[archetype.index()].len() as u32;
        if !self.locations.restore(entity, EntityLocation { archetype, row }) {
            return Err(StoreError::EntityNotFound(entity));
        }
        self.archetypes[archetype.index()].push_row(entity, values);
        log::trace!("restore {entity} into {archetype}");
        Ok(())
    }

    /// Apply a partial update, moving the entity if its component set changes.
    pub(crate) fn update(&mut self, entity: Entity, update: &EntityUpdate) -> Result<(), StoreError> {
        let location = self
            .locations
            .locate(entity)
            .ok_or(StoreError::EntityNotFound(entity))?;
        for (name, value) in update.iter() {
            match value {
                Some(value) => self.validate(name, value)?,
                None if name == ID => return Err(StoreError::ReservedComponent),
                None if !self.components.contains_key(name) => {
                    return Err(StoreError::UnknownComponent(name.to_owned()));
                }
                None => {}
            }
        }

        let source = location.archetype;
        let row = location.row as usize;
        let table = &self.archetypes[source.index()];
        let structural = update
            .iter()
            .any(|(name, value)| table.has_component(name) != value.is_some());

        if !structural {
            let table = &mut self.archetypes[source.index()];
            for (name, value) in update.iter() {
                if let Some(value) = value {
                    table.set(row, name, value.clone());
                }
            }
            log::trace!("update {entity} in place");
            return Ok(());
        }

        let mut values = table.read_row(row);
        values.remove(ID);
        for (name, value) in update.iter() {
            match value {
                Some(value) => values.insert(name.to_owned(), value.clone()),
                None => values.remove(name),
            };
        }
        let names: Vec<&str> = values.keys().map(String::as_str).collect();
        let target = self.ensure_archetype(&names)?;

        self.archetypes[source.index()].delete_row(row, &mut self.locations);
        let new_row = self.archetypes[target.index()].push_row(entity, values);
        self.locations.update(
            entity,
            EntityLocation {
                archetype: target,
                row: new_row as u32,
            },
        );
        log::trace!("move {entity} from {source} to {target}");
        Ok(())
    }

    /// Remove an entity, returning its archetype and its values (without `id`).
    pub(crate) fn delete(&mut self, entity: Entity) -> Result<(ArchetypeId, EntityValues), StoreError> {
        let location = self
            .locations
            .locate(entity)
            .ok_or(StoreError::EntityNotFound(entity))?;
        let table = &mut self.archetypes[location.archetype.index()];
        let row = location.row as usize;
        let mut values = table.read_row(row);
        values.remove(ID);
        self.locations.delete(entity);
        table.delete_row(row, &mut self.locations);
        log::trace!("delete {entity} from {}", location.archetype);
        Ok((location.archetype, values))
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn locations(&self) -> &EntityLocationTable {
        &self.locations
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;

    fn store() -> Store {
        Store::builder()
            .component("value", Schema::I32)
            .component("position", Schema::VEC3)
            .component("velocity", Schema::VEC3)
            .component("frozen", Schema::Bool)
            .archetype("counter", &["value"])
            .archetype("body", &["position", "velocity"])
            .build()
            .unwrap()
    }

    #[test]
    fn two_rows_in_value_archetype() {
        let mut store = store();
        let a = store.archetype_named("counter").unwrap();
        let e0 = store.insert(a, values! { "value" => 42 }).unwrap();
        let _e1 = store.insert(a, values! { "value" => 100 }).unwrap();

        let table = store.archetype(a).unwrap();
        assert_eq!(table.len(), 2);
        let column = table.column("value").unwrap();
        assert_eq!(column.get(0), Value::I32(42));
        assert_eq!(column.get(1), Value::I32(100));
        assert_eq!(store.locate(e0), Some(EntityLocation { archetype: a, row: 0 }));
    }

    #[test]
    fn archetypes_are_structural() {
        let mut store = store();
        let body = store.archetype_named("body").unwrap();
        assert_eq!(store.ensure_archetype(&["velocity", "position"]).unwrap(), body);
        assert_eq!(store.ensure_archetype(&["id", "position", "velocity"]).unwrap(), body);
        assert_eq!(store.find_archetype(&["position", "velocity"]), Some(body));
        assert_eq!(store.find_archetype(&["position"]), None);
        let count = store.archetype_count();
        store.ensure_archetype(&["position"]).unwrap();
        store.ensure_archetype(&["position"]).unwrap();
        assert_eq!(store.archetype_count(), count + 1);
    }

    #[test]
    fn builder_rejects_bad_config() {
        assert_eq!(
            Store::builder().component("id", Schema::U32).build().err(),
            Some(StoreError::ReservedComponent)
        );
        assert!(matches!(
            Store::builder().component("v", Schema::Vector(0)).build(),
            Err(StoreError::InvalidSchema { .. })
        ));
        assert!(matches!(
            Store::builder().archetype("ghost", &["nope"]).build(),
            Err(StoreError::UnknownComponent(name)) if name == "nope"
        ));
        assert!(matches!(
            Store::builder().resource("r", Schema::F32, 1).build(),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn insert_validates_values() {
        let mut store = store();
        let a = store.archetype_named("counter").unwrap();
        assert_eq!(
            store.insert(a, values! { "value" => 1.0f32 }).err(),
            Some(StoreError::TypeMismatch {
                name: "value".into(),
                expected: Schema::I32
            })
        );
        assert_eq!(
            store.insert(a, values! { "mystery" => 1 }).err(),
            Some(StoreError::UnknownComponent("mystery".into()))
        );
        assert_eq!(
            store.insert(a, values! { "frozen" => true }).err(),
            Some(StoreError::NotInArchetype {
                archetype: a,
                component: "frozen".into()
            })
        );
        assert_eq!(
            store.insert(ArchetypeId(99), values! {}).err(),
            Some(StoreError::UnknownArchetype(ArchetypeId(99)))
        );
        assert_eq!(store.entity_count(), 0);
    }

    #[test]
    fn reads_of_dead_entities_are_none() {
        let mut store = store();
        let a = store.archetype_named("counter").unwrap();
        let e = store.insert(a, values! { "value" => 5 }).unwrap();
        assert_eq!(store.get(e, "value"), Some(Value::I32(5)));
        assert_eq!(store.get(e, "position"), None);

        store.delete(e).unwrap();
        assert_eq!(store.get(e, "value"), None);
        assert_eq!(store.read(e), None);
        assert_eq!(store.locate(e), None);
        assert_eq!(store.delete(e).err(), Some(StoreError::EntityNotFound(e)));
    }

    #[test]
    fn delete_repoints_last_row() {
        let mut store = store();
        let a = store.archetype_named("counter").unwrap();
        let e0 = store.insert(a, values! { "value" => 0 }).unwrap();
        let _e1 = store.insert(a, values! { "value" => 1 }).unwrap();
        let e2 = store.insert(a, values! { "value" => 2 }).unwrap();

        let (archetype, values) = store.delete(e0).unwrap();
        assert_eq!(archetype, a);
        assert_eq!(values, values! { "value" => 0 });
        assert_eq!(store.locate(e2), Some(EntityLocation { archetype: a, row: 0 }));
        assert_eq!(store.get(e2, "value"), Some(Value::I32(2)));
    }

    #[test]
    fn update_in_place() {
        let mut store = store();
        let a = store.archetype_named("counter").unwrap();
        let e = store.insert(a, values! { "value" => 1 }).unwrap();
        store.update(e, &EntityUpdate::new().set("value", 9)).unwrap();
        assert_eq!(store.get(e, "value"), Some(Value::I32(9)));
        assert_eq!(store.locate(e).unwrap().archetype, a);
    }

    #[test]
    fn update_adding_component_moves_entity() {
        let mut store = store();
        let body = store.archetype_named("body").unwrap();
        let e0 = store
            .insert(body, values! { "position" => [1.0f32, 2.0, 3.0] })
            .unwrap();
        let e1 = store.insert(body, values! {}).unwrap();

        store
            .update(e0, &EntityUpdate::new().set("frozen", true))
            .unwrap();

        let location = store.locate(e0).unwrap();
        assert_ne!(location.archetype, body);
        let moved = store.archetype(location.archetype).unwrap();
        assert!(moved.matches(&["frozen", "position", "velocity"], &[]));
        assert_eq!(
            store.read(e0).unwrap(),
            values! {
                "id" => e0,
                "frozen" => true,
                "position" => [1.0f32, 2.0, 3.0],
                "velocity" => [0.0f32, 0.0, 0.0],
            }
        );
        // e1 was displaced into row 0 of the source.
        assert_eq!(store.locate(e1), Some(EntityLocation { archetype: body, row: 0 }));
        assert_eq!(store.archetype(body).unwrap().len(), 1);
    }

    #[test]
    fn update_removing_component_moves_entity() {
        let mut store = store();
        let body = store.archetype_named("body").unwrap();
        let e = store.insert(body, values! {}).unwrap();
        store
            .update(e, &EntityUpdate::new().remove("velocity"))
            .unwrap();
        let location = store.locate(e).unwrap();
        assert_eq!(Some(location.archetype), store.find_archetype(&["position"]));
        assert_eq!(store.get(e, "velocity"), None);

        // Removing something the entity doesn't have is a no-op.
        store
            .update(e, &EntityUpdate::new().remove("frozen"))
            .unwrap();
        assert_eq!(store.locate(e), Some(location));
    }

    #[test]
    fn update_rejects_id_and_unknown_names() {
        let mut store = store();
        let a = store.archetype_named("counter").unwrap();
        let e = store.insert(a, values! {}).unwrap();
        assert_eq!(
            store.update(e, &EntityUpdate::new().remove("id")).err(),
            Some(StoreError::ReservedComponent)
        );
        assert_eq!(
            store.update(e, &EntityUpdate::new().set("id", e)).err(),
            Some(StoreError::ReservedComponent)
        );
        assert_eq!(
            store.update(e, &EntityUpdate::new().remove("nope")).err(),
            Some(StoreError::UnknownComponent("nope".into()))
        );
    }

    #[test]
    fn read_as_projects_onto_archetype() {
        let mut store = store();
        let body = store.archetype_named("body").unwrap();
        let counter = store.archetype_named("counter").unwrap();
        let e = store.insert(body, values! {}).unwrap();
        let position_only = store.ensure_archetype(&["position"]).unwrap();

        let projected = store.read_as(e, position_only).unwrap();
        assert_eq!(projected.len(), 2);
        assert_eq!(projected["id"], Value::Entity(e));
        assert!(projected.contains_key("position"));
        assert_eq!(store.read_as(e, counter), None);
    }

    #[test]
    fn query_include_exclude() {
        let mut store = store();
        let body = store.archetype_named("body").unwrap();
        let counter = store.archetype_named("counter").unwrap();
        let frozen = store
            .ensure_archetype(&["position", "velocity", "frozen"])
            .unwrap();
        let b = store.insert(body, values! {}).unwrap();
        let f = store.insert(frozen, values! {}).unwrap();
        let _c = store.insert(counter, values! {}).unwrap();

        let ids: Vec<_> = store
            .query_archetypes(&["position"], &[])
            .map(Archetype::id)
            .collect();
        assert_eq!(ids, vec![body, frozen]);

        let ids: Vec<_> = store
            .query_archetypes(&["position"], &["frozen"])
            .map(Archetype::id)
            .collect();
        assert_eq!(ids, vec![body]);

        assert_eq!(store.select(&["velocity"], &[]), vec![b, f]);
        assert_eq!(store.select(&["id"], &["position"]).len(), 1);
        assert!(store.select(&["nothing"], &[]).is_empty());
    }

    #[test]
    fn query_reflects_archetypes_at_call_time() {
        let mut store = store();
        let before = store.query_archetypes(&["frozen"], &[]).count();
        store.ensure_archetype(&["frozen"]).unwrap();
        assert_eq!(store.query_archetypes(&["frozen"], &[]).count(), before + 1);
    }

    #[test]
    fn stale_handle_does_not_alias() {
        let mut store = store();
        let a = store.archetype_named("counter").unwrap();
        let e = store.insert(a, values! { "value" => 1 }).unwrap();
        store.delete(e).unwrap();
        let reused = store.insert(a, values! { "value" => 2 }).unwrap();
        assert_eq!(reused.index(), e.index());
        assert_eq!(store.get(e, "value"), None);
        assert_eq!(store.get(reused, "value"), Some(Value::I32(2)));
    }

    #[test]
    fn restore_brings_back_original_handle() {
        let mut store = store();
        let counter = store.archetype_named("counter").unwrap();
        let e0 = store.insert(counter, values! { "value" => 1 }).unwrap();
        let e1 = store.insert(counter, values! { "value" => 2 }).unwrap();
        let (_, values) = store.delete(e0).unwrap();

        store.restore(e0, values).unwrap();
        assert_eq!(store.get(e0, "value"), Some(Value::I32(1)));
        assert_eq!(store.get(e1, "value"), Some(Value::I32(2)));
        assert_eq!(store.locate(e0).unwrap().archetype, counter);
        assert_eq!(store.entity_count(), 2);
    }

    #[test]
    fn restore_of_live_handle_fails() {
        let mut store = store();
        let counter = store.archetype_named("counter").unwrap();
        let e0 = store.insert(counter, values! { "value" => 1 }).unwrap();
        assert_eq!(
            store.restore(e0, values! { "value" => 5 }),
            Err(StoreError::EntityNotFound(e0))
        );
        assert_eq!(store.get(e0, "value"), Some(Value::I32(1)));
        assert_eq!(store.archetype(counter).unwrap().len(), 1);
    }
}
