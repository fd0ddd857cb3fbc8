//! # Transactions — Redo/Undo Logs and Change-Sets
//!
//! Every mutation of a [`Store`] goes through [`TransactionalStore::execute`].
//! The closure receives a [`Transaction`], a mutation-capable view of the
//! store that records each write as it happens:
//!
//! ```text
//! execute(|tx| ...)
//!   │
//!   ├─ tx.insert(..)   redo += Insert{e, row}     undo += Delete{e}
//!   ├─ tx.update(..)   redo += Update{e, new}     undo += Update{e, old}
//!   ├─ tx.delete(..)   redo += Delete{e}          undo += Insert{e, row}
//!   │
//!   ├─ Ok(value)  →  commit: undo reversed, TransactionResult returned
//!   └─ Err / panic →  rollback: partial undo replayed, store unchanged
//! ```
//!
//! Replaying `undo` right after the transaction restores the previous state;
//! replaying `redo` after that restores the transaction's effect.
//!
//! Rollback brings deleted entities back under their original handles, so
//! handles held outside the failed transaction stay valid.
//!
//! ## Entity handles across replays
//!
//! Handles are generational, so an entity re-created by replaying an `Insert`
//! gets a fresh handle. Each `Insert` records the handle it produced at the
//! time; while replaying a log, later operations that mention that handle are
//! redirected to the new one.
//!
//! ## Merged updates
//!
//! Consecutive updates to the same entity collapse into one redo/undo pair.
//! The redo side keeps the latest values, the undo side the earliest.

use std::collections::{BTreeSet, HashMap};
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::ecs::{ArchetypeId, Entity, EntityUpdate, EntityValues, ID, Store, Value};
use crate::error::StoreError;

/// One recorded write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOperation {
    /// Create an entity with exactly these components. `entity` is the handle
    /// the insert produced when it was recorded.
    Insert { entity: Entity, values: EntityValues },
    Update { entity: Entity, values: EntityUpdate },
    Delete { entity: Entity },
}

impl WriteOperation {
    pub fn entity(&self) -> Entity {
        match self {
            WriteOperation::Insert { entity, .. }
            | WriteOperation::Update { entity, .. }
            | WriteOperation::Delete { entity } => *entity,
        }
    }
}

/// What one committed transaction did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    redo: Vec<WriteOperation>,
    undo: Vec<WriteOperation>,
    changed_entities: BTreeSet<Entity>,
    changed_components: BTreeSet<String>,
    changed_archetypes: BTreeSet<ArchetypeId>,
    transient: bool,
}

impl TransactionResult {
    /// Operations in the order they were applied.
    pub fn redo(&self) -> &[WriteOperation] {
        &self.redo
    }

    /// Inverse operations, last-applied first.
    pub fn undo(&self) -> &[WriteOperation] {
        &self.undo
    }

    pub fn changed_entities(&self) -> &BTreeSet<Entity> {
        &self.changed_entities
    }

    pub fn changed_components(&self) -> &BTreeSet<String> {
        &self.changed_components
    }

    pub fn changed_archetypes(&self) -> &BTreeSet<ArchetypeId> {
        &self.changed_archetypes
    }

    /// Transient transactions (drags, previews) are not meant for undo history.
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    /// True if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.redo.is_empty()
    }
}

#[derive(Default)]
struct Log {
    redo: Vec<WriteOperation>,
    /// Inverses in apply order; reversed on commit.
    undo: Vec<WriteOperation>,
    entities: BTreeSet<Entity>,
    components: BTreeSet<String>,
    archetypes: BTreeSet<ArchetypeId>,
}

/// Mutation-capable view of a [`Store`] inside
/// [`execute`](TransactionalStore::execute).
///
/// Dereferences to the store for reads. Dropping a transaction that was not
/// committed (the closure returned `Err` or panicked) rolls back every write
/// it made.
pub struct Transaction<'s> {
    store: &'s mut Store,
    log: Log,
    committed: bool,
}

impl<'s> Transaction<'s> {
    fn begin(store: &'s mut Store) -> Self {
        Self {
            store,
            log: Log::default(),
            committed: false,
        }
    }

    /// The archetype for exactly `components`, created if needed.
    pub fn ensure_archetype<S: AsRef<str>>(
        &mut self,
        components: &[S],
    ) -> Result<ArchetypeId, StoreError> {
        self.store.ensure_archetype(components)
    }

    /// Insert a new entity into `archetype`. Components missing from
    /// `values` get their schema default.
    pub fn insert(
        &mut self,
        archetype: ArchetypeId,
        values: EntityValues,
    ) -> Result<Entity, StoreError> {
        let entity = self.store.insert(archetype, values)?;
        let mut row = self.store.read(entity).unwrap_or_default();
        row.remove(ID);

        self.log.entities.insert(entity);
        self.log.components.extend(row.keys().cloned());
        self.log.archetypes.insert(archetype);
        self.log.redo.push(WriteOperation::Insert {
            entity,
            values: row,
        });
        self.log.undo.push(WriteOperation::Delete { entity });
        Ok(entity)
    }

    /// Insert into an archetype declared by name on the builder.
    pub fn insert_named(&mut self, name: &str, values: EntityValues) -> Result<Entity, StoreError> {
        let archetype = self
            .store
            .archetype_named(name)
            .ok_or_else(|| StoreError::UnknownArchetypeName(name.to_owned()))?;
        self.insert(archetype, values)
    }

    /// Insert into the archetype whose components are exactly the keys of
    /// `values`.
    pub fn spawn(&mut self, values: EntityValues) -> Result<Entity, StoreError> {
        let archetype = {
            let names: Vec<&str> = values.keys().map(String::as_str).collect();
            self.store.ensure_archetype(&names)?
        };
        self.insert(archetype, values)
    }

    /// Apply a partial update. Only components whose value actually changes
    /// are recorded.
    pub fn update(&mut self, entity: Entity, update: EntityUpdate) -> Result<(), StoreError> {
        let from = self
            .store
            .locate(entity)
            .ok_or(StoreError::EntityNotFound(entity))?
            .archetype;
        let before = self.store.read(entity).unwrap_or_default();
        self.store.update(entity, &update)?;

        let mut redo = EntityUpdate::new();
        let mut undo = EntityUpdate::new();
        for (name, value) in update.iter() {
            let old = before.get(name);
            if old != value {
                redo.insert(name, value.cloned());
                undo.insert(name, old.cloned());
            }
        }
        if redo.is_empty() {
            return Ok(());
        }

        self.log.entities.insert(entity);
        self.log.components.extend(redo.names().map(str::to_owned));
        self.log.archetypes.insert(from);
        if let Some(location) = self.store.locate(entity) {
            self.log.archetypes.insert(location.archetype);
        }

        if let (
            Some(WriteOperation::Update {
                entity: last_redo,
                values: redo_values,
            }),
            Some(WriteOperation::Update {
                entity: last_undo,
                values: undo_values,
            }),
        ) = (self.log.redo.last_mut(), self.log.undo.last_mut())
        {
            if *last_redo == entity && *last_undo == entity {
                redo_values.overwrite_with(redo);
                undo_values.keep_first(undo);
                return Ok(());
            }
        }

        self.log.redo.push(WriteOperation::Update {
            entity,
            values: redo,
        });
        self.log.undo.push(WriteOperation::Update {
            entity,
            values: undo,
        });
        Ok(())
    }

    /// Delete an entity.
    pub fn delete(&mut self, entity: Entity) -> Result<(), StoreError> {
        let (archetype, values) = self.store.delete(entity)?;

        self.log.entities.insert(entity);
        self.log.components.extend(values.keys().cloned());
        self.log.archetypes.insert(archetype);
        self.log.redo.push(WriteOperation::Delete { entity });
        self.log.undo.push(WriteOperation::Insert { entity, values });
        Ok(())
    }

    /// Apply a recorded log, following entities re-created by its inserts.
    pub fn apply(&mut self, operations: &[WriteOperation]) -> Result<(), StoreError> {
        let mut remap = HashMap::new();
        for op in operations {
            match op {
                WriteOperation::Insert { entity, values } => {
                    let created = self.spawn(values.clone())?;
                    remap.insert(*entity, created);
                }
                WriteOperation::Update { entity, values } => {
                    self.update(resolve(&remap, *entity), values.clone())?;
                }
                WriteOperation::Delete { entity } => {
                    self.delete(resolve(&remap, *entity))?;
                }
            }
        }
        Ok(())
    }

    fn commit(mut self, transient: bool) -> TransactionResult {
        self.committed = true;
        let log = std::mem::take(&mut self.log);
        let mut undo = log.undo;
        undo.reverse();
        TransactionResult {
            redo: log.redo,
            undo,
            changed_entities: log.entities,
            changed_components: log.components,
            changed_archetypes: log.archetypes,
            transient,
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = Store;

    fn deref(&self) -> &Store {
        &*self.store
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.committed || self.log.undo.is_empty() {
            return;
        }
        log::warn!(
            "rolling back transaction after {} write(s)",
            self.log.redo.len()
        );
        let mut remap = HashMap::new();
        for op in self.log.undo.iter().rev() {
            if let Err(err) = apply_unrecorded(&mut *self.store, op, &mut remap) {
                log::error!("rollback of {op:?} failed: {err}");
            }
        }
    }
}

fn resolve(remap: &HashMap<Entity, Entity>, entity: Entity) -> Entity {
    remap.get(&entity).copied().unwrap_or(entity)
}

fn apply_unrecorded(
    store: &mut Store,
    op: &WriteOperation,
    remap: &mut HashMap<Entity, Entity>,
) -> Result<(), StoreError> {
    match op {
        WriteOperation::Insert { entity, values } => {
            if store.restore(*entity, values.clone()).is_ok() {
                return Ok(());
            }
            let archetype = {
                let names: Vec<&str> = values.keys().map(String::as_str).collect();
                store.ensure_archetype(&names)?
            };
            let created = store.insert(archetype, values.clone())?;
            remap.insert(*entity, created);
        }
        WriteOperation::Update { entity, values } => {
            store.update(resolve(remap, *entity), values)?;
        }
        WriteOperation::Delete { entity } => {
            store.delete(resolve(remap, *entity))?;
        }
    }
    Ok(())
}

// ── TransactionalStore ───────────────────────────────────────────────────

/// A [`Store`] that can only be mutated through transactions.
pub struct TransactionalStore {
    store: Store,
}

impl TransactionalStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> Store {
        self.store
    }

    /// Assign a resource and return the previous value. Resources are not
    /// part of any transaction.
    pub fn set_resource(&mut self, name: &str, value: Value) -> Result<Value, StoreError> {
        self.store.set_resource(name, value)
    }

    /// Run `f` as one transaction.
    ///
    /// On `Ok` the writes are kept and returned alongside the closure's value.
    /// On `Err` every write is rolled back before the error is returned.
    ///
    /// ```
    /// use hirsla::{Schema, Store, TransactionalStore, Value, values};
    ///
    /// let mut store = TransactionalStore::new(
    ///     Store::builder().component("hp", Schema::I32).build().unwrap(),
    /// );
    /// let (entity, result) = store
    ///     .execute(|tx| tx.spawn(values! { "hp" => 10 }))
    ///     .unwrap();
    /// assert_eq!(store.get(entity, "hp"), Some(Value::I32(10)));
    /// assert_eq!(result.redo().len(), 1);
    /// ```
    pub fn execute<T, E>(
        &mut self,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, E>,
    ) -> Result<(T, TransactionResult), E> {
        self.run(false, f)
    }

    /// Like [`execute`](Self::execute), but marks the result transient so
    /// undo history skips it.
    pub fn execute_transient<T, E>(
        &mut self,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, E>,
    ) -> Result<(T, TransactionResult), E> {
        self.run(true, f)
    }

    fn run<T, E>(
        &mut self,
        transient: bool,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, E>,
    ) -> Result<(T, TransactionResult), E> {
        let mut tx = Transaction::begin(&mut self.store);
        let value = f(&mut tx)?;
        let result = tx.commit(transient);
        log::debug!(
            "committed transaction: {} write(s), {} entities, {} archetypes{}",
            result.redo.len(),
            result.changed_entities.len(),
            result.changed_archetypes.len(),
            if transient { " (transient)" } else { "" }
        );
        Ok((value, result))
    }
}

impl Deref for TransactionalStore {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.store
    }
}

impl From<Store> for TransactionalStore {
    fn from(store: Store) -> Self {
        Self::new(store)
    }
}

/// Anything that can execute a recorded operation log as a new transaction.
pub trait Replay {
    fn replay(&mut self, operations: &[WriteOperation]) -> Result<TransactionResult, StoreError>;
}

impl Replay for TransactionalStore {
    fn replay(&mut self, operations: &[WriteOperation]) -> Result<TransactionResult, StoreError> {
        self.execute(|tx| tx.apply(operations))
            .map(|((), result)| result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;
    use crate::ecs::Schema;
    use crate::values;

    pub(crate) fn store() -> TransactionalStore {
        TransactionalStore::new(
            Store::builder()
                .component("value", Schema::I32)
                .component("position", Schema::VEC3)
                .component("velocity", Schema::VEC3)
                .component("name", Schema::String)
                .archetype("counter", &["value"])
                .archetype("body", &["position", "velocity"])
                .build()
                .unwrap(),
        )
    }

    /// Every live record (without handles), sorted, so two stores compare
    /// equal when they hold the same data regardless of ids and row order.
    pub(crate) fn snapshot(store: &Store) -> Vec<String> {
        let mut rows = Vec::new();
        for archetype in store.archetypes() {
            for row in 0..archetype.len() {
                let mut values = archetype.read_row(row);
                values.remove(ID);
                rows.push(format!("{:?} {:?}", archetype.components(), values));
            }
        }
        rows.sort();
        rows
    }

    #[test]
    fn insert_records_redo_undo_and_changes() {
        let mut store = store();
        let counter = store.archetype_named("counter").unwrap();
        let (e, result) = store
            .execute(|tx| tx.insert(counter, values! { "value" => 42 }))
            .unwrap();

        assert_eq!(
            result.redo(),
            &[WriteOperation::Insert {
                entity: e,
                values: values! { "value" => 42 }
            }]
        );
        assert_eq!(result.undo(), &[WriteOperation::Delete { entity: e }]);
        assert_eq!(result.changed_entities(), &BTreeSet::from([e]));
        assert_eq!(result.changed_components(), &BTreeSet::from(["value".to_string()]));
        assert_eq!(result.changed_archetypes(), &BTreeSet::from([counter]));
        assert!(!result.is_transient());
    }

    #[test]
    fn insert_records_defaults() {
        let mut store = store();
        let (_, result) = store
            .execute(|tx| tx.insert_named("body", values! {}))
            .unwrap();
        match &result.redo()[0] {
            WriteOperation::Insert { values, .. } => {
                assert_eq!(
                    values,
                    &values! {
                        "position" => [0.0f32, 0.0, 0.0],
                        "velocity" => [0.0f32, 0.0, 0.0],
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn undo_is_reverse_chronological() {
        let mut store = store();
        let ((a, b), result) = store
            .execute(|tx| {
                let a = tx.spawn(values! { "value" => 1 })?;
                let b = tx.spawn(values! { "value" => 2 })?;
                tx.delete(a)?;
                Ok::<_, StoreError>((a, b))
            })
            .unwrap();

        let kinds: Vec<_> = result
            .undo()
            .iter()
            .map(|op| (std::mem::discriminant(op), op.entity()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (
                    std::mem::discriminant(&WriteOperation::Insert {
                        entity: a,
                        values: values! {}
                    }),
                    a
                ),
                (std::mem::discriminant(&WriteOperation::Delete { entity: b }), b),
                (std::mem::discriminant(&WriteOperation::Delete { entity: a }), a),
            ]
        );
    }

    #[test]
    fn undo_then_redo_restores_states() {
        let mut store = store();
        let (a, _) = store
            .execute(|tx| tx.spawn(values! { "value" => 1 }))
            .unwrap();
        let before = snapshot(&store);

        let (_, result) = store
            .execute(|tx| {
                tx.update(a, EntityUpdate::new().set("value", 5).set("name", "a"))?;
                let b = tx.insert_named("body", values! { "velocity" => [1.0f32, 0.0, 0.0] })?;
                tx.update(b, EntityUpdate::new().remove("position"))?;
                tx.spawn(values! { "name" => "c" })
            })
            .unwrap();
        let after = snapshot(&store);
        assert_ne!(before, after);

        store.replay(result.undo()).unwrap();
        assert_eq!(snapshot(&store), before);

        store.replay(result.redo()).unwrap();
        assert_eq!(snapshot(&store), after);
    }

    #[test]
    fn deleted_entity_comes_back_with_same_values() {
        let mut store = store();
        let (e, _) = store
            .execute(|tx| tx.spawn(values! { "value" => 1 }))
            .unwrap();
        let (_, t2) = store.execute(|tx| tx.delete(e)).unwrap();
        assert!(!store.is_alive(e));

        let restored = store.replay(t2.undo()).unwrap();
        let revived = *restored.changed_entities().iter().next().unwrap();
        assert_eq!(store.get(revived, "value"), Some(Value::I32(1)));
        assert_eq!(
            store.locate(revived).map(|l| l.archetype),
            store.archetype_named("counter")
        );
    }

    #[test]
    fn insert_then_update_logs_two_operations() {
        let mut store = store();
        let (_, result) = store
            .execute(|tx| {
                let e = tx.spawn(values! { "value" => 1 })?;
                tx.update(e, EntityUpdate::new().set("value", 2))
            })
            .unwrap();
        assert_eq!(result.redo().len(), 2);
        assert_eq!(result.undo().len(), 2);
    }

    #[test]
    fn consecutive_updates_merge() {
        let mut store = store();
        let (e, _) = store
            .execute(|tx| tx.spawn(values! { "value" => 1 }))
            .unwrap();
        let (_, result) = store
            .execute(|tx| {
                tx.update(e, EntityUpdate::new().set("value", 2))?;
                tx.update(e, EntityUpdate::new().set("value", 3).set("name", "x"))
            })
            .unwrap();

        assert_eq!(
            result.redo(),
            &[WriteOperation::Update {
                entity: e,
                values: EntityUpdate::new().set("value", 3).set("name", "x"),
            }]
        );
        assert_eq!(
            result.undo(),
            &[WriteOperation::Update {
                entity: e,
                values: EntityUpdate::new().set("value", 1).remove("name"),
            }]
        );

        store.replay(result.undo()).unwrap();
        assert_eq!(
            store.read(e),
            Some(values! { "id" => e, "value" => 1 })
        );
    }

    #[test]
    fn updates_to_different_entities_do_not_merge() {
        let mut store = store();
        let ((a, b), _) = store
            .execute(|tx| {
                Ok::<_, StoreError>((
                    tx.spawn(values! { "value" => 1 })?,
                    tx.spawn(values! { "value" => 1 })?,
                ))
            })
            .unwrap();
        let (_, result) = store
            .execute(|tx| {
                tx.update(a, EntityUpdate::new().set("value", 2))?;
                tx.update(b, EntityUpdate::new().set("value", 2))?;
                tx.update(a, EntityUpdate::new().set("value", 3))
            })
            .unwrap();
        assert_eq!(result.redo().len(), 3);
    }

    #[test]
    fn unchanged_update_is_not_recorded() {
        let mut store = store();
        let (e, _) = store
            .execute(|tx| tx.spawn(values! { "value" => 1 }))
            .unwrap();
        let (_, result) = store
            .execute(|tx| tx.update(e, EntityUpdate::new().set("value", 1).remove("name")))
            .unwrap();
        assert!(result.is_empty());
        assert!(result.changed_entities().is_empty());
        assert!(result.changed_archetypes().is_empty());
    }

    #[test]
    fn structural_update_touches_both_archetypes() {
        let mut store = store();
        let counter = store.archetype_named("counter").unwrap();
        let (e, _) = store
            .execute(|tx| tx.spawn(values! { "value" => 1 }))
            .unwrap();
        let (_, result) = store
            .execute(|tx| tx.update(e, EntityUpdate::new().set("name", "moved")))
            .unwrap();
        let target = store.locate(e).unwrap().archetype;
        assert_ne!(target, counter);
        assert_eq!(result.changed_archetypes(), &BTreeSet::from([counter, target]));
        assert_eq!(result.changed_components(), &BTreeSet::from(["name".to_string()]));
    }

    #[test]
    fn delete_change_set_lists_all_components() {
        let mut store = store();
        let (e, _) = store
            .execute(|tx| tx.insert_named("body", values! {}))
            .unwrap();
        let (_, result) = store.execute(|tx| tx.delete(e)).unwrap();
        assert_eq!(
            result.changed_components(),
            &BTreeSet::from(["position".to_string(), "velocity".to_string()])
        );
    }

    #[test]
    fn error_rolls_back() {
        let mut store = store();
        let (keep, _) = store
            .execute(|tx| tx.spawn(values! { "value" => 7 }))
            .unwrap();
        let before = snapshot(&store);

        let err = store
            .execute(|tx| {
                tx.spawn(values! { "value" => 1 })?;
                tx.update(keep, EntityUpdate::new().set("name", "renamed"))?;
                tx.delete(keep)?;
                tx.spawn(values! { "value" => 1.5f32 })
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::TypeMismatch { .. }));
        assert_eq!(snapshot(&store), before);
        assert_eq!(store.entity_count(), 1);
        assert!(store.is_alive(keep));
        assert_eq!(store.get(keep, "value"), Some(Value::I32(7)));
        assert_eq!(store.get(keep, "name"), None);
    }

    #[test]
    fn rollback_keeps_handle_when_deleted_slot_was_reused() {
        let mut store = store();
        let (keep, _) = store
            .execute(|tx| tx.insert_named("body", values! { "position" => [1.0f32, 2.0, 3.0] }))
            .unwrap();
        let (other, _) = store
            .execute(|tx| tx.spawn(values! { "value" => 2 }))
            .unwrap();

        let result = store.execute(|tx| {
            tx.delete(keep)?;
            // Takes the slot `keep` just freed.
            tx.spawn(values! { "value" => 3 })?;
            tx.delete(other)?;
            tx.spawn(values! { "value" => 1.5f32 })
        });

        assert!(result.is_err());
        assert_eq!(store.entity_count(), 2);
        assert_eq!(
            store.get(keep, "position"),
            Some(Value::from([1.0f32, 2.0, 3.0]))
        );
        assert_eq!(store.get(other, "value"), Some(Value::I32(2)));
        let body = store.archetype_named("body").unwrap();
        assert_eq!(store.locate(keep).unwrap().archetype, body);
    }

    #[test]
    fn set_resource_outside_transactions() {
        let mut store = TransactionalStore::new(
            Store::builder()
                .resource("gravity", Schema::F32, -9.8f32)
                .build()
                .unwrap(),
        );
        let previous = store.set_resource("gravity", Value::F32(-1.6)).unwrap();
        assert_eq!(previous, Value::F32(-9.8));
        assert_eq!(store.resource("gravity"), Some(&Value::F32(-1.6)));

        assert_eq!(
            store.set_resource("wind", Value::F32(0.0)),
            Err(StoreError::UnknownResource("wind".to_owned()))
        );
        assert!(matches!(
            store.set_resource("gravity", Value::I32(1)),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[derive(Debug)]
    enum AppError {
        Store(StoreError),
        Cancelled,
    }

    impl From<StoreError> for AppError {
        fn from(err: StoreError) -> Self {
            AppError::Store(err)
        }
    }

    #[test]
    fn caller_error_type_rolls_back() {
        let mut store = store();
        let result = store.execute(|tx| {
            tx.spawn(values! { "value" => 1 })?;
            Err::<(), _>(AppError::Cancelled)
        });
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert_eq!(store.entity_count(), 0);

        let result = store.execute(|tx| tx.delete(Entity::new(9, 0)).map_err(AppError::from));
        assert!(matches!(result, Err(AppError::Store(StoreError::EntityNotFound(_)))));
    }

    #[test]
    fn panic_rolls_back() {
        let mut store = store();
        let (e, _) = store
            .execute(|tx| tx.spawn(values! { "value" => 3 }))
            .unwrap();
        let before = snapshot(&store);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _ = store.execute(|tx| {
                tx.update(e, EntityUpdate::new().set("value", 4))?;
                tx.delete(e)?;
                if tx.entity_count() == 0 {
                    panic!("boom");
                }
                Ok::<_, StoreError>(())
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(snapshot(&store), before);
        assert_eq!(store.get(e, "value"), Some(Value::I32(3)));
    }

    #[test]
    fn transient_flag() {
        let mut store = store();
        let (_, result) = store
            .execute_transient(|tx| tx.spawn(values! { "value" => 1 }))
            .unwrap();
        assert!(result.is_transient());
    }

    #[test]
    fn replay_follows_reinserted_entities() {
        let mut store = store();
        let stale = Entity::new(40, 3);
        let ops = vec![
            WriteOperation::Insert {
                entity: stale,
                values: values! { "value" => 1 },
            },
            WriteOperation::Update {
                entity: stale,
                values: EntityUpdate::new().set("value", 2),
            },
        ];
        let result = store.replay(&ops).unwrap();
        let created = *result.changed_entities().iter().next().unwrap();
        assert_ne!(created, stale);
        assert_eq!(store.get(created, "value"), Some(Value::I32(2)));
    }

    #[test]
    fn redo_then_undo_is_identity_for_random_transactions() {
        let mut store = store();
        let mut seed = 0x2545_f491_u32;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed
        };

        for round in 0..40 {
            let before = snapshot(&store);
            let picks: Vec<u32> = (0..8).map(|_| next()).collect();
            let (_, result) = store
                .execute(|tx| {
                    for pick in &picks {
                        let live = tx.select(&["id"], &[]);
                        match pick % 5 {
                            0 | 1 => {
                                tx.spawn(values! { "value" => *pick as i32 })?;
                            }
                            2 if !live.is_empty() => {
                                let e = live[*pick as usize % live.len()];
                                tx.update(e, EntityUpdate::new().set("value", round))?;
                            }
                            3 if !live.is_empty() => {
                                let e = live[*pick as usize % live.len()];
                                let update = if pick % 2 == 0 {
                                    EntityUpdate::new().set("position", [1.0f32, 2.0, 3.0])
                                } else {
                                    EntityUpdate::new().remove("value")
                                };
                                tx.update(e, update)?;
                            }
                            4 if !live.is_empty() => {
                                tx.delete(live[*pick as usize % live.len()])?;
                            }
                            _ => {}
                        }
                    }
                    Ok::<_, StoreError>(())
                })
                .unwrap();
            let after = snapshot(&store);

            // Undo re-creates deleted entities under new handles, so redo
            // goes through the inverse of the undo replay.
            let undone = store.replay(result.undo()).unwrap();
            assert_eq!(snapshot(&store), before, "undo of round {round}");
            store.replay(undone.undo()).unwrap();
            assert_eq!(snapshot(&store), after, "redo of round {round}");
        }
    }
}
