//! # Observable Store — Subscriptions Driven by Change-Sets
//!
//! [`ObservableStore`] wraps a [`TransactionalStore`] and turns each committed
//! [`TransactionResult`] into notifications:
//!
//! ```text
//! execute(..) commits
//!   │
//!   ├─ for e in changed_entities     → observe_entity(e)     (current values)
//!   ├─ for c in changed_components   → observe_component(c)  (pulse)
//!   ├─ for a in changed_archetypes   → observe_archetype(a)  (pulse)
//!   └─ once                          → observe_transactions  (the result)
//!
//! set_resource(name, v)              → observe_resource(name) (immediately)
//! ```
//!
//! Nothing fires before the transaction has committed, and a rolled-back
//! transaction fires nothing. Entity and resource subscriptions are called
//! once with the current value when they are created; the others only hear
//! about later changes.

use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

use crate::ecs::{ArchetypeId, Entity, EntityValues, ID, Store, Value};
use crate::error::StoreError;
use crate::observe::{Observers, Subscription};
use crate::transaction::{Replay, Transaction, TransactionResult, TransactionalStore, WriteOperation};

/// A transactional store with change subscriptions.
pub struct ObservableStore {
    store: TransactionalStore,
    entities: HashMap<Entity, Rc<Observers<Option<EntityValues>>>>,
    components: HashMap<String, Rc<Observers<()>>>,
    archetypes: HashMap<ArchetypeId, Rc<Observers<()>>>,
    resources: HashMap<String, Rc<Observers<Value>>>,
    transactions: Rc<Observers<TransactionResult>>,
}

impl ObservableStore {
    pub fn new(store: Store) -> Self {
        Self {
            store: TransactionalStore::new(store),
            entities: HashMap::new(),
            components: HashMap::new(),
            archetypes: HashMap::new(),
            resources: HashMap::new(),
            transactions: Observers::new(),
        }
    }

    pub fn into_inner(self) -> TransactionalStore {
        self.store
    }

    /// Run `f` as one transaction, then notify subscribers.
    pub fn execute<T, E>(
        &mut self,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, E>,
    ) -> Result<(T, TransactionResult), E> {
        let (value, result) = self.store.execute(f)?;
        self.notify(&result);
        Ok((value, result))
    }

    /// Transient variant of [`execute`](Self::execute). Subscribers are
    /// notified the same way.
    pub fn execute_transient<T, E>(
        &mut self,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, E>,
    ) -> Result<(T, TransactionResult), E> {
        let (value, result) = self.store.execute_transient(f)?;
        self.notify(&result);
        Ok((value, result))
    }

    fn notify(&mut self, result: &TransactionResult) {
        for entity in result.changed_entities() {
            let Some(list) = self.entities.get(entity) else {
                continue;
            };
            let values = self.store.read(*entity);
            list.notify(&values);
            // A deleted handle never comes back, so its list is done.
            if values.is_none() {
                self.entities.remove(entity);
            }
        }
        for component in result.changed_components() {
            if let Some(list) = self.components.get(component) {
                list.notify(&());
            }
        }
        for archetype in result.changed_archetypes() {
            if let Some(list) = self.archetypes.get(archetype) {
                list.notify(&());
            }
        }
        self.transactions.notify(result);

        self.entities.retain(|_, list| !list.is_empty());
        self.components.retain(|_, list| !list.is_empty());
        self.archetypes.retain(|_, list| !list.is_empty());
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Called now with the entity's values, then after every transaction
    /// that changes it. The last call is with `None`, when the entity is
    /// deleted; the subscription ends there.
    pub fn observe_entity(
        &mut self,
        entity: Entity,
        mut f: impl FnMut(Option<&EntityValues>) + 'static,
    ) -> Subscription {
        let current = self.store.read(entity);
        f(current.as_ref());
        if current.is_none() {
            return Observers::<Option<EntityValues>>::new().subscribe(|_| {});
        }
        self.entities
            .entry(entity)
            .or_insert_with(Observers::new)
            .subscribe(move |values: &Option<EntityValues>| f(values.as_ref()))
    }

    /// Pulsed after every transaction that writes `component`.
    pub fn observe_component(
        &mut self,
        component: &str,
        mut f: impl FnMut() + 'static,
    ) -> Result<Subscription, StoreError> {
        // `id` never changes in place, so it has nothing to pulse about.
        if component == ID {
            return Err(StoreError::ReservedComponent);
        }
        if self.store.schema(component).is_none() {
            return Err(StoreError::UnknownComponent(component.to_owned()));
        }
        Ok(self
            .components
            .entry(component.to_owned())
            .or_insert_with(Observers::new)
            .subscribe(move |_| f()))
    }

    /// Pulsed after every transaction that adds, removes or rewrites rows of
    /// `archetype`.
    pub fn observe_archetype(
        &mut self,
        archetype: ArchetypeId,
        mut f: impl FnMut() + 'static,
    ) -> Result<Subscription, StoreError> {
        if self.store.archetype(archetype).is_none() {
            return Err(StoreError::UnknownArchetype(archetype));
        }
        Ok(self
            .archetypes
            .entry(archetype)
            .or_insert_with(Observers::new)
            .subscribe(move |_| f()))
    }

    /// Called with every committed [`TransactionResult`].
    pub fn observe_transactions(
        &mut self,
        f: impl FnMut(&TransactionResult) + 'static,
    ) -> Subscription {
        self.transactions.subscribe(f)
    }

    /// Called now with the resource's value, then on every assignment.
    pub fn observe_resource(
        &mut self,
        name: &str,
        mut f: impl FnMut(&Value) + 'static,
    ) -> Result<Subscription, StoreError> {
        let current = self
            .store
            .resource(name)
            .ok_or_else(|| StoreError::UnknownResource(name.to_owned()))?;
        f(current);
        Ok(self
            .resources
            .entry(name.to_owned())
            .or_insert_with(Observers::new)
            .subscribe(f))
    }

    /// Assign a resource and notify its subscribers before returning.
    pub fn set_resource(&mut self, name: &str, value: impl Into<Value>) -> Result<(), StoreError> {
        let value = value.into();
        self.store.set_resource(name, value.clone())?;
        if let Some(list) = self.resources.get(name) {
            list.notify(&value);
        }
        Ok(())
    }
}

impl Deref for ObservableStore {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.store
    }
}

impl From<Store> for ObservableStore {
    fn from(store: Store) -> Self {
        Self::new(store)
    }
}

impl Replay for ObservableStore {
    fn replay(&mut self, operations: &[WriteOperation]) -> Result<TransactionResult, StoreError> {
        self.execute(|tx| tx.apply(operations))
            .map(|((), result)| result)
    }
}
