//! # Hirsla — Archetype-Based Columnar Entity Store
//!
//! An in-memory store for fixed-schema records (entities) laid out as
//! archetype tables, with transactions that produce exact undo/redo logs and
//! an observation layer driven by their change-sets.
//!
//! ```text
//! ObservableStore    subscriptions, notified after commit
//!   └─ TransactionalStore   execute(|tx| ..) → TransactionResult
//!        └─ Store           archetypes, location table, resources
//! History            undo/redo stacks replayed through either wrapper
//! ```
//!
//! Start with `use hirsla::prelude::*`, describe components with
//! [`Store::builder`], and mutate through
//! [`execute`](TransactionalStore::execute).
//!
//! Everything is single-threaded: one owner drives all mutation.

pub mod ecs;
pub mod error;
pub mod history;
pub mod observable;
pub(crate) mod observe;
pub mod prelude;
pub mod transaction;

#[cfg(feature = "diagnostics")]
pub mod diag;

pub use ecs::{
    Archetype, ArchetypeId, Column, Entity, EntityLocation, EntityUpdate, EntityValues, Schema,
    Store, StoreBuilder, Value,
};
pub use error::StoreError;
pub use history::History;
pub use observable::ObservableStore;
pub use observe::Subscription;
pub use transaction::{Replay, Transaction, TransactionResult, TransactionalStore, WriteOperation};
