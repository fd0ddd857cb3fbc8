//! Convenience re-exports — `use hirsla::prelude::*` for the common items.

pub use crate::ecs::{
    ArchetypeId, Entity, EntityUpdate, EntityValues, ID, Schema, Store, Value,
};
pub use crate::error::StoreError;
pub use crate::history::History;
pub use crate::observable::ObservableStore;
pub use crate::observe::Subscription;
pub use crate::transaction::{Replay, Transaction, TransactionResult, TransactionalStore};
pub use crate::values;
