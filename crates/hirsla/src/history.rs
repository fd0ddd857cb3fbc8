//! # History — Undo/Redo Stacks over Transaction Logs
//!
//! [`History`] keeps the undo logs of committed transactions and replays them
//! through any [`Replay`] implementor (a [`TransactionalStore`] or an
//! [`ObservableStore`](crate::ObservableStore), which also notifies).
//!
//! ```text
//! record(T)  →  undo_stack.push(T.undo)          redo_stack.clear()
//! undo()     →  U = replay(undo_stack.pop())     redo_stack.push(U.undo)
//! redo()     →  R = replay(redo_stack.pop())     undo_stack.push(R.undo)
//! ```
//!
//! Pushing the inverse of what was just replayed (rather than the original
//! `redo`) keeps every stored log in terms of the handles that exist now.
//!
//! Replaying an `Insert` re-creates an entity under a new handle, so logs
//! further down either stack may still mention the old one. The history keeps
//! an alias map from retired handles to their replacements and rewrites each
//! log before replaying it. [`resolve`](History::resolve) exposes the same
//! mapping to callers holding handles. Aliases are pruned once neither side
//! is mentioned by a step still on either stack.
//!
//! Transient and empty transactions are never recorded.
//!
//! [`TransactionalStore`]: crate::TransactionalStore

use std::collections::{HashMap, HashSet};

use crate::ecs::Entity;
use crate::error::StoreError;
use crate::transaction::{Replay, TransactionResult, WriteOperation};

/// Undo/redo stacks of operation logs.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Vec<WriteOperation>>,
    redo_stack: Vec<Vec<WriteOperation>>,
    aliases: HashMap<Entity, Entity>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` undo steps; the oldest are dropped first.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Push a committed transaction onto the undo stack and clear redo.
    ///
    /// Returns `false` for transient or empty transactions, which are ignored.
    pub fn record(&mut self, result: &TransactionResult) -> bool {
        if result.is_transient() || result.is_empty() {
            return false;
        }
        self.undo_stack.push(result.undo().to_vec());
        self.redo_stack.clear();
        self.enforce_limit();
        self.prune_aliases();
        true
    }

    /// Undo the most recent step. Returns `Ok(false)` if there was nothing
    /// to undo. On error the step stays on the stack and the store is
    /// unchanged.
    pub fn undo(&mut self, store: &mut impl Replay) -> Result<bool, StoreError> {
        let Some(log) = self.undo_stack.pop() else {
            return Ok(false);
        };
        match self.replay(store, &log) {
            Ok(inverse) => {
                self.redo_stack.push(inverse);
                log::debug!("undo: {} step(s) left", self.undo_stack.len());
                Ok(true)
            }
            Err(err) => {
                self.undo_stack.push(log);
                Err(err)
            }
        }
    }

    /// Redo the most recently undone step. Returns `Ok(false)` if there was
    /// nothing to redo.
    pub fn redo(&mut self, store: &mut impl Replay) -> Result<bool, StoreError> {
        let Some(log) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match self.replay(store, &log) {
            Ok(inverse) => {
                self.undo_stack.push(inverse);
                self.enforce_limit();
                self.prune_aliases();
                log::debug!("redo: {} step(s) left", self.redo_stack.len());
                Ok(true)
            }
            Err(err) => {
                self.redo_stack.push(log);
                Err(err)
            }
        }
    }

    /// The current handle of an entity that undo/redo may have re-created.
    ///
    /// Only handles that a step still on either stack refers to (or was
    /// rewritten to) are tracked.
    pub fn resolve(&self, mut entity: Entity) -> Entity {
        while let Some(&next) = self.aliases.get(&entity) {
            entity = next;
        }
        entity
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.aliases.clear();
    }

    /// Replay `log` with handles rewritten, learn the handles its inserts
    /// produced, and return the inverse of what was applied.
    fn replay(
        &mut self,
        store: &mut impl Replay,
        log: &[WriteOperation],
    ) -> Result<Vec<WriteOperation>, StoreError> {
        let log: Vec<WriteOperation> = log.iter().map(|op| self.rewrite(op)).collect();
        let result = store.replay(&log)?;

        let recorded = log.iter().filter_map(inserted);
        let created = result.redo().iter().filter_map(inserted);
        for (old, new) in recorded.zip(created) {
            if old != new {
                self.aliases.insert(old, new);
            }
        }
        Ok(result.undo().to_vec())
    }

    fn rewrite(&self, op: &WriteOperation) -> WriteOperation {
        match op {
            WriteOperation::Insert { entity, values } => WriteOperation::Insert {
                entity: self.resolve(*entity),
                values: values.clone(),
            },
            WriteOperation::Update { entity, values } => WriteOperation::Update {
                entity: self.resolve(*entity),
                values: values.clone(),
            },
            WriteOperation::Delete { entity } => WriteOperation::Delete {
                entity: self.resolve(*entity),
            },
        }
    }

    /// Collapse alias chains and drop the ones no stored step refers to.
    fn prune_aliases(&mut self) {
        if self.aliases.is_empty() {
            return;
        }
        let mentioned: HashSet<Entity> = self
            .undo_stack
            .iter()
            .chain(&self.redo_stack)
            .flatten()
            .map(WriteOperation::entity)
            .collect();
        let flattened: Vec<(Entity, Entity)> = self
            .aliases
            .keys()
            .map(|&old| (old, self.resolve(old)))
            .collect();
        self.aliases = flattened
            .into_iter()
            .filter(|(old, new)| mentioned.contains(old) || mentioned.contains(new))
            .collect();
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            let excess = self.undo_stack.len().saturating_sub(limit);
            self.undo_stack.drain(..excess);
        }
    }
}

fn inserted(op: &WriteOperation) -> Option<Entity> {
    match op {
        WriteOperation::Insert { entity, .. } => Some(*entity),
        _ => None,
    }
}
