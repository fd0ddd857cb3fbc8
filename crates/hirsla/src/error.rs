//! Error type shared by the store, transactions and history.

use crate::ecs::{ArchetypeId, Entity, Schema};

/// Everything a mutation can reject.
///
/// Reads never fail: unknown or dead entities simply read as `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown component `{0}`")]
    UnknownComponent(String),
    #[error("unknown resource `{0}`")]
    UnknownResource(String),
    #[error("{0} does not exist")]
    UnknownArchetype(ArchetypeId),
    #[error("archetype name `{0}` is not declared")]
    UnknownArchetypeName(String),
    #[error("the `id` component is managed by the store")]
    ReservedComponent,
    #[error("value for `{name}` does not match its schema `{expected}`")]
    TypeMismatch { name: String, expected: Schema },
    #[error("{archetype} has no component `{component}`")]
    NotInArchetype {
        archetype: ArchetypeId,
        component: String,
    },
    #[error("entity {0} is not alive")]
    EntityNotFound(Entity),
    #[error("invalid schema for `{name}`: {reason}")]
    InvalidSchema { name: String, reason: &'static str },
}
