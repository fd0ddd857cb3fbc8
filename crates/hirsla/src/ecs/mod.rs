//! # Archetype-Based Columnar Storage
//!
//! The table layer of the store: entities, typed columns, archetypes, queries
//! and resources. Everything here is single-writer and synchronous; the
//! transaction and observation layers at the crate root build on top of it.
//!
//! ## Module Overview
//!
//! - [`entity`] — Generational entity handles and the location table
//! - [`schema`] — Component type descriptors and dynamic values
//! - [`component`] — Typed dense columns
//! - [`archetype`] — One table per component set, swap-remove deletion
//! - [`query`] — Include/exclude filtering over archetypes
//! - [`resource`] — Named store-wide singletons
//! - [`store`] — Central container tying it all together

pub mod archetype;
pub mod component;
pub mod entity;
pub mod query;
pub mod resource;
pub mod schema;
pub mod store;

pub use archetype::{Archetype, ArchetypeId, ID};
pub use component::Column;
pub use entity::{Entity, EntityLocation};
pub use query::QueryArchetypes;
pub use resource::Resources;
pub use schema::{EntityUpdate, EntityValues, Schema, Value};
pub use store::{Store, StoreBuilder};
