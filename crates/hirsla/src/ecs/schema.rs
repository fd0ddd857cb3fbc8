//! # Schema — Component Type Descriptors and Dynamic Values
//!
//! Components are declared by name with a [`Schema`] describing their shape.
//! The schema decides which column layout an archetype allocates (see
//! [`Column`](super::component::Column)) and which [`Value`]s may be written.
//!
//! ```text
//! "position" → Vector(3)        → flat f32 column, stride 3
//! "mass"     → F32              → Vec<f32>
//! "owner"    → Entity           → Vec<Entity>
//! "material" → Struct{...}      → Vec<Value>
//! ```
//!
//! [`Value`] is the dynamic counterpart used at the store boundary: inserts,
//! updates, reads, write-operation logs and resources all speak `Value`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Type descriptor for a component or resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schema {
    Bool,
    I32,
    U32,
    F32,
    F64,
    Entity,
    /// Fixed-size `f32` vector or matrix, e.g. `Vector(3)` or `Vector(16)`.
    Vector(usize),
    String,
    /// Nested record; every field is required.
    Struct(BTreeMap<String, Schema>),
    /// Accepts any value.
    Any,
}

impl Schema {
    pub const VEC2: Schema = Schema::Vector(2);
    pub const VEC3: Schema = Schema::Vector(3);
    pub const VEC4: Schema = Schema::Vector(4);
    pub const QUAT: Schema = Schema::Vector(4);
    pub const MAT4X4: Schema = Schema::Vector(16);

    /// Build a [`Schema::Struct`] from `(name, schema)` pairs.
    pub fn structure<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Schema::Struct(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    /// Value written into a column when an insert doesn't supply one.
    pub fn default_value(&self) -> Value {
        match self {
            Schema::Bool => Value::Bool(false),
            Schema::I32 => Value::I32(0),
            Schema::U32 => Value::U32(0),
            Schema::F32 => Value::F32(0.0),
            Schema::F64 => Value::F64(0.0),
            Schema::Entity => Value::Null,
            Schema::Vector(n) => Value::Vector(vec![0.0; *n]),
            Schema::String => Value::String(String::new()),
            Schema::Struct(fields) => Value::Struct(
                fields
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.default_value()))
                    .collect(),
            ),
            Schema::Any => Value::Null,
        }
    }

    /// Whether `value` may be stored under this schema.
    ///
    /// `Entity` components also accept `Null` (no target yet).
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Schema::Any, _) => true,
            (Schema::Bool, Value::Bool(_))
            | (Schema::I32, Value::I32(_))
            | (Schema::U32, Value::U32(_))
            | (Schema::F32, Value::F32(_))
            | (Schema::F64, Value::F64(_))
            | (Schema::Entity, Value::Entity(_) | Value::Null)
            | (Schema::String, Value::String(_)) => true,
            (Schema::Vector(n), Value::Vector(v)) => v.len() == *n,
            (Schema::Struct(fields), Value::Struct(values)) => {
                fields.len() == values.len()
                    && fields.iter().all(|(name, schema)| {
                        values.get(name).is_some_and(|v| schema.accepts(v))
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Bool => f.write_str("bool"),
            Schema::I32 => f.write_str("i32"),
            Schema::U32 => f.write_str("u32"),
            Schema::F32 => f.write_str("f32"),
            Schema::F64 => f.write_str("f64"),
            Schema::Entity => f.write_str("entity"),
            Schema::Vector(n) => write!(f, "vector<{n}>"),
            Schema::String => f.write_str("string"),
            Schema::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, schema)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {schema}")?;
                }
                f.write_str("}")
            }
            Schema::Any => f.write_str("any"),
        }
    }
}

/// A dynamically typed component or resource value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    I32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
    Entity(Entity),
    Vector(Vec<f32>),
    String(String),
    Struct(BTreeMap<String, Value>),
    List(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<Entity> {
        match self {
            Value::Entity(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_value_from!(
    bool => Bool,
    i32 => I32,
    u32 => U32,
    f32 => F32,
    f64 => F64,
    Entity => Entity,
    Vec<f32> => Vector,
    String => String,
    BTreeMap<String, Value> => Struct,
    Vec<Value> => List,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl<const N: usize> From<[f32; N]> for Value {
    fn from(v: [f32; N]) -> Self {
        Value::Vector(v.to_vec())
    }
}

/// A full record: component name → value. The `id` component is included
/// when read back from the store.
pub type EntityValues = BTreeMap<String, Value>;

/// A partial record for [`update`](crate::Transaction::update): component
/// name → new value, or `None` to remove the component.
///
/// Adding a component the entity lacks, or removing one it has, moves the
/// entity to another archetype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityUpdate(BTreeMap<String, Option<Value>>);

impl EntityUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or add) a component.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), Some(value.into()));
        self
    }

    /// Remove a component.
    pub fn remove(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), None);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<Value>) {
        self.0.insert(name.into(), value);
    }

    /// `Some(None)` means the update removes `name`.
    pub fn get(&self, name: &str) -> Option<Option<&Value>> {
        self.0.get(name).map(Option::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold a later update into this one; its entries win.
    pub(crate) fn overwrite_with(&mut self, later: EntityUpdate) {
        self.0.extend(later.0);
    }

    /// Fold a later update in, keeping entries this one already has.
    pub(crate) fn keep_first(&mut self, later: EntityUpdate) {
        for (name, value) in later.0 {
            self.0.entry(name).or_insert(value);
        }
    }
}

impl From<EntityValues> for EntityUpdate {
    fn from(values: EntityValues) -> Self {
        Self(values.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

impl FromIterator<(String, Option<Value>)> for EntityUpdate {
    fn from_iter<I: IntoIterator<Item = (String, Option<Value>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build [`EntityValues`] from `name => value` pairs.
///
/// ```
/// use hirsla::values;
/// let v = values! { "mass" => 2.0f32, "position" => [0.0f32, 1.0, 0.0] };
/// assert_eq!(v.len(), 2);
/// ```
#[macro_export]
macro_rules! values {
    () => { $crate::EntityValues::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut values = $crate::EntityValues::new();
        $( values.insert(::std::string::String::from($name), $crate::Value::from($value)); )+
        values
    }};
}
