//! # Component Storage — Typed Columns
//!
//! Each component of an archetype is stored in its own [`Column`], a dense
//! array whose element type is picked from the component's [`Schema`]:
//!
//! ```text
//! Schema::F32        → Column::F32(Vec<f32>)
//! Schema::Vector(3)  → Column::Vector { width: 3, data: [x0 y0 z0 x1 y1 z1 ...] }
//! Schema::Struct{..} → Column::Values(Vec<Value>)
//! ```
//!
//! Scalars and vectors get flat buffers so bulk readers (render layers copying
//! into GPU buffers) can borrow a contiguous slice. Everything else falls back
//! to boxed [`Value`]s.
//!
//! Writing a value of the wrong kind into a column is a bug in the store (values
//! are validated against the schema before they get here), so it panics.

use super::entity::Entity;
use super::schema::{Schema, Value};

/// A single dense column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Bool(Vec<bool>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    /// `None` for an unset entity reference.
    Entity(Vec<Option<Entity>>),
    /// Row `i` occupies `data[i * width..(i + 1) * width]`.
    Vector { width: usize, data: Vec<f32> },
    Values(Vec<Value>),
}

impl Column {
    /// Allocate an empty column for `schema`.
    pub fn new(schema: &Schema) -> Self {
        match schema {
            Schema::Bool => Column::Bool(Vec::new()),
            Schema::I32 => Column::I32(Vec::new()),
            Schema::U32 => Column::U32(Vec::new()),
            Schema::F32 => Column::F32(Vec::new()),
            Schema::F64 => Column::F64(Vec::new()),
            Schema::Entity => Column::Entity(Vec::new()),
            Schema::Vector(width) => Column::Vector {
                width: *width,
                data: Vec::new(),
            },
            Schema::String | Schema::Struct(_) | Schema::Any => Column::Values(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Bool(v) => v.len(),
            Column::I32(v) => v.len(),
            Column::U32(v) => v.len(),
            Column::F32(v) => v.len(),
            Column::F64(v) => v.len(),
            Column::Entity(v) => v.len(),
            Column::Vector { width, data } => data.len() / width,
            Column::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value.
    ///
    /// # Panics
    ///
    /// If the value's kind doesn't match the column.
    pub fn push(&mut self, value: Value) {
        match (self, value) {
            (Column::Bool(v), Value::Bool(x)) => v.push(x),
            (Column::I32(v), Value::I32(x)) => v.push(x),
            (Column::U32(v), Value::U32(x)) => v.push(x),
            (Column::F32(v), Value::F32(x)) => v.push(x),
            (Column::F64(v), Value::F64(x)) => v.push(x),
            (Column::Entity(v), Value::Entity(x)) => v.push(Some(x)),
            (Column::Entity(v), Value::Null) => v.push(None),
            (Column::Vector { width, data }, Value::Vector(x)) if x.len() == *width => {
                data.extend_from_slice(&x)
            }
            (Column::Values(v), x) => v.push(x),
            (column, value) => mismatch(column, &value),
        }
    }

    /// Read row `row` as a [`Value`].
    ///
    /// # Panics
    ///
    /// If `row` is out of range.
    pub fn get(&self, row: usize) -> Value {
        match self {
            Column::Bool(v) => Value::Bool(v[row]),
            Column::I32(v) => Value::I32(v[row]),
            Column::U32(v) => Value::U32(v[row]),
            Column::F32(v) => Value::F32(v[row]),
            Column::F64(v) => Value::F64(v[row]),
            Column::Entity(v) => v[row].map_or(Value::Null, Value::Entity),
            Column::Vector { width, data } => {
                Value::Vector(data[row * width..(row + 1) * width].to_vec())
            }
            Column::Values(v) => v[row].clone(),
        }
    }

    /// Overwrite row `row`.
    ///
    /// # Panics
    ///
    /// If `row` is out of range or the value's kind doesn't match the column.
    pub fn set(&mut self, row: usize, value: Value) {
        match (self, value) {
            (Column::Bool(v), Value::Bool(x)) => v[row] = x,
            (Column::I32(v), Value::I32(x)) => v[row] = x,
            (Column::U32(v), Value::U32(x)) => v[row] = x,
            (Column::F32(v), Value::F32(x)) => v[row] = x,
            (Column::F64(v), Value::F64(x)) => v[row] = x,
            (Column::Entity(v), Value::Entity(x)) => v[row] = Some(x),
            (Column::Entity(v), Value::Null) => v[row] = None,
            (Column::Vector { width, data }, Value::Vector(x)) if x.len() == *width => {
                data[row * *width..(row + 1) * *width].copy_from_slice(&x)
            }
            (Column::Values(v), x) => v[row] = x,
            (column, value) => mismatch(column, &value),
        }
    }

    /// Remove row `row` by moving the last row into its place.
    ///
    /// Returns `true` if a row was moved (i.e. `row` wasn't the last one).
    pub fn swap_remove(&mut self, row: usize) -> bool {
        let last = self.len() - 1;
        match self {
            Column::Bool(v) => {
                v.swap_remove(row);
            }
            Column::I32(v) => {
                v.swap_remove(row);
            }
            Column::U32(v) => {
                v.swap_remove(row);
            }
            Column::F32(v) => {
                v.swap_remove(row);
            }
            Column::F64(v) => {
                v.swap_remove(row);
            }
            Column::Entity(v) => {
                v.swap_remove(row);
            }
            Column::Vector { width, data } => {
                let width = *width;
                if row != last {
                    data.copy_within(last * width..(last + 1) * width, row * width);
                }
                data.truncate(last * width);
            }
            Column::Values(v) => {
                v.swap_remove(row);
            }
        }
        row != last
    }

    fn kind(&self) -> &'static str {
        match self {
            Column::Bool(_) => "bool",
            Column::I32(_) => "i32",
            Column::U32(_) => "u32",
            Column::F32(_) => "f32",
            Column::F64(_) => "f64",
            Column::Entity(_) => "entity",
            Column::Vector { .. } => "vector",
            Column::Values(_) => "value",
        }
    }

    // ── Typed slices ─────────────────────────────────────────────────────

    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        match self {
            Column::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32_slice(&self) -> Option<&[i32]> {
        match self {
            Column::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32_slice(&self) -> Option<&[u32]> {
        match self {
            Column::U32(v) => Some(v),
            _ => None,
        }
    }

    /// The flat `f32` buffer of a vector column and its stride.
    pub fn as_vector_slice(&self) -> Option<(&[f32], usize)> {
        match self {
            Column::Vector { width, data } => Some((data, *width)),
            _ => None,
        }
    }
}

fn mismatch(column: &Column, value: &Value) -> ! {
    panic!(
        "Column type mismatch: cannot store {value:?} in a `{}` column",
        column.kind()
    )
}
