//! Field values and the datasets an adapter partitions them into.

use crate::types::{Identifier, NumericRange};
use serde::{Deserialize, Serialize};

///
/// Value
///
/// Typed field value produced by an adapter or an index model and written
/// to bytes by a field codec.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Range(NumericRange),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric extent of this value, if it has one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_numeric_range(&self) -> Option<NumericRange> {
        match self {
            Self::Int(v) => Some(NumericRange::point(*v as f64)),
            Self::Uint(v) => Some(NumericRange::point(*v as f64)),
            Self::Float(v) => Some(NumericRange::point(*v)),
            Self::Range(range) => Some(*range),
            Self::Null | Self::Bool(_) | Self::Text(_) | Self::Blob(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NumericRange> for Value {
    fn from(v: NumericRange) -> Self {
        Self::Range(v)
    }
}

///
/// PersistentValue
///
/// One field identifier paired with its value.
///

#[derive(Clone, Debug, PartialEq)]
pub struct PersistentValue {
    pub id: Identifier,
    pub value: Value,
}

impl PersistentValue {
    #[must_use]
    pub fn new(id: impl Into<Identifier>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

///
/// PersistentDataset
///
/// Ordered field values. Field order follows insertion order so that
/// encode and decode produce the same layout.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistentDataset {
    values: Vec<PersistentValue>,
}

impl PersistentDataset {
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Add a value, replacing any earlier value for the same field.
    pub fn add(&mut self, value: PersistentValue) {
        match self.values.iter_mut().find(|v| v.id == value.id) {
            Some(existing) => *existing = value,
            None => self.values.push(value),
        }
    }

    #[must_use]
    pub fn get(&self, id: &Identifier) -> Option<&Value> {
        self.values.iter().find(|v| &v.id == id).map(|v| &v.value)
    }

    #[must_use]
    pub fn values(&self) -> &[PersistentValue] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<PersistentValue> for PersistentDataset {
    fn from_iter<I: IntoIterator<Item = PersistentValue>>(iter: I) -> Self {
        let mut dataset = Self::new();
        for value in iter {
            dataset.add(value);
        }

        dataset
    }
}

///
/// TESTS
///
