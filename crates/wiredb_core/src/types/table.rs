use std::collections::BTreeMap;

use wiredb_codec::{CodecResult, Value};

use super::{expect_map, text_key};

/// A structured row: named columns holding dynamic values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: BTreeMap<String, Value>,
}

impl Table {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, returning its previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    /// Builder form of [`Table::insert`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Removes a column.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    /// Column names in ascending order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterates `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Map(
            self.columns
                .iter()
                .map(|(k, v)| (Value::Text(k.clone()), v.clone()))
                .collect(),
        )
    }

    pub(crate) fn from_value(value: Value) -> CodecResult<Self> {
        let mut columns = BTreeMap::new();
        for (key, value) in expect_map(value)? {
            columns.insert(text_key(key)?, value);
        }
        Ok(Self { columns })
    }
}
