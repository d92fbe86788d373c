use std::collections::VecDeque;

use wiredb_codec::{CodecResult, Value};

use super::expect_array;

/// An ordered sequence of dynamic values, pushable at both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct List {
    items: VecDeque<Value>,
}

impl List {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends an item.
    pub fn push_front(&mut self, item: impl Into<Value>) {
        self.items.push_front(item.into());
    }

    /// Appends an item.
    pub fn push_back(&mut self, item: impl Into<Value>) {
        self.items.push_back(item.into());
    }

    /// Removes and returns the first item.
    pub fn pop_front(&mut self) -> Option<Value> {
        self.items.pop_front()
    }

    /// Removes and returns the last item.
    pub fn pop_back(&mut self) -> Option<Value> {
        self.items.pop_back()
    }

    /// Item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Items in `start..end`, clamped to the list bounds.
    #[must_use]
    pub fn range(&self, start: usize, end: usize) -> Vec<&Value> {
        let end = end.min(self.items.len());
        if start >= end {
            return Vec::new();
        }
        self.items.range(start..end).collect()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates items front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Array(self.items.iter().cloned().collect())
    }

    pub(crate) fn from_value(value: Value) -> CodecResult<Self> {
        Ok(Self {
            items: expect_array(value)?.into(),
        })
    }
}

impl<V: Into<Value>> FromIterator<V> for List {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}
