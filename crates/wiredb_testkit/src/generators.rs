//! Property-based test generators using proptest.
//!
//! Provides strategies for every storable value variant, plus keys and
//! TTLs, so segment properties can be checked across the whole domain.

use proptest::prelude::*;
use wiredb_codec::Value;
use wiredb_core::{List, Number, Set, SortedSet, Table, Text, TypedValue};

/// Strategy for segment keys, including empty and binary keys.
pub fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Strategy for TTLs in seconds; 0 (no expiry) is weighted heavily.
pub fn ttl_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        3 => Just(0u64),
        2 => 1u64..86_400,
        1 => any::<u64>(),
    ]
}

/// Strategy for arbitrary float-free codec values, nested up to three levels.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
        "[a-z0-9 ]{0,12}".prop_map(Value::Text),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|m| {
                Value::map(m.into_iter().map(|(k, v)| (Value::Text(k), v)).collect())
            }),
        ]
    })
}

/// Strategy for member and column names.
pub fn member_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:_-]{0,16}"
}

/// Strategy for sets.
pub fn set_strategy() -> impl Strategy<Value = Set> {
    prop::collection::vec(member_strategy(), 0..16)
        .prop_map(|members| members.into_iter().collect())
}

/// Strategy for sorted sets.
pub fn sorted_set_strategy() -> impl Strategy<Value = SortedSet> {
    prop::collection::btree_map(member_strategy(), any::<i64>(), 0..16).prop_map(|scores| {
        let mut set = SortedSet::new();
        for (member, score) in scores {
            set.add(member, score);
        }
        set
    })
}

/// Strategy for lists.
pub fn list_strategy() -> impl Strategy<Value = List> {
    prop::collection::vec(value_strategy(), 0..8).prop_map(|items| items.into_iter().collect())
}

/// Strategy for text values, including non-ASCII.
pub fn text_strategy() -> impl Strategy<Value = Text> {
    any::<String>().prop_map(Text::from)
}

/// Strategy for tables.
pub fn table_strategy() -> impl Strategy<Value = Table> {
    prop::collection::btree_map(member_strategy(), value_strategy(), 0..8).prop_map(|columns| {
        columns
            .into_iter()
            .fold(Table::new(), |table, (column, value)| table.with(column, value))
    })
}

/// Strategy for counters, with and without an informational TTL.
pub fn number_strategy() -> impl Strategy<Value = Number> {
    (any::<i64>(), prop::option::of(0..=i64::MAX as u64)).prop_map(|(value, ttl)| match ttl {
        Some(ttl) => Number::new(value).with_ttl(ttl),
        None => Number::new(value),
    })
}

/// Strategy for any storable value.
pub fn typed_value_strategy() -> impl Strategy<Value = TypedValue> {
    prop_oneof![
        set_strategy().prop_map(TypedValue::from),
        sorted_set_strategy().prop_map(TypedValue::from),
        list_strategy().prop_map(TypedValue::from),
        text_strategy().prop_map(TypedValue::from),
        table_strategy().prop_map(TypedValue::from),
        number_strategy().prop_map(TypedValue::from),
    ]
}

/// Property test configuration.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
