//! Benchmark utilities.

#![warn(missing_docs)]

use rand::distributions::Alphanumeric;
use rand::Rng;
use wiredb_codec::Value;
use wiredb_core::{List, Number, Set, SortedSet, Table, Text, TypedValue};

/// Random alphanumeric string of `len` characters.
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random bytes.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Distinct keys of the form `bench:<n>`.
pub fn generate_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("bench:{i}")).collect()
}

/// One value of each kind, each holding roughly `members` entries.
pub fn sample_values(members: usize) -> Vec<(&'static str, TypedValue)> {
    let mut rng = rand::thread_rng();

    let set: Set = (0..members).map(|_| random_string(12)).collect();
    let mut sorted = SortedSet::new();
    for _ in 0..members {
        sorted.add(random_string(12), rng.gen_range(-1_000..1_000));
    }
    let list: List = (0..members)
        .map(|i| Value::from(i64::try_from(i).unwrap_or(i64::MAX)))
        .collect();
    let table = (0..members).fold(Table::new(), |t, i| {
        t.with(format!("col{i}"), Value::Bytes(random_data(16)))
    });

    vec![
        ("set", set.into()),
        ("sorted_set", sorted.into()),
        ("list", list.into()),
        ("text", Text::from(random_string(members * 8)).into()),
        ("table", table.into()),
        ("number", Number::new(rng.gen()).into()),
    ]
}
