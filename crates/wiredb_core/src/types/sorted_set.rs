use std::collections::BTreeMap;

use wiredb_codec::{CodecResult, Value};

use super::{expect_integer, expect_map, text_key};

/// Members ranked by a signed integer score.
///
/// Ties on score are broken by member name, so ranking is total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedSet {
    scores: BTreeMap<String, i64>,
}

impl SortedSet {
    /// Creates an empty sorted set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or rescores a member, returning its previous score.
    pub fn add(&mut self, member: impl Into<String>, score: i64) -> Option<i64> {
        self.scores.insert(member.into(), score)
    }

    /// Adds `delta` to a member's score (0 if absent) and returns the new
    /// score. Overflow wraps.
    pub fn incr(&mut self, member: impl Into<String>, delta: i64) -> i64 {
        let score = self.scores.entry(member.into()).or_insert(0);
        *score = score.wrapping_add(delta);
        *score
    }

    /// Removes a member, returning its score.
    pub fn remove(&mut self, member: &str) -> Option<i64> {
        self.scores.remove(member)
    }

    /// Score of `member`, if present.
    #[must_use]
    pub fn score(&self, member: &str) -> Option<i64> {
        self.scores.get(member).copied()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns true if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// All members ordered by ascending score.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&str, i64)> {
        let mut ranked: Vec<_> = self
            .scores
            .iter()
            .map(|(member, score)| (member.as_str(), *score))
            .collect();
        ranked.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    /// Members whose score lies in `min..=max`, ordered by score.
    #[must_use]
    pub fn range_by_score(&self, min: i64, max: i64) -> Vec<(&str, i64)> {
        self.ranked()
            .into_iter()
            .filter(|(_, score)| (min..=max).contains(score))
            .collect()
    }

    /// Zero-based rank of `member` in ascending score order.
    #[must_use]
    pub fn rank(&self, member: &str) -> Option<usize> {
        self.ranked().iter().position(|(m, _)| *m == member)
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Map(
            self.scores
                .iter()
                .map(|(member, score)| (Value::Text(member.clone()), Value::Integer(*score)))
                .collect(),
        )
    }

    pub(crate) fn from_value(value: Value) -> CodecResult<Self> {
        let mut scores = BTreeMap::new();
        for (key, score) in expect_map(value)? {
            scores.insert(text_key(key)?, expect_integer(&score)?);
        }
        Ok(Self { scores })
    }
}
