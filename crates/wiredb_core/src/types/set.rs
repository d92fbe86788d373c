use std::collections::BTreeSet;

use wiredb_codec::{CodecError, CodecResult, Value};

use super::{expect_array, text_key};

/// An unordered collection of unique string members.
///
/// Members are held sorted so that equal sets always encode to equal bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Set {
    members: BTreeSet<String>,
}

impl Set {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member. Returns false if it was already present.
    pub fn add(&mut self, member: impl Into<String>) -> bool {
        self.members.insert(member.into())
    }

    /// Removes a member. Returns false if it was absent.
    pub fn remove(&mut self, member: &str) -> bool {
        self.members.remove(member)
    }

    /// Returns true if `member` is present.
    #[must_use]
    pub fn contains(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Array(self.members.iter().cloned().map(Value::Text).collect())
    }

    pub(crate) fn from_value(value: Value) -> CodecResult<Self> {
        let mut members = BTreeSet::new();
        let mut last: Option<String> = None;
        for item in expect_array(value)? {
            let member = text_key(item)?;
            if last.as_ref().is_some_and(|prev| *prev >= member) {
                return Err(CodecError::non_canonical(
                    "set members not strictly ascending",
                ));
            }
            last = Some(member.clone());
            members.insert(member);
        }
        Ok(Self { members })
    }
}

impl<S: Into<String>> FromIterator<S> for Set {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(Into::into).collect(),
        }
    }
}
