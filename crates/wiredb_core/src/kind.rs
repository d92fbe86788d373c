//! Value kind registry.
//!
//! [`Kind`] is the one-byte discriminant written into every segment header.
//! The numbering is part of the on-disk format: a tag, once assigned, is
//! never reused or renumbered.

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::Serializable;

/// Discriminant identifying which value variant a segment payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Kind {
    /// Unordered collection of unique members.
    Set = 0,
    /// Members ordered by integer score.
    SortedSet = 1,
    /// Ordered sequence of values.
    List = 2,
    /// Scalar string.
    Text = 3,
    /// Structured row of named columns.
    Table = 4,
    /// Atomic integer counter.
    Number = 5,
    /// No value; used by tombstones.
    Unknown = 6,
}

impl Kind {
    /// Every kind in wire-tag order.
    pub const ALL: [Kind; 7] = [
        Kind::Set,
        Kind::SortedSet,
        Kind::List,
        Kind::Text,
        Kind::Table,
        Kind::Number,
        Kind::Unknown,
    ];

    /// Converts a wire tag back into a kind.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Set),
            1 => Some(Self::SortedSet),
            2 => Some(Self::List),
            3 => Some(Self::Text),
            4 => Some(Self::Table),
            5 => Some(Self::Number),
            6 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Lowercase name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::SortedSet => "sorted set",
            Self::List => "list",
            Self::Text => "text",
            Self::Table => "table",
            Self::Number => "number",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves the kind tag for a value about to be stored.
///
/// # Errors
///
/// Returns [`CoreError::UnsupportedType`] when the value reports no kind, or
/// reports [`Kind::Unknown`], which is reserved for tombstones.
pub fn kind_of<S: Serializable + ?Sized>(value: &S) -> CoreResult<Kind> {
    match value.kind() {
        Some(kind) if kind != Kind::Unknown => Ok(kind),
        _ => Err(CoreError::unsupported_type(value.describe())),
    }
}
