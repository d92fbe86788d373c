//! Storable value variants.
//!
//! Each variant knows its [`Kind`] and its canonical CBOR shape:
//!
//! | Kind | Canonical shape |
//! |---|---|
//! | [`Set`] | array of text, ascending, unique |
//! | [`SortedSet`] | map of text member to integer score |
//! | [`List`] | array of any value |
//! | [`Text`] | text string |
//! | [`Table`] | map of text column to any value |
//! | [`Number`] | map `{"number": int}` plus optional `"ttl": uint` |
//!
//! [`TypedValue`] is the closed sum over all six.

mod list;
mod number;
mod set;
mod sorted_set;
mod table;
mod text;

pub use list::List;
pub use number::Number;
pub use set::Set;
pub use sorted_set::SortedSet;
pub use table::Table;
pub use text::Text;

use wiredb_codec::{from_cbor, to_canonical_cbor, CodecError, CodecResult, Value};

use crate::kind::Kind;

/// A value that can be written into a segment.
///
/// Only the built-in variants report a kind. Other implementors can still
/// produce canonical bytes, but the segment codec rejects them with
/// [`crate::CoreError::UnsupportedType`].
pub trait Serializable {
    /// Serializes the value to canonical CBOR bytes.
    fn to_canonical(&self) -> CodecResult<Vec<u8>>;

    /// The wire kind for this value, if it has one.
    fn kind(&self) -> Option<Kind> {
        None
    }

    /// Human-readable description used in error messages.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// A value that can be read back out of a segment of kind [`Self::KIND`].
pub trait Deserializable: Sized {
    /// The kind a segment must carry to decode into this type.
    const KIND: Kind;

    /// Parses canonical CBOR bytes.
    fn from_canonical(bytes: &[u8]) -> CodecResult<Self>;
}

/// Wires a variant's `to_value`/`from_value` pair into the codec traits.
macro_rules! canonical_variant {
    ($ty:ident, $kind:expr) => {
        impl Serializable for $ty {
            fn to_canonical(&self) -> CodecResult<Vec<u8>> {
                to_canonical_cbor(&self.to_value())
            }

            fn kind(&self) -> Option<Kind> {
                Some($kind)
            }
        }

        impl Deserializable for $ty {
            const KIND: Kind = $kind;

            fn from_canonical(bytes: &[u8]) -> CodecResult<Self> {
                Self::from_value(from_cbor(bytes)?)
            }
        }

        impl From<$ty> for TypedValue {
            fn from(value: $ty) -> Self {
                TypedValue::$ty(value)
            }
        }
    };
}

canonical_variant!(Set, Kind::Set);
canonical_variant!(SortedSet, Kind::SortedSet);
canonical_variant!(List, Kind::List);
canonical_variant!(Text, Kind::Text);
canonical_variant!(Table, Kind::Table);
canonical_variant!(Number, Kind::Number);

/// Any storable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// A [`Set`].
    Set(Set),
    /// A [`SortedSet`].
    SortedSet(SortedSet),
    /// A [`List`].
    List(List),
    /// A [`Text`].
    Text(Text),
    /// A [`Table`].
    Table(Table),
    /// A [`Number`].
    Number(Number),
}

impl TypedValue {
    /// The wire kind of the wrapped variant.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Set(_) => Kind::Set,
            Self::SortedSet(_) => Kind::SortedSet,
            Self::List(_) => Kind::List,
            Self::Text(_) => Kind::Text,
            Self::Table(_) => Kind::Table,
            Self::Number(_) => Kind::Number,
        }
    }

    /// Decodes canonical bytes as the variant selected by `kind`.
    ///
    /// # Errors
    ///
    /// Fails when the bytes do not have the shape `kind` requires, or when
    /// `kind` is [`Kind::Unknown`].
    pub fn from_canonical(kind: Kind, bytes: &[u8]) -> CodecResult<Self> {
        Ok(match kind {
            Kind::Set => Self::Set(Set::from_canonical(bytes)?),
            Kind::SortedSet => Self::SortedSet(SortedSet::from_canonical(bytes)?),
            Kind::List => Self::List(List::from_canonical(bytes)?),
            Kind::Text => Self::Text(Text::from_canonical(bytes)?),
            Kind::Table => Self::Table(Table::from_canonical(bytes)?),
            Kind::Number => Self::Number(Number::from_canonical(bytes)?),
            Kind::Unknown => return Err(CodecError::unsupported("value of unknown kind")),
        })
    }
}

impl Serializable for TypedValue {
    fn to_canonical(&self) -> CodecResult<Vec<u8>> {
        match self {
            Self::Set(v) => v.to_canonical(),
            Self::SortedSet(v) => v.to_canonical(),
            Self::List(v) => v.to_canonical(),
            Self::Text(v) => v.to_canonical(),
            Self::Table(v) => v.to_canonical(),
            Self::Number(v) => v.to_canonical(),
        }
    }

    fn kind(&self) -> Option<Kind> {
        Some(TypedValue::kind(self))
    }

    fn describe(&self) -> String {
        format!("TypedValue::{}", TypedValue::kind(self))
    }
}

/// Unwraps a text map key.
pub(crate) fn text_key(key: Value) -> CodecResult<String> {
    match key {
        Value::Text(s) => Ok(s),
        other => Err(CodecError::unexpected_shape("text key", other.type_name())),
    }
}

/// Unwraps a map.
pub(crate) fn expect_map(value: Value) -> CodecResult<Vec<(Value, Value)>> {
    match value {
        Value::Map(pairs) => Ok(pairs),
        other => Err(CodecError::unexpected_shape("map", other.type_name())),
    }
}

/// Unwraps an array.
pub(crate) fn expect_array(value: Value) -> CodecResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(CodecError::unexpected_shape("array", other.type_name())),
    }
}

/// Unwraps an integer.
pub(crate) fn expect_integer(value: &Value) -> CodecResult<i64> {
    value
        .as_integer()
        .ok_or_else(|| CodecError::unexpected_shape("integer", value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_value_reports_inner_kind() {
        assert_eq!(TypedValue::from(Set::new()).kind(), Kind::Set);
        assert_eq!(TypedValue::from(SortedSet::new()).kind(), Kind::SortedSet);
        assert_eq!(TypedValue::from(List::new()).kind(), Kind::List);
        assert_eq!(TypedValue::from(Text::new("")).kind(), Kind::Text);
        assert_eq!(TypedValue::from(Table::new()).kind(), Kind::Table);
        assert_eq!(TypedValue::from(Number::new(0)).kind(), Kind::Number);
    }

    #[test]
    fn typed_value_encodes_like_inner() {
        let text = Text::new("hello");
        let typed = TypedValue::from(text.clone());
        assert_eq!(typed.to_canonical().unwrap(), text.to_canonical().unwrap());
    }

    #[test]
    fn from_canonical_dispatches_on_kind() {
        let bytes = Number::new(9).to_canonical().unwrap();
        let typed = TypedValue::from_canonical(Kind::Number, &bytes).unwrap();
        assert_eq!(typed, TypedValue::Number(Number::new(9)));

        assert!(TypedValue::from_canonical(Kind::Text, &bytes).is_err());
        assert!(TypedValue::from_canonical(Kind::Unknown, &bytes).is_err());
    }
}
