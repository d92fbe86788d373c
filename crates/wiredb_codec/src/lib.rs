//! # WireDB Codec
//!
//! Canonical CBOR encoding for the payload of WireDB segments.
//!
//! Every storable value is serialized to a canonical byte form before it is
//! handed to the record layer. Canonical means deterministic:
//! - Integers and lengths use the shortest head
//! - All lengths are definite
//! - Map entries are ordered by encoded key, shorter keys first
//! - Text is UTF-8, no floats, no tags
//!
//! The decoder enforces the same rules, so a payload either decodes to
//! exactly one value or fails.
//!
//! ## Usage
//!
//! ```
//! use wiredb_codec::{from_cbor, to_canonical_cbor, Value};
//!
//! let value = Value::map(vec![(Value::from("number"), Value::Integer(42))]);
//! let bytes = to_canonical_cbor(&value).unwrap();
//! assert_eq!(from_cbor(&bytes).unwrap(), value);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod limits;
mod value;

pub use decoder::{from_cbor, CanonicalDecoder};
pub use encoder::{to_canonical_cbor, CanonicalEncoder};
pub use error::{CodecError, CodecResult};
pub use limits::{MAX_BYTES_LENGTH, MAX_CONTAINER_ELEMENTS, MAX_DEPTH};
pub use value::Value;

/// Types that encode to canonical CBOR.
pub trait Encode {
    /// Encodes `self` to canonical CBOR bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Types that decode from canonical CBOR.
pub trait Decode: Sized {
    /// Decodes a value from canonical CBOR bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl Encode for Value {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_canonical_cbor(self)
    }
}

impl Decode for Value {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
            "[a-z]{0,8}".prop_map(Value::Text),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(|m| {
                    Value::map(m.into_iter().map(|(k, v)| (Value::Text(k), v)).collect())
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(value in arb_value()) {
            let bytes = value.encode().unwrap();
            prop_assert_eq!(Value::decode(&bytes).unwrap(), value);
        }

        #[test]
        fn encoding_is_stable_across_reencode(value in arb_value()) {
            let first = value.encode().unwrap();
            let second = Value::decode(&first).unwrap().encode().unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn nested_document() {
        let doc = Value::map(vec![
            (
                Value::from("users"),
                Value::Array(vec![
                    Value::map(vec![
                        (Value::from("name"), Value::from("Alice")),
                        (Value::from("age"), Value::Integer(30)),
                    ]),
                    Value::map(vec![(Value::from("name"), Value::from("Bob"))]),
                ]),
            ),
            (Value::from("count"), Value::Integer(2)),
        ]);

        let bytes = doc.encode().unwrap();
        assert_eq!(from_cbor(&bytes).unwrap(), doc);
    }
}
