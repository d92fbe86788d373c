//! Pinned segment test vectors.
//!
//! Each vector fixes a value, key, TTL and clock reading together with the
//! exact wire bytes they must produce. Bindings in other languages check
//! themselves against the JSON export.

use serde::{Deserialize, Serialize};
use wiredb_core::{Number, Segment, Set, Text, TypedValue};

use crate::fixtures::{CodecFixture, FIXED_START};
use crate::golden::hex_decode;

/// A segment the identity codec must encode to `expected_hex` when its
/// clock reads [`FIXED_START`].
#[derive(Debug, Clone)]
pub struct SegmentVector {
    /// Unique identifier, also the golden file suffix.
    pub id: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Record key.
    pub key: &'static str,
    /// Stored value; `None` builds a tombstone.
    pub value: Option<TypedValue>,
    /// TTL passed to the builder.
    pub ttl_seconds: u64,
    /// Expected wire bytes (hex-encoded).
    pub expected_hex: &'static str,
}

impl SegmentVector {
    /// Builds the segment this vector describes.
    pub fn build(&self) -> Segment {
        let fixture = CodecFixture::new();
        match &self.value {
            Some(value) => fixture
                .codec
                .build_live(self.key, value, self.ttl_seconds)
                .expect("Failed to build vector segment"),
            None => fixture.codec.build_tombstone(self.key),
        }
    }

    /// Expected wire bytes.
    pub fn expected_bytes(&self) -> Vec<u8> {
        hex_decode(self.expected_hex)
    }

    /// Language-neutral form of this vector.
    pub fn to_test_vector(&self) -> TestVector {
        TestVector {
            id: self.id.into(),
            description: self.description.into(),
            created_at: FIXED_START,
            expected_hex: self.expected_hex.into(),
        }
    }
}

/// A test vector that can be shared across languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Clock reading used to build the segment.
    pub created_at: u64,
    /// Expected wire bytes (hex-encoded).
    pub expected_hex: String,
}

/// The pinned segment vectors.
pub fn segment_vectors() -> Vec<SegmentVector> {
    vec![
        SegmentVector {
            id: "number_live",
            description: "counter 42 under user:1, no expiry",
            key: "user:1",
            value: Some(Number::new(42).into()),
            ttl_seconds: 0,
            expected_hex: "0005000000000000000000002a36fe9c9717060000000a000000\
                           757365723a31a1666e756d626572182a8d777fea",
        },
        SegmentVector {
            id: "tombstone",
            description: "deletion of user:1",
            key: "user:1",
            value: None,
            ttl_seconds: 0,
            expected_hex: "0106000000000000000000002a36fe9c97170600000000000000\
                           757365723a31805d7dc7",
        },
        SegmentVector {
            id: "text_ttl",
            description: "text 'hi' expiring after 10 seconds",
            key: "greet",
            value: Some(Text::from("hi").into()),
            ttl_seconds: 10,
            expected_hex: "000300e4358a009d971700002a36fe9c97170500000003000000\
                           677265657462686969cc7d71",
        },
        SegmentVector {
            id: "set_live",
            description: "set {a, b}, members in ascending order",
            key: "tags",
            value: Some(["b", "a"].into_iter().collect::<Set>().into()),
            ttl_seconds: 0,
            expected_hex: "0000000000000000000000002a36fe9c971704000000050000007461677382616161620e6986ea",
        },
    ]
}

/// Exports the vectors as pretty-printed JSON.
pub fn export_json() -> String {
    let vectors: Vec<TestVector> = segment_vectors()
        .iter()
        .map(SegmentVector::to_test_vector)
        .collect();
    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}
