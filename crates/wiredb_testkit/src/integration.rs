//! End-to-end segment properties across value, codec and stream layers.

use std::time::Duration;

use proptest::prelude::*;
use wiredb_core::{
    CoreError, Kind, Lz4Transformer, Number, Segment, Text, TransformerChain, TypedValue,
};

use crate::fixtures::{CodecFixture, TestLog, FIXED_START};
use crate::generators::{key_strategy, ttl_strategy, typed_value_strategy, PropTestConfig};

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn live_segments_roundtrip(
        key in key_strategy(),
        value in typed_value_strategy(),
        ttl in ttl_strategy(),
    ) {
        let fixture = CodecFixture::new();
        let segment = fixture.codec.build_live(&key, &value, ttl).unwrap();
        let bytes = segment.encode();

        prop_assert_eq!(bytes.len(), segment.size());
        prop_assert_eq!(segment.key(), key.as_slice());
        prop_assert_eq!(segment.kind(), value.kind());
        prop_assert_eq!(segment.created_at(), FIXED_START);
        if ttl == 0 {
            prop_assert_eq!(segment.expires_at(), 0);
        } else {
            prop_assert!(segment.expires_at() > segment.created_at());
        }

        let parsed = fixture.codec.parse(&bytes).unwrap();
        prop_assert_eq!(&parsed, &segment);
        prop_assert_eq!(fixture.codec.decode_value(&parsed).unwrap(), Some(value));
    }

    #[test]
    fn tombstones_roundtrip(key in key_strategy()) {
        let fixture = CodecFixture::new();
        let segment = fixture.codec.build_tombstone(&key);
        prop_assert!(segment.is_tombstone());
        prop_assert_eq!(segment.kind(), Kind::Unknown);
        prop_assert_eq!(segment.value_size(), 0);
        prop_assert_eq!(segment.size(), 26 + key.len() + 4);
        prop_assert_eq!(Segment::decode(&segment.encode()).unwrap(), segment);
    }

    #[test]
    fn any_single_byte_flip_is_rejected(
        value in typed_value_strategy(),
        position in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let fixture = CodecFixture::new();
        let mut bytes = fixture.codec.build_live("k", &value, 0).unwrap().encode();
        let i = position.index(bytes.len());
        bytes[i] ^= mask;
        prop_assert!(fixture.codec.parse(&bytes).unwrap_err().is_corruption());
    }

    #[test]
    fn compressed_values_roundtrip(value in typed_value_strategy()) {
        let fixture = CodecFixture::with_transformer(
            TransformerChain::new().then(Lz4Transformer::new()),
        );
        let segment = fixture.codec.build_live("k", &value, 0).unwrap();
        let parsed = fixture.codec.parse(&segment.encode()).unwrap();
        prop_assert_eq!(fixture.codec.decode_value(&parsed).unwrap(), Some(value));
    }
}

#[test]
fn user_counter_example() {
    let fixture = CodecFixture::new();
    let segment = fixture
        .codec
        .build_live("user:1", &Number::new(42), 0)
        .unwrap();

    assert!(!segment.is_tombstone());
    assert_eq!(segment.kind(), Kind::Number);
    assert_eq!(segment.key_size(), 6);
    assert_eq!(segment.value_size(), 10);
    assert_eq!(segment.expires_at(), 0);
    assert_eq!(segment.size(), 46);
    assert_eq!(fixture.codec.to_number(&segment).unwrap().get(), 42);
}

#[test]
fn ttl_expires_with_the_clock() {
    let fixture = CodecFixture::new();
    let segment = fixture
        .codec
        .build_live("session", &Text::from("token"), 30)
        .unwrap();

    assert_eq!(fixture.codec.ttl_remaining(&segment), 30_000_000_000);
    fixture.clock.advance(Duration::from_secs(29));
    assert_eq!(fixture.codec.ttl_remaining(&segment), 1_000_000_000);
    fixture.clock.advance(Duration::from_secs(1));
    assert_eq!(fixture.codec.ttl_remaining(&segment), -1);
    assert!(fixture.codec.is_expired(&segment));
}

#[test]
fn every_kind_rejects_every_other_accessor() {
    let fixture = CodecFixture::new();
    let codec = &fixture.codec;
    let segment = codec.build_live("k", &Text::from("x"), 0).unwrap();

    let conversions: [(Kind, Result<(), CoreError>); 5] = [
        (Kind::Set, codec.to_set(&segment).map(drop)),
        (Kind::SortedSet, codec.to_sorted_set(&segment).map(drop)),
        (Kind::List, codec.to_list(&segment).map(drop)),
        (Kind::Table, codec.to_table(&segment).map(drop)),
        (Kind::Number, codec.to_number(&segment).map(drop)),
    ];
    for (kind, result) in conversions {
        match result {
            Err(CoreError::TypeConversion { requested, actual }) => {
                assert_eq!(requested, kind);
                assert_eq!(actual, Kind::Text);
            }
            other => panic!("expected conversion error for {kind}, got {other:?}"),
        }
    }
}

#[test]
fn log_replay_skips_corrupt_record_and_stops_at_torn_tail() {
    let fixture = CodecFixture::new();
    let segments = vec![
        fixture.codec.build_live("a", &Number::new(1), 0).unwrap(),
        fixture.codec.build_live("b", &Text::from("two"), 0).unwrap(),
        fixture.codec.build_tombstone("a"),
        fixture.codec.build_live("c", &Number::new(3), 0).unwrap(),
    ];
    let log = TestLog::new();
    let offsets = log.append_all(&segments).unwrap();

    let mut bytes = log.bytes();
    // Corrupt the value of "b", then tear the last record.
    let b_value = offsets[1] as usize + 26 + 1;
    bytes[b_value] ^= 0x20;
    bytes.truncate(bytes.len() - 2);
    log.overwrite(&bytes);

    let results: Vec<_> = log.reader().unwrap().collect();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &(offsets[0], segments[0].clone()));
    assert!(matches!(
        &results[1],
        Err(CoreError::CorruptRecord { offset: Some(o), .. }) if *o == offsets[1]
    ));
    assert_eq!(results[2].as_ref().unwrap(), &(offsets[2], segments[2].clone()));

    let live: Vec<TypedValue> = results
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|(_, s)| fixture.codec.decode_value(&s).unwrap())
        .collect();
    assert_eq!(live, vec![TypedValue::from(Number::new(1))]);
}
