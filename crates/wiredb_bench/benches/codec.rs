//! Canonical encoding benchmarks for the value variants.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use wiredb_bench::sample_values;
use wiredb_codec::{from_cbor, CanonicalEncoder, Value};
use wiredb_core::{Serializable, TypedValue};

/// Canonical bytes for every kind at a few sizes.
fn bench_to_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_canonical");

    for members in [8usize, 64, 512] {
        for (name, value) in sample_values(members) {
            group.bench_with_input(BenchmarkId::new(name, members), &value, |b, value| {
                b.iter(|| black_box(value.to_canonical().unwrap()));
            });
        }
    }

    group.finish();
}

/// Parsing canonical bytes back into typed values.
fn bench_from_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_canonical");

    for (name, value) in sample_values(64) {
        let bytes = value.to_canonical().unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(TypedValue::from_canonical(value.kind(), black_box(&bytes)).unwrap())
            });
        });
    }

    group.finish();
}

/// Map key sorting dominates table encoding; compare against a pre-sorted map.
fn bench_map_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_ordering");
    let pairs: Vec<(Value, Value)> = (0..256)
        .rev()
        .map(|i| (Value::Text(format!("k{i}")), Value::Integer(i)))
        .collect();
    let sorted = Value::map(pairs.clone());
    let unsorted = Value::Map(pairs);

    group.bench_function("unsorted_256", |b| {
        b.iter(|| {
            let mut encoder = CanonicalEncoder::with_capacity(4096);
            encoder.encode(black_box(&unsorted)).unwrap();
            black_box(encoder.into_bytes());
        });
    });
    group.bench_function("presorted_256", |b| {
        b.iter(|| {
            let mut encoder = CanonicalEncoder::with_capacity(4096);
            encoder.encode(black_box(&sorted)).unwrap();
            black_box(encoder.into_bytes());
        });
    });
    group.bench_function("decode_256", |b| {
        let mut encoder = CanonicalEncoder::new();
        encoder.encode(&sorted).unwrap();
        let bytes = encoder.into_bytes();
        b.iter(|| black_box(from_cbor(black_box(&bytes)).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_to_canonical,
    bench_from_canonical,
    bench_map_ordering,
);

criterion_main!(benches);
