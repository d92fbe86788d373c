//! Segment build, encode and parse benchmarks.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use wiredb_bench::{generate_keys, random_string, sample_values};
use wiredb_core::{
    Lz4Transformer, Number, Segment, SegmentCodec, SegmentReader, SegmentWriter, Text,
};

/// Building a live segment for every kind.
fn bench_build_live(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_live");
    let codec = SegmentCodec::identity();

    for (name, value) in sample_values(64) {
        group.bench_function(name, |b| {
            b.iter(|| black_box(codec.build_live("bench:key", black_box(&value), 60).unwrap()));
        });
    }

    group.finish();
}

/// Wire encoding and checksum verification across payload sizes.
fn bench_wire(c: &mut Criterion) {
    let mut group = c.benchmark_group("wire");
    let codec = SegmentCodec::identity();

    for size in [64usize, 1024, 16384] {
        let segment = codec
            .build_live("bench:key", &Text::from(random_string(size)), 0)
            .unwrap();
        let bytes = segment.encode();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", size), &segment, |b, segment| {
            b.iter(|| black_box(segment.encode()));
        });
        group.bench_with_input(BenchmarkId::new("parse", size), &bytes, |b, bytes| {
            b.iter(|| black_box(codec.parse(black_box(bytes)).unwrap()));
        });
    }

    group.finish();
}

/// Identity versus LZ4 payloads on compressible text.
fn bench_transformers(c: &mut Criterion) {
    let mut group = c.benchmark_group("transformer");
    let text = Text::from("wiredb ".repeat(2048));

    for (name, codec) in [
        ("identity", SegmentCodec::identity()),
        ("lz4", SegmentCodec::new(Lz4Transformer::new())),
    ] {
        let segment = codec.build_live("k", &text, 0).unwrap();
        group.bench_function(BenchmarkId::new("build", name), |b| {
            b.iter(|| black_box(codec.build_live("k", black_box(&text), 0).unwrap()));
        });
        group.bench_function(BenchmarkId::new("to_text", name), |b| {
            b.iter(|| black_box(codec.to_text(black_box(&segment)).unwrap()));
        });
    }

    group.finish();
}

/// Appending and replaying a log of counters.
fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");
    let codec = SegmentCodec::identity();
    let segments: Vec<Segment> = generate_keys(1_000)
        .iter()
        .enumerate()
        .map(|(i, key)| codec.build_live(key, &Number::new(i as i64), 0).unwrap())
        .collect();
    let total: usize = segments.iter().map(Segment::size).sum();
    group.throughput(Throughput::Bytes(total as u64));

    group.bench_function("append_1000", |b| {
        b.iter(|| {
            let mut writer = SegmentWriter::new(Vec::with_capacity(total));
            for segment in &segments {
                writer.append(segment).unwrap();
            }
            black_box(writer.into_inner());
        });
    });

    let mut writer = SegmentWriter::new(Vec::with_capacity(total));
    for segment in &segments {
        writer.append(segment).unwrap();
    }
    let log = writer.into_inner();

    group.bench_function("replay_1000", |b| {
        b.iter(|| {
            let count = SegmentReader::new(Cursor::new(black_box(&log)))
                .filter(Result::is_ok)
                .count();
            black_box(count);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_build_live,
    bench_wire,
    bench_transformers,
    bench_stream,
);

criterion_main!(benches);
