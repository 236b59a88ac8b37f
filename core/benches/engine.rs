//! Engine benchmarks: profiling and end-to-end selection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use compress_core::engine::CompressionEngine;
use compress_core::profiler::Payload;

fn inputs() -> Vec<(&'static str, Payload)> {
    let rows: Vec<_> = (0..2_000).map(|i| json!({"id": i, "name": "user", "active": i % 2 == 0})).collect();

    // Pseudo-random bytes (hard to compress)
    let mut state = 12345u64;
    let noise: Vec<u8> = (0..64 * 1024)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 33) as u8
        })
        .collect();

    vec![
        ("records", Payload::Structured(json!({ "users": rows }))),
        ("prose", Payload::Text("the quick brown fox jumps over the lazy dog ".repeat(1_500))),
        ("noise", Payload::Binary(noise)),
    ]
}

fn size_of(payload: &Payload) -> u64 {
    payload.canonicalize().map(|c| c.as_bytes().len() as u64).unwrap_or(0)
}

fn bench_profile(c: &mut Criterion) {
    let engine = CompressionEngine::new();
    let mut group = c.benchmark_group("profile");
    for (name, payload) in inputs() {
        group.throughput(Throughput::Bytes(size_of(&payload)));
        group.bench_with_input(BenchmarkId::from_parameter(name), &payload, |b, p| {
            b.iter(|| black_box(engine.profile(p).unwrap()));
        });
    }
    group.finish();
}

fn bench_compress_optimal(c: &mut Criterion) {
    let engine = CompressionEngine::new();
    let mut group = c.benchmark_group("compress_optimal");
    group.sample_size(20);
    for (name, payload) in inputs() {
        group.throughput(Throughput::Bytes(size_of(&payload)));
        group.bench_with_input(BenchmarkId::from_parameter(name), &payload, |b, p| {
            b.iter(|| black_box(engine.compress_optimal(p).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_profile, bench_compress_optimal);
criterion_main!(benches);
