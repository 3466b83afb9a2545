//! Benchmarks for hokusai
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use hokusai::frequency::CountMinSketch;
use hokusai::temporal::Hokusai;
use hokusai::traits::Sketch;

// ============================================================================
// Count-Min Sketch Benchmarks
// ============================================================================

fn bench_count_min(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_sketch");
    group.throughput(Throughput::Elements(1));

    for width_log2 in [10, 14, 18] {
        group.bench_function(format!("add_w{}", width_log2), |b| {
            let mut cms = CountMinSketch::new(width_log2, 4);
            let mut i = 0u64;
            b.iter(|| {
                cms.add(i.to_string().as_bytes(), 1);
                i = i.wrapping_add(1);
            });
        });
    }

    group.bench_function("estimate", |b| {
        let mut cms = CountMinSketch::new(14, 4);
        for i in 0..100_000u64 {
            cms.add(i.to_string().as_bytes(), 1);
        }
        let mut i = 0u64;
        b.iter(|| {
            let estimate = cms.estimate(i.to_string().as_bytes());
            i = i.wrapping_add(1);
            black_box(estimate)
        });
    });

    group.bench_function("merge", |b| {
        let mut cms1 = CountMinSketch::new(14, 4);
        let mut cms2 = CountMinSketch::new(14, 4);
        for i in 0..10_000u64 {
            cms1.add(i.to_string().as_bytes(), 1);
            cms2.add((i + 10_000).to_string().as_bytes(), 1);
        }
        b.iter_batched(
            || cms1.clone(),
            |mut merged| {
                merged.merge(black_box(&cms2)).unwrap();
                merged
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("compress", |b| {
        let mut cms = CountMinSketch::new(14, 4);
        for i in 0..10_000u64 {
            cms.add(i.to_string().as_bytes(), 1);
        }
        b.iter_batched(
            || cms.clone(),
            |mut compressed| {
                compressed.compress();
                compressed
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

// ============================================================================
// Time-aggregation engine Benchmarks
// ============================================================================

fn bench_hokusai(c: &mut Criterion) {
    let mut group = c.benchmark_group("hokusai");
    group.throughput(Throughput::Elements(1));

    group.bench_function("add_steady", |b| {
        let mut engine = Hokusai::new(0, i64::MAX / 2, 5, 12, 4);
        let mut i = 0u64;
        b.iter(|| {
            engine.add(0, i.to_string().as_bytes(), 1);
            i = i.wrapping_add(1);
        });
    });

    group.bench_function("add_with_window_roll", |b| {
        let mut engine = Hokusai::new(0, 1, 5, 12, 4);
        let mut epoch = 0i64;
        b.iter(|| {
            engine.add(epoch, b"item", 1);
            epoch += 1;
        });
    });

    group.bench_function("count_recent", |b| {
        let mut engine = Hokusai::new(0, 10, 5, 12, 4);
        for window in 0..8i64 {
            for i in 0..1_000u64 {
                engine.add(window * 10 + 5, i.to_string().as_bytes(), 1);
            }
        }
        let mut i = 0u64;
        b.iter(|| {
            let estimate = engine.count(65, i.to_string().as_bytes());
            i = i.wrapping_add(1);
            black_box(estimate)
        });
    });

    group.bench_function("count_aged", |b| {
        let mut engine = Hokusai::new(0, 10, 5, 12, 4);
        for window in 0..16i64 {
            for i in 0..1_000u64 {
                engine.add(window * 10 + 5, i.to_string().as_bytes(), 1);
            }
        }
        let mut i = 0u64;
        b.iter(|| {
            let estimate = engine.count(5, i.to_string().as_bytes());
            i = i.wrapping_add(1);
            black_box(estimate)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_count_min, bench_hokusai);
criterion_main!(benches);
