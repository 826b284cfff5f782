//! Criterion micro-benchmarks for allocate, free, and reallocate.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loam_bench::{fragmented_heap, fresh_heap, request_sizes};

/// Benchmark: allocate then immediately free a cycling mix of sizes.
fn bench_alloc_free_churn(c: &mut Criterion) {
    let sizes = request_sizes(256, 7);
    c.bench_function("alloc_free_churn_256", |b| {
        b.iter(|| {
            let mut heap = fresh_heap();
            let mut live = Vec::with_capacity(sizes.len());
            for &size in &sizes {
                live.push(heap.allocate(size).unwrap());
            }
            for addr in live.drain(..) {
                heap.free(addr);
            }
            black_box(heap.heap_bytes());
        });
    });
}

/// Benchmark: first-fit scans over a heap with 64 mixed-size holes.
fn bench_first_fit_fragmented(c: &mut Criterion) {
    c.bench_function("first_fit_64_holes", |b| {
        b.iter(|| {
            let (mut heap, _live) = fragmented_heap(64);
            // Large request: skips most holes before finding a fit.
            let addr = heap.allocate(300).unwrap();
            black_box(addr);
        });
    });
}

/// Benchmark: grow in place against a free successor vs. relocating.
fn bench_realloc_grow(c: &mut Criterion) {
    c.bench_function("realloc_grow_in_place", |b| {
        b.iter(|| {
            let mut heap = fresh_heap();
            let a = heap.allocate(64).unwrap();
            // Successor is free heap tail: absorbed without a move.
            let a = heap.reallocate(Some(a), 256).unwrap().unwrap();
            black_box(a);
        });
    });

    c.bench_function("realloc_relocate", |b| {
        b.iter(|| {
            let mut heap = fresh_heap();
            let a = heap.allocate(64).unwrap();
            // Pin the successor so growth must move the payload.
            let pin = heap.allocate(64).unwrap();
            let a = heap.reallocate(Some(a), 256).unwrap().unwrap();
            black_box((a, pin));
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_free_churn,
    bench_first_fit_fragmented,
    bench_realloc_grow
);
criterion_main!(benches);
