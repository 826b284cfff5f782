//! Integration test: behaviour when the memory source runs dry.
//!
//! Exhaustion must surface as a clean error, leave the heap
//! structurally intact with all live payloads untouched, and become
//! recoverable once memory is freed.

use loam_heap::{Heap, HeapConfig, HeapError};
use loam_test_utils::{assert_pattern, fill_pattern, CappedSource};

fn capped_heap(limit: usize) -> Heap {
    Heap::with_source(
        HeapConfig::new().with_extension_bytes(64),
        Box::new(CappedSource::new(limit)),
    )
    .unwrap()
}

#[test]
fn allocation_fails_cleanly_at_the_limit() {
    let mut heap = capped_heap(4096);
    let mut live = Vec::new();
    let err = loop {
        match heap.allocate(64) {
            Ok(addr) => live.push(addr),
            Err(err) => break err,
        }
    };
    assert!(matches!(err, HeapError::Exhausted { limit: 4096, .. }));
    assert!(!live.is_empty());
    heap.check().unwrap();

    // Freeing one block makes an identical request succeed again.
    heap.free(live.pop().unwrap());
    heap.allocate(64).unwrap();
    heap.check().unwrap();
}

#[test]
fn failed_growth_leaves_live_payloads_intact() {
    let mut heap = capped_heap(1024);
    let a = heap.allocate(120).unwrap();
    let b = heap.allocate(120).unwrap();
    fill_pattern(heap.payload_mut(a), 1);
    fill_pattern(heap.payload_mut(b), 2);

    let err = heap.allocate(8192).unwrap_err();
    assert!(matches!(err, HeapError::Exhausted { .. }));

    assert_pattern(heap.payload(a), 1, 120);
    assert_pattern(heap.payload(b), 2, 120);
    heap.check().unwrap();
}

#[test]
fn exhausted_heap_still_reuses_freed_blocks() {
    let mut heap = capped_heap(512);
    let mut live = Vec::new();
    while let Ok(addr) = heap.allocate(48) {
        live.push(addr);
    }
    let held = live.len();
    // Free every other block, then re-allocate the same sizes: all of
    // them must come from the free list with no growth at all.
    let extensions = heap.extension_count();
    let freed: Vec<_> = live.iter().step_by(2).copied().collect();
    for addr in &freed {
        heap.free(*addr);
    }
    for _ in &freed {
        heap.allocate(48).unwrap();
    }
    assert_eq!(heap.extension_count(), extensions);
    assert!(held >= 4, "limit should fit several blocks");
    heap.check().unwrap();
}
