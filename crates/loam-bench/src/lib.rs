//! Benchmark profiles and utilities for the Loam allocator.
//!
//! Provides pre-built heap states and deterministic request streams so
//! benchmarks exercise reproducible workloads:
//!
//! - [`fresh_heap`]: an empty heap with the default growth step
//! - [`fragmented_heap`]: a heap with a long free list of mixed hole sizes
//! - [`request_sizes`]: a deterministic stream of payload sizes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use loam_core::Addr;
use loam_heap::{Heap, HeapConfig};

/// Build an empty heap with the default configuration.
pub fn fresh_heap() -> Heap {
    Heap::new(HeapConfig::default()).unwrap()
}

/// Build a heap whose free list holds `holes` non-adjacent free blocks
/// of cycling sizes, forcing real first-fit scans.
///
/// Allocates `2 * holes` blocks and frees every other one, so no pair
/// of holes can coalesce. Returns the heap and the surviving blocks.
pub fn fragmented_heap(holes: usize) -> (Heap, Vec<Addr>) {
    let mut heap = fresh_heap();
    let mut all = Vec::with_capacity(2 * holes);
    for i in 0..2 * holes {
        let size = 16 + (i % 7) * 48;
        all.push(heap.allocate(size).unwrap());
    }
    let mut live = Vec::with_capacity(holes);
    for (i, addr) in all.into_iter().enumerate() {
        if i % 2 == 0 {
            heap.free(addr);
        } else {
            live.push(addr);
        }
    }
    (heap, live)
}

/// Deterministic stream of `count` payload sizes in `1..=480`.
///
/// Plain xorshift so runs are comparable without pulling a RNG crate
/// into the bench profile.
pub fn request_sizes(count: usize, seed: u64) -> Vec<usize> {
    let mut state = seed | 1;
    let mut sizes = Vec::with_capacity(count);
    for _ in 0..count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        sizes.push(1 + (state % 480) as usize);
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragmented_heap_has_requested_hole_count() {
        let (heap, live) = fragmented_heap(32);
        assert_eq!(live.len(), 32);
        assert!(heap.free_block_count() >= 32);
        heap.check().unwrap();
    }

    #[test]
    fn request_sizes_is_deterministic_and_in_range() {
        let a = request_sizes(256, 9);
        let b = request_sizes(256, 9);
        assert_eq!(a, b);
        assert!(a.iter().all(|&s| (1..=480).contains(&s)));
    }
}
