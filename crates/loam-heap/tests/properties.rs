//! Property test: the heap against a shadow model.
//!
//! Every live payload is mirrored in a plain `Vec<Vec<u8>>`. After
//! each operation the structural checker must pass and every mirrored
//! byte must still be readable through the heap.

use loam_heap::{Heap, HeapConfig};
use loam_test_utils::fill_pattern;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Alloc(usize),
    Free(usize),
    Realloc(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1..512usize).prop_map(Op::Alloc),
        1 => any::<usize>().prop_map(Op::Free),
        2 => (any::<usize>(), 1..768usize).prop_map(|(i, s)| Op::Realloc(i, s)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn heap_matches_shadow_model(ops in proptest::collection::vec(op_strategy(), 1..120)) {
        let mut heap = Heap::new(HeapConfig::default()).unwrap();
        let mut live: Vec<(loam_core::Addr, Vec<u8>)> = Vec::new();
        let mut seed = 0u8;

        for op in ops {
            match op {
                Op::Alloc(size) => {
                    let addr = heap.allocate(size).unwrap();
                    seed = seed.wrapping_add(1);
                    fill_pattern(&mut heap.payload_mut(addr)[..size], seed);
                    live.push((addr, heap.payload(addr)[..size].to_vec()));
                }
                Op::Free(i) => {
                    if !live.is_empty() {
                        let (addr, _) = live.swap_remove(i % live.len());
                        heap.free(addr);
                    }
                }
                Op::Realloc(i, size) => {
                    if !live.is_empty() {
                        let i = i % live.len();
                        let (addr, old) = live[i].clone();
                        let addr = heap.reallocate(Some(addr), size).unwrap().unwrap();
                        let keep = old.len().min(size);
                        prop_assert_eq!(&heap.payload(addr)[..keep], &old[..keep]);
                        seed = seed.wrapping_add(1);
                        fill_pattern(&mut heap.payload_mut(addr)[..size], seed);
                        live[i] = (addr, heap.payload(addr)[..size].to_vec());
                    }
                }
            }

            heap.check().unwrap();
            for (addr, bytes) in &live {
                prop_assert_eq!(&heap.payload(*addr)[..bytes.len()], &bytes[..]);
            }
        }

        for (addr, _) in live {
            heap.free(addr);
        }
        heap.check().unwrap();
        prop_assert!(heap.free_block_count() <= 1);
    }
}
