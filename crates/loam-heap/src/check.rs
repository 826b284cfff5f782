//! Whole-heap invariant verification.
//!
//! [`Heap::check`] walks the physical block chain and the free list
//! and cross-validates them. It exists for the test suite and for
//! debugging sessions; it is O(heap size) and is never called on any
//! allocation path.

use std::error::Error;
use std::fmt;

use crate::block::{self, ALIGNMENT, MIN_BLOCK_SIZE, TAGS_SIZE};
use crate::heap::{Heap, PROLOGUE};

/// A violated heap invariant, naming the offending block offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckError {
    /// A sentinel is missing, resized, or marked free.
    BadSentinel {
        /// Offset of the bad sentinel.
        offset: usize,
    },
    /// A block's header and footer disagree on size or flag.
    TagMismatch {
        /// Offset of the inconsistent block.
        offset: usize,
    },
    /// A block's size is not a multiple of the alignment unit.
    Misaligned {
        /// Offset of the misaligned block.
        offset: usize,
    },
    /// A block is smaller than the minimum block size.
    Undersized {
        /// Offset of the undersized block.
        offset: usize,
    },
    /// A block extends past the epilogue.
    Overrun {
        /// Offset of the overrunning block.
        offset: usize,
    },
    /// Two physically adjacent blocks are both free.
    AdjacentFree {
        /// Offset of the second of the two free blocks.
        offset: usize,
    },
    /// A free block is missing from the free list.
    NotListed {
        /// Offset of the unlisted free block.
        offset: usize,
    },
    /// A free-list entry does not name a free block.
    StaleListing {
        /// The stale listed offset.
        offset: usize,
    },
    /// A free-list entry's neighbour links are not bidirectional.
    BrokenLinks {
        /// Offset of the entry with broken links.
        offset: usize,
    },
    /// The physical walk and the free list disagree on how many
    /// blocks are free.
    CountMismatch {
        /// Free blocks encountered by the physical walk.
        walked: usize,
        /// Entries on the free list.
        listed: usize,
    },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSentinel { offset } => write!(f, "bad sentinel at 0x{offset:x}"),
            Self::TagMismatch { offset } => {
                write!(f, "header/footer mismatch for block at 0x{offset:x}")
            }
            Self::Misaligned { offset } => write!(f, "misaligned block size at 0x{offset:x}"),
            Self::Undersized { offset } => write!(f, "undersized block at 0x{offset:x}"),
            Self::Overrun { offset } => {
                write!(f, "block at 0x{offset:x} extends past the epilogue")
            }
            Self::AdjacentFree { offset } => {
                write!(f, "adjacent free blocks ending at 0x{offset:x}")
            }
            Self::NotListed { offset } => {
                write!(f, "free block at 0x{offset:x} missing from free list")
            }
            Self::StaleListing { offset } => {
                write!(f, "free list names non-free block at 0x{offset:x}")
            }
            Self::BrokenLinks { offset } => {
                write!(f, "free-list links at 0x{offset:x} are not bidirectional")
            }
            Self::CountMismatch { walked, listed } => {
                write!(
                    f,
                    "free-block count mismatch: walk found {walked}, list holds {listed}"
                )
            }
        }
    }
}

impl Error for CheckError {}

impl Heap {
    /// Verify every structural invariant of the heap.
    ///
    /// Checks, in order: sentinel integrity, per-block tag agreement /
    /// alignment / minimum size / bounds, the no-adjacent-free
    /// invariant, exact correspondence between the allocated flag and
    /// free-list membership, and free-list link consistency. Returns
    /// the first violation found.
    pub fn check(&self) -> Result<(), CheckError> {
        let buf = self.buf();

        if block::size(buf, PROLOGUE) != TAGS_SIZE || !block::allocated(buf, PROLOGUE) {
            return Err(CheckError::BadSentinel { offset: PROLOGUE });
        }
        if block::size(buf, self.epilogue) != TAGS_SIZE
            || !block::allocated(buf, self.epilogue)
            || self.epilogue + TAGS_SIZE != self.heap_bytes()
        {
            return Err(CheckError::BadSentinel {
                offset: self.epilogue,
            });
        }

        let mut cur = TAGS_SIZE;
        let mut walked_free = 0;
        let mut prev_was_free = false;
        while cur < self.epilogue {
            let size = block::size(buf, cur);
            if size % ALIGNMENT != 0 {
                return Err(CheckError::Misaligned { offset: cur });
            }
            if size < MIN_BLOCK_SIZE {
                return Err(CheckError::Undersized { offset: cur });
            }
            if cur + size > self.epilogue {
                return Err(CheckError::Overrun { offset: cur });
            }
            let alloc = block::allocated(buf, cur);
            if block::footer_size(buf, cur) != size || block::footer_allocated(buf, cur) != alloc {
                return Err(CheckError::TagMismatch { offset: cur });
            }
            if !alloc {
                if prev_was_free {
                    return Err(CheckError::AdjacentFree { offset: cur });
                }
                if !self.free.contains(cur) {
                    return Err(CheckError::NotListed { offset: cur });
                }
                walked_free += 1;
            }
            prev_was_free = !alloc;
            cur += size;
        }

        for off in self.free.iter() {
            if off >= self.epilogue || block::allocated(buf, off) {
                return Err(CheckError::StaleListing { offset: off });
            }
            let flink = self.free.flink(off);
            let blink = self.free.blink(off);
            if self.free.blink(flink) != off || self.free.flink(blink) != off {
                return Err(CheckError::BrokenLinks { offset: off });
            }
        }

        if walked_free != self.free.len() {
            return Err(CheckError::CountMismatch {
                walked: walked_free,
                listed: self.free.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeapConfig;

    fn heap() -> Heap {
        Heap::new(HeapConfig::default()).unwrap()
    }

    #[test]
    fn fresh_heap_passes() {
        heap().check().unwrap();
    }

    #[test]
    fn busy_heap_passes() {
        let mut h = heap();
        let mut live = Vec::new();
        for i in 1..30 {
            live.push(h.allocate(i * 12).unwrap());
            if i % 2 == 0 {
                h.free(live.swap_remove(i % live.len()));
            }
            h.check().unwrap();
        }
    }

    #[test]
    fn detects_flag_cleared_behind_lists_back() {
        let mut h = heap();
        let a = h.allocate(64).unwrap();
        let off = a.offset() - 8;
        // Clear the flag without telling the free list.
        block::set_allocated(h.source.as_mut_slice(), off, false);
        assert_eq!(h.check(), Err(CheckError::NotListed { offset: off }));
    }

    #[test]
    fn detects_tag_mismatch() {
        let mut h = heap();
        let a = h.allocate(64).unwrap();
        let off = a.offset() - 8;
        // Shrink the header only; the footer still carries the old size.
        let buf = h.source.as_mut_slice();
        buf[off..off + 8].copy_from_slice(&(48u64 | 1).to_le_bytes());
        assert_eq!(h.check(), Err(CheckError::TagMismatch { offset: off }));
    }

    #[test]
    fn detects_clobbered_epilogue() {
        let mut h = heap();
        h.allocate(64).unwrap();
        let epilogue = h.epilogue;
        block::set_allocated(h.source.as_mut_slice(), epilogue, false);
        assert_eq!(h.check(), Err(CheckError::BadSentinel { offset: epilogue }));
    }
}
