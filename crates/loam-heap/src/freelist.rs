//! The explicit free-list structure.
//!
//! A circular doubly linked list of free block offsets, kept as an
//! auxiliary [`IndexMap`] rather than threaded through the blocks'
//! payload bytes. This removes any aliasing between "list link" and
//! "user payload" views of the managed range while preserving the
//! classic semantics: O(1) head insertion, O(1) removal by offset, and
//! a single anchor from which searches scan circularly.
//!
//! Membership must correspond exactly to the allocated flag: the heap
//! inserts a block here when (and only when) it becomes free, and
//! removes it before (and only before) it becomes allocated.

use indexmap::IndexMap;

/// Forward and backward neighbours of one free block in list order.
///
/// List order is unrelated to physical address order: insertion is at
/// the head, so most-recently-freed blocks are searched first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FreeLinks {
    /// Offset of the next free block in the circle.
    flink: usize,
    /// Offset of the previous free block in the circle.
    blink: usize,
}

/// Circular doubly linked free list keyed by block offset.
#[derive(Debug, Default)]
pub(crate) struct FreeList {
    links: IndexMap<usize, FreeLinks>,
    /// The anchor: where circular scans start. `None` iff the list is
    /// empty.
    first: Option<usize>,
}

impl FreeList {
    /// Create an empty free list.
    pub fn new() -> Self {
        Self {
            links: IndexMap::new(),
            first: None,
        }
    }

    /// The anchor offset, if any block is free.
    pub fn first(&self) -> Option<usize> {
        self.first
    }

    /// Number of free blocks.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no blocks are free.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Whether `off` is on the list.
    pub fn contains(&self, off: usize) -> bool {
        self.links.contains_key(&off)
    }

    /// Offset of the free block after `off` in list order.
    ///
    /// # Panics
    ///
    /// Panics if `off` is not on the list.
    pub fn flink(&self, off: usize) -> usize {
        self.links[&off].flink
    }

    /// Offset of the free block before `off` in list order.
    ///
    /// # Panics
    ///
    /// Panics if `off` is not on the list.
    pub fn blink(&self, off: usize) -> usize {
        self.links[&off].blink
    }

    /// Insert `off` at the head of the list.
    ///
    /// The block must not already be on the list.
    pub fn insert(&mut self, off: usize) {
        debug_assert!(!self.contains(off), "block 0x{off:x} already free-listed");
        match self.first {
            Some(first) => {
                let last = self.links[&first].blink;
                self.links.insert(
                    off,
                    FreeLinks {
                        flink: first,
                        blink: last,
                    },
                );
                self.links[&last].flink = off;
                self.links[&first].blink = off;
            }
            None => {
                // Only element of a circular list: self-referential.
                self.links.insert(
                    off,
                    FreeLinks {
                        flink: off,
                        blink: off,
                    },
                );
            }
        }
        self.first = Some(off);
    }

    /// Detach `off` from the list.
    ///
    /// Handles the one-element case and moves the anchor forward if the
    /// removed block was the anchor. The block must be on the list.
    pub fn remove(&mut self, off: usize) {
        debug_assert!(self.contains(off), "block 0x{off:x} is not free-listed");
        let FreeLinks { flink, blink } = self.links[&off];
        if flink == off {
            // Self-referential: this was the only free block.
            self.links.clear();
            self.first = None;
            return;
        }
        self.links[&blink].flink = flink;
        self.links[&flink].blink = blink;
        self.links.swap_remove(&off);
        if self.first == Some(off) {
            self.first = Some(flink);
        }
    }

    /// Iterate offsets in list order, starting at the anchor.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let mut cur = self.first;
        let anchor = self.first;
        std::iter::from_fn(move || {
            let off = cur?;
            let next = self.links[&off].flink;
            cur = if Some(next) == anchor { None } else { Some(next) };
            Some(off)
        })
    }
}
