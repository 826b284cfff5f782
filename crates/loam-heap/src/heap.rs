//! The heap orchestrator: allocate, free, and reallocate.
//!
//! [`Heap`] owns the managed range (through a
//! [`MemorySource`](loam_core::MemorySource)) and all allocator state.
//! There are no globals: independent heaps coexist freely, which is
//! also what makes the test suite straightforward.
//!
//! The lifecycle of a request:
//! 1. `allocate()` normalises the payload size into a total block size
//! 2. a first-fit circular scan of the free list looks for a block
//! 3. on a miss, the range is grown (batched) and the scan repeats
//! 4. `free()` clears the allocated flag and eagerly coalesces
//! 5. `reallocate()` resizes in place where physically possible

use loam_core::{Addr, MemorySource};

use crate::block::{self, MIN_BLOCK_SIZE, TAGS_SIZE, WORD_SIZE};
use crate::config::HeapConfig;
use crate::error::HeapError;
use crate::freelist::FreeList;
use crate::region::GrowableBuffer;

/// Offset of the prologue sentinel. Always zero; named for clarity.
pub(crate) const PROLOGUE: usize = 0;

/// A first-fit boundary-tag heap over a growable linear byte range.
///
/// Single-threaded by design: every operation runs to completion
/// without yielding, and there is no internal locking. Wrap the heap
/// in a mutex for concurrent use.
pub struct Heap {
    /// The managed byte range.
    pub(crate) source: Box<dyn MemorySource>,
    /// Circular free list, most-recently-freed first.
    pub(crate) free: FreeList,
    /// Offset of the epilogue sentinel (the topmost block).
    pub(crate) epilogue: usize,
    /// Number of growth calls made since construction.
    pub(crate) extensions: u64,
    /// Immutable configuration.
    pub(crate) config: HeapConfig,
}

impl core::fmt::Debug for Heap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Heap")
            .field("epilogue", &self.epilogue)
            .field("extensions", &self.extensions)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Total block size needed to hold `payload` usable bytes.
fn required_block_size(payload: usize) -> usize {
    (block::align(payload) + TAGS_SIZE).max(MIN_BLOCK_SIZE)
}

impl Heap {
    /// Create a heap over a fresh [`GrowableBuffer`].
    ///
    /// Establishes the sentinel-bounded empty managed range. Returns
    /// `Err` if the config is invalid or the source cannot supply the
    /// bootstrap bytes.
    pub fn new(config: HeapConfig) -> Result<Self, HeapError> {
        Self::with_source(config, Box::new(GrowableBuffer::new()))
    }

    /// Create a heap over a caller-supplied memory source.
    ///
    /// The source must start empty; the heap assumes offset 0 is its
    /// prologue.
    pub fn with_source(
        config: HeapConfig,
        mut source: Box<dyn MemorySource>,
    ) -> Result<Self, HeapError> {
        if config.extension_bytes == 0 || config.extension_bytes % MIN_BLOCK_SIZE != 0 {
            return Err(HeapError::InvalidConfig {
                reason: format!(
                    "extension_bytes must be a nonzero multiple of {MIN_BLOCK_SIZE} (got {})",
                    config.extension_bytes,
                ),
            });
        }
        if !source.is_empty() {
            return Err(HeapError::InvalidConfig {
                reason: format!("memory source must start empty (has {} bytes)", source.len()),
            });
        }
        source.extend(2 * TAGS_SIZE)?;
        let mut heap = Self {
            source,
            free: FreeList::new(),
            epilogue: TAGS_SIZE,
            extensions: 0,
            config,
        };
        block::set_size_and_allocated(heap.buf_mut(), PROLOGUE, TAGS_SIZE, true);
        let epilogue = heap.epilogue;
        block::set_size_and_allocated(heap.buf_mut(), epilogue, TAGS_SIZE, true);
        Ok(heap)
    }

    /// Allocate a block with at least `size` usable payload bytes.
    ///
    /// Returns the payload address. The payload's initial contents are
    /// unspecified (this heap happens to hand out zeroed bytes from
    /// fresh extensions, but recycled blocks carry stale data — do not
    /// rely on either).
    ///
    /// # Errors
    ///
    /// [`HeapError::ZeroSize`] for a zero-byte request;
    /// [`HeapError::Exhausted`] if the free list cannot satisfy the
    /// request and the source refuses to grow.
    pub fn allocate(&mut self, size: usize) -> Result<Addr, HeapError> {
        if size == 0 {
            return Err(HeapError::ZeroSize);
        }
        let need = required_block_size(size);
        if self.free.is_empty() {
            self.extend_heap(need)?;
        }
        loop {
            if let Some(off) = self.fit(need) {
                return Ok(Addr(block::block_to_payload(off)));
            }
            // Growth requests at least `need` bytes and folds them into
            // one free block, so the next pass is guaranteed to fit.
            self.extend_heap(need)?;
        }
    }

    /// Release a live block.
    ///
    /// `addr` must have been returned by [`allocate`](Self::allocate)
    /// or [`reallocate`](Self::reallocate) on this heap and not yet
    /// freed. That precondition is checked by `debug_assert!` only;
    /// violating it in a release build corrupts allocator bookkeeping
    /// (but cannot corrupt process memory — all accesses stay inside
    /// the managed range).
    pub fn free(&mut self, addr: Addr) {
        debug_assert!(self.is_live(addr), "free of non-live address {addr}");
        let off = block::payload_to_block(addr.offset());
        block::set_allocated(self.buf_mut(), off, false);
        self.coalesce(off);
    }

    /// Resize a block, preserving its payload contents.
    ///
    /// - `addr: None` behaves as [`allocate`](Self::allocate).
    /// - `size == 0` behaves as [`free`](Self::free) and returns
    ///   `Ok(None)`.
    /// - Otherwise returns the (possibly moved) payload address. The
    ///   first `min(old payload, new payload)` bytes are preserved;
    ///   bytes beyond the old payload length are unspecified.
    ///
    /// Resizing happens in place whenever the block itself or its
    /// physically adjacent free neighbours can absorb the request;
    /// only the fallback path (allocate + copy + free) changes the
    /// address when growing, and shrinking never does.
    ///
    /// # Errors
    ///
    /// [`HeapError::Exhausted`] if growth is needed and the source
    /// refuses; the original block is untouched in that case.
    pub fn reallocate(
        &mut self,
        addr: Option<Addr>,
        size: usize,
    ) -> Result<Option<Addr>, HeapError> {
        let Some(addr) = addr else {
            return self.allocate(size).map(Some);
        };
        if size == 0 {
            self.free(addr);
            return Ok(None);
        }
        debug_assert!(self.is_live(addr), "reallocate of non-live address {addr}");

        let off = block::payload_to_block(addr.offset());
        let need = required_block_size(size);
        let cur = block::size(self.buf(), off);

        if need <= cur {
            self.shrink_in_place(off, need, cur);
            return Ok(Some(addr));
        }
        self.grow(addr, off, need, cur, size).map(Some)
    }

    /// The usable bytes of a live block, shared.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `addr` is not live; panics in any
    /// build if it points outside the managed range.
    pub fn payload(&self, addr: Addr) -> &[u8] {
        debug_assert!(self.is_live(addr), "payload of non-live address {addr}");
        let off = block::payload_to_block(addr.offset());
        let len = block::payload_size(self.buf(), off);
        &self.buf()[addr.offset()..addr.offset() + len]
    }

    /// The usable bytes of a live block, mutable.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `addr` is not live; panics in any
    /// build if it points outside the managed range.
    pub fn payload_mut(&mut self, addr: Addr) -> &mut [u8] {
        debug_assert!(self.is_live(addr), "payload of non-live address {addr}");
        let off = block::payload_to_block(addr.offset());
        let len = block::payload_size(self.buf(), off);
        let start = addr.offset();
        &mut self.source.as_mut_slice()[start..start + len]
    }

    /// Usable payload length of a live block.
    ///
    /// At least as large as the size originally requested, possibly
    /// larger (exact-ish fits keep their whole span).
    pub fn payload_len(&self, addr: Addr) -> usize {
        debug_assert!(self.is_live(addr), "payload_len of non-live address {addr}");
        block::payload_size(self.buf(), block::payload_to_block(addr.offset()))
    }

    /// Best-effort liveness test for an address.
    ///
    /// True when `addr` plausibly names the payload of a currently
    /// allocated block: in range, aligned, flagged allocated with
    /// agreeing tags. A crafted interior offset can still fool it;
    /// this backs debug assertions, not a safety boundary.
    pub fn is_live(&self, addr: Addr) -> bool {
        let payload = addr.offset();
        if payload < TAGS_SIZE + WORD_SIZE || payload % block::ALIGNMENT != 0 {
            return false;
        }
        let off = block::payload_to_block(payload);
        if off >= self.epilogue {
            return false;
        }
        let size = block::size(self.buf(), off);
        if size < MIN_BLOCK_SIZE || size % block::ALIGNMENT != 0 || off + size > self.epilogue {
            return false;
        }
        block::allocated(self.buf(), off)
            && block::footer_allocated(self.buf(), off)
            && block::footer_size(self.buf(), off) == size
    }

    /// Total bytes of the managed range, sentinels included.
    ///
    /// Never decreases across any sequence of operations.
    pub fn heap_bytes(&self) -> usize {
        self.source.len()
    }

    /// Number of blocks currently on the free list.
    pub fn free_block_count(&self) -> usize {
        self.free.len()
    }

    /// Total bytes held in free blocks, tags included.
    pub fn free_bytes(&self) -> usize {
        self.free
            .iter()
            .map(|off| block::size(self.buf(), off))
            .sum()
    }

    /// Number of growth calls made against the source since
    /// construction (the bootstrap extension is not counted).
    pub fn extension_count(&self) -> u64 {
        self.extensions
    }

    /// The heap's configuration.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    pub(crate) fn buf(&self) -> &[u8] {
        self.source.as_slice()
    }

    fn buf_mut(&mut self) -> &mut [u8] {
        self.source.as_mut_slice()
    }

    /// First-fit scan: one circular pass from the anchor.
    ///
    /// On a hit the candidate is removed from the list, marked
    /// allocated, and split when the leftover can stand as a block of
    /// its own. Returns the fitted block's offset, or `None` after a
    /// full wrap.
    fn fit(&mut self, need: usize) -> Option<usize> {
        let start = self.free.first()?;
        let mut cur = start;
        loop {
            let have = block::size(self.buf(), cur);
            if have >= need {
                self.free.remove(cur);
                let leftover = have - need;
                if leftover >= MIN_BLOCK_SIZE {
                    block::set_size_and_allocated(self.buf_mut(), cur, need, true);
                    let rem = cur + need;
                    block::set_size_and_allocated(self.buf_mut(), rem, leftover, false);
                    // The remainder's physical neighbours are the block
                    // just carved out and the original successor, both
                    // allocated, so a plain insert keeps the invariant.
                    self.free.insert(rem);
                } else {
                    block::set_allocated(self.buf_mut(), cur, true);
                }
                return Some(cur);
            }
            cur = self.free.flink(cur);
            if cur == start {
                return None;
            }
        }
    }

    /// Grow the managed range and fold the new bytes into the free
    /// pool.
    ///
    /// The old epilogue is repurposed as the new free block's header
    /// and a fresh epilogue is written at the new top. The new block
    /// is coalesced downward in case the topmost block was already
    /// free.
    fn extend_heap(&mut self, need: usize) -> Result<(), HeapError> {
        let amount = self.config.extension_bytes.max(need);
        self.source.extend(amount)?;
        let old_epilogue = self.epilogue;
        block::set_size_and_allocated(self.buf_mut(), old_epilogue, amount, false);
        self.epilogue = old_epilogue + amount;
        let epilogue = self.epilogue;
        block::set_size_and_allocated(self.buf_mut(), epilogue, TAGS_SIZE, true);
        self.extensions += 1;
        self.coalesce(old_epilogue);
        Ok(())
    }

    /// Merge the just-freed block at `off` with free physical
    /// neighbours and insert the survivor into the free list.
    ///
    /// Neighbours are found by tag navigation, never through the free
    /// list: physical adjacency and list adjacency are unrelated. The
    /// sentinels are permanently allocated, so no bounds checks are
    /// needed at the extremes.
    fn coalesce(&mut self, off: usize) {
        let mut start = off;
        let mut merged = block::size(self.buf(), off);
        if !block::prev_allocated(self.buf(), off) {
            let p = block::prev(self.buf(), off);
            merged += block::size(self.buf(), p);
            self.free.remove(p);
            start = p;
        }
        if !block::next_allocated(self.buf(), off) {
            let n = block::next(self.buf(), off);
            merged += block::size(self.buf(), n);
            self.free.remove(n);
        }
        block::set_size_and_allocated(self.buf_mut(), start, merged, false);
        self.free.insert(start);
    }

    /// Shrink a live block to `need` bytes, returning the tail to the
    /// free pool when it can stand as a block of its own.
    fn shrink_in_place(&mut self, off: usize, need: usize, cur: usize) {
        let leftover = cur - need;
        if leftover < MIN_BLOCK_SIZE {
            // Keeping the sliver inside the block wastes less than a
            // free block too small to ever satisfy a request.
            return;
        }
        block::set_size_and_allocated(self.buf_mut(), off, need, true);
        let rem = off + need;
        block::set_size_and_allocated(self.buf_mut(), rem, leftover, false);
        self.coalesce(rem);
    }

    /// Grow a live block to `need` total bytes.
    ///
    /// Prefers absorbing the free successor (no payload move), then
    /// the free predecessor (overlap-safe move down), and falls back
    /// to allocate + copy + free only when the neighbourhood cannot
    /// hold the request.
    fn grow(
        &mut self,
        addr: Addr,
        off: usize,
        need: usize,
        cur: usize,
        requested: usize,
    ) -> Result<Addr, HeapError> {
        let prev_free = !block::prev_allocated(self.buf(), off);
        let next_free = !block::next_allocated(self.buf(), off);
        let prev_size = if prev_free {
            block::prev_size(self.buf(), off)
        } else {
            0
        };
        let next_size = if next_free {
            block::next_size(self.buf(), off)
        } else {
            0
        };

        if cur + prev_size + next_size < need {
            return self.relocate(addr, off, cur, requested);
        }

        if cur + next_size >= need {
            self.absorb_successor(off, need, cur, next_size);
            return Ok(addr);
        }
        Ok(self.absorb_predecessor(off, need, cur, next_free, next_size))
    }

    /// Fallback growth: allocate a new block, copy the payload, free
    /// the old block. The only growth path that changes the address.
    fn relocate(
        &mut self,
        addr: Addr,
        off: usize,
        cur: usize,
        requested: usize,
    ) -> Result<Addr, HeapError> {
        // Allocate first so that a failure leaves the old block
        // untouched.
        let new_addr = self.allocate(requested)?;
        let old_payload = cur - TAGS_SIZE;
        let copy_len = old_payload.min(self.payload_len(new_addr));
        let src = block::block_to_payload(off);
        self.buf_mut()
            .copy_within(src..src + copy_len, new_addr.offset());
        self.free(addr);
        Ok(new_addr)
    }

    /// Absorb the free successor into the block at `off`. The payload
    /// does not move.
    fn absorb_successor(&mut self, off: usize, need: usize, cur: usize, next_size: usize) {
        let n = block::next(self.buf(), off);
        self.free.remove(n);
        let merged = cur + next_size;
        let leftover = merged - need;
        if leftover >= MIN_BLOCK_SIZE {
            block::set_size_and_allocated(self.buf_mut(), off, need, true);
            let rem = off + need;
            block::set_size_and_allocated(self.buf_mut(), rem, leftover, false);
            self.coalesce(rem);
        } else {
            block::set_size_and_allocated(self.buf_mut(), off, merged, true);
        }
    }

    /// Absorb the free predecessor (and the successor too when the
    /// predecessor alone is not enough), moving the payload down to
    /// the merged block's start.
    ///
    /// Returns the new payload address.
    fn absorb_predecessor(
        &mut self,
        off: usize,
        need: usize,
        cur: usize,
        next_free: bool,
        next_size: usize,
    ) -> Addr {
        let new_off = block::prev(self.buf(), off);
        self.free.remove(new_off);
        let mut merged = cur + block::size(self.buf(), new_off);
        if next_free && merged < need {
            let n = block::next(self.buf(), off);
            self.free.remove(n);
            merged += next_size;
        }

        // Move the payload before rewriting any tags. The destination
        // starts below the source, so the overlap-safe copy_within is
        // required; the new tags land outside the copied range.
        let old_payload = cur - TAGS_SIZE;
        let src = block::block_to_payload(off);
        let dst = block::block_to_payload(new_off);
        self.buf_mut().copy_within(src..src + old_payload, dst);

        let leftover = merged - need;
        if leftover >= MIN_BLOCK_SIZE {
            block::set_size_and_allocated(self.buf_mut(), new_off, need, true);
            let rem = new_off + need;
            block::set_size_and_allocated(self.buf_mut(), rem, leftover, false);
            // The remainder may sit flush against a still-free
            // successor we chose not to absorb; coalescing re-merges
            // them into one block.
            self.coalesce(rem);
        } else {
            block::set_size_and_allocated(self.buf_mut(), new_off, merged, true);
        }
        Addr(dst)
    }
}
