//! Boundary-tag block representation.
//!
//! A block is a contiguous span of the managed range identified by its
//! byte offset. Its first and last words are tags: the block's total
//! size with the low bit holding the allocated flag. Size is always a
//! multiple of [`ALIGNMENT`], so the bit is free for overloading.
//!
//! The duplicate footer is what makes backward navigation possible:
//! the word immediately below any block is the previous block's
//! footer, readable without knowing anything else about the previous
//! block.
//!
//! All functions here operate on the raw byte range and a block
//! offset. Offsets must name a real block; passing anything else is a
//! contract violation caught by `debug_assert!` where detectable and
//! by slice bounds checks otherwise.

/// Alignment unit for block sizes and payload addresses, in bytes.
pub const ALIGNMENT: usize = 8;

/// Size of one tag word in bytes.
pub const WORD_SIZE: usize = 8;

/// Combined size of a block's header and footer tags.
pub const TAGS_SIZE: usize = 2 * WORD_SIZE;

/// Smallest legal block: header + footer + two payload words.
///
/// Two payload words is the historical floor for a free block (enough
/// to thread list links through the payload); Loam keeps its free list
/// out of band but retains the floor so that any block can be freed
/// and later carved without ever producing an unrepresentable sliver.
pub const MIN_BLOCK_SIZE: usize = 4 * WORD_SIZE;

/// Round `size` up to the nearest multiple of [`ALIGNMENT`].
#[inline]
pub fn align(size: usize) -> usize {
    (size + (ALIGNMENT - 1)) & !(ALIGNMENT - 1)
}

/// Read one tag word at a byte offset.
#[inline]
fn load_word(buf: &[u8], off: usize) -> u64 {
    let mut w = [0u8; WORD_SIZE];
    w.copy_from_slice(&buf[off..off + WORD_SIZE]);
    u64::from_le_bytes(w)
}

/// Write one tag word at a byte offset.
#[inline]
fn store_word(buf: &mut [u8], off: usize, word: u64) {
    buf[off..off + WORD_SIZE].copy_from_slice(&word.to_le_bytes());
}

/// Total size of the block at `off`, from its header.
#[inline]
pub fn size(buf: &[u8], off: usize) -> usize {
    (load_word(buf, off) & !1) as usize
}

/// Allocated flag of the block at `off`, from its header.
#[inline]
pub fn allocated(buf: &[u8], off: usize) -> bool {
    load_word(buf, off) & 1 == 1
}

/// Byte offset of the footer of the block at `off`.
#[inline]
fn footer(buf: &[u8], off: usize) -> usize {
    off + size(buf, off) - WORD_SIZE
}

/// Total size recorded in the footer of the block at `off`.
#[inline]
pub fn footer_size(buf: &[u8], off: usize) -> usize {
    (load_word(buf, footer(buf, off)) & !1) as usize
}

/// Allocated flag recorded in the footer of the block at `off`.
#[inline]
pub fn footer_allocated(buf: &[u8], off: usize) -> bool {
    load_word(buf, footer(buf, off)) & 1 == 1
}

/// Set the allocated flag of the block at `off` in both tags.
#[inline]
pub fn set_allocated(buf: &mut [u8], off: usize, alloc: bool) {
    let end = footer(buf, off);
    for tag in [off, end] {
        let word = load_word(buf, tag);
        let word = if alloc { word | 1 } else { word & !1 };
        store_word(buf, tag, word);
    }
}

/// Set both the size and the allocated flag of the block at `off`.
///
/// The incoming header word may be stale garbage (a freshly grown
/// extent, or the interior of a block being split), so this never
/// reads the old tags.
#[inline]
pub fn set_size_and_allocated(buf: &mut [u8], off: usize, new_size: usize, alloc: bool) {
    debug_assert_eq!(new_size % ALIGNMENT, 0, "block size must be aligned");
    debug_assert!(new_size >= TAGS_SIZE, "block must hold both tags");
    let word = new_size as u64 | u64::from(alloc);
    store_word(buf, off, word);
    store_word(buf, off + new_size - WORD_SIZE, word);
}

/// Offset of the physically next block.
#[inline]
pub fn next(buf: &[u8], off: usize) -> usize {
    off + size(buf, off)
}

/// Whether the physically next block is allocated.
#[inline]
pub fn next_allocated(buf: &[u8], off: usize) -> bool {
    allocated(buf, next(buf, off))
}

/// Size of the physically next block.
#[inline]
pub fn next_size(buf: &[u8], off: usize) -> usize {
    size(buf, next(buf, off))
}

/// Size of the physically previous block, read from its footer.
#[inline]
pub fn prev_size(buf: &[u8], off: usize) -> usize {
    (load_word(buf, off - WORD_SIZE) & !1) as usize
}

/// Whether the physically previous block is allocated.
#[inline]
pub fn prev_allocated(buf: &[u8], off: usize) -> bool {
    load_word(buf, off - WORD_SIZE) & 1 == 1
}

/// Offset of the physically previous block.
#[inline]
pub fn prev(buf: &[u8], off: usize) -> usize {
    off - prev_size(buf, off)
}

/// Translate a payload address to its block offset.
#[inline]
pub fn payload_to_block(payload: usize) -> usize {
    debug_assert!(payload >= WORD_SIZE, "payload address below first header");
    payload - WORD_SIZE
}

/// Translate a block offset to its payload address.
#[inline]
pub fn block_to_payload(off: usize) -> usize {
    off + WORD_SIZE
}

/// Usable payload bytes of the block at `off`.
#[inline]
pub fn payload_size(buf: &[u8], off: usize) -> usize {
    size(buf, off) - TAGS_SIZE
}
