//! The address-space provider abstraction.

use crate::error::SourceError;

/// A monotonically growing linear address range.
///
/// This is the heap's only collaborator: a provider of raw bytes that
/// the allocator carves into blocks. Implementations own a single
/// contiguous byte range that only ever grows.
///
/// # Contract
///
/// - Each successful [`extend`](MemorySource::extend) appends exactly
///   `len` zeroed bytes at the top of the range and returns the offset
///   of the first new byte (the old length).
/// - Offsets handed out by previous calls are never invalidated: the
///   range never shrinks and existing bytes are never relocated or
///   rewritten by the source itself.
/// - A failed `extend` leaves the range completely unchanged.
pub trait MemorySource {
    /// Append `len` zeroed bytes to the range.
    ///
    /// Returns the offset at which the new bytes begin, or
    /// [`SourceError::Exhausted`] if the source cannot supply them.
    fn extend(&mut self, len: usize) -> Result<usize, SourceError>;

    /// Current length of the range in bytes.
    fn len(&self) -> usize;

    /// Whether the range is still empty (no successful `extend` yet).
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entire range as a shared byte slice.
    fn as_slice(&self) -> &[u8];

    /// The entire range as a mutable byte slice.
    ///
    /// Mutation through this slice is how the allocator writes block
    /// tags and payload data; the source itself never interprets the
    /// bytes it holds.
    fn as_mut_slice(&mut self) -> &mut [u8];
}
