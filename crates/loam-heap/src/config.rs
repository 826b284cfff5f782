//! Heap configuration parameters.

use crate::block::MIN_BLOCK_SIZE;

/// Configuration for a [`Heap`](crate::Heap).
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug)]
pub struct HeapConfig {
    /// Minimum number of bytes requested from the memory source per
    /// growth call.
    ///
    /// Growth is batched: a small allocation that misses the free list
    /// still extends the range by at least this much, amortising the
    /// source's per-call overhead. A request larger than this extends
    /// by exactly the requested amount instead.
    ///
    /// Default: 512 (16 × the minimum block size). Must be a nonzero
    /// multiple of the minimum block size.
    pub extension_bytes: usize,
}

impl HeapConfig {
    /// Default growth batch: 16 minimum-sized blocks.
    pub const DEFAULT_EXTENSION_BYTES: usize = 16 * MIN_BLOCK_SIZE;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            extension_bytes: Self::DEFAULT_EXTENSION_BYTES,
        }
    }

    /// Override the growth batch size.
    pub fn with_extension_bytes(mut self, extension_bytes: usize) -> Self {
        self.extension_bytes = extension_bytes;
        self
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new()
    }
}
