//! The default in-process address-space provider.

use loam_core::{MemorySource, SourceError};

/// An unbounded growable byte range backed by a `Vec<u8>`.
///
/// This is the default [`MemorySource`] for a [`Heap`](crate::Heap):
/// extension simply appends zeroed bytes to the vector. It never
/// reports exhaustion — a capped source for exhaustion testing lives
/// in `loam-test-utils`.
#[derive(Debug, Default)]
pub struct GrowableBuffer {
    data: Vec<u8>,
}

impl GrowableBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }
}

impl MemorySource for GrowableBuffer {
    fn extend(&mut self, len: usize) -> Result<usize, SourceError> {
        let base = self.data.len();
        self.data.resize(base + len, 0);
        Ok(base)
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_returns_old_top() {
        let mut buf = GrowableBuffer::new();
        assert_eq!(buf.extend(32).unwrap(), 0);
        assert_eq!(buf.extend(16).unwrap(), 32);
        assert_eq!(buf.len(), 48);
    }

    #[test]
    fn extension_is_zeroed() {
        let mut buf = GrowableBuffer::new();
        buf.extend(8).unwrap();
        buf.as_mut_slice()[3] = 0xff;
        buf.extend(8).unwrap();
        assert_eq!(&buf.as_slice()[8..], &[0u8; 8]);
        // Existing bytes are untouched by growth.
        assert_eq!(buf.as_slice()[3], 0xff);
    }

    #[test]
    fn starts_empty() {
        let buf = GrowableBuffer::new();
        assert!(buf.is_empty());
    }
}
