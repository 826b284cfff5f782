//! Test utilities and mock memory sources for Loam development.
//!
//! Provides [`CappedSource`], a [`MemorySource`] with a hard byte
//! limit for exercising exhaustion paths, plus byte-pattern helpers
//! for payload-integrity assertions.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use loam_core::{MemorySource, SourceError};

/// A growable byte range with a hard capacity.
///
/// Behaves exactly like the default unbounded source until the limit
/// is reached; an extension that would cross the limit fails with
/// [`SourceError::Exhausted`] and leaves the range unchanged.
pub struct CappedSource {
    data: Vec<u8>,
    limit: usize,
}

impl CappedSource {
    /// Create a source that will never exceed `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// The hard capacity in bytes.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl MemorySource for CappedSource {
    fn extend(&mut self, len: usize) -> Result<usize, SourceError> {
        let base = self.data.len();
        if base + len > self.limit {
            return Err(SourceError::Exhausted {
                requested: len,
                limit: self.limit,
            });
        }
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

/// Fill a payload slice with a deterministic byte pattern.
pub fn fill_pattern(payload: &mut [u8], seed: u8) {
    for (i, byte) in payload.iter_mut().enumerate() {
        *byte = seed.wrapping_add(i as u8).wrapping_mul(31);
    }
}

/// Verify the first `len` bytes of a payload against [`fill_pattern`].
///
/// # Panics
///
/// Panics with the differing index if the pattern does not match.
pub fn assert_pattern(payload: &[u8], seed: u8, len: usize) {
    for i in 0..len {
        let expected = seed.wrapping_add(i as u8).wrapping_mul(31);
        assert_eq!(
            payload[i], expected,
            "pattern mismatch at byte {i} (seed {seed})"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_source_enforces_limit() {
        let mut src = CappedSource::new(64);
        assert_eq!(src.extend(32).unwrap(), 0);
        assert_eq!(src.extend(32).unwrap(), 32);
        let err = src.extend(1).unwrap_err();
        assert_eq!(
            err,
            SourceError::Exhausted {
                requested: 1,
                limit: 64
            }
        );
        // Failed extension changed nothing.
        assert_eq!(src.len(), 64);
    }

    #[test]
    fn pattern_round_trips() {
        let mut bytes = vec![0u8; 100];
        fill_pattern(&mut bytes, 42);
        assert_pattern(&bytes, 42, 100);
    }
}
