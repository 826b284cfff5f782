//! Heap-level error types.

use std::error::Error;
use std::fmt;

use loam_core::SourceError;

/// Errors from heap operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapError {
    /// An allocation of zero bytes was requested. No block is produced
    /// for an empty payload.
    ZeroSize,
    /// The memory source refused a growth request. The heap is
    /// unchanged; freeing memory and retrying may succeed.
    Exhausted {
        /// Bytes the failed growth call asked for.
        requested: usize,
        /// Hard capacity of the source in bytes.
        limit: usize,
    },
    /// The heap configuration is invalid.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "zero-size allocation request"),
            Self::Exhausted { requested, limit } => {
                write!(
                    f,
                    "heap exhausted: growth of {requested} bytes refused (source limit {limit} bytes)"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid heap config: {reason}"),
        }
    }
}

impl Error for HeapError {}

impl From<SourceError> for HeapError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Exhausted { requested, limit } => Self::Exhausted { requested, limit },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_exhaustion_maps_to_heap_exhaustion() {
        let e: HeapError = SourceError::Exhausted {
            requested: 512,
            limit: 1024,
        }
        .into();
        assert_eq!(
            e,
            HeapError::Exhausted {
                requested: 512,
                limit: 1024
            }
        );
    }

    #[test]
    fn display_is_informative() {
        assert!(HeapError::ZeroSize.to_string().contains("zero-size"));
        let e = HeapError::InvalidConfig {
            reason: "extension_bytes must be nonzero".into(),
        };
        assert!(e.to_string().contains("extension_bytes"));
    }
}
