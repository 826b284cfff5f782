//! Error types for address-space providers.

use std::error::Error;
use std::fmt;

/// Errors from a [`MemorySource`](crate::MemorySource).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceError {
    /// The source refused to extend the managed range: address space
    /// exhausted. The range is unchanged; the caller may free memory
    /// and retry.
    Exhausted {
        /// Number of bytes the extension asked for.
        requested: usize,
        /// Hard capacity of the source in bytes.
        limit: usize,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { requested, limit } => {
                write!(
                    f,
                    "memory source exhausted: requested {requested} more bytes, limit {limit} bytes"
                )
            }
        }
    }
}

impl Error for SourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_quantities() {
        let e = SourceError::Exhausted {
            requested: 512,
            limit: 4096,
        };
        let msg = e.to_string();
        assert!(msg.contains("512"));
        assert!(msg.contains("4096"));
    }
}
