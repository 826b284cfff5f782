//! The caller-visible payload address type.

use std::fmt;

/// A payload address handed out by the heap.
///
/// `Addr` is a byte offset into the managed range, pointing at the first
/// usable payload byte of a live block. It is *not* a machine pointer:
/// all dereferencing goes through the heap's bounds-checked payload
/// accessors. An `Addr` is valid from the `allocate`/`reallocate` call
/// that produced it until the `free`/`reallocate` call that retires it;
/// using it beyond that window is a contract violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct Addr(pub usize);

impl Addr {
    /// The raw byte offset into the managed range.
    pub fn offset(self) -> usize {
        self.0
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl From<usize> for Addr {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_hex() {
        assert_eq!(Addr(0x28).to_string(), "0x28");
    }

    #[test]
    fn orders_by_offset() {
        assert!(Addr(16) < Addr(48));
        assert_eq!(Addr(32).offset(), 32);
    }
}
