//! Loam: an explicit-heap dynamic memory allocator.
//!
//! This is the top-level facade crate re-exporting the public API of
//! the Loam sub-crates. For most users, adding `loam` as a single
//! dependency is sufficient.
//!
//! A [`Heap`] manages a single growable linear byte range and
//! satisfies allocate / free / reallocate requests against it using
//! boundary-tag blocks, an explicit circular free list, first-fit
//! search with splitting, and eager coalescing. Addresses are byte
//! offsets into the managed range; payload access is bounds-checked,
//! so the whole workspace is `unsafe`-free.
//!
//! # Quick start
//!
//! ```rust
//! use loam::prelude::*;
//!
//! let mut heap = Heap::new(HeapConfig::default()).unwrap();
//!
//! let a = heap.allocate(24).unwrap();
//! heap.payload_mut(a)[..4].copy_from_slice(b"loam");
//!
//! // Grow in place where physically possible; contents survive.
//! let a = heap.reallocate(Some(a), 64).unwrap().unwrap();
//! assert_eq!(&heap.payload(a)[..4], b"loam");
//!
//! heap.free(a);
//! ```
//!
//! # Crates
//!
//! | Module source | Contents |
//! |---------------|----------|
//! | `loam-core`   | [`Addr`], [`MemorySource`], source errors |
//! | `loam-heap`   | [`Heap`], [`HeapConfig`], errors, invariant checker |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub use loam_core::{Addr, MemorySource, SourceError};
pub use loam_heap::{CheckError, GrowableBuffer, Heap, HeapConfig, HeapError};

/// The types most callers need.
pub mod prelude {
    pub use loam_core::Addr;
    pub use loam_heap::{Heap, HeapConfig, HeapError};
}
