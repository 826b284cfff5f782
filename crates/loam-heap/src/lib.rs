//! Boundary-tag heap allocation for Loam.
//!
//! Provides an explicit-heap dynamic allocator: a [`Heap`] manages a
//! single growable byte range obtained from a
//! [`MemorySource`](loam_core::MemorySource) and satisfies allocate /
//! free / reallocate requests against it. Block identity is a byte
//! offset into the range; every access is a bounds-checked slice
//! operation, so this crate carries no `unsafe`.
//!
//! # Architecture
//!
//! ```text
//! Heap (orchestrator)
//! ├── Box<dyn MemorySource> (owned growable byte range; GrowableBuffer default)
//! ├── block (boundary tags: size|allocated in header + footer words)
//! ├── FreeList (circular doubly linked, IndexMap-backed, offset-keyed)
//! └── HeapConfig (growth batching)
//! ```
//!
//! # Block layout
//!
//! Every block spans an 8-byte-aligned range `[offset, offset + size)`:
//! a header word, `size - 16` payload bytes, and a footer word that
//! duplicates the header. The low bit of both words holds the
//! allocated flag. The range is bounded by two permanently allocated
//! zero-payload sentinels (prologue at offset 0, epilogue at the top),
//! so neighbour navigation never needs an existence check.
//!
//! # Invariants
//!
//! - Header and footer of every block agree at the end of every public
//!   operation.
//! - No two physically adjacent blocks are both free (coalescing is
//!   eager).
//! - A block is on the free list if and only if its allocated flag is
//!   clear.
//!
//! [`Heap::check`] verifies all of these and is used heavily by the
//! test suite.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub(crate) mod block;
pub mod check;
pub mod config;
pub mod error;
pub(crate) mod freelist;
pub mod heap;
pub mod region;

pub use check::CheckError;
pub use config::HeapConfig;
pub use error::HeapError;
pub use heap::Heap;
pub use region::GrowableBuffer;
