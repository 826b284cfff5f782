//! Core types and traits for the Loam heap allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared across the Loam workspace: the
//! caller-visible [`Addr`] type, the [`MemorySource`] address-space
//! provider trait, and source-level error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod addr;
pub mod error;
pub mod source;

pub use addr::Addr;
pub use error::SourceError;
pub use source::MemorySource;
