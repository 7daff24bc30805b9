//! Core types for the linarena allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the small vocabulary shared by the allocator and its callers: the
//! stable [`LinIndex`] handle, the half-open [`IndexRange`], and the
//! fatal-assertion facility every precondition check routes through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod fatal;
pub mod id;
pub mod range;

pub use id::LinIndex;
pub use range::IndexRange;
