//! Fixed-element-size linear arena with stable integer addressing.
//!
//! Callers allocate runs of same-sized elements and get back a small
//! integer [`LinIndex`] rather than a pointer, so growth of the backing
//! storage never invalidates a handle. The arena supports bulk
//! clear-and-reuse (frame allocation), freeing of individual runs with
//! first-fit reuse, and iteration over index ranges that cross internal
//! block boundaries. This crate is the only one in the workspace that
//! contains `unsafe` code, confined to `backend.rs` and `raw.rs`.
//!
//! # Architecture
//!
//! ```text
//! LinAlloc (facade, Uninitialized/Ready/Destroyed)
//! ├── MemoryBackend (pluggable raw memory; SystemBackend by default)
//! ├── BlockTable → GrowVec<Block> (one active block, sealed blocks before it)
//! │   ├── Block → RawBuffer (zero-initialised backend buffer)
//! │   └── resolve: index → (block, offset) by binary search over bounds
//! ├── FreeRegistry (FirstFitRegistry by default, IndexedRegistry)
//! └── RangeIter (cursor over [start, end) across blocks)
//! ```
//!
//! # Errors
//!
//! Backend refusal and size overflow come back as [`ArenaError`]. Misuse
//! (zero lengths, out-of-range indices, foreign or misaligned addresses,
//! use outside the `Ready` state) is a fatal violation and panics through
//! [`linarena_core::fatal`].
//!
//! The arena is single-threaded and not internally synchronised.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod backend;
mod block;
pub mod config;
pub mod error;
pub mod free;
mod growvec;
pub mod iter;
mod raw;
mod resolve;

// Public re-exports for the primary API surface.
pub use arena::{ArenaState, LinAlloc};
pub use backend::{AllocError, MemoryBackend, SystemBackend};
pub use block::BlockInfo;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use free::{FirstFitRegistry, FreeRegion, FreeRegistry, IndexedRegistry};
pub use iter::RangeIter;
pub use linarena_core::{IndexRange, LinIndex};
