//! Arena-specific error types.
//!
//! Only conditions a caller can reasonably react to are modelled here.
//! Misuse (bad lengths, out-of-range indices, foreign addresses) is a
//! fatal violation reported through `linarena_core::fatal`.

use std::error::Error;
use std::fmt;

use crate::backend::AllocError;

/// Errors that can occur while the arena acquires memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The memory backend refused an allocation or reallocation.
    AllocationFailed {
        /// Size of the refused request in bytes.
        bytes: usize,
    },
    /// The requested element count does not fit in a byte size the
    /// platform can lay out.
    CapacityOverflow {
        /// Number of elements requested.
        elements: usize,
        /// Size of one element in bytes.
        element_size: usize,
    },
    /// Allocating would push the global index past `u32::MAX`.
    IndexSpaceExhausted {
        /// Number of elements requested.
        requested: usize,
        /// Number of global indices already issued.
        allocated: usize,
    },
}

impl ArenaError {
    pub(crate) fn from_backend(_err: AllocError, bytes: usize) -> Self {
        Self::AllocationFailed { bytes }
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { bytes } => {
                write!(f, "memory backend failed to provide {bytes} bytes")
            }
            Self::CapacityOverflow {
                elements,
                element_size,
            } => {
                write!(
                    f,
                    "capacity overflow: {elements} elements of {element_size} bytes"
                )
            }
            Self::IndexSpaceExhausted {
                requested,
                allocated,
            } => {
                write!(
                    f,
                    "index space exhausted: requested {requested} elements with {allocated} already allocated"
                )
            }
        }
    }
}

impl Error for ArenaError {}
