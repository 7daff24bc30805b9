//! Arena configuration parameters.

use linarena_core::fatal_assert;

/// Alignment, in bytes, of every block buffer.
///
/// Elements are laid out back to back, so element `i` of a block is
/// aligned to `gcd(ELEMENT_ALIGN, element_size)`.
pub const ELEMENT_ALIGN: usize = 16;

/// Configuration for a linear arena.
///
/// Fixed for the lifetime of an initialised arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of one element in bytes. Must be non-zero.
    pub element_size: usize,

    /// Capacity of block 0 in elements. Must be non-zero.
    ///
    /// Default: 64.
    pub initial_capacity: usize,

    /// Whether memory reclaimed by `clear` is zero-filled before reuse.
    ///
    /// Block 0 is zeroed eagerly during `clear`; later blocks are zeroed
    /// lazily when the arena grows back into them.
    pub zero_on_clear: bool,
}

impl ArenaConfig {
    /// Default capacity of block 0, in elements.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

    /// Create a config for elements of `element_size` bytes.
    ///
    /// Uses default values for all other parameters.
    pub fn new(element_size: usize) -> Self {
        Self {
            element_size,
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            zero_on_clear: false,
        }
    }

    /// Set the capacity of block 0.
    #[must_use]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Set whether `clear` zero-fills reclaimed memory.
    #[must_use]
    pub fn with_zero_on_clear(mut self, zero_on_clear: bool) -> Self {
        self.zero_on_clear = zero_on_clear;
        self
    }

    /// Size of block 0 in bytes, or `None` on overflow.
    pub fn block_bytes(&self) -> Option<usize> {
        self.initial_capacity.checked_mul(self.element_size)
    }

    #[track_caller]
    pub(crate) fn validate(&self) {
        fatal_assert!(
            self.element_size > 0,
            "element size must be positive, got {}",
            self.element_size
        );
        fatal_assert!(
            self.initial_capacity > 0,
            "initial capacity must be positive, got {}",
            self.initial_capacity
        );
    }
}
