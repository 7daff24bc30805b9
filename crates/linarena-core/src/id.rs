//! Strongly-typed allocation handles.

use std::fmt;

use crate::fatal::fatal;

/// Global linear index of an element inside a linear arena.
///
/// Indices are assigned in increasing order as elements are allocated
/// and stay valid across any growth of the backing storage. They are
/// only invalidated by a `clear` or `destroy` of the owning arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinIndex(pub u32);

impl LinIndex {
    /// The index as a `usize`, for slice arithmetic.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// The index `n` elements after this one.
    ///
    /// Useful for addressing the tail of a contiguous run returned by a
    /// multi-element allocation.
    ///
    /// # Panics
    ///
    /// Panics if the result does not fit in a `u32`.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn offset(self, n: u32) -> Self {
        match self.0.checked_add(n) {
            Some(i) => Self(i),
            None => fatal(format_args!("index {} offset by {n} overflows u32", self.0)),
        }
    }
}

impl fmt::Display for LinIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LinIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<LinIndex> for u32 {
    fn from(v: LinIndex) -> Self {
        v.0
    }
}
