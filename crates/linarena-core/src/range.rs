//! Half-open ranges of global indices.

use std::fmt;
use std::ops::Range;

use crate::fatal::fatal;
use crate::fatal_assert;
use crate::id::LinIndex;

/// A non-empty half-open range `[start, end)` of global indices.
///
/// The constructor enforces `start < end`; an empty or inverted range
/// is a fatal violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexRange {
    start: u32,
    end: u32,
}

impl IndexRange {
    /// Create the range `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start >= end`.
    #[track_caller]
    pub fn new(start: u32, end: u32) -> Self {
        fatal_assert!(start < end, "invalid index range [{start}, {end})");
        Self { start, end }
    }

    /// The range covering `len` indices beginning at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero or the end does not fit in a `u32`.
    #[track_caller]
    pub fn from_run(start: LinIndex, len: u32) -> Self {
        match start.0.checked_add(len) {
            Some(end) => Self::new(start.0, end),
            None => fatal(format_args!(
                "run of {len} indices at {start} overflows u32"
            )),
        }
    }

    /// First index in the range.
    pub fn start(&self) -> LinIndex {
        LinIndex(self.start)
    }

    /// One past the last index in the range.
    pub fn end(&self) -> LinIndex {
        LinIndex(self.end)
    }

    /// Number of indices covered. Always at least 1.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `index` falls inside the range.
    pub fn contains(&self, index: LinIndex) -> bool {
        self.start <= index.0 && index.0 < self.end
    }
}

impl From<Range<u32>> for IndexRange {
    #[track_caller]
    fn from(r: Range<u32>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
