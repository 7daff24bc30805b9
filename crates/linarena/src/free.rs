//! Registries of freed element runs.
//!
//! A freed run keeps its storage inside its block but is logically
//! vacant (and zero-filled by the arena). The next allocation that fits
//! takes the first registered run whose length is large enough, whole:
//! runs are never split, so a reused run longer than the request leaves
//! its tail unreachable until the next `clear`.
//!
//! The arena talks to its registry only through [`FreeRegistry`], so the
//! storage and search strategy can be swapped without touching the
//! allocator. Two strategies ship:
//!
//! - [`FirstFitRegistry`]: an insertion-ordered `GrowVec` scanned
//!   linearly. The default.
//! - [`IndexedRegistry`]: an insertion-ordered `IndexMap` keyed by start
//!   index, with the same policy, that also catches a second free of the
//!   same start index.

use indexmap::IndexMap;
use linarena_core::{fatal_assert, LinIndex};
use tracing::trace;

use crate::growvec::GrowVec;

/// A contiguous run of freed global indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeRegion {
    /// First index of the run.
    pub start: LinIndex,
    /// Number of elements in the run.
    pub len: u32,
}

/// Storage and search strategy for freed runs.
///
/// Implementations must preserve first-fit in insertion order and must
/// hand regions back whole.
pub trait FreeRegistry: Default {
    /// Iterator over registered regions in insertion order.
    type Regions<'a>: Iterator<Item = FreeRegion>
    where
        Self: 'a;

    /// Remove and return the first registered region of at least `len`
    /// elements, if any.
    fn try_reuse(&mut self, len: usize) -> Option<FreeRegion>;

    /// Record a freed region at the tail.
    fn register(&mut self, region: FreeRegion);

    /// Forget every region.
    fn clear(&mut self);

    /// Number of registered regions.
    fn len(&self) -> usize;

    /// Whether no regions are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered regions in insertion order.
    fn regions(&self) -> Self::Regions<'_>;
}

/// Linear first-fit over an insertion-ordered vector.
#[derive(Debug, Default)]
pub struct FirstFitRegistry {
    regions: GrowVec<FreeRegion>,
}

impl FreeRegistry for FirstFitRegistry {
    type Regions<'a> = std::iter::Copied<std::slice::Iter<'a, FreeRegion>>;

    fn try_reuse(&mut self, len: usize) -> Option<FreeRegion> {
        // TODO: an ordered index over lengths would make this sublinear and
        // allow overlap checks on register.
        let slot = self.regions.iter().position(|r| r.len as usize >= len)?;
        let region = self.regions.remove(slot);
        trace!(start = %region.start, len = region.len, requested = len, "reusing freed region");
        Some(region)
    }

    fn register(&mut self, region: FreeRegion) {
        trace!(start = %region.start, len = region.len, "registered freed region");
        self.regions.push(region);
    }

    fn clear(&mut self) {
        self.regions.clear();
    }

    fn len(&self) -> usize {
        self.regions.len()
    }

    fn regions(&self) -> Self::Regions<'_> {
        self.regions.as_slice().iter().copied()
    }
}

type IndexedIter<'a> = indexmap::map::Iter<'a, LinIndex, u32>;

/// First-fit over an insertion-ordered map keyed by start index.
///
/// Registering a start index that is already registered is a fatal
/// violation. Overlapping regions with different starts are not detected.
#[derive(Debug, Default)]
pub struct IndexedRegistry {
    regions: IndexMap<LinIndex, u32>,
}

impl FreeRegistry for IndexedRegistry {
    type Regions<'a> = std::iter::Map<IndexedIter<'a>, fn((&LinIndex, &u32)) -> FreeRegion>;

    fn try_reuse(&mut self, len: usize) -> Option<FreeRegion> {
        let slot = self.regions.values().position(|&l| l as usize >= len)?;
        let (start, region_len) = self.regions.shift_remove_index(slot)?;
        trace!(%start, len = region_len, requested = len, "reusing freed region");
        Some(FreeRegion {
            start,
            len: region_len,
        })
    }

    #[track_caller]
    fn register(&mut self, region: FreeRegion) {
        fatal_assert!(
            !self.regions.contains_key(&region.start),
            "region starting at index {} freed twice",
            region.start
        );
        trace!(start = %region.start, len = region.len, "registered freed region");
        self.regions.insert(region.start, region.len);
    }

    fn clear(&mut self) {
        self.regions.clear();
    }

    fn len(&self) -> usize {
        self.regions.len()
    }

    fn regions(&self) -> Self::Regions<'_> {
        fn to_region((&start, &len): (&LinIndex, &u32)) -> FreeRegion {
            FreeRegion { start, len }
        }
        let to_region: fn((&LinIndex, &u32)) -> FreeRegion = to_region;
        self.regions.iter().map(to_region)
    }
}
