//! Benchmark workloads for the linarena allocator.
//!
//! Provides deterministic allocation patterns shared by the benches:
//!
//! - [`FrameProfile::reference`]: a few thousand small runs per frame
//! - [`FrameProfile::stress`]: ten times the runs with longer tails
//! - [`run_lengths`]: seeded run-length sequence for one frame

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use linarena::{ArenaConfig, ArenaError, LinAlloc, LinIndex};

/// Shape of one frame's allocations.
#[derive(Clone, Copy, Debug)]
pub struct FrameProfile {
    /// Element size in bytes.
    pub element_size: usize,
    /// Block 0 capacity in elements.
    pub initial_capacity: usize,
    /// Allocations per frame.
    pub runs: usize,
    /// Longest run, in elements.
    pub max_run: usize,
}

impl FrameProfile {
    /// 4096 runs of 1..=8 elements of 16 bytes.
    pub fn reference() -> Self {
        Self {
            element_size: 16,
            initial_capacity: 256,
            runs: 4096,
            max_run: 8,
        }
    }

    /// 40960 runs of 1..=32 elements of 16 bytes, starting from a tiny block 0.
    pub fn stress() -> Self {
        Self {
            element_size: 16,
            initial_capacity: 16,
            runs: 40_960,
            max_run: 32,
        }
    }

    /// Arena configured for this profile.
    pub fn config(&self) -> ArenaConfig {
        ArenaConfig::new(self.element_size).with_initial_capacity(self.initial_capacity)
    }

    /// Fresh arena on the global allocator.
    pub fn arena(&self) -> Result<LinAlloc, ArenaError> {
        LinAlloc::new(self.config())
    }
}

/// Generate `runs` run lengths in `1..=max_run`.
///
/// Uses a splitmix-style hash of the seed so every bench run allocates
/// the same sequence.
pub fn run_lengths(runs: usize, max_run: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..runs)
        .map(|_| {
            state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^= z >> 31;
            (z % max_run as u64) as usize + 1
        })
        .collect()
}

/// Allocate one frame's runs, returning the first index of each.
pub fn fill_frame(arena: &mut LinAlloc, lengths: &[usize]) -> Result<Vec<LinIndex>, ArenaError> {
    lengths.iter().map(|&len| arena.alloc(len)).collect()
}
