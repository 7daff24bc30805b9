//! Element blocks and the growable block table.
//!
//! A [`Block`] is one contiguous backend buffer. The [`BlockTable`] keeps
//! an ordered run of blocks of which exactly one, the *active* block,
//! accepts new elements. Every block before it is *sealed*: its
//! `upper_bound` records the exclusive global index reached when it
//! stopped receiving writes, which is what index resolution searches.
//!
//! ```text
//! blocks:  [ b0 sealed ][ b1 sealed ][ b2 active ][ b3 spare ]
//! bounds:       4            14           -            -
//! indices:   0..4          4..14       14..total
//! ```
//!
//! Blocks past the active one are left over from before a `clear` and
//! are reused in order as the arena refills.

use linarena_core::fatal_assert;
use tracing::debug;

use crate::backend::MemoryBackend;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::growvec::GrowVec;
use crate::raw::RawBuffer;

/// One contiguous element buffer.
pub(crate) struct Block {
    pub(crate) buf: RawBuffer,
    /// Capacity in elements.
    pub(crate) capacity: usize,
    /// Elements written since the last clear.
    pub(crate) used: usize,
    /// Exclusive global index bound of this block and all before it.
    /// Only meaningful once sealed.
    pub(crate) upper_bound: usize,
}

impl Block {
    fn zeroed<B: MemoryBackend>(
        backend: &B,
        capacity: usize,
        element_size: usize,
    ) -> Result<Self, ArenaError> {
        Ok(Self {
            buf: RawBuffer::zeroed(backend, capacity, element_size)?,
            capacity,
            used: 0,
            upper_bound: 0,
        })
    }

    /// Bytes of `len` elements starting at element `offset`.
    pub(crate) fn run(&self, offset: usize, len: usize, element_size: usize) -> &[u8] {
        let start = offset * element_size;
        &self.buf.as_bytes()[start..start + len * element_size]
    }

    pub(crate) fn run_mut(&mut self, offset: usize, len: usize, element_size: usize) -> &mut [u8] {
        let start = offset * element_size;
        &mut self.buf.as_bytes_mut()[start..start + len * element_size]
    }
}

/// Read-only view of one block, for introspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Capacity in elements.
    pub capacity: usize,
    /// Elements currently written.
    pub used: usize,
    /// Whether the block has been sealed behind the active block.
    pub sealed: bool,
    /// Exclusive global index bound. Zero unless `sealed`.
    pub upper_bound: usize,
}

/// Where a run of elements lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Location {
    /// Global index of the first element.
    pub(crate) index: usize,
    pub(crate) block: usize,
    /// Element offset inside `block`.
    pub(crate) offset: usize,
}

/// Ordered sequence of blocks with a single active block.
///
/// Invariant: `active < blocks.len() <= blocks.capacity()`.
pub(crate) struct BlockTable {
    pub(crate) blocks: GrowVec<Block>,
    pub(crate) active: usize,
    /// Global indices issued since the last clear.
    pub(crate) total: usize,
    pub(crate) element_size: usize,
    zero_on_clear: bool,
}

impl BlockTable {
    /// Create a table holding a zero-filled block 0.
    pub(crate) fn new<B: MemoryBackend>(
        backend: &B,
        config: &ArenaConfig,
    ) -> Result<Self, ArenaError> {
        let first = Block::zeroed(backend, config.initial_capacity, config.element_size)?;
        let mut blocks = GrowVec::new();
        blocks.push(first);
        Ok(Self {
            blocks,
            active: 0,
            total: 0,
            element_size: config.element_size,
            zero_on_clear: config.zero_on_clear,
        })
    }

    /// Whether the active block cannot take `len` more elements.
    pub(crate) fn needs_room(&self, len: usize) -> bool {
        let block = &self.blocks[self.active];
        block.used == block.capacity || block.used + len > block.capacity
    }

    /// Make the active block able to hold `required` more elements.
    ///
    /// Seals a non-empty active block and moves on to the next one,
    /// reusing (and if needed growing) a block left from before a clear,
    /// or creating a fresh block of `(previous capacity + required) * 2`.
    /// A block emptied by `clear` is reused in place without sealing.
    ///
    /// On error nothing is sealed or advanced.
    pub(crate) fn ensure_room_for<B: MemoryBackend>(
        &mut self,
        backend: &B,
        required: usize,
    ) -> Result<(), ArenaError> {
        let element_size = self.element_size;
        let overflow = ArenaError::CapacityOverflow {
            elements: required,
            element_size,
        };
        let seal = self.blocks[self.active].used > 0;
        let target = if seal { self.active + 1 } else { self.active };
        if target == self.blocks.capacity() {
            self.blocks.ensure_capacity(target + 1);
        }
        let prev_capacity = match target {
            0 => 0,
            t => self.blocks[t - 1].capacity,
        };
        let wanted = prev_capacity
            .checked_add(required)
            .ok_or_else(|| overflow.clone())?;

        if target < self.blocks.len() {
            let zero_on_clear = self.zero_on_clear;
            let block = &mut self.blocks[target];
            fatal_assert!(
                block.used == 0,
                "reused block {target} still holds {} elements",
                block.used
            );
            let mut zero = false;
            if block.capacity < wanted {
                block.buf.grow(backend, wanted, element_size)?;
                debug!(
                    block = target,
                    from = block.capacity,
                    to = wanted,
                    "grew reused block"
                );
                block.capacity = wanted;
                zero = true;
            }
            fatal_assert!(
                block.capacity >= required,
                "reused block {target} has capacity {} for a run of {required}",
                block.capacity
            );
            if zero || (zero_on_clear && target != 0) {
                block.buf.zero();
            }
            debug!(block = target, capacity = block.capacity, "reusing block");
        } else {
            fatal_assert!(
                target == self.blocks.len(),
                "block table skipped from {} blocks to slot {target}",
                self.blocks.len()
            );
            let capacity = wanted.checked_mul(2).ok_or(overflow)?;
            let block = Block::zeroed(backend, capacity, element_size)?;
            self.blocks.push(block);
            debug!(block = target, capacity, "created block");
        }

        if seal {
            self.blocks[self.active].upper_bound = self.total;
            debug!(
                block = self.active,
                upper_bound = self.total,
                "sealed block"
            );
            self.active = target;
        }
        Ok(())
    }

    /// Claim `len` slots at the end of the active block.
    ///
    /// The caller must have made room with [`Self::ensure_room_for`].
    pub(crate) fn write_slots(&mut self, len: usize) -> Location {
        let block = &mut self.blocks[self.active];
        fatal_assert!(
            block.used + len <= block.capacity,
            "active block {} cannot hold {len} more elements",
            self.active
        );
        let location = Location {
            index: self.total,
            block: self.active,
            offset: block.used,
        };
        block.used += len;
        self.total += len;
        location
    }

    /// Reset every block to empty, keeping the buffers.
    ///
    /// Returns `false` when nothing had been allocated.
    pub(crate) fn clear(&mut self) -> bool {
        if self.active == 0 && self.blocks[0].used == 0 {
            return false;
        }
        if self.zero_on_clear {
            // Later blocks are zeroed when the table grows back into them.
            let first = &mut self.blocks[0];
            let used = first.used;
            first.run_mut(0, used, self.element_size).fill(0);
        }
        for block in &mut self.blocks.as_mut_slice()[..=self.active] {
            block.used = 0;
            block.upper_bound = 0;
        }
        self.active = 0;
        self.total = 0;
        true
    }

    /// Return every buffer to `backend`, leaving the table empty.
    pub(crate) fn release<B: MemoryBackend>(&mut self, backend: &B) {
        for block in self.blocks.drain() {
            block.buf.release(backend);
        }
        self.active = 0;
        self.total = 0;
    }

    /// Blocks `0..=active`, the only ones holding elements.
    pub(crate) fn in_use(&self) -> &[Block] {
        &self.blocks.as_slice()[..=self.active]
    }

    /// Elements written across blocks `0..=active`.
    pub(crate) fn count(&self) -> usize {
        self.in_use().iter().map(|b| b.used).sum()
    }

    /// Element capacity across all constructed blocks.
    pub(crate) fn capacity(&self) -> usize {
        self.blocks.iter().map(|b| b.capacity).sum()
    }

    pub(crate) fn memory_bytes(&self) -> usize {
        self.blocks.iter().map(|b| b.buf.len_bytes()).sum()
    }

    pub(crate) fn info(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        let active = self.active;
        self.blocks.iter().enumerate().map(move |(i, b)| BlockInfo {
            capacity: b.capacity,
            used: b.used,
            sealed: i < active,
            upper_bound: b.upper_bound,
        })
    }

    pub(crate) fn run(&self, at: Location, len: usize) -> &[u8] {
        self.blocks[at.block].run(at.offset, len, self.element_size)
    }

    pub(crate) fn run_mut(&mut self, at: Location, len: usize) -> &mut [u8] {
        let element_size = self.element_size;
        self.blocks[at.block].run_mut(at.offset, len, element_size)
    }
}
