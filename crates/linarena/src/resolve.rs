//! Global index and address resolution over the block table.
//!
//! Sealed blocks carry strictly increasing `upper_bound`s, so the block
//! holding a global index is found by binary search over them. Anything
//! past the last sealed bound lives in the active block.

use linarena_core::fatal_assert;
use linarena_core::fatal::fatal;

use crate::block::{BlockTable, Location};

impl BlockTable {
    /// Block holding `index`: the first sealed block whose bound exceeds
    /// it, else the active block.
    pub(crate) fn block_for(&self, index: usize) -> usize {
        let sealed = &self.blocks.as_slice()[..self.active];
        sealed.partition_point(|b| b.upper_bound <= index)
    }

    /// First global index stored in `block`.
    pub(crate) fn block_base(&self, block: usize) -> usize {
        match block {
            0 => 0,
            b => self.blocks[b - 1].upper_bound,
        }
    }

    /// Offset of `index` within `block`.
    pub(crate) fn offset_in(&self, block: usize, index: usize) -> usize {
        index - self.block_base(block)
    }

    /// Resolve a global index to its block and offset.
    ///
    /// # Panics
    ///
    /// Panics if `index` has not been allocated since the last clear.
    #[track_caller]
    pub(crate) fn resolve(&self, index: usize) -> Location {
        fatal_assert!(
            index < self.total,
            "index {index} out of range (allocated {})",
            self.total
        );
        let block = self.block_for(index);
        let offset = self.offset_in(block, index);
        fatal_assert!(
            offset < self.blocks[block].used,
            "index {index} resolved past the end of block {block}"
        );
        Location {
            index,
            block,
            offset,
        }
    }

    /// Resolve a run of `len` elements starting at `index`, requiring the
    /// whole run to lie inside one block's written range.
    #[track_caller]
    pub(crate) fn resolve_run(&self, index: usize, len: usize) -> Location {
        let at = self.resolve(index);
        fatal_assert!(
            at.offset + len <= self.blocks[at.block].used,
            "region of {len} elements at index {index} overruns block {}",
            at.block
        );
        at
    }

    /// Resolve an element address back to its global index.
    ///
    /// Blocks are scanned in order for one whose written bytes contain
    /// `addr`. The address must sit on an element boundary and the run of
    /// `len` elements from it must stay within that block's written range.
    ///
    /// # Panics
    ///
    /// Panics on a misaligned address, an overrunning length, or an
    /// address that belongs to no block.
    #[track_caller]
    pub(crate) fn locate_addr(&self, addr: usize, len: usize) -> Location {
        let element_size = self.element_size;
        for (block, b) in self.in_use().iter().enumerate() {
            let start = b.buf.addr();
            let end = start + b.used * element_size;
            if addr < start || addr >= end {
                continue;
            }
            let delta = addr - start;
            fatal_assert!(
                delta % element_size == 0,
                "address {addr:#x} is not aligned to the {element_size}-byte element size"
            );
            let offset = delta / element_size;
            fatal_assert!(
                offset + len <= b.used,
                "region of {len} elements at offset {offset} overruns block {block} ({} used)",
                b.used
            );
            return Location {
                index: self.block_base(block) + offset,
                block,
                offset,
            };
        }
        fatal(format_args!(
            "address {addr:#x} does not belong to any block"
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::SystemBackend;
    use crate::block::BlockTable;
    use crate::config::ArenaConfig;

    /// Table with blocks holding indices 0..4, 4..9 and 9..12.
    fn three_blocks() -> BlockTable {
        let config = ArenaConfig::new(8).with_initial_capacity(4);
        let mut t = BlockTable::new(&SystemBackend, &config).unwrap();
        for len in [4, 5, 3] {
            if t.needs_room(len) {
                t.ensure_room_for(&SystemBackend, len).unwrap();
            }
            t.write_slots(len);
        }
        // 4 fills b0; 5 opens b1 (cap 18); 3 fits in b1.
        t
    }

    fn sealed_three() -> BlockTable {
        let config = ArenaConfig::new(8).with_initial_capacity(4);
        let mut t = BlockTable::new(&SystemBackend, &config).unwrap();
        for len in [4, 10, 30] {
            if t.needs_room(len) {
                t.ensure_room_for(&SystemBackend, len).unwrap();
            }
            t.write_slots(len);
        }
        t
    }

    #[test]
    fn resolves_within_first_and_active_block() {
        let mut t = three_blocks();
        assert_eq!(t.active, 1);
        let a = t.resolve(3);
        assert_eq!((a.block, a.offset), (0, 3));
        let b = t.resolve(4);
        assert_eq!((b.block, b.offset), (1, 0));
        let c = t.resolve(11);
        assert_eq!((c.block, c.offset), (1, 7));
        t.release(&SystemBackend);
    }

    #[test]
    fn binary_search_crosses_sealed_blocks() {
        let mut t = sealed_three();
        // b0: 0..4, b1 (cap 28): 4..14, b2 (cap 116): 14..44
        assert_eq!(t.active, 2);
        for (index, block, offset) in [(0, 0, 0), (3, 0, 3), (4, 1, 0), (13, 1, 9), (14, 2, 0), (43, 2, 29)] {
            let at = t.resolve(index);
            assert_eq!((at.block, at.offset), (block, offset), "index {index}");
        }
        t.release(&SystemBackend);
    }

    #[test]
    fn address_round_trips_to_index() {
        let mut t = sealed_three();
        for index in [0, 3, 4, 13, 14, 43] {
            let at = t.resolve(index);
            let addr = t.run(at, 1).as_ptr() as usize;
            assert_eq!(t.locate_addr(addr, 1), at);
        }
        t.release(&SystemBackend);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_equal_to_total_is_fatal() {
        let t = three_blocks();
        t.resolve(12);
    }

    #[test]
    #[should_panic(expected = "not aligned")]
    fn misaligned_address_is_fatal() {
        let t = three_blocks();
        let addr = t.run(t.resolve(1), 1).as_ptr() as usize + 3;
        t.locate_addr(addr, 1);
    }

    #[test]
    #[should_panic(expected = "overruns block")]
    fn overrunning_length_is_fatal() {
        let t = three_blocks();
        let addr = t.run(t.resolve(2), 1).as_ptr() as usize;
        t.locate_addr(addr, 3);
    }

    #[test]
    #[should_panic(expected = "does not belong to any block")]
    fn foreign_address_is_fatal() {
        let t = three_blocks();
        let local = 0u64;
        t.locate_addr(&local as *const u64 as usize, 1);
    }

    #[test]
    #[should_panic(expected = "overruns block")]
    fn run_crossing_block_boundary_is_fatal() {
        let t = three_blocks();
        t.resolve_run(2, 4);
    }
}
