//! Sequential traversal of a global index range across blocks.

use std::iter::FusedIterator;

use linarena_core::LinIndex;

use crate::block::Block;

/// Cursor over the elements of a half-open index range.
///
/// Yields each element's bytes in ascending index order, stepping from
/// one block into the next transparently. Freed elements are visited
/// too; they read as zero. Iteration also stops at the last allocated
/// element if the range extends past it.
///
/// Created by [`LinAlloc::iter`](crate::LinAlloc::iter) and
/// [`LinAlloc::iter_all`](crate::LinAlloc::iter_all).
#[derive(Clone)]
pub struct RangeIter<'a> {
    /// Blocks `0..=active`.
    blocks: &'a [Block],
    element_size: usize,
    start: usize,
    range_len: usize,
    block: usize,
    offset: usize,
    visited: usize,
}

impl<'a> RangeIter<'a> {
    pub(crate) fn new(
        blocks: &'a [Block],
        element_size: usize,
        start: usize,
        range_len: usize,
        block: usize,
        offset: usize,
    ) -> Self {
        Self {
            blocks,
            element_size,
            start,
            range_len,
            block,
            offset,
            visited: 0,
        }
    }

    pub(crate) fn empty(blocks: &'a [Block], element_size: usize) -> Self {
        Self::new(blocks, element_size, 0, 0, 0, 0)
    }

    /// Global index of the element the next call to `next` yields.
    pub fn position(&self) -> LinIndex {
        LinIndex((self.start + self.visited) as u32)
    }

    fn at_end(&self) -> bool {
        self.visited >= self.range_len
            || self.block >= self.blocks.len()
            || self.offset >= self.blocks[self.block].used
    }

    fn remaining(&self) -> usize {
        if self.at_end() {
            return 0;
        }
        let in_blocks: usize = self.blocks[self.block..].iter().map(|b| b.used).sum();
        (in_blocks - self.offset).min(self.range_len - self.visited)
    }
}

impl<'a> Iterator for RangeIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.at_end() {
            return None;
        }
        let blocks = self.blocks;
        let block = &blocks[self.block];
        let item = block.run(self.offset, 1, self.element_size);
        self.offset += 1;
        if self.offset == block.used {
            self.block += 1;
            self.offset = 0;
        }
        self.visited += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for RangeIter<'_> {}

impl FusedIterator for RangeIter<'_> {}
