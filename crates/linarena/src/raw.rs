//! Owned byte buffers obtained from a [`MemoryBackend`].
//!
//! This is the only place that turns backend pointers into slices. A
//! [`RawBuffer`] is always fully initialised: it starts zero-filled and
//! any bytes added by growth are zero-filled before it is observable.
//!
//! A buffer does not remember its backend. Every call that touches the
//! allocation itself (`grow`, `release`) must be given the backend that
//! produced it; `BlockTable` is the single owner that upholds this.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::backend::MemoryBackend;
use crate::config::ELEMENT_ALIGN;
use crate::error::ArenaError;

/// Byte size and layout for `elements` items of `element_size` bytes.
fn layout_for(elements: usize, element_size: usize) -> Result<Layout, ArenaError> {
    let overflow = ArenaError::CapacityOverflow {
        elements,
        element_size,
    };
    let bytes = elements
        .checked_mul(element_size)
        .ok_or_else(|| overflow.clone())?;
    Layout::from_size_align(bytes, ELEMENT_ALIGN).map_err(|_| overflow)
}

/// A contiguous, zero-initialised byte buffer owned by one block.
pub(crate) struct RawBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: the allocation is uniquely owned by this buffer and is only
// reached through `&self`/`&mut self`, so moving it to another thread
// moves sole access with it.
unsafe impl Send for RawBuffer {}

impl RawBuffer {
    /// Allocate a zero-filled buffer for `elements` items.
    pub(crate) fn zeroed<B: MemoryBackend>(
        backend: &B,
        elements: usize,
        element_size: usize,
    ) -> Result<Self, ArenaError> {
        let layout = layout_for(elements, element_size)?;
        let ptr = backend
            .allocate_zeroed(layout)
            .map_err(|e| ArenaError::from_backend(e, layout.size()))?;
        Ok(Self { ptr, layout })
    }

    /// Grow the buffer to hold `elements` items, preserving its prefix.
    ///
    /// The buffer may move. Bytes past the old size are zero-filled. On
    /// error the buffer is unchanged.
    pub(crate) fn grow<B: MemoryBackend>(
        &mut self,
        backend: &B,
        elements: usize,
        element_size: usize,
    ) -> Result<(), ArenaError> {
        let new_layout = layout_for(elements, element_size)?;
        let old_size = self.layout.size();
        if new_layout.size() <= old_size {
            return Ok(());
        }
        // SAFETY: `ptr` was produced by `backend` for `self.layout` (owner
        // invariant) and `new_layout` was validated above.
        let ptr = unsafe { backend.reallocate(self.ptr, self.layout, new_layout.size()) }
            .map_err(|e| ArenaError::from_backend(e, new_layout.size()))?;
        // SAFETY: the allocation is `new_layout.size()` bytes long, so the
        // tail past `old_size` is in bounds.
        unsafe {
            ptr.as_ptr()
                .add(old_size)
                .write_bytes(0, new_layout.size() - old_size);
        }
        self.ptr = ptr;
        self.layout = new_layout;
        Ok(())
    }

    /// Return the buffer to `backend`.
    pub(crate) fn release<B: MemoryBackend>(self, backend: &B) {
        // SAFETY: `ptr` was produced by `backend` for `self.layout` (owner
        // invariant) and `self` is consumed, so it cannot be used again.
        unsafe { backend.deallocate(self.ptr, self.layout) }
    }

    /// Size of the buffer in bytes.
    pub(crate) fn len_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Start address, for address-to-index resolution only.
    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        // SAFETY: the allocation is `layout.size()` bytes, fully
        // initialised, and borrowed for the lifetime of `&self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as for `as_bytes`, with exclusivity from `&mut self`.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }

    /// Zero-fill the whole buffer.
    pub(crate) fn zero(&mut self) {
        self.as_bytes_mut().fill(0);
    }
}
