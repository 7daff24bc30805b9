//! Pluggable raw-memory backend.
//!
//! Every block buffer is obtained from, grown through, and returned to a
//! [`MemoryBackend`]. The arena is generic over it so a custom memory
//! manager or an instrumentation layer can be substituted without touching
//! the allocator itself. [`SystemBackend`] forwards to the global allocator.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::error::Error;
use std::fmt;
use std::ptr::NonNull;

/// The backend could not satisfy a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory backend allocation failed")
    }
}

impl Error for AllocError {}

/// Raw memory provider used for block buffers.
///
/// Layouts passed in always have a non-zero size.
pub trait MemoryBackend {
    /// Allocate uninitialised memory for `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Allocate zero-filled memory for `layout`.
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return memory to the backend.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this backend for `layout` and not
    /// released since.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Resize an allocation to `new_size` bytes, keeping `layout.align()`.
    ///
    /// The first `min(layout.size(), new_size)` bytes are preserved; any
    /// bytes beyond are uninitialised. On failure the original allocation
    /// is left untouched.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this backend for `layout` and not
    /// released since. `new_size` must be non-zero and, rounded up to
    /// `layout.align()`, must not overflow `isize`.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError>;
}

/// Backend that forwards to the global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBackend;

impl MemoryBackend for SystemBackend {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0);
        // SAFETY: layouts handed to backends are never zero-sized.
        NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(AllocError)
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0);
        // SAFETY: layouts handed to backends are never zero-sized.
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) }).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        // SAFETY: forwarded from the caller's contract.
        NonNull::new(unsafe { alloc::realloc(ptr.as_ptr(), layout, new_size) }).ok_or(AllocError)
    }
}

impl<B: MemoryBackend + ?Sized> MemoryBackend for &B {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate_zeroed(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        // SAFETY: forwarded from the caller's contract.
        unsafe { (**self).reallocate(ptr, layout, new_size) }
    }
}
