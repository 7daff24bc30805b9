//! Test utilities and instrumented backends for linarena development.
//!
//! Provides [`MemoryBackend`] wrappers that observe or sabotage the
//! arena's traffic to its memory provider, plus element fixtures in
//! [`fixtures`].
//!
//! - [`CountingBackend`]: forwards to [`SystemBackend`] and counts calls.
//! - [`FailingBackend`]: succeeds a fixed number of times, then refuses.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use linarena::{AllocError, MemoryBackend, SystemBackend};

/// Snapshot of the calls a [`CountingBackend`] has seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendCalls {
    pub allocate: usize,
    pub allocate_zeroed: usize,
    pub deallocate: usize,
    pub reallocate: usize,
}

impl BackendCalls {
    /// Calls that obtained or resized memory.
    pub fn acquisitions(&self) -> usize {
        self.allocate + self.allocate_zeroed + self.reallocate
    }
}

/// Forwards to [`SystemBackend`], counting every call.
///
/// Also tracks bytes currently outstanding, so tests can assert that an
/// arena returned everything on `destroy`.
#[derive(Debug, Default)]
pub struct CountingBackend {
    allocate: AtomicUsize,
    allocate_zeroed: AtomicUsize,
    deallocate: AtomicUsize,
    reallocate: AtomicUsize,
    live_bytes: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> BackendCalls {
        BackendCalls {
            allocate: self.allocate.load(Ordering::Relaxed),
            allocate_zeroed: self.allocate_zeroed.load(Ordering::Relaxed),
            deallocate: self.deallocate.load(Ordering::Relaxed),
            reallocate: self.reallocate.load(Ordering::Relaxed),
        }
    }

    /// Bytes handed out and not yet returned.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }
}

impl MemoryBackend for CountingBackend {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.allocate.fetch_add(1, Ordering::Relaxed);
        let ptr = SystemBackend.allocate(layout)?;
        self.live_bytes.fetch_add(layout.size(), Ordering::Relaxed);
        Ok(ptr)
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.allocate_zeroed.fetch_add(1, Ordering::Relaxed);
        let ptr = SystemBackend.allocate_zeroed(layout)?;
        self.live_bytes.fetch_add(layout.size(), Ordering::Relaxed);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocate.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
        // SAFETY: forwarded from the caller's contract.
        unsafe { SystemBackend.deallocate(ptr, layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        self.reallocate.fetch_add(1, Ordering::Relaxed);
        // SAFETY: forwarded from the caller's contract.
        let grown = unsafe { SystemBackend.reallocate(ptr, layout, new_size) }?;
        self.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
        self.live_bytes.fetch_add(new_size, Ordering::Relaxed);
        Ok(grown)
    }
}

/// Forwards to [`SystemBackend`] for the first `succeed_count`
/// acquisitions (allocate, zeroed allocate, or reallocate), then refuses
/// every further one. Deallocation always succeeds.
#[derive(Debug)]
pub struct FailingBackend {
    pub succeed_count: usize,
    acquisitions: AtomicUsize,
}

impl FailingBackend {
    /// Create a backend that allows `succeed_count` acquisitions.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            acquisitions: AtomicUsize::new(0),
        }
    }

    /// How many acquisitions have been attempted.
    pub fn attempts(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }

    fn admit(&self) -> Result<(), AllocError> {
        let n = self.acquisitions.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(AllocError);
        }
        Ok(())
    }
}

impl MemoryBackend for FailingBackend {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.admit()?;
        SystemBackend.allocate(layout)
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.admit()?;
        SystemBackend.allocate_zeroed(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { SystemBackend.deallocate(ptr, layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        self.admit()?;
        // SAFETY: forwarded from the caller's contract.
        unsafe { SystemBackend.reallocate(ptr, layout, new_size) }
    }
}
