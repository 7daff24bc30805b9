//! The linear arena facade.
//!
//! [`LinAlloc`] composes the block table, the free registry and the
//! memory backend into the public allocator. Its lifecycle is an explicit
//! state machine:
//!
//! ```text
//! Uninitialized --init--> Ready --destroy--> Destroyed
//! ```
//!
//! Every operation other than `init` requires `Ready`; calling one in any
//! other state is a fatal violation.

use linarena_core::fatal::fatal;
use linarena_core::{fatal_assert, IndexRange, LinIndex};
use tracing::debug;

use crate::backend::{MemoryBackend, SystemBackend};
use crate::block::{BlockInfo, BlockTable, Location};
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::free::{FirstFitRegistry, FreeRegion, FreeRegistry};
use crate::iter::RangeIter;

/// Lifecycle state of a [`LinAlloc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaState {
    /// Created with a backend but not yet initialised.
    Uninitialized,
    /// Initialised and usable.
    Ready,
    /// All memory released. Terminal.
    Destroyed,
}

struct Live<R> {
    config: ArenaConfig,
    table: BlockTable,
    free: R,
}

enum Lifecycle<R> {
    Uninitialized,
    Ready(Live<R>),
    Destroyed,
}

/// Fixed-element-size arena addressed by stable global indices.
///
/// Callers allocate runs of same-sized elements and receive a
/// [`LinIndex`] instead of a pointer. Growth may move block buffers, but
/// an index keeps resolving to the same element until the next
/// [`clear`](Self::clear). `clear` keeps every buffer for reuse, which
/// makes the arena suitable as a per-frame allocator.
///
/// # Example
///
/// ```
/// use linarena::{ArenaConfig, LinAlloc};
///
/// let mut arena = LinAlloc::new(ArenaConfig::new(8).with_initial_capacity(4))?;
/// let (first, bytes) = arena.alloc_slice(4)?;
/// bytes[..8].copy_from_slice(&7u64.to_le_bytes());
///
/// // Overflows block 0; the old index still resolves.
/// let next = arena.alloc(1)?;
/// assert_eq!(next.0, 4);
/// assert_eq!(arena.get(first), &7u64.to_le_bytes());
///
/// arena.clear();
/// assert_eq!(arena.count(), 0);
/// # Ok::<(), linarena::ArenaError>(())
/// ```
pub struct LinAlloc<B: MemoryBackend = SystemBackend, R: FreeRegistry = FirstFitRegistry> {
    backend: B,
    lifecycle: Lifecycle<R>,
}

impl LinAlloc {
    /// Create a ready arena on the global allocator.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::with_backend(config, SystemBackend)
    }
}

impl<B: MemoryBackend> LinAlloc<B> {
    /// Create a ready arena that draws memory from `backend`, with the
    /// default first-fit registry.
    pub fn with_backend(config: ArenaConfig, backend: B) -> Result<Self, ArenaError> {
        Self::with_registry(config, backend)
    }
}

impl<B: MemoryBackend, R: FreeRegistry> LinAlloc<B, R> {
    /// Create an uninitialised arena that will draw memory from `backend`.
    pub fn uninit(backend: B) -> Self {
        Self {
            backend,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Create a ready arena that draws memory from `backend` and tracks
    /// freed runs in a registry of type `R`.
    ///
    /// The registry type is chosen by annotation, e.g.
    /// `LinAlloc::<_, IndexedRegistry>::with_registry(config, backend)`.
    pub fn with_registry(config: ArenaConfig, backend: B) -> Result<Self, ArenaError> {
        let mut arena = Self::uninit(backend);
        arena.init(config)?;
        Ok(arena)
    }

    /// Initialise the arena, allocating a zero-filled block 0 of
    /// `config.initial_capacity` elements.
    ///
    /// On error the arena stays uninitialised.
    ///
    /// # Panics
    ///
    /// Panics if the arena is not uninitialised, or if the element size
    /// or initial capacity is zero.
    #[track_caller]
    pub fn init(&mut self, config: ArenaConfig) -> Result<(), ArenaError> {
        fatal_assert!(
            matches!(self.lifecycle, Lifecycle::Uninitialized),
            "arena initialised twice (state {:?})",
            self.state()
        );
        config.validate();
        let table = BlockTable::new(&self.backend, &config)?;
        debug!(
            element_size = config.element_size,
            initial_capacity = config.initial_capacity,
            zero_on_clear = config.zero_on_clear,
            "arena initialised"
        );
        self.lifecycle = Lifecycle::Ready(Live {
            config,
            table,
            free: R::default(),
        });
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ArenaState {
        match self.lifecycle {
            Lifecycle::Uninitialized => ArenaState::Uninitialized,
            Lifecycle::Ready(_) => ArenaState::Ready,
            Lifecycle::Destroyed => ArenaState::Destroyed,
        }
    }

    /// The memory backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[track_caller]
    fn live(&self) -> &Live<R> {
        match &self.lifecycle {
            Lifecycle::Ready(live) => live,
            Lifecycle::Uninitialized => fatal(format_args!("arena used before init")),
            Lifecycle::Destroyed => fatal(format_args!("arena used after destroy")),
        }
    }

    #[track_caller]
    fn parts_mut(&mut self) -> (&B, &mut Live<R>) {
        match &mut self.lifecycle {
            Lifecycle::Ready(live) => (&self.backend, live),
            Lifecycle::Uninitialized => fatal(format_args!("arena used before init")),
            Lifecycle::Destroyed => fatal(format_args!("arena used after destroy")),
        }
    }

    /// Allocate `len` contiguous elements and return the global index of
    /// the first.
    ///
    /// A previously freed run of at least `len` elements is reused first
    /// (first fit, whole run). Otherwise the elements are appended,
    /// growing into a new block if the active one is full. On error the
    /// arena is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero or the arena is not ready.
    #[track_caller]
    pub fn alloc(&mut self, len: usize) -> Result<LinIndex, ArenaError> {
        self.alloc_slice(len).map(|(index, _)| index)
    }

    /// Allocate `len` contiguous elements and return the index of the
    /// first together with the run's bytes.
    ///
    /// Reused freed runs read as zero. Fresh elements read as zero unless
    /// they recycle memory from before a `clear` without `zero_on_clear`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero or the arena is not ready.
    #[track_caller]
    pub fn alloc_slice(&mut self, len: usize) -> Result<(LinIndex, &mut [u8]), ArenaError> {
        fatal_assert!(len > 0, "alloc length must be positive");
        let (backend, live) = self.parts_mut();
        let at = live.place(backend, len)?;
        Ok((LinIndex(at.index as u32), live.table.run_mut(at, len)))
    }

    /// Bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` has not been allocated since the last clear.
    #[track_caller]
    pub fn get(&self, index: LinIndex) -> &[u8] {
        let table = &self.live().table;
        table.run(table.resolve(index.get()), 1)
    }

    /// Mutable bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` has not been allocated since the last clear.
    #[track_caller]
    pub fn get_mut(&mut self, index: LinIndex) -> &mut [u8] {
        let (_, live) = self.parts_mut();
        let at = live.table.resolve(index.get());
        live.table.run_mut(at, 1)
    }

    /// Bytes of the `len` elements starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the run is not wholly inside one block's written range,
    /// which holds for any run returned by a single `alloc`.
    #[track_caller]
    pub fn get_run(&self, index: LinIndex, len: usize) -> &[u8] {
        let table = &self.live().table;
        table.run(table.resolve_run(index.get(), len), len)
    }

    /// Mutable bytes of the `len` elements starting at `index`.
    ///
    /// # Panics
    ///
    /// As for [`get_run`](Self::get_run).
    #[track_caller]
    pub fn get_run_mut(&mut self, index: LinIndex, len: usize) -> &mut [u8] {
        let (_, live) = self.parts_mut();
        let at = live.table.resolve_run(index.get(), len);
        live.table.run_mut(at, len)
    }

    /// Free the `len` elements starting at `address`, zero-filling them
    /// and making the run available to later allocations.
    ///
    /// `address` must be the address of an element previously handed out
    /// by this arena (for example via [`alloc_slice`](Self::alloc_slice)
    /// or [`get`](Self::get)). It is only compared against block bounds,
    /// never dereferenced. Freeing a run that is already free is not
    /// detected by the default registry.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero, the address is null, misaligned, or not
    /// inside any block, or the run overruns its block.
    #[track_caller]
    pub fn free_region(&mut self, address: *const u8, len: usize) {
        fatal_assert!(len > 0, "free length must be positive");
        fatal_assert!(!address.is_null(), "free of a null address");
        let (_, live) = self.parts_mut();
        let at = live.table.locate_addr(address as usize, len);
        live.release_run(at, len);
    }

    /// Free the `len` elements starting at `index`.
    ///
    /// Index-based form of [`free_region`](Self::free_region) with the
    /// same validation.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero, `index` is out of range, or the run
    /// overruns its block.
    #[track_caller]
    pub fn free(&mut self, index: LinIndex, len: usize) {
        fatal_assert!(len > 0, "free length must be positive");
        let (_, live) = self.parts_mut();
        let at = live.table.resolve_run(index.get(), len);
        live.release_run(at, len);
    }

    /// Discard every allocation while keeping the block buffers.
    ///
    /// No-op if nothing has been allocated. With `zero_on_clear`, block 0
    /// is zeroed now and later blocks when they are next reused.
    #[track_caller]
    pub fn clear(&mut self) {
        let (_, live) = self.parts_mut();
        let blocks = live.table.active + 1;
        if live.table.clear() {
            live.free.clear();
            debug!(blocks, "arena cleared");
        }
    }

    /// Release all memory back to the backend. The arena is unusable
    /// afterwards.
    ///
    /// Destroying an uninitialised arena just marks it destroyed.
    ///
    /// # Panics
    ///
    /// Panics if the arena was already destroyed.
    #[track_caller]
    pub fn destroy(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Destroyed) {
            Lifecycle::Ready(mut live) => {
                let blocks = live.table.blocks.len();
                live.table.release(&self.backend);
                debug!(blocks, "arena destroyed");
            }
            Lifecycle::Uninitialized => {}
            Lifecycle::Destroyed => fatal(format_args!("arena destroyed twice")),
        }
    }

    /// Elements currently written across blocks `0..=active`, freed runs
    /// included.
    #[track_caller]
    pub fn count(&self) -> usize {
        self.live().table.count()
    }

    /// Number of global indices issued since the last clear; the next
    /// fresh allocation starts here.
    #[track_caller]
    pub fn len(&self) -> usize {
        self.live().table.total
    }

    /// Whether no index has been issued since the last clear.
    #[track_caller]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configuration the arena was initialised with.
    #[track_caller]
    pub fn config(&self) -> &ArenaConfig {
        &self.live().config
    }

    /// Size of one element in bytes.
    #[track_caller]
    pub fn element_size(&self) -> usize {
        self.live().config.element_size
    }

    /// Number of constructed blocks, including spares past the active one.
    #[track_caller]
    pub fn block_count(&self) -> usize {
        self.live().table.blocks.len()
    }

    /// Index of the block currently receiving new elements.
    #[track_caller]
    pub fn active_block(&self) -> usize {
        self.live().table.active
    }

    /// Per-block view, in block order.
    #[track_caller]
    pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        self.live().table.info()
    }

    /// Element capacity summed over all constructed blocks.
    #[track_caller]
    pub fn capacity(&self) -> usize {
        self.live().table.capacity()
    }

    /// Bytes held from the backend for element storage.
    #[track_caller]
    pub fn memory_bytes(&self) -> usize {
        self.live().table.memory_bytes()
    }

    /// Number of freed runs awaiting reuse.
    #[track_caller]
    pub fn free_region_count(&self) -> usize {
        self.live().free.len()
    }

    /// Freed runs awaiting reuse, in registration order.
    #[track_caller]
    pub fn free_regions(&self) -> R::Regions<'_> {
        self.live().free.regions()
    }

    /// Iterate the elements of `range` in index order.
    ///
    /// Stops early at the last allocated element if `range` extends past
    /// [`len`](Self::len).
    ///
    /// # Panics
    ///
    /// Panics if `range.start()` has not been allocated.
    #[track_caller]
    pub fn iter(&self, range: IndexRange) -> RangeIter<'_> {
        let table = &self.live().table;
        let at = table.resolve(range.start().get());
        RangeIter::new(
            table.in_use(),
            table.element_size,
            at.index,
            range.len(),
            at.block,
            at.offset,
        )
    }

    /// Iterate every allocated element, `0..len()`.
    #[track_caller]
    pub fn iter_all(&self) -> RangeIter<'_> {
        let table = &self.live().table;
        if table.total == 0 {
            return RangeIter::empty(table.in_use(), table.element_size);
        }
        RangeIter::new(table.in_use(), table.element_size, 0, table.total, 0, 0)
    }
}

impl<R: FreeRegistry> Live<R> {
    /// Find room for `len` elements: a freed run first, else fresh slots.
    fn place<B: MemoryBackend>(&mut self, backend: &B, len: usize) -> Result<Location, ArenaError> {
        if let Some(region) = self.free.try_reuse(len) {
            return Ok(self.table.resolve(region.start.get()));
        }
        let allocated = self.table.total;
        let exhausted = ArenaError::IndexSpaceExhausted {
            requested: len,
            allocated,
        };
        match allocated.checked_add(len) {
            Some(end) if end <= u32::MAX as usize => {}
            _ => return Err(exhausted),
        }
        if self.table.needs_room(len) {
            self.table.ensure_room_for(backend, len)?;
        }
        Ok(self.table.write_slots(len))
    }

    /// Zero a validated run and hand it to the registry.
    fn release_run(&mut self, at: Location, len: usize) {
        self.table.run_mut(at, len).fill(0);
        self.free.register(FreeRegion {
            start: LinIndex(at.index as u32),
            len: len as u32,
        });
    }
}

impl<B: MemoryBackend, R: FreeRegistry> Drop for LinAlloc<B, R> {
    fn drop(&mut self) {
        if let Lifecycle::Ready(live) = &mut self.lifecycle {
            live.table.release(&self.backend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::free::IndexedRegistry;

    fn arena(element_size: usize, initial: usize) -> LinAlloc {
        LinAlloc::new(ArenaConfig::new(element_size).with_initial_capacity(initial)).unwrap()
    }

    fn write_u64(arena: &mut LinAlloc, index: LinIndex, value: u64) {
        arena.get_mut(index).copy_from_slice(&value.to_le_bytes());
    }

    fn read_u64(arena: &LinAlloc, index: LinIndex) -> u64 {
        u64::from_le_bytes(arena.get(index).try_into().unwrap())
    }

    #[test]
    fn lifecycle_transitions() {
        let mut a: LinAlloc = LinAlloc::uninit(SystemBackend);
        assert_eq!(a.state(), ArenaState::Uninitialized);
        a.init(ArenaConfig::new(4)).unwrap();
        assert_eq!(a.state(), ArenaState::Ready);
        a.destroy();
        assert_eq!(a.state(), ArenaState::Destroyed);
    }

    #[test]
    fn with_backend_defaults_the_registry() {
        let mut a = LinAlloc::with_backend(ArenaConfig::new(4), SystemBackend).unwrap();
        let i = a.alloc(2).unwrap();
        a.free(i, 2);
        let regions: Vec<FreeRegion> = a.free_regions().collect();
        assert_eq!(regions, vec![FreeRegion { start: i, len: 2 }]);
    }

    #[test]
    fn arena_moves_across_threads() {
        use std::sync::{Arc, Mutex};

        fn assert_send<T: Send>() {}
        assert_send::<LinAlloc>();
        assert_send::<LinAlloc<SystemBackend, IndexedRegistry>>();

        let shared = Arc::new(Mutex::new(arena(8, 4)));
        let worker = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                let mut a = shared.lock().unwrap();
                let i = a.alloc(1).unwrap();
                write_u64(&mut a, i, 77);
                i
            })
        };
        let i = worker.join().unwrap();
        assert_eq!(read_u64(&shared.lock().unwrap(), i), 77);

        let mut owned = arena(8, 4);
        owned.alloc(5).unwrap();
        let len = std::thread::spawn(move || owned.len()).join().unwrap();
        assert_eq!(len, 5);
    }

    #[test]
    fn overflow_into_second_block_matches_growth_rule() {
        let mut a = arena(8, 4);
        assert_eq!(a.alloc(4).unwrap(), LinIndex(0));
        assert_eq!(a.alloc(1).unwrap(), LinIndex(4));
        let blocks: Vec<BlockInfo> = a.blocks().collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].sealed);
        assert_eq!(blocks[0].upper_bound, 4);
        assert_eq!(blocks[1].capacity, 10);
        assert_eq!(a.active_block(), 1);
    }

    #[test]
    fn indices_survive_growth() {
        let mut a = arena(8, 2);
        let mut issued = Vec::new();
        for v in 0..50u64 {
            let i = a.alloc(1).unwrap();
            write_u64(&mut a, i, v * 3);
            issued.push((i, v * 3));
        }
        assert!(a.block_count() > 2);
        for (i, v) in issued {
            assert_eq!(read_u64(&a, i), v);
        }
    }

    #[test]
    fn multi_element_run_is_contiguous() {
        let mut a = arena(4, 4);
        a.alloc(3).unwrap();
        let (start, bytes) = a.alloc_slice(5).unwrap();
        assert_eq!(bytes.len(), 20);
        let base = bytes.as_ptr() as usize;
        for k in 0..5 {
            let addr = a.get(start.offset(k)).as_ptr() as usize;
            assert_eq!(addr, base + k as usize * 4);
        }
    }

    #[test]
    fn count_tracks_all_blocks() {
        let mut a = arena(1, 3);
        a.alloc(2).unwrap();
        a.alloc(2).unwrap();
        a.alloc(7).unwrap();
        assert_eq!(a.count(), 11);
        assert_eq!(a.len(), 11);
    }

    #[test]
    fn clear_resets_and_keeps_capacity() {
        let mut a = arena(2, 2);
        for _ in 0..20 {
            a.alloc(1).unwrap();
        }
        let capacity = a.capacity();
        let bytes = a.memory_bytes();
        a.clear();
        assert_eq!(a.count(), 0);
        assert!(a.is_empty());
        assert_eq!(a.capacity(), capacity);
        assert_eq!(a.memory_bytes(), bytes);
        assert_eq!(a.alloc(1).unwrap(), LinIndex(0));
    }

    #[test]
    fn clear_on_empty_arena_is_noop() {
        let mut a = arena(2, 2);
        a.clear();
        assert_eq!(a.count(), 0);
        assert_eq!(a.block_count(), 1);
    }

    #[test]
    fn clear_discards_free_regions() {
        let mut a = arena(2, 8);
        let i = a.alloc(3).unwrap();
        a.free(i, 3);
        assert_eq!(a.free_region_count(), 1);
        a.clear();
        assert_eq!(a.free_region_count(), 0);
    }

    #[test]
    fn freed_run_is_zeroed_and_reused() {
        let mut a = arena(8, 8);
        let (i, bytes) = a.alloc_slice(3).unwrap();
        bytes.fill(0x5A);
        let ptr = bytes.as_ptr();
        a.alloc(2).unwrap();
        a.free_region(ptr, 3);
        assert!(a.get_run(i, 3).iter().all(|&b| b == 0));
        let (again, bytes) = a.alloc_slice(2).unwrap();
        assert_eq!(again, i);
        assert!(bytes.iter().all(|&b| b == 0));
        assert_eq!(a.free_region_count(), 0);
    }

    #[test]
    fn first_fit_takes_earlier_shorter_region() {
        let mut a = arena(1, 16);
        let r3 = a.alloc(3).unwrap();
        let r5 = a.alloc(5).unwrap();
        a.free(r3, 3);
        a.free(r5, 5);
        assert_eq!(a.alloc(2).unwrap(), r3);
        let left: Vec<FreeRegion> = a.free_regions().collect();
        assert_eq!(
            left,
            vec![FreeRegion {
                start: r5,
                len: 5
            }]
        );
        // The third element of the reused length-3 run is gone until clear.
        assert_eq!(a.alloc(1).unwrap(), r5);
    }

    #[test]
    fn free_in_sealed_block_resolves_right_index() {
        let mut a = arena(8, 4);
        a.alloc(4).unwrap();
        let (i, bytes) = a.alloc_slice(2).unwrap();
        let addr = bytes.as_ptr();
        a.alloc(20).unwrap();
        a.free_region(addr, 2);
        let regions: Vec<FreeRegion> = a.free_regions().collect();
        assert_eq!(regions, vec![FreeRegion { start: i, len: 2 }]);
    }

    #[test]
    fn indexed_registry_plugs_in() {
        let mut a: LinAlloc<SystemBackend, IndexedRegistry> =
            LinAlloc::with_registry(ArenaConfig::new(4), SystemBackend).unwrap();
        let i = a.alloc(2).unwrap();
        a.free(i, 2);
        assert_eq!(a.alloc(1).unwrap(), i);
    }

    #[test]
    #[should_panic(expected = "freed twice")]
    fn indexed_registry_catches_double_free() {
        let mut a: LinAlloc<SystemBackend, IndexedRegistry> =
            LinAlloc::with_registry(ArenaConfig::new(4), SystemBackend).unwrap();
        let i = a.alloc(2).unwrap();
        a.free(i, 2);
        a.free(i, 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_at_len_is_fatal() {
        let mut a = arena(4, 4);
        a.alloc(2).unwrap();
        a.get(LinIndex(2));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_after_clear_is_fatal() {
        let mut a = arena(4, 4);
        let i = a.alloc(1).unwrap();
        a.clear();
        a.get(i);
    }

    #[test]
    #[should_panic(expected = "alloc length must be positive")]
    fn zero_length_alloc_is_fatal() {
        arena(4, 4).alloc(0).unwrap();
    }

    #[test]
    #[should_panic(expected = "arena used after destroy")]
    fn use_after_destroy_is_fatal() {
        let mut a = arena(4, 4);
        a.destroy();
        a.alloc(1).unwrap();
    }

    #[test]
    #[should_panic(expected = "arena used before init")]
    fn use_before_init_is_fatal() {
        let a: LinAlloc = LinAlloc::uninit(SystemBackend);
        a.count();
    }

    #[test]
    #[should_panic(expected = "arena initialised twice")]
    fn double_init_is_fatal() {
        let mut a = arena(4, 4);
        a.init(ArenaConfig::new(4)).unwrap();
    }

    #[test]
    #[should_panic(expected = "arena destroyed twice")]
    fn double_destroy_is_fatal() {
        let mut a = arena(4, 4);
        a.destroy();
        a.destroy();
    }

    #[test]
    #[should_panic(expected = "free of a null address")]
    fn null_free_is_fatal() {
        let mut a = arena(4, 4);
        a.alloc(1).unwrap();
        a.free_region(std::ptr::null(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_index_keeps_its_value(
                lens in proptest::collection::vec(1usize..12, 1..40),
                initial in 1usize..8,
            ) {
                let mut a = arena(8, initial);
                let mut issued = Vec::new();
                for (n, &len) in lens.iter().enumerate() {
                    let start = a.alloc(len).unwrap();
                    for k in 0..len as u32 {
                        let v = ((n as u64) << 32) | u64::from(k);
                        write_u64(&mut a, start.offset(k), v);
                        issued.push((start.offset(k), v));
                    }
                }
                for &(i, v) in &issued {
                    prop_assert_eq!(read_u64(&a, i), v);
                }
                prop_assert_eq!(a.count(), issued.len());
                prop_assert_eq!(a.len(), issued.len());
            }

            #[test]
            fn iteration_visits_every_index_in_order(
                lens in proptest::collection::vec(1usize..10, 1..30),
                initial in 1usize..6,
            ) {
                let mut a = arena(8, initial);
                let total: usize = lens.iter().sum();
                for &len in &lens {
                    a.alloc(len).unwrap();
                }
                for i in 0..total as u32 {
                    write_u64(&mut a, LinIndex(i), u64::from(i));
                }
                let seen: Vec<u64> = a
                    .iter_all()
                    .map(|e| u64::from_le_bytes(e.try_into().unwrap()))
                    .collect();
                prop_assert_eq!(seen, (0..total as u64).collect::<Vec<_>>());
            }

            #[test]
            fn refill_after_clear_issues_same_indices(
                lens in proptest::collection::vec(1usize..10, 1..30),
            ) {
                let mut a = arena(4, 2);
                let first: Vec<LinIndex> = lens.iter().map(|&l| a.alloc(l).unwrap()).collect();
                let capacity = a.capacity();
                a.clear();
                let second: Vec<LinIndex> = lens.iter().map(|&l| a.alloc(l).unwrap()).collect();
                prop_assert_eq!(first, second);
                prop_assert_eq!(a.capacity(), capacity);
            }
        }
    }
}
