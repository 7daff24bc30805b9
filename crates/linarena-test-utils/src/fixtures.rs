//! Element fixtures for tests and benches.
//!
//! Arena elements are raw bytes; these helpers store and load `u64`
//! values so tests can check that an index still resolves to the value
//! written through it.

use linarena::{ArenaConfig, FreeRegistry, LinAlloc, LinIndex, MemoryBackend};

/// Element size used by the `u64` helpers.
pub const U64_ELEMENT: usize = std::mem::size_of::<u64>();

/// Config for `u64` elements with a small block 0, so tests grow quickly.
pub fn u64_config(initial_capacity: usize) -> ArenaConfig {
    ArenaConfig::new(U64_ELEMENT).with_initial_capacity(initial_capacity)
}

/// Store `value` in the element at `index`.
pub fn write_u64<B: MemoryBackend, R: FreeRegistry>(
    arena: &mut LinAlloc<B, R>,
    index: LinIndex,
    value: u64,
) {
    arena.get_mut(index).copy_from_slice(&value.to_le_bytes());
}

/// Load the element at `index` as a `u64`.
pub fn read_u64<B: MemoryBackend, R: FreeRegistry>(arena: &LinAlloc<B, R>, index: LinIndex) -> u64 {
    decode_u64(arena.get(index))
}

/// Decode one element's bytes, as yielded by `RangeIter`.
pub fn decode_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; U64_ELEMENT];
    raw.copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}

/// Allocate a run of `values.len()` elements and store `values` in it.
pub fn push_run<B: MemoryBackend, R: FreeRegistry>(
    arena: &mut LinAlloc<B, R>,
    values: &[u64],
) -> LinIndex {
    let (start, bytes) = arena
        .alloc_slice(values.len())
        .expect("fixture allocation failed");
    for (chunk, v) in bytes.chunks_exact_mut(U64_ELEMENT).zip(values) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
    start
}
