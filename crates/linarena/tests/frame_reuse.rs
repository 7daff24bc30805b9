//! Integration test: frame-allocator reuse against an instrumented backend.
//!
//! After the first frame has grown the arena to its working size, later
//! frames of the same shape must not touch the backend at all.

use linarena::{ArenaState, LinAlloc, LinIndex};
use linarena_test_utils::fixtures::{push_run, read_u64, u64_config};
use linarena_test_utils::CountingBackend;

const FRAME: [usize; 6] = [3, 1, 7, 2, 12, 5];

fn run_frame(arena: &mut LinAlloc<CountingBackend>, frame: u64) -> Vec<(LinIndex, u64)> {
    let mut written = Vec::new();
    for (n, &len) in FRAME.iter().enumerate() {
        let values: Vec<u64> = (0..len as u64).map(|k| frame * 1000 + n as u64 * 100 + k).collect();
        let start = push_run(arena, &values);
        for (k, v) in values.into_iter().enumerate() {
            written.push((start.offset(k as u32), v));
        }
    }
    written
}

#[test]
fn later_frames_issue_no_backend_calls() {
    let mut arena = LinAlloc::with_backend(u64_config(4), CountingBackend::new()).unwrap();
    run_frame(&mut arena, 0);
    assert!(arena.block_count() > 1);
    let after_first = arena.backend().calls();

    for frame in 1..20 {
        arena.clear();
        assert_eq!(arena.count(), 0);
        let written = run_frame(&mut arena, frame);
        for (index, value) in written {
            assert_eq!(read_u64(&arena, index), value);
        }
    }
    assert_eq!(arena.backend().calls(), after_first);
}

#[test]
fn smaller_frames_reuse_without_growth() {
    let mut arena = LinAlloc::with_backend(u64_config(4), CountingBackend::new()).unwrap();
    run_frame(&mut arena, 0);
    let calls = arena.backend().calls();
    let bytes = arena.memory_bytes();
    arena.clear();
    push_run(&mut arena, &[1, 2, 3]);
    push_run(&mut arena, &[4]);
    assert_eq!(arena.backend().calls(), calls);
    assert_eq!(arena.memory_bytes(), bytes);
}

#[test]
fn larger_run_after_clear_grows_a_reused_block() {
    let mut arena = LinAlloc::with_backend(u64_config(4), CountingBackend::new()).unwrap();
    push_run(&mut arena, &[0; 4]);
    push_run(&mut arena, &[0; 1]); // block 1, capacity (4 + 1) * 2
    arena.clear();
    push_run(&mut arena, &[0; 4]);
    let before = arena.backend().calls();
    let start = push_run(&mut arena, &[7; 30]);
    let after = arena.backend().calls();
    assert_eq!(after.reallocate, before.reallocate + 1);
    assert_eq!(after.allocate_zeroed, before.allocate_zeroed);
    assert_eq!(arena.block_count(), 2);
    assert_eq!(arena.blocks().nth(1).unwrap().capacity, 4 + 30);
    assert_eq!(read_u64(&arena, start.offset(29)), 7);
}

#[test]
fn destroy_returns_every_byte() {
    let mut arena = LinAlloc::with_backend(u64_config(2), CountingBackend::new()).unwrap();
    run_frame(&mut arena, 0);
    assert!(arena.backend().live_bytes() > 0);
    arena.destroy();
    assert_eq!(arena.state(), ArenaState::Destroyed);
    assert_eq!(arena.backend().live_bytes(), 0);
    let calls = arena.backend().calls();
    assert_eq!(calls.deallocate, calls.allocate + calls.allocate_zeroed);
}

#[test]
fn drop_returns_every_byte() {
    let backend = CountingBackend::new();
    {
        let mut arena = LinAlloc::with_backend(u64_config(2), &backend).unwrap();
        for _ in 0..40 {
            arena.alloc(3).unwrap();
        }
        assert!(backend.live_bytes() > 0);
    }
    assert_eq!(backend.live_bytes(), 0);
}
