//! Doubling-growth vector used for the block table and free registry.
//!
//! [`GrowVec`] wraps a `Vec` but owns the growth policy instead of
//! deferring to `Vec`'s amortisation: the first allocation reserves
//! [`GrowVec::INITIAL_CAPACITY`] slots, and every later growth doubles
//! the logical capacity (clamped up to the request if doubling is not
//! enough). Elements are addressed by slot index, never by reference
//! across a growth.

use linarena_core::fatal_assert;

/// Growable sequence with an explicit doubling policy.
#[derive(Clone, Debug)]
pub struct GrowVec<T> {
    items: Vec<T>,
    /// Logical capacity. Zero means no backing buffer has been reserved.
    capacity: usize,
}

impl<T> GrowVec<T> {
    /// Capacity reserved by the first `push`.
    pub const INITIAL_CAPACITY: usize = 4;

    /// Create an empty vector with no backing buffer.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            capacity: 0,
        }
    }

    /// Append `item` and return its slot index.
    ///
    /// Reserves [`Self::INITIAL_CAPACITY`] slots on first use and doubles
    /// the capacity whenever the vector is full.
    pub fn push(&mut self, item: T) -> usize {
        fatal_assert!(
            self.items.len() <= self.capacity,
            "grow vec length {} exceeds capacity {}",
            self.items.len(),
            self.capacity
        );
        if self.capacity == 0 {
            self.first_reserve(Self::INITIAL_CAPACITY);
        } else if self.items.len() == self.capacity {
            self.reserve_to(self.capacity * 2);
        }
        let slot = self.items.len();
        self.items.push(item);
        slot
    }

    /// Grow to hold at least `n` elements.
    ///
    /// A request at or above the current capacity doubles it, clamping up
    /// to `n` when doubling is still short. A first request reserves
    /// exactly `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    #[track_caller]
    pub fn ensure_capacity(&mut self, n: usize) {
        fatal_assert!(n > 0, "requested capacity must be positive");
        if self.capacity == 0 {
            self.first_reserve(n);
        } else if n >= self.capacity {
            self.reserve_to((self.capacity * 2).max(n));
        }
    }

    fn first_reserve(&mut self, n: usize) {
        fatal_assert!(
            self.items.is_empty(),
            "grow vec has elements but no reserved capacity"
        );
        self.reserve_to(n);
    }

    fn reserve_to(&mut self, capacity: usize) {
        self.items.reserve_exact(capacity - self.items.len());
        self.capacity = capacity;
    }

    /// Remove the element at `slot`, shifting later elements down.
    pub fn remove(&mut self, slot: usize) -> T {
        self.items.remove(slot)
    }

    /// Drop all elements, keeping the reserved capacity.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Logical capacity under the doubling policy.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All elements in slot order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// All elements in slot order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Iterate elements in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Remove and yield every element, leaving the vector empty with its
    /// capacity intact.
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.items.drain(..)
    }
}

impl<T> Default for GrowVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::ops::Index<usize> for GrowVec<T> {
    type Output = T;

    fn index(&self, slot: usize) -> &T {
        &self.items[slot]
    }
}

impl<T> std::ops::IndexMut<usize> for GrowVec<T> {
    fn index_mut(&mut self, slot: usize) -> &mut T {
        &mut self.items[slot]
    }
}
