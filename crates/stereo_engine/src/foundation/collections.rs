//! Specialized collection types

/// Fixed-capacity FIFO delay line
///
/// Every [`push`](DelayLine::push) evicts the oldest entry, so the length is
/// always exactly the capacity. Storage is a single boxed slice addressed
/// through a head index; pushing never allocates.
///
/// Logical index 0 is the oldest entry and `capacity - 1` the newest.
#[derive(Debug, Clone)]
pub struct DelayLine<T> {
    slots: Box<[T]>,
    /// Physical slot holding the oldest entry
    head: usize,
}

impl<T: Clone> DelayLine<T> {
    /// Create a delay line pre-filled with `fill`
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn filled(capacity: usize, fill: T) -> Self {
        assert!(capacity > 0, "delay line capacity must be at least 1");
        Self {
            slots: vec![fill; capacity].into_boxed_slice(),
            head: 0,
        }
    }
}

impl<T> DelayLine<T> {
    /// Number of entries, always equal to the capacity
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Fixed capacity
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// A delay line is never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Drop the oldest entry and append `value` as the newest
    ///
    /// Returns the evicted value.
    pub fn push(&mut self, value: T) -> T {
        let evicted = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % self.slots.len();
        evicted
    }

    /// Entry at logical `index` (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.slots.len() {
            return None;
        }
        Some(&self.slots[(self.head + index) % self.slots.len()])
    }

    /// Entry recorded `frames_ago` pushes before the newest one
    ///
    /// `frames_ago == 0` is the newest entry, `capacity - 1` the oldest.
    /// Out-of-range requests are a caller bug; debug builds assert, release
    /// builds clamp to the oldest entry.
    pub fn delayed(&self, frames_ago: usize) -> &T {
        let capacity = self.slots.len();
        debug_assert!(
            frames_ago < capacity,
            "delay of {} frames exceeds delay line capacity {}",
            frames_ago,
            capacity
        );
        let frames_ago = frames_ago.min(capacity - 1);
        &self.slots[(self.head + capacity - frames_ago - 1) % capacity]
    }

    /// Newest entry
    pub fn newest(&self) -> &T {
        self.delayed(0)
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (wrapped, front) = self.slots.split_at(self.head);
        front.iter().chain(wrapped.iter())
    }
}
