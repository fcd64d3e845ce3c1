//! Fixed-capacity circular buffer of cumulative samples.

use std::iter::Chain;
use std::slice;

use crate::error::{RateError, Result};

/// Circular buffer holding the last `capacity` values written to it.
///
/// Writes overwrite the oldest slot. Traversal always starts at the oldest
/// slot and visits every slot exactly once, including slots that were never
/// written (those hold `T::default()`). Callers that care about the
/// difference track how many writes happened themselves.
#[derive(Debug, Clone)]
pub struct Ring<T> {
    slots: Box<[T]>,
    cursor: usize,
}

/// Oldest-to-newest traversal over a [`Ring`].
pub type Iter<'a, T> = Chain<slice::Iter<'a, T>, slice::Iter<'a, T>>;

impl<T: Copy + Default> Ring<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RateError::InvalidCapacity);
        }

        Ok(Self {
            slots: vec![T::default(); capacity].into_boxed_slice(),
            cursor: 0,
        })
    }

    /// Overwrites the oldest slot and advances the cursor by one.
    pub fn push(&mut self, value: T) {
        self.slots[self.cursor] = value;
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    /// The most recently written value, or the default when nothing was written.
    pub fn latest(&self) -> T {
        let index = (self.cursor + self.slots.len() - 1) % self.slots.len();
        self.slots[index]
    }
}

impl<T> Ring<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates from the oldest slot to the newest one.
    ///
    /// The cursor always points at the oldest slot, so the traversal is the
    /// tail of the backing slice followed by its head.
    pub fn iter(&self) -> Iter<'_, T> {
        let (head, tail) = self.slots.split_at(self.cursor);
        tail.iter().chain(head.iter())
    }
}

impl<'a, T> IntoIterator for &'a Ring<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(ring: &Ring<u64>) -> Vec<u64> {
        ring.iter().copied().collect()
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert_eq!(Ring::<u64>::new(0).unwrap_err(), RateError::InvalidCapacity);
    }

    #[test]
    fn test_unwritten_slots_are_visited() {
        let mut ring = Ring::new(4).unwrap();
        assert_eq!(collect(&ring), vec![0, 0, 0, 0]);

        ring.push(7);
        assert_eq!(collect(&ring), vec![0, 0, 0, 7]);
        assert_eq!(ring.latest(), 7);
    }

    #[test]
    fn test_wraps_oldest_first() {
        let mut ring = Ring::new(3).unwrap();
        for value in 1..=5 {
            ring.push(value);
        }

        assert_eq!(collect(&ring), vec![3, 4, 5]);
        assert_eq!(ring.latest(), 5);
        assert_eq!(ring.capacity(), 3);
    }

    #[test]
    fn test_traversal_is_restartable() {
        let mut ring = Ring::new(2).unwrap();
        ring.push(1);
        ring.push(2);

        let first: Vec<_> = ring.iter().collect();
        let second: Vec<_> = (&ring).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(ring.iter().count(), 2);
    }

    #[test]
    fn test_single_slot_ring() {
        let mut ring = Ring::new(1).unwrap();
        ring.push(10);
        ring.push(11);

        assert_eq!(collect(&ring), vec![11]);
    }
}
