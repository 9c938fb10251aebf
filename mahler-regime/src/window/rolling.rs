//! Fixed-capacity rolling window.
//!
//! Backed by a pre-sized arena and a write index: once full, every push
//! overwrites the oldest slot, so memory is bounded by the capacity chosen
//! at construction no matter how many observations arrive.

use std::iter::Chain;
use std::slice;

/// Circular buffer holding at most `capacity` elements, oldest evicted first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    slots: Vec<T>,
    capacity: usize,
    /// Index of the slot the next push writes to once the window is full.
    head: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Append a value, returning the evicted element if the window was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Get the element at chronological position `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.slots.len() {
            return None;
        }
        let physical = if self.is_full() {
            (self.head + index) % self.capacity
        } else {
            index
        };
        self.slots.get(physical)
    }

    /// Most recently pushed element.
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> Chain<slice::Iter<'_, T>, slice::Iter<'_, T>> {
        // `head` stays at zero until the window fills, so this split is a
        // no-op for a partially filled window.
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Iterate over the newest `n` elements, oldest of those first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &T> + '_ {
        let skip = self.len().saturating_sub(n);
        self.iter().skip(skip)
    }

    /// Drop every element, keeping the allocation.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Copy the contents out in chronological order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity() {
        let mut window = RollingWindow::new(3);
        assert!(window.push(1).is_none());
        assert!(window.push(2).is_none());
        assert_eq!(window.len(), 2);
        assert!(!window.is_full());
        assert_eq!(window.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut window = RollingWindow::new(3);
        for i in 1..=3 {
            window.push(i);
        }
        assert_eq!(window.push(4), Some(1));
        assert_eq!(window.push(5), Some(2));
        assert_eq!(window.to_vec(), vec![3, 4, 5]);
        assert_eq!(window.last(), Some(&5));
        assert_eq!(window.get(0), Some(&3));
        assert_eq!(window.get(3), None);
    }

    #[test]
    fn test_wraps_many_times() {
        let mut window = RollingWindow::new(4);
        for i in 0..1_000 {
            window.push(i);
        }
        assert_eq!(window.len(), 4);
        assert_eq!(window.to_vec(), vec![996, 997, 998, 999]);
        let reversed: Vec<_> = window.iter().rev().copied().collect();
        assert_eq!(reversed, vec![999, 998, 997, 996]);
    }

    #[test]
    fn test_tail() {
        let mut window = RollingWindow::new(5);
        for i in 0..7 {
            window.push(i);
        }
        let tail: Vec<_> = window.tail(3).copied().collect();
        assert_eq!(tail, vec![4, 5, 6]);

        let all: Vec<_> = window.tail(10).copied().collect();
        assert_eq!(all, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_zero_capacity_coerced() {
        let mut window = RollingWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.push('a');
        assert_eq!(window.push('b'), Some('a'));
        assert_eq!(window.to_vec(), vec!['b']);
    }

    #[test]
    fn test_clear() {
        let mut window = RollingWindow::new(2);
        window.push(1.0);
        window.push(2.0);
        window.push(3.0);
        window.clear();
        assert!(window.is_empty());
        window.push(4.0);
        assert_eq!(window.to_vec(), vec![4.0]);
    }
}
