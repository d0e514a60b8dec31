//! Indexed binary min-heap
//!
//! Priority scheduling for the path search. Payloads are identity-keyed
//! through a side map, so `contains`, `remove`, and decrease-key updates are
//! cheap and at most one entry per payload ever exists.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// A min-heap of (payload, priority) pairs with at most one entry per
/// distinct payload
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    heap: Vec<(T, f32)>,
    index: FxHashMap<T, usize>,
}

impl<T: Copy + Eq + Hash> PriorityQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    /// Whether a payload is currently queued
    #[must_use]
    pub fn contains(&self, payload: T) -> bool {
        self.index.contains_key(&payload)
    }

    /// The minimum-priority payload without removing it
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.heap.first().map(|&(payload, _)| payload)
    }

    /// Insert a payload. If it is already queued this is an atomic
    /// remove-and-reinsert with the new priority.
    pub fn enqueue(&mut self, payload: T, priority: f32) {
        self.remove(payload);
        self.heap.push((payload, priority));
        self.index.insert(payload, self.heap.len() - 1);
        self.sift_up(self.heap.len() - 1);
    }

    /// Remove and return the minimum-priority payload
    pub fn dequeue(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let (payload, _) = self.heap.swap_remove(0);
        self.index.remove(&payload);
        if !self.heap.is_empty() {
            self.index.insert(self.heap[0].0, 0);
            self.sift_down(0);
        }
        Some(payload)
    }

    /// Remove an arbitrary payload by identity, restoring heap order
    pub fn remove(&mut self, payload: T) {
        let Some(pos) = self.index.remove(&payload) else {
            return;
        };
        if pos == self.heap.len() - 1 {
            self.heap.pop();
            return;
        }
        self.heap.swap_remove(pos);
        self.index.insert(self.heap[pos].0, pos);
        self.sift_down(pos);
        self.sift_up(pos);
    }

    /// Re-prioritize a queued payload; unknown payloads are ignored
    pub fn update_priority(&mut self, payload: T, priority: f32) {
        let Some(&pos) = self.index.get(&payload) else {
            return;
        };
        self.heap[pos].1 = priority;
        self.sift_down(pos);
        self.sift_up(pos);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].1 < self.heap[parent].1 {
                self.swap_entries(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            let right = 2 * pos + 2;
            let mut smallest = pos;
            if left < self.heap.len() && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }
            if right < self.heap.len() && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap_entries(pos, smallest);
            pos = smallest;
        }
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.index.insert(self.heap[a].0, a);
        self.index.insert(self.heap[b].0, b);
    }
}

impl<T: Copy + Eq + Hash> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn test_dequeue_in_priority_order() {
        let mut queue = PriorityQueue::new();
        for (payload, priority) in [(10, 5.0), (20, 1.0), (30, 3.0), (40, 4.0), (50, 2.0)] {
            queue.enqueue(payload, priority);
        }
        let order: Vec<i32> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(order, vec![20, 50, 30, 40, 10]);
    }

    #[test]
    fn test_dequeue_empty_returns_none() {
        let mut queue: PriorityQueue<u32> = PriorityQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_enqueue_existing_updates_instead_of_duplicating() {
        let mut queue = PriorityQueue::new();
        queue.enqueue(1, 10.0);
        queue.enqueue(2, 20.0);
        queue.enqueue(1, 30.0);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(1));
    }

    #[test]
    fn test_update_priority_reorders() {
        let mut queue = PriorityQueue::new();
        queue.enqueue(1, 10.0);
        queue.enqueue(2, 20.0);
        queue.enqueue(3, 30.0);
        queue.update_priority(3, 1.0);
        assert_eq!(queue.peek(), Some(3));
        queue.update_priority(3, 25.0);
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
    }

    #[test]
    fn test_remove_arbitrary_payload() {
        let mut queue = PriorityQueue::new();
        for p in 0..10 {
            queue.enqueue(p, p as f32);
        }
        queue.remove(0);
        queue.remove(5);
        queue.remove(99); // absent: no-op
        assert_eq!(queue.len(), 8);
        assert!(!queue.contains(5));
        let order: Vec<i32> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 6, 7, 8, 9]);
    }

    #[test]
    fn test_heap_property_under_random_operations() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut queue = PriorityQueue::new();

        for _ in 0..500 {
            let payload: u32 = rng.gen_range(0..64);
            match rng.gen_range(0..4) {
                0 | 1 => queue.enqueue(payload, rng.gen_range(0.0..100.0)),
                2 => queue.update_priority(payload, rng.gen_range(0.0..100.0)),
                _ => queue.remove(payload),
            }
            assert!(queue.len() <= 64, "duplicate payload entries exist");
        }

        let mut last = f32::NEG_INFINITY;
        while let Some(payload) = queue.peek() {
            let mut priority = f32::NAN;
            for &(p, pr) in &queue.heap {
                if p == payload {
                    priority = pr;
                }
            }
            assert!(priority >= last, "dequeue order not non-decreasing");
            last = priority;
            queue.dequeue();
        }
    }
}
