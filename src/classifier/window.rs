use std::collections::{vec_deque, VecDeque};

/// Fixed-capacity ring buffer: pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Fraction of entries matching `pred`; `0.0` when empty.
    pub fn fraction(&self, pred: impl Fn(&T) -> bool) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        let matching = self.items.iter().filter(|item| pred(item)).count();
        matching as f64 / self.items.len() as f64
    }
}
