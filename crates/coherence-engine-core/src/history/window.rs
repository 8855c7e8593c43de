//! Bounded FIFO buffer and population statistics over f64 samples.

use std::collections::VecDeque;

/// A generic rolling window buffer with fixed capacity.
///
/// Pushing into a full window evicts the oldest item first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create a new rolling window. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add an item, evicting the oldest one when full.
    pub fn push(&mut self, item: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Iterate over the newest `n` items, oldest of those first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &T> {
        self.buffer.iter().skip(self.buffer.len().saturating_sub(n))
    }

    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Window contents, oldest to newest.
    pub fn to_vec(&self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }
}

impl RollingWindow<f64> {
    /// Newest `n` values as an owned vector.
    pub fn tail_vec(&self, n: usize) -> Vec<f64> {
        self.tail(n).copied().collect()
    }

    pub fn min(&self) -> Option<f64> {
        self.buffer.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.buffer.iter().copied().reduce(f64::max)
    }

    pub fn average(&self) -> Option<f64> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(self.buffer.iter().sum::<f64>() / self.buffer.len() as f64)
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance around `mean` (divides by n); 0 for an empty slice.
pub fn population_variance(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation around `mean`.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    population_variance(values, mean).sqrt()
}
