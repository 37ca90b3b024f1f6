//! Fixed-capacity FIFO of recent records.

use crate::{ResultsError, ResultsResult};
use std::collections::VecDeque;

/// Two hours of one-second ticks.
pub const DEFAULT_HISTORY_CAPACITY: usize = 7200;

/// Records that carry a simulation time stamp (seconds).
pub trait Timestamped {
    fn time_s(&self) -> f64;
}

/// Ring buffer that drops the oldest entry once full.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> HistoryBuffer<T> {
    pub fn with_capacity(capacity: usize) -> ResultsResult<Self> {
        if capacity == 0 {
            return Err(ResultsError::ZeroCapacity);
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append `item`, returning the evicted oldest entry if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }
}

impl<T> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl<T: Timestamped> HistoryBuffer<T> {
    /// Records no older than `duration` seconds before the latest one.
    pub fn since(&self, duration: f64) -> impl Iterator<Item = &T> {
        let cutoff = self
            .latest()
            .map(|r| r.time_s() - duration)
            .unwrap_or(f64::INFINITY);
        self.items.iter().filter(move |r| r.time_s() >= cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Timestamped for f64 {
        fn time_s(&self) -> f64 {
            *self
        }
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            HistoryBuffer::<f64>::with_capacity(0),
            Err(ResultsError::ZeroCapacity)
        ));
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut buf = HistoryBuffer::with_capacity(3).unwrap();
        for t in 0..3 {
            assert_eq!(buf.push(t as f64), None);
        }
        assert_eq!(buf.push(3.0), Some(0.0));
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(buf.latest(), Some(&3.0));
    }

    #[test]
    fn since_keeps_trailing_window() {
        let mut buf = HistoryBuffer::with_capacity(100).unwrap();
        for t in 0..50 {
            buf.push(t as f64);
        }
        let window: Vec<f64> = buf.since(10.0).copied().collect();
        assert_eq!(window.first(), Some(&39.0));
        assert_eq!(window.len(), 11);
        assert_eq!(buf.since(1000.0).count(), 50);
    }

    #[test]
    fn since_on_empty_buffer_is_empty() {
        let buf = HistoryBuffer::<f64>::with_capacity(4).unwrap();
        assert_eq!(buf.since(10.0).count(), 0);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = HistoryBuffer::with_capacity(2).unwrap();
        buf.push(1.0);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 2);
        assert_eq!(buf.latest(), None);
    }

    #[test]
    fn default_capacity() {
        let buf = HistoryBuffer::<f64>::default();
        assert_eq!(buf.capacity(), DEFAULT_HISTORY_CAPACITY);
    }
}
