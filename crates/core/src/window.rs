use std::collections::VecDeque;

/// Default number of live samples kept per series (one minute at 2 s/tick).
pub const DEFAULT_CAPACITY: usize = 30;

/// Fixed-capacity FIFO sequence backing every live chart series.
///
/// `push` evicts the oldest element once the capacity would be exceeded, so
/// `len() <= capacity()` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow<T> {
    samples:  VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// A zero capacity is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new sample, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.samples.iter()
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Snapshot in arrival order, ready to hand to a chart.
    pub fn to_vec(&self) -> Vec<T> {
        self.samples.iter().cloned().collect()
    }
}

impl RollingWindow<f64> {
    /// Average of all samples in the window.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Largest sample, or 0 for an empty window.
    pub fn max(&self) -> f64 {
        self.samples.iter().copied().fold(0.0, f64::max)
    }
}

impl<T> Default for RollingWindow<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_capacity_keeps_everything() {
        let mut w = RollingWindow::new(30);
        for v in [10.0, 20.0, 15.0] {
            w.push(v);
        }
        assert_eq!(w.to_vec(), vec![10.0, 20.0, 15.0]);
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn thirty_one_pushes_evict_the_first() {
        let mut w = RollingWindow::new(30);
        for v in 1..=31 {
            w.push(v);
        }
        assert_eq!(w.to_vec(), (2..=31).collect::<Vec<_>>());
    }

    #[test]
    fn long_runs_hold_most_recent_in_order() {
        let mut w = RollingWindow::new(30);
        for v in 0..1000 {
            w.push(v);
            assert!(w.len() <= 30);
        }
        assert_eq!(w.to_vec(), (970..1000).collect::<Vec<_>>());
    }

    #[test]
    fn push_reports_evicted_value() {
        let mut w = RollingWindow::new(2);
        assert_eq!(w.push('a'), None);
        assert_eq!(w.push('b'), None);
        assert_eq!(w.push('c'), Some('a'));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut w = RollingWindow::new(0);
        w.push(1);
        w.push(2);
        assert_eq!(w.capacity(), 1);
        assert_eq!(w.to_vec(), vec![2]);
    }

    #[test]
    fn average_and_max_of_empty_window_are_zero() {
        let w: RollingWindow<f64> = RollingWindow::default();
        assert_eq!(w.average(), 0.0);
        assert_eq!(w.max(), 0.0);
    }

    #[test]
    fn max_tracks_evictions() {
        let mut w = RollingWindow::new(2);
        for v in [9.0, 1.0, 2.0] {
            w.push(v);
        }
        assert_eq!(w.max(), 2.0);
        assert_eq!(w.average(), 1.5);
    }
}
