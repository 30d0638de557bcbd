// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Windowed running average
//!
//! A fixed-capacity ring buffer with a running sum. Each update subtracts the
//! value being overwritten before adding the new one, so [`WindowedAverage::get`]
//! is O(1) and the sum never has to be recomputed.

/// Running mean over the last `N` samples
#[derive(Debug, Clone)]
pub struct WindowedAverage {
    values: Vec<f64>,
    sum: f64,
    index: usize,
    count: usize,
}

impl WindowedAverage {
    /// Create an average over `window` samples (a zero window is treated as 1)
    pub fn new(window: usize) -> Self {
        Self {
            values: vec![0.0; window.max(1)],
            sum: 0.0,
            index: 0,
            count: 0,
        }
    }

    /// Record a sample, evicting the oldest once the window is full
    pub fn add(&mut self, value: f64) {
        if self.ready() {
            self.sum -= self.values[self.index];
        }

        self.values[self.index] = value;
        self.sum += value;
        self.count = (self.count + 1).min(self.window());
        self.index = (self.index + 1) % self.window();
    }

    /// Mean of the samples currently held, 0 before any sample
    pub fn get(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// True once a full window has been observed since construction or reset
    pub fn ready(&self) -> bool {
        self.count >= self.window()
    }

    /// Clear all samples
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
        self.sum = 0.0;
        self.index = 0;
        self.count = 0;
    }

    /// Window size
    pub fn window(&self) -> usize {
        self.values.len()
    }

    /// Number of samples held (saturates at the window size)
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if no sample has been added since construction or reset
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_average() {
        let avg = WindowedAverage::new(4);
        assert_eq!(avg.get(), 0.0);
        assert!(!avg.ready());
        assert!(avg.is_empty());
    }

    #[test]
    fn test_partial_window() {
        let mut avg = WindowedAverage::new(4);
        avg.add(2.0);
        avg.add(4.0);
        assert_relative_eq!(avg.get(), 3.0);
        assert!(!avg.ready());
        assert_eq!(avg.len(), 2);
    }

    #[test]
    fn test_sliding_window() {
        let mut avg = WindowedAverage::new(3);
        for v in [1.0, 2.0, 3.0] {
            avg.add(v);
        }
        assert!(avg.ready());
        assert_relative_eq!(avg.get(), 2.0);

        // 1.0 is evicted
        avg.add(7.0);
        assert_relative_eq!(avg.get(), 4.0);
        assert_eq!(avg.len(), 3);
    }

    #[test]
    fn test_matches_naive_mean() {
        let window = 5;
        let mut avg = WindowedAverage::new(window);
        let values: Vec<f64> = (0..60).map(|i| ((i * 37) % 11) as f64 * 0.25 - 1.0).collect();

        for (i, &v) in values.iter().enumerate() {
            avg.add(v);
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            let expected = slice.iter().sum::<f64>() / slice.len() as f64;
            assert_relative_eq!(avg.get(), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_reset() {
        let mut avg = WindowedAverage::new(2);
        avg.add(10.0);
        avg.add(20.0);
        assert!(avg.ready());

        avg.reset();
        assert!(!avg.ready());
        assert_eq!(avg.get(), 0.0);

        avg.add(5.0);
        assert_relative_eq!(avg.get(), 5.0);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let mut avg = WindowedAverage::new(0);
        assert_eq!(avg.window(), 1);
        avg.add(3.0);
        assert!(avg.ready());
        assert_relative_eq!(avg.get(), 3.0);
    }
}
