// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Windowed min-max scaler

use crate::extremum::{WindowedMax, WindowedMin};

/// Scaled value reported when the window has no range
pub const DEGENERATE_SCALE: f64 = 0.5;

/// Rescales values into `[0, 1]` relative to the range of a sliding window
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: WindowedMin,
    max: WindowedMax,
}

impl MinMaxScaler {
    /// Create a scaler over `window` samples
    pub fn new(window: usize) -> Self {
        Self {
            min: WindowedMin::new(window),
            max: WindowedMax::new(window),
        }
    }

    /// Add a sample to both extrema
    pub fn add(&mut self, value: f64) {
        self.min.add(value);
        self.max.add(value);
    }

    /// Scale `value` against the current window
    ///
    /// Returns [`DEGENERATE_SCALE`] when min equals max, so an empty or flat
    /// window never yields NaN or infinity.
    pub fn scale(&self, value: f64) -> f64 {
        let min = self.min.value();
        let max = self.max.value();
        if min == max {
            return DEGENERATE_SCALE;
        }
        (value - min) / (max - min)
    }

    /// Width of the current window, `max - min`
    pub fn range(&self) -> f64 {
        self.max.value() - self.min.value()
    }

    pub fn min(&self) -> f64 {
        self.min.value()
    }

    pub fn max(&self) -> f64 {
        self.max.value()
    }

    /// True once both extrema hold a full window
    pub fn ready(&self) -> bool {
        self.min.ready() && self.max.ready()
    }

    pub fn reset(&mut self) {
        self.min.reset();
        self.max.reset();
    }

    pub fn window(&self) -> usize {
        self.min.window()
    }
}
