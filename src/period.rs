// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Hysteresis period detector
//!
//! Each call to [`PeriodDetector::update`] runs two phases:
//!
//! 1. **Value handling**: range check, smoothing average, min-max
//!    normalization, amplitude check, then the hysteresis transition against
//!    the threshold.
//! 2. **Period handling**: once a high has both a start and an end, its
//!    midpoint is taken as the peak. The distance to the previous peak is
//!    checked against the period limit and folded into a smoothing average.
//!
//! Listeners only hear about the smoothed period from the second confirmed
//! period after a reset onwards; the first is measured from an arbitrary edge.
//!
//! Any failed limit resets the transient state (timestamps, counter and both
//! averages). Configuration, listeners and the normalization window survive.

use crate::average::WindowedAverage;
use crate::config::DetectorConfig;
use crate::limit::{NumericLimit, TimeLimit};
use crate::scaler::MinMaxScaler;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn, Span};

/// Callback invoked once per confirmed, smoothed period
pub type PeriodListener = Box<dyn Fn(Duration) + Send>;

/// Hysteresis state derived from the tracked timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// No high is being tracked
    Idle,
    /// A high started and has not ended yet
    InHigh,
    /// The high ended and awaits period handling
    PendingClose,
}

/// Detects the dominant period of a noisy periodic signal
pub struct PeriodDetector {
    threshold: f64,

    listeners: Vec<PeriodListener>,

    high_start: Option<Instant>,
    high_end: Option<Instant>,
    prev_peak: Option<Instant>,

    period_count: u64,

    period_limit: TimeLimit,
    value_limit: NumericLimit,
    amplitude_limit: NumericLimit,

    value_avg: WindowedAverage,
    scaler: MinMaxScaler,
    period_avg: WindowedAverage,

    span: Span,
}

impl PeriodDetector {
    /// Create a detector with the default windows and no limits
    pub fn new(threshold: f64) -> Self {
        Self::from_config(&DetectorConfig::unbounded(threshold))
    }

    /// Create a detector from a full configuration
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            threshold: config.threshold,
            listeners: Vec::new(),
            high_start: None,
            high_end: None,
            prev_peak: None,
            period_count: 0,
            period_limit: config.period_limit,
            value_limit: config.value_limit,
            amplitude_limit: config.amplitude_limit,
            value_avg: WindowedAverage::new(config.value_window),
            scaler: MinMaxScaler::new(config.scaler_window),
            period_avg: WindowedAverage::new(config.period_window),
            span: tracing::debug_span!("waveform"),
        }
    }

    /// Scope every event of this detector to `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Process a sample taken now
    pub fn update(&mut self, value: f64) -> f64 {
        self.update_at(value, Instant::now())
    }

    /// Process a sample taken at `now`
    ///
    /// Returns the normalized value, or the raw/smoothed value while the
    /// windows are still warming up or after a rejection.
    pub fn update_at(&mut self, value: f64, now: Instant) -> f64 {
        let value = self.handle_value(value, now);
        self.handle_period();
        value
    }

    /// Return to idle, keeping configuration, listeners and the scaler window
    pub fn reset(&mut self) {
        self.high_start = None;
        self.high_end = None;
        self.prev_peak = None;
        self.period_count = 0;
        self.period_avg.reset();
        self.value_avg.reset();
    }

    pub fn set_period_limit(&mut self, limit: TimeLimit) {
        self.period_limit = limit;
    }

    pub fn set_value_limit(&mut self, limit: NumericLimit) {
        self.value_limit = limit;
    }

    pub fn set_amplitude_limit(&mut self, limit: NumericLimit) {
        self.amplitude_limit = limit;
    }

    /// Register a listener for smoothed periods
    ///
    /// Listeners run inline on the caller of `update`; anything slow belongs
    /// behind a queue.
    pub fn on_period<F>(&mut self, listener: F)
    where
        F: Fn(Duration) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn period_limit(&self) -> TimeLimit {
        self.period_limit
    }

    pub fn value_limit(&self) -> NumericLimit {
        self.value_limit
    }

    pub fn amplitude_limit(&self) -> NumericLimit {
        self.amplitude_limit
    }

    /// Periods confirmed since the last reset
    pub fn period_count(&self) -> u64 {
        self.period_count
    }

    /// Current smoothed period, if any period has been confirmed
    pub fn smoothed_period(&self) -> Option<Duration> {
        if self.period_avg.is_empty() {
            None
        } else {
            Some(to_millis(self.period_avg.get()))
        }
    }

    pub fn state(&self) -> DetectorState {
        match (self.high_start, self.high_end) {
            (None, _) => DetectorState::Idle,
            (Some(_), None) => DetectorState::InHigh,
            (Some(_), Some(_)) => DetectorState::PendingClose,
        }
    }

    fn handle_value(&mut self, value: f64, now: Instant) -> f64 {
        if !value.is_finite() || !self.value_limit.contains(value) {
            warn!(parent: &self.span, value, limit = %self.value_limit, "value out of range");
            self.reset();
            return value;
        }

        self.value_avg.add(value);
        if !self.value_avg.ready() {
            return value;
        }
        let smoothed = self.value_avg.get();

        self.scaler.add(smoothed);
        if !self.scaler.ready() {
            return smoothed;
        }

        let range = self.scaler.range();
        if !self.amplitude_limit.contains(range) {
            warn!(parent: &self.span, range, limit = %self.amplitude_limit, "amplitude out of range");
            self.reset();
            return smoothed;
        }

        let value = self.scaler.scale(smoothed);

        if value > self.threshold && self.high_start.is_none() {
            self.high_start = Some(now);
        } else if value < self.threshold && self.high_end.is_none() && self.high_start.is_some() {
            self.high_end = Some(now);
        }

        value
    }

    fn handle_period(&mut self) {
        let (Some(start), Some(end)) = (self.high_start, self.high_end) else {
            return;
        };

        let midpoint = start + end.saturating_duration_since(start) / 2;

        if let Some(prev) = self.prev_peak {
            let period = midpoint.saturating_duration_since(prev);
            if !self.period_limit.contains(period) {
                warn!(
                    parent: &self.span,
                    period_secs = period.as_secs_f64(),
                    limit = %self.period_limit,
                    "period out of range"
                );
                self.reset();
                return;
            }

            self.period_avg.add(period.as_secs_f64());
            self.period_count += 1;

            if self.period_count > 1 {
                let smoothed = to_millis(self.period_avg.get());
                debug!(
                    parent: &self.span,
                    period_ms = period.as_millis() as u64,
                    smoothed_ms = smoothed.as_millis() as u64,
                    count = self.period_count,
                    "period confirmed"
                );
                for listener in &self.listeners {
                    listener(smoothed);
                }
            }
        }

        self.prev_peak = Some(midpoint);
        self.high_start = None;
        self.high_end = None;
    }
}

impl fmt::Debug for PeriodDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodDetector")
            .field("threshold", &self.threshold)
            .field("state", &self.state())
            .field("period_count", &self.period_count)
            .field("period_limit", &self.period_limit)
            .field("value_limit", &self.value_limit)
            .field("amplitude_limit", &self.amplitude_limit)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Seconds to a whole-millisecond duration (truncating)
fn to_millis(secs: f64) -> Duration {
    Duration::from_millis((secs * 1000.0) as u64)
}
