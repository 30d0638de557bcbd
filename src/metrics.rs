// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Pipeline counters
//!
//! Lock-free counters shared between the kernel and its sampling and
//! dispatch tasks.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters of a kernel
#[derive(Debug, Default)]
pub struct KernelStats {
    samples_read: AtomicU64,
    read_errors: AtomicU64,
    periods_detected: AtomicU64,
    notifications_dropped: AtomicU64,
    write_failures: AtomicU64,
}

/// Point-in-time copy of [`KernelStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Samples successfully read from the source
    pub samples_read: u64,
    /// Ticks skipped because the source failed to read
    pub read_errors: u64,
    /// Smoothed periods delivered by the detector
    pub periods_detected: u64,
    /// Periods dropped because the dispatch queue was full
    pub notifications_dropped: u64,
    /// Individual sink writes that failed
    pub write_failures: u64,
}

impl KernelStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&self) {
        self.samples_read.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_period(&self) {
        self.periods_detected.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_dropped_notification(&self) {
        self.notifications_dropped.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_write_failures(&self, count: usize) {
        self.write_failures.fetch_add(count as u64, Ordering::SeqCst);
    }

    /// Copy all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            samples_read: self.samples_read.load(Ordering::SeqCst),
            read_errors: self.read_errors.load(Ordering::SeqCst),
            periods_detected: self.periods_detected.load(Ordering::SeqCst),
            notifications_dropped: self.notifications_dropped.load(Ordering::SeqCst),
            write_failures: self.write_failures.load(Ordering::SeqCst),
        }
    }
}

impl StatsSnapshot {
    /// Fraction of ticks that produced a sample (0.0 - 1.0)
    pub fn read_success_rate(&self) -> f64 {
        let total = self.samples_read + self.read_errors;
        if total == 0 {
            return 0.0;
        }
        self.samples_read as f64 / total as f64
    }
}
