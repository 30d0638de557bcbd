// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! # Artbit - Pulse period detection
//!
//! Turns a noisy periodic analog signal (a pulse sampled from a finger-clip
//! sensor, for instance) into a validated, smoothed period and fans the
//! derived rate out to any number of sinks.
//!
//! ## Key Features
//!
//! - **Streaming statistics**: O(1) windowed average, O(1) amortized windowed
//!   min/max, and a min-max scaler built from them
//! - **Validated periods**: value, amplitude and period limits reset the
//!   detector whenever the signal stops being trustworthy
//! - **Hysteresis peaks**: the midpoint of each high is taken as the peak
//! - **Concurrent fan-out**: every sink is written concurrently, failures are
//!   isolated and aggregated
//!
//! ## Quick Start
//!
//! ```rust
//! use artbit::PeriodDetector;
//! use std::time::{Duration, Instant};
//!
//! let mut detector = PeriodDetector::new(0.8);
//! detector.on_period(|period| println!("{:.1} BPM", 60.0 / period.as_secs_f64()));
//!
//! let start = Instant::now();
//! for i in 0..5_000u32 {
//!     let t = i as f64 * 0.002;
//!     let value = 0.5 + 0.2 * (2.0 * std::f64::consts::PI * t / 0.8).sin();
//!     detector.update_at(value, start + Duration::from_millis(2) * i);
//! }
//! assert!(detector.period_count() > 0);
//! ```
//!
//! ## Modules
//!
//! - [`average`]: windowed running mean
//! - [`extremum`]: windowed minimum and maximum
//! - [`scaler`]: windowed min-max scaler
//! - [`limit`]: inclusive value and time limits
//! - [`period`]: hysteresis period detector
//! - [`connector`]: source and sink abstractions
//! - [`kernel`]: sampling loop and sink fan-out
//! - [`config`]: detector and kernel configuration
//! - [`metrics`]: pipeline counters

// Modules
pub mod average;
pub mod config;
pub mod connector;
pub mod error;
pub mod extremum;
pub mod kernel;
pub mod limit;
pub mod metrics;
pub mod period;
pub mod scaler;

// Re-exports for convenient access
pub use average::WindowedAverage;
pub use config::{DetectorConfig, KernelConfig, DEFAULT_INTERVAL, DEFAULT_THRESHOLD};
pub use connector::{Lifecycle, MemorySink, MemorySinkState, MemorySource, Sink, Source};
pub use error::{ComponentFailure, PipelineError, Result, Stage};
pub use extremum::{WindowedExtremum, WindowedMax, WindowedMin};
pub use kernel::{fan_out, Kernel};
pub use limit::{Limit, NumericLimit, TimeLimit};
pub use metrics::{KernelStats, StatsSnapshot};
pub use period::{DetectorState, PeriodDetector, PeriodListener};
pub use scaler::MinMaxScaler;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
