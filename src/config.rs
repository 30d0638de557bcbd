// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Configuration types for the detector and kernel

use crate::error::{PipelineError, Result};
use crate::limit::{NumericLimit, TimeLimit};
use std::time::Duration;

/// Default sampling interval of the kernel
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2);

/// Default normalized level that marks a "high"
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Period detector configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Normalized hysteresis threshold in `[0, 1]`
    pub threshold: f64,

    /// Samples in the value smoothing average
    pub value_window: usize,

    /// Samples in the min-max normalization window
    pub scaler_window: usize,

    /// Periods in the period smoothing average
    pub period_window: usize,

    /// Accepted periods (default: 180 to 40 BPM)
    pub period_limit: TimeLimit,

    /// Accepted raw sample values
    pub value_limit: NumericLimit,

    /// Accepted range of the normalization window
    pub amplitude_limit: NumericLimit,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            value_window: 20,
            scaler_window: 1000,
            period_window: 10,
            period_limit: TimeLimit::new(Duration::from_millis(333), Duration::from_millis(1500)),
            value_limit: NumericLimit::new(0.1, 0.98),
            amplitude_limit: NumericLimit::new(0.1, 0.9),
        }
    }
}

impl DetectorConfig {
    /// Default configuration with a custom threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Configuration with no value, amplitude or period bounds
    pub fn unbounded(threshold: f64) -> Self {
        Self {
            threshold,
            period_limit: TimeLimit::default(),
            value_limit: NumericLimit::default(),
            amplitude_limit: NumericLimit::default(),
            ..Default::default()
        }
    }

    /// Check windows, threshold and limits
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PipelineError::InvalidConfig(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        for (name, window) in [
            ("value_window", self.value_window),
            ("scaler_window", self.scaler_window),
            ("period_window", self.period_window),
        ] {
            if window == 0 {
                return Err(PipelineError::InvalidConfig(format!("{} must be > 0", name)));
            }
        }
        if self.period_limit.is_inverted() {
            return Err(PipelineError::InvalidConfig(format!(
                "period limit {} is inverted",
                self.period_limit
            )));
        }
        if self.value_limit.is_inverted() {
            return Err(PipelineError::InvalidConfig(format!(
                "value limit {} is inverted",
                self.value_limit
            )));
        }
        if self.amplitude_limit.is_inverted() {
            return Err(PipelineError::InvalidConfig(format!(
                "amplitude limit {} is inverted",
                self.amplitude_limit
            )));
        }
        Ok(())
    }
}

/// Kernel configuration
#[derive(Debug, Clone, PartialEq)]
pub struct KernelConfig {
    /// Sampling cadence
    pub interval: Duration,

    /// Unit the delivered rate is expressed in (60s gives beats per minute)
    pub rate_unit: Duration,

    /// Period notifications that may wait for the dispatcher
    pub notify_capacity: usize,

    /// Detector owned by the kernel
    pub detector: DetectorConfig,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            rate_unit: Duration::from_secs(60),
            notify_capacity: 8,
            detector: DetectorConfig::default(),
        }
    }
}

impl KernelConfig {
    /// Default configuration with a custom sampling interval
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(PipelineError::InvalidConfig("interval must be > 0".into()));
        }
        if self.rate_unit.is_zero() {
            return Err(PipelineError::InvalidConfig("rate_unit must be > 0".into()));
        }
        if self.notify_capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "notify_capacity must be > 0".into(),
            ));
        }
        self.detector.validate()
    }

    /// Rate delivered to sinks for a smoothed `period`
    pub fn rate(&self, period: Duration) -> f64 {
        self.rate_unit.as_secs_f64() / period.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_config_default() {
        let config = DetectorConfig::default();
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.value_window, 20);
        assert_eq!(config.scaler_window, 1000);
        assert_eq!(config.period_window, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_detector_config_rejects_bad_threshold() {
        let config = DetectorConfig::with_threshold(1.5);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_detector_config_rejects_zero_window() {
        let config = DetectorConfig {
            scaler_window: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scaler_window"));
    }

    #[test]
    fn test_detector_config_rejects_inverted_limit() {
        let config = DetectorConfig {
            amplitude_limit: NumericLimit::new(0.9, 0.1),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_kernel_config_default() {
        let config = KernelConfig::default();
        assert_eq!(config.interval, Duration::from_millis(2));
        assert_eq!(config.notify_capacity, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_kernel_config_rate_is_bpm() {
        let config = KernelConfig::default();
        assert_eq!(config.rate(Duration::from_millis(750)), 80.0);
        assert_eq!(config.rate(Duration::from_secs(1)), 60.0);
    }

    #[test]
    fn test_kernel_config_rejects_zero_interval() {
        let config = KernelConfig::with_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
