// Artbit Plugins - Sources and sinks
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Synthetic waveform source
//!
//! Produces a sine between `low` and `high`, advanced by a fixed sample step
//! per read regardless of wall-clock time, with optional noise bursts. The
//! output is always clamped to `[0, 1]`, the range of a normalized ADC.

use crate::noise::NoiseGenerator;
use artbit::{PipelineError, Result, Source};
use async_trait::async_trait;
use std::f64::consts::PI;
use std::time::Duration;
use tracing::{debug, info, Span};

/// Waveform parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WaveConfig {
    /// Sine frequency (1.3 Hz is 78 BPM)
    pub frequency_hz: f64,
    /// Trough of the wave
    pub low: f64,
    /// Crest of the wave
    pub high: f64,
    /// Simulated time between two reads
    pub step: Duration,
    /// Peak offset of a noise burst; zero disables noise
    pub noise_amplitude: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1.3,
            low: 0.3,
            high: 0.7,
            step: Duration::from_millis(2),
            noise_amplitude: 0.1,
        }
    }
}

impl WaveConfig {
    /// Noise-free wave with the given period
    pub fn clean(period: Duration) -> Self {
        Self {
            frequency_hz: 1.0 / period.as_secs_f64(),
            noise_amplitude: 0.0,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.frequency_hz.is_finite() && self.frequency_hz > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "wave frequency {} must be positive",
                self.frequency_hz
            )));
        }
        if !(self.low.is_finite() && self.high.is_finite()) || self.low > self.high {
            return Err(PipelineError::InvalidConfig(format!(
                "wave range [{}, {}] is invalid",
                self.low, self.high
            )));
        }
        if self.step.is_zero() {
            return Err(PipelineError::InvalidConfig("wave step must be > 0".into()));
        }
        if !self.noise_amplitude.is_finite() {
            return Err(PipelineError::InvalidConfig(format!(
                "noise amplitude {} must be finite",
                self.noise_amplitude
            )));
        }
        Ok(())
    }

    /// Noise-free value of read number `index`
    pub fn value_at(&self, index: u64) -> f64 {
        let t = index as f64 * self.step.as_secs_f64();
        let mid = (self.low + self.high) / 2.0;
        let half = (self.high - self.low) / 2.0;
        mid + half * (2.0 * PI * self.frequency_hz * t).sin()
    }
}

/// Sine source with noise bursts
#[derive(Debug)]
pub struct WaveSource {
    config: WaveConfig,
    noise: Option<NoiseGenerator>,
    counter: u64,
    span: Span,
}

impl WaveSource {
    pub fn new(config: WaveConfig) -> Self {
        let noise = (config.noise_amplitude != 0.0).then(|| NoiseGenerator::new(config.noise_amplitude));
        Self {
            config,
            noise,
            counter: 0,
            span: tracing::debug_span!("wave_source"),
        }
    }

    /// Reseed the noise generator for reproducible output
    pub fn with_seed(mut self, seed: u64) -> Self {
        if self.noise.is_some() {
            self.noise = Some(NoiseGenerator::seeded(self.config.noise_amplitude, seed));
        }
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Reads served so far
    pub fn reads(&self) -> u64 {
        self.counter
    }

    /// Produce the next sample
    pub fn next_value(&mut self) -> f64 {
        let mut value = self.config.value_at(self.counter);
        self.counter += 1;
        if let Some(offset) = self.noise.as_mut().and_then(NoiseGenerator::next_offset) {
            value += offset;
        }
        value.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl Source for WaveSource {
    async fn start(&mut self) -> Result<()> {
        self.config.validate()?;
        info!(
            parent: &self.span,
            frequency_hz = self.config.frequency_hz,
            low = self.config.low,
            high = self.config.high,
            noise = self.config.noise_amplitude,
            "wave source started"
        );
        Ok(())
    }

    async fn read(&mut self) -> Result<f64> {
        Ok(self.next_value())
    }

    async fn stop(&mut self) -> Result<()> {
        debug!(parent: &self.span, reads = self.counter, "wave source stopped");
        Ok(())
    }
}
