// Artbit Plugins - Sources and sinks
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Random noise bursts
//!
//! Emits a uniform offset in `[-amplitude, amplitude]` after a random gap of
//! `0..max_gap` reads, then draws the next gap.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default upper bound (exclusive) of the gap between bursts, in reads
pub const DEFAULT_MAX_GAP: u32 = 100;

/// Sparse random offsets
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    rng: StdRng,
    amplitude: f64,
    max_gap: u32,
    gap: u32,
    counter: u32,
}

impl NoiseGenerator {
    /// Generator seeded from the OS
    pub fn new(amplitude: f64) -> Self {
        Self::from_rng(StdRng::from_entropy(), amplitude)
    }

    /// Deterministic generator
    pub fn seeded(amplitude: f64, seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), amplitude)
    }

    /// A non-finite amplitude produces silent bursts
    fn from_rng(mut rng: StdRng, amplitude: f64) -> Self {
        let gap = rng.gen_range(0..DEFAULT_MAX_GAP);
        let amplitude = if amplitude.is_finite() { amplitude.abs() } else { 0.0 };
        Self {
            rng,
            amplitude,
            max_gap: DEFAULT_MAX_GAP,
            gap,
            counter: 0,
        }
    }

    /// Change the gap bound; takes effect from the next burst
    pub fn with_max_gap(mut self, max_gap: u32) -> Self {
        self.max_gap = max_gap.max(1);
        self
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Advance one read; `Some(offset)` when a burst fires
    pub fn next_offset(&mut self) -> Option<f64> {
        self.counter += 1;
        if self.counter < self.gap {
            return None;
        }
        self.counter = 0;
        self.gap = self.rng.gen_range(0..self.max_gap);
        if self.amplitude == 0.0 {
            return Some(0.0);
        }
        Some(self.rng.gen_range(-self.amplitude..=self.amplitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_within_amplitude() {
        let mut noise = NoiseGenerator::seeded(0.1, 1);
        let offsets: Vec<f64> = (0..10_000).filter_map(|_| noise.next_offset()).collect();
        assert!(!offsets.is_empty());
        assert!(offsets.iter().all(|o| o.abs() <= 0.1));
    }

    #[test]
    fn test_bursts_are_sparse() {
        let mut noise = NoiseGenerator::seeded(0.1, 2);
        let bursts = (0..10_000).filter(|_| noise.next_offset().is_some()).count();
        // mean gap is about 50 reads
        assert!(bursts > 100, "{} bursts", bursts);
        assert!(bursts < 1_000, "{} bursts", bursts);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let mut a = NoiseGenerator::seeded(0.2, 99);
        let mut b = NoiseGenerator::seeded(0.2, 99);
        for _ in 0..1_000 {
            assert_eq!(a.next_offset(), b.next_offset());
        }
    }

    #[test]
    fn test_gap_of_one_fires_every_read() {
        let mut noise = NoiseGenerator::seeded(0.05, 3).with_max_gap(1);
        // the first gap was drawn from the default bound
        for _ in 0..DEFAULT_MAX_GAP {
            noise.next_offset();
        }
        assert!((0..50).all(|_| noise.next_offset().is_some()));
    }

    #[test]
    fn test_non_finite_amplitude_is_silent() {
        for amplitude in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut noise = NoiseGenerator::seeded(amplitude, 6).with_max_gap(1);
            assert_eq!(noise.amplitude(), 0.0);
            for _ in 0..500 {
                if let Some(offset) = noise.next_offset() {
                    assert_eq!(offset, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_zero_amplitude() {
        let mut noise = NoiseGenerator::seeded(0.0, 4).with_max_gap(1);
        for _ in 0..200 {
            if let Some(offset) = noise.next_offset() {
                assert_eq!(offset, 0.0);
            }
        }
    }
}
