// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Inclusive two-sided limits
//!
//! An endpoint of zero (or below) means "no bound on that side", so
//! `Limit::default()` accepts everything.

use std::fmt;
use std::time::Duration;

/// Values a [`Limit`] can bound
pub trait Bound: Copy + PartialOrd + fmt::Debug {
    /// True if this endpoint actually constrains the range
    fn is_set(&self) -> bool;
}

impl Bound for f64 {
    fn is_set(&self) -> bool {
        *self > 0.0
    }
}

impl Bound for Duration {
    fn is_set(&self) -> bool {
        !self.is_zero()
    }
}

/// Inclusive range check with optional sides
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Limit<T> {
    pub min: T,
    pub max: T,
}

/// Limit over periods
pub type TimeLimit = Limit<Duration>;

/// Limit over sample values and amplitudes
pub type NumericLimit = Limit<f64>;

impl<T: Bound> Limit<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// True if `value` respects both configured sides
    pub fn contains(&self, value: T) -> bool {
        if self.min.is_set() && value < self.min {
            return false;
        }
        if self.max.is_set() && value > self.max {
            return false;
        }
        true
    }

    /// True if both sides are set and min exceeds max
    pub fn is_inverted(&self) -> bool {
        self.min.is_set() && self.max.is_set() && self.min > self.max
    }
}

impl TimeLimit {
    /// Width of the limit: `max - min` when both sides are set, otherwise
    /// whichever side is configured
    pub fn span(&self) -> Duration {
        match (self.min.is_set(), self.max.is_set()) {
            (true, true) => self.max.saturating_sub(self.min),
            (false, true) => self.max,
            _ => self.min,
        }
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?}]", self.min, self.max)
    }
}

impl fmt::Display for NumericLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_limit_inclusive() {
        let limit = NumericLimit::new(0.1, 0.9);
        assert!(limit.contains(0.1));
        assert!(limit.contains(0.5));
        assert!(limit.contains(0.9));
        assert!(!limit.contains(0.05));
        assert!(!limit.contains(0.95));
    }

    #[test]
    fn test_unset_sides_are_open() {
        let open = NumericLimit::default();
        assert!(open.contains(-1e9));
        assert!(open.contains(1e9));

        let upper_only = NumericLimit::new(0.0, 1.0);
        assert!(upper_only.contains(-5.0));
        assert!(!upper_only.contains(1.5));

        let lower_only = TimeLimit::new(Duration::from_millis(300), Duration::ZERO);
        assert!(lower_only.contains(Duration::from_secs(60)));
        assert!(!lower_only.contains(Duration::from_millis(299)));
    }

    #[test]
    fn test_time_limit_span() {
        let ms = Duration::from_millis;
        assert_eq!(TimeLimit::new(ms(333), ms(1500)).span(), ms(1167));
        assert_eq!(TimeLimit::new(Duration::ZERO, ms(1500)).span(), ms(1500));
        assert_eq!(TimeLimit::new(ms(333), Duration::ZERO).span(), ms(333));
        assert_eq!(TimeLimit::default().span(), Duration::ZERO);
    }

    #[test]
    fn test_inverted() {
        assert!(NumericLimit::new(0.9, 0.1).is_inverted());
        assert!(!NumericLimit::new(0.0, 0.1).is_inverted());
    }

    #[test]
    fn test_display() {
        assert_eq!(NumericLimit::new(0.1, 0.98).to_string(), "[0.10, 0.98]");
        let limit = TimeLimit::new(Duration::from_millis(333), Duration::from_millis(1500));
        assert_eq!(limit.to_string(), "[333ms, 1.5s]");
    }
}
