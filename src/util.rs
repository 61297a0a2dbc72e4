//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if `min <= value < max`.
    pub fn contains_half_open(&self, value: T) -> bool {
        value >= self.min && value < self.max
    }
}

impl<T: Float> Interval<T> {
    /// Clamps a value into the interval.
    pub fn clamp(&self, value: T) -> T {
        value.max(self.min).min(self.max)
    }

    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// Wraps `value` into `[0, period)`.
///
/// Tiny negative inputs can make `rem_euclid` round up to exactly `period`,
/// which would fall outside every half-open span, so that case maps to zero.
pub fn wrap(value: f64, period: f64) -> f64 {
    let wrapped = value.rem_euclid(period);
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// The shortest distance between two positions on a loop of length `period`.
pub fn loop_distance(a: f64, b: f64, period: f64) -> f64 {
    let d = wrap(a - b, period);
    f64::min(d, period - d)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn wrap_handles_negative_and_multi_lap_values() {
        assert_approx_eq!(wrap(12.5, 10.0), 2.5);
        assert_approx_eq!(wrap(-2.5, 10.0), 7.5);
        assert_approx_eq!(wrap(-32.5, 10.0), 7.5);
        assert_eq!(wrap(-1e-18, 10.0), 0.0);
        assert!(wrap(10.0, 10.0) < 10.0);
    }

    #[test]
    fn loop_distance_is_symmetric_across_the_seam() {
        assert_approx_eq!(loop_distance(0.5, 99.5, 100.0), 1.0);
        assert_approx_eq!(loop_distance(99.5, 0.5, 100.0), 1.0);
        assert_approx_eq!(loop_distance(20.0, 30.0, 100.0), 10.0);
    }

    #[test]
    fn interval_helpers() {
        let span = Interval::new(2.0, 6.0);
        assert!(!span.contains_half_open(6.0));
        assert!(span.contains_half_open(2.0));
        assert_approx_eq!(span.lerp(0.25), 3.0);
        assert_approx_eq!(span.clamp(9.0), 6.0);
        assert_approx_eq!(span.clamp(-1.0), 2.0);
    }
}
