//! Closed numeric range.

use std::fmt;

use crate::error::{Result, SimError};

/// Closed interval `[min, max]` with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    min: f64,
    max: f64,
}

impl Interval {
    /// Create an interval, failing when `max < min` or a bound is not finite.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(SimError::Construction(format!(
                "interval bounds must be finite, got [{}, {}]",
                min, max
            )));
        }
        if max < min {
            return Err(SimError::Construction(format!(
                "wrong interval, max {} < min {}",
                max, min
            )));
        }
        Ok(Self { min, max })
    }

    /// Bounds already known to be ordered, e.g. the ends of a validated grid.
    pub(crate) fn from_ordered(min: f64, max: f64) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Closed containment test.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// True when `other` lies entirely inside this interval.
    pub fn includes(&self, other: &Interval) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    /// 1 inside the interval, 0 outside.
    #[inline]
    pub fn indicator(&self, x: f64) -> f64 {
        if self.contains(x) {
            1.0
        } else {
            0.0
        }
    }
}

impl TryFrom<[f64; 2]> for Interval {
    type Error = SimError;

    fn try_from(bounds: [f64; 2]) -> Result<Self> {
        Interval::new(bounds[0], bounds[1])
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
