//! Fixed-step time discretization.

use crate::error::{Result, SimError};

/// Dates `t_i = t0 + i/k` where `k = floor(1 / user_step)` steps fit in one
/// time unit. Every integer date of `[t0, t_end]` is hit exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    unit: String,
    min: i64,
    max: i64,
    steps_per_unit: u64,
    dates: Vec<f64>,
}

impl Timeline {
    pub fn new(unit: impl Into<String>, min: i64, max: i64, user_step: f64) -> Result<Self> {
        if !(user_step > 0.0) || user_step > 1.0 {
            return Err(SimError::Construction(format!(
                "time step {} must be in (0, 1]",
                user_step
            )));
        }
        if max < min {
            return Err(SimError::Construction(format!(
                "timeline end {} is before its start {}",
                max, min
            )));
        }
        let steps_per_unit = (1.0 / user_step).floor() as u64;
        let k = steps_per_unit as i64;
        let n = (max - min) * k;
        let dates = (0..=n)
            .map(|i| {
                let (whole, frac) = (i / k, i % k);
                (min + whole) as f64 + frac as f64 / k as f64
            })
            .collect();
        Ok(Self {
            unit: unit.into(),
            min,
            max,
            steps_per_unit,
            dates,
        })
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Time step `dt = 1 / k`.
    pub fn step(&self) -> f64 {
        1.0 / self.steps_per_unit as f64
    }

    pub fn steps_per_unit(&self) -> u64 {
        self.steps_per_unit
    }

    pub fn dates(&self) -> &[f64] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Index of `date` in the timeline, if present.
    pub fn index_of(&self, date: f64) -> Option<usize> {
        self.dates.iter().position(|d| *d == date)
    }
}

/// Integer value of `date` when it has no fractional part.
pub fn integral_date(date: f64) -> Option<i64> {
    if date.fract() == 0.0 {
        Some(date as i64)
    } else {
        None
    }
}
