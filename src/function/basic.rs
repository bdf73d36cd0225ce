//! Elementary closed-form helpers shared by the function variants.

use std::f64::consts::PI;

use crate::distribution::Interval;
use crate::error::{Result, SimError};

/// Normal density with the given mean and standard deviation.
#[inline]
pub fn gaussian(mean: f64, sd: f64, x: f64) -> f64 {
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * (2.0 * PI).sqrt())
}

/// 1 when `x` lies in `domain`, 0 otherwise.
#[inline]
pub fn indicator(domain: &Interval, x: f64) -> f64 {
    domain.indicator(x)
}

/// Standard deviations must be strictly positive.
pub fn check_sd(sd: f64) -> Result<()> {
    if sd > 0.0 && sd.is_finite() {
        Ok(())
    } else {
        Err(SimError::Construction(format!(
            "gaussian standard deviation must be positive, got {}",
            sd
        )))
    }
}
