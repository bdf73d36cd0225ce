//! Non-negative distribution wrapper.

use std::ops::Deref;

use super::{DiscreteDistribution, IntegrationMethod};
use crate::error::{Result, SimError};

/// A [`DiscreteDistribution`] whose values are all `>= 0`.
///
/// The invariant is checked on construction and after every mutating call.
/// A violation is an error, values are never clamped. Read access goes
/// through `Deref`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositiveDistribution(DiscreteDistribution);

impl PositiveDistribution {
    pub fn new(x: Vec<f64>, y: Vec<f64>, method: IntegrationMethod) -> Result<Self> {
        Self::try_from(DiscreteDistribution::new(x, y, method)?)
    }

    pub fn zeros(x: Vec<f64>, method: IntegrationMethod) -> Result<Self> {
        Ok(Self(DiscreteDistribution::zeros(x, method)?))
    }

    pub fn as_distribution(&self) -> &DiscreteDistribution {
        &self.0
    }

    pub fn into_inner(self) -> DiscreteDistribution {
        self.0
    }

    pub fn add_assign(&mut self, other: &DiscreteDistribution) -> Result<()> {
        self.0.add_assign(other)?;
        self.check()
    }

    pub fn sub_assign(&mut self, other: &DiscreteDistribution) -> Result<()> {
        self.0.sub_assign(other)?;
        self.check()
    }

    pub fn mul_assign(&mut self, other: &DiscreteDistribution) -> Result<()> {
        self.0.mul_assign(other)?;
        self.check()
    }

    pub fn scale(&mut self, factor: f64) -> Result<()> {
        self.0.scale(factor);
        self.check()
    }

    pub fn set_values(&mut self, y: Vec<f64>) -> Result<()> {
        self.0.set_values(y)?;
        self.check()
    }

    pub fn normalize(&mut self) -> Result<()> {
        self.0.normalize();
        self.check()
    }

    pub fn proportionalize(&mut self, target: f64) -> Result<()> {
        self.0.proportionalize(target)?;
        self.check()
    }

    fn check(&self) -> Result<()> {
        ensure_non_negative(&self.0)
    }
}

impl Deref for PositiveDistribution {
    type Target = DiscreteDistribution;

    fn deref(&self) -> &DiscreteDistribution {
        &self.0
    }
}

impl TryFrom<DiscreteDistribution> for PositiveDistribution {
    type Error = SimError;

    fn try_from(distribution: DiscreteDistribution) -> Result<Self> {
        ensure_non_negative(&distribution)?;
        Ok(Self(distribution))
    }
}

fn ensure_non_negative(distribution: &DiscreteDistribution) -> Result<()> {
    match distribution
        .y()
        .iter()
        .enumerate()
        .find(|(_, v)| !(**v >= 0.0))
    {
        Some((i, v)) => Err(SimError::Invariant(format!(
            "negative value {} at x = {} in a positive distribution",
            v,
            distribution.x()[i]
        ))),
        None => Ok(()),
    }
}
