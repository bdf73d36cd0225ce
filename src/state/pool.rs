//! Carbon pools.

use crate::distribution::{DiscreteDistribution, PositiveDistribution};
use crate::error::{Result, SimError};
use crate::parameters::{Accessibility, PoolKey};

/// Non-negative carbon mass distribution of one (class, accessibility) pair.
/// Mass is the integral, in g C.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    class: String,
    accessibility: Accessibility,
    distribution: PositiveDistribution,
}

impl Pool {
    pub fn new(
        class: impl Into<String>,
        accessibility: Accessibility,
        distribution: PositiveDistribution,
    ) -> Self {
        Self {
            class: class.into(),
            accessibility,
            distribution,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    pub fn is_accessible(&self) -> bool {
        self.accessibility.is_accessible()
    }

    pub fn key(&self) -> PoolKey {
        PoolKey::new(self.class.clone(), self.accessibility)
    }

    /// Carbon mass (g).
    pub fn mass(&self) -> f64 {
        self.distribution.integral()
    }

    pub fn distribution(&self) -> &DiscreteDistribution {
        self.distribution.as_distribution()
    }

    pub fn positive(&self) -> &PositiveDistribution {
        &self.distribution
    }

    pub fn add(&mut self, delta: &DiscreteDistribution) -> Result<()> {
        self.distribution.add_assign(delta).map_err(|e| self.tag(e))
    }

    /// Fails if any value would become negative.
    pub fn remove(&mut self, delta: &DiscreteDistribution) -> Result<()> {
        self.distribution.sub_assign(delta).map_err(|e| self.tag(e))
    }

    pub fn set_values(&mut self, values: Vec<f64>) -> Result<()> {
        self.distribution.set_values(values).map_err(|e| self.tag(e))
    }

    fn tag(&self, error: SimError) -> SimError {
        match error {
            SimError::Invariant(msg) => SimError::Invariant(format!("pool {}: {}", self.key(), msg)),
            SimError::Domain(msg) => SimError::Domain(format!("pool {}: {}", self.key(), msg)),
            other => other,
        }
    }
}
