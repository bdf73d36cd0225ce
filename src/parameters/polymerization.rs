//! Biochemical classes and their polymerization grids.

use crate::distribution::Interval;
use crate::error::{Result, SimError};

/// Uniform discretization of a polymerization domain.
///
/// The user step is shrunk so that an integer number of steps covers the
/// domain: `n = floor(length / user_step)`, `step = length / n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polymerization {
    domain: Interval,
    step: f64,
    grid: Vec<f64>,
}

impl Polymerization {
    pub fn new(min: f64, max: f64, user_step: f64) -> Result<Self> {
        let domain = Interval::new(min, max)?;
        if !(user_step > 0.0) {
            return Err(SimError::Construction(format!(
                "polymerization step must be positive, got {}",
                user_step
            )));
        }
        if domain.length() < user_step {
            return Err(SimError::Construction(format!(
                "polymerization domain {} is shorter than the user step {}",
                domain, user_step
            )));
        }
        let n_steps = ((domain.length() / user_step).floor() as usize).max(1);
        let step = domain.length() / n_steps as f64;
        let mut grid: Vec<f64> = (0..=n_steps).map(|i| min + i as f64 * step).collect();
        // grid support and nominal domain must agree exactly
        grid[n_steps] = max;
        Ok(Self { domain, step, grid })
    }

    pub fn domain(&self) -> &Interval {
        &self.domain
    }

    /// Final grid step.
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// Named substrate category with its own polymerization grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BiochemicalClass {
    name: String,
    polymerization: Polymerization,
}

impl BiochemicalClass {
    pub fn new(name: impl Into<String>, polymerization: Polymerization) -> Self {
        Self {
            name: name.into(),
            polymerization,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polymerization(&self) -> &Polymerization {
        &self.polymerization
    }
}
