//! Enzymes and their depolymerization activity.

use super::State;
use crate::context::Context;
use crate::distribution::{DiscreteDistribution, PositiveDistribution};
use crate::error::{Result, SimError};
use crate::function::Args;
use crate::parameters::Parameters;

#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeActivity {
    /// Rate at every grid point of the class
    pub depolymerization_rate: PositiveDistribution,
    /// Rate ⊙ accessible pool
    pub activity_distribution: DiscreteDistribution,
    /// Activity integrated over the depolymerization domain
    pub activity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enzyme {
    name: String,
    activity: Option<EnzymeActivity>,
}

impl Enzyme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activity: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_evaluated(&self) -> bool {
        self.activity.is_some()
    }

    /// Production is summed over the producing species in name order, so
    /// the result does not depend on declaration order.
    pub fn evaluate(&mut self, parameters: &Parameters, context: &Context, state: &State) -> Result<()> {
        if self.activity.is_some() {
            return Err(SimError::Invariant(format!(
                "enzyme {} at date {} is evaluated twice",
                self.name,
                state.date()
            )));
        }
        let traits = parameters.enzyme(&self.name)?;

        let mut production = 0.0;
        for species_name in parameters.enzyme_producers(&self.name) {
            let microbe = state.microbe(species_name)?;
            let function = parameters
                .species(species_name)?
                .enzyme_production()
                .get(&self.name)
                .ok_or_else(|| {
                    SimError::Setup(format!(
                        "species {} is listed as producer of {} without a production function",
                        species_name, self.name
                    ))
                })?;
            production += function.execute_at(parameters, context, Some(state), microbe.mass())?;
        }

        let pool = state.substrate().accessible_pool(&traits.class)?.distribution();
        let rate = pool.from_fn(|_, x| {
            traits
                .rate
                .execute(parameters, context, Some(state), Args::Two(x, production))
        })?;
        let depolymerization_rate = PositiveDistribution::try_from(rate).map_err(|e| {
            SimError::Invariant(format!("depolymerization rate of enzyme {}: {}", self.name, e))
        })?;
        let activity_distribution = depolymerization_rate.mul(pool)?;
        let activity = activity_distribution.integral_over(&traits.depolymerization_domain)?;

        self.activity = Some(EnzymeActivity {
            depolymerization_rate,
            activity_distribution,
            activity,
        });
        Ok(())
    }

    pub fn evaluation(&self) -> Result<&EnzymeActivity> {
        self.activity
            .as_ref()
            .ok_or_else(|| SimError::Invariant(format!("enzyme {} is not evaluated", self.name)))
    }

    pub fn depolymerization_rate(&self) -> Result<&PositiveDistribution> {
        Ok(&self.evaluation()?.depolymerization_rate)
    }

    pub fn activity_distribution(&self) -> Result<&DiscreteDistribution> {
        Ok(&self.evaluation()?.activity_distribution)
    }

    pub fn activity(&self) -> Result<f64> {
        Ok(self.evaluation()?.activity)
    }
}
