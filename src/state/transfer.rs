//! Fluxes between two accessibility states of one class.

use super::State;
use crate::context::Context;
use crate::distribution::DiscreteDistribution;
use crate::error::{Result, SimError};
use crate::parameters::{Parameters, TransferKey};

#[derive(Debug, Clone, PartialEq)]
pub struct PoolTransfer {
    key: TransferKey,
    flux: Option<DiscreteDistribution>,
}

impl PoolTransfer {
    pub fn new(key: TransferKey) -> Self {
        Self { key, flux: None }
    }

    pub fn key(&self) -> &TransferKey {
        &self.key
    }

    pub fn is_evaluated(&self) -> bool {
        self.flux.is_some()
    }

    /// Flux = transfer function applied pointwise to the origin pool.
    pub fn evaluate(&mut self, parameters: &Parameters, context: &Context, state: &State) -> Result<()> {
        if self.flux.is_some() {
            return Err(SimError::Invariant(format!(
                "pool transfer {} at date {} is evaluated twice",
                self.key,
                state.date()
            )));
        }
        let traits = parameters.transfer(&self.key)?;
        let origin = state.substrate().pool_by_key(&self.key.origin_pool())?;
        let flux = traits
            .function
            .apply(parameters, context, Some(state), origin.distribution())?;
        self.flux = Some(flux);
        Ok(())
    }

    pub fn flux(&self) -> Result<&DiscreteDistribution> {
        self.flux
            .as_ref()
            .ok_or_else(|| SimError::Invariant(format!("pool transfer {} is not evaluated", self.key)))
    }
}
