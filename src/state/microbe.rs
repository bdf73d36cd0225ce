//! Microbial biomass and its per-step assimilation fluxes.

use std::collections::BTreeMap;

use super::State;
use crate::context::Context;
use crate::distribution::DiscreteDistribution;
use crate::error::{Result, SimError};
use crate::parameters::Parameters;

/// Values derived by [`Microbe::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct MicrobeFluxes {
    /// Class → uptake flux on the accessible pool grid
    pub uptake_flux: BTreeMap<String, DiscreteDistribution>,
    /// Class → carbon use efficiency on the accessible pool grid
    pub carbon_use_efficiency: BTreeMap<String, DiscreteDistribution>,
    /// Σ ∫ (1 - efficiency) · uptake
    pub respiration: f64,
    pub mortality_flux: f64,
}

/// Biomass of one species at one date.
#[derive(Debug, Clone, PartialEq)]
pub struct Microbe {
    species: String,
    mass: f64,
    fluxes: Option<MicrobeFluxes>,
}

impl Microbe {
    pub fn new(species: impl Into<String>, mass: f64) -> Self {
        Self {
            species: species.into(),
            mass,
            fluxes: None,
        }
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    /// Biomass (g C).
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn is_evaluated(&self) -> bool {
        self.fluxes.is_some()
    }

    /// Derive uptake, efficiency, respiration and mortality from the
    /// accessible pools of `state`. Runs once per instance.
    pub fn evaluate(&mut self, parameters: &Parameters, context: &Context, state: &State) -> Result<()> {
        if self.fluxes.is_some() {
            return Err(SimError::Invariant(format!(
                "microbe {} at date {} is evaluated twice",
                self.species,
                state.date()
            )));
        }
        let species = parameters.species(&self.species)?;
        let mut uptake_flux = BTreeMap::new();
        let mut carbon_use_efficiency = BTreeMap::new();
        let mut respiration = 0.0;
        for (class, assimilation) in species.assimilation() {
            let pool = state.substrate().accessible_pool(class)?.distribution();
            let uptake = assimilation
                .uptake_flux
                .apply(parameters, context, Some(state), pool)?;
            let efficiency = assimilation
                .carbon_use_efficiency
                .apply(parameters, context, Some(state), pool)?;
            respiration += efficiency.complement()?.mul(&uptake)?.integral();
            uptake_flux.insert(class.clone(), uptake);
            carbon_use_efficiency.insert(class.clone(), efficiency);
        }
        let mortality_flux = species
            .mortality()
            .execute_at(parameters, context, Some(state), self.mass)?;

        self.fluxes = Some(MicrobeFluxes {
            uptake_flux,
            carbon_use_efficiency,
            respiration,
            mortality_flux,
        });
        Ok(())
    }

    pub fn fluxes(&self) -> Result<&MicrobeFluxes> {
        self.fluxes.as_ref().ok_or_else(|| {
            SimError::Invariant(format!("microbe {} is not evaluated", self.species))
        })
    }

    pub fn uptake_flux(&self) -> Result<&BTreeMap<String, DiscreteDistribution>> {
        Ok(&self.fluxes()?.uptake_flux)
    }

    pub fn carbon_use_efficiency(&self) -> Result<&BTreeMap<String, DiscreteDistribution>> {
        Ok(&self.fluxes()?.carbon_use_efficiency)
    }

    pub fn respiration(&self) -> Result<f64> {
        Ok(self.fluxes()?.respiration)
    }

    pub fn mortality_flux(&self) -> Result<f64> {
        Ok(self.fluxes()?.mortality_flux)
    }

    /// Carbon incorporated into biomass: Σ ∫ efficiency · uptake.
    pub fn assimilation_flux(&self) -> Result<f64> {
        let fluxes = self.fluxes()?;
        let mut total = 0.0;
        for (class, uptake) in &fluxes.uptake_flux {
            let efficiency = fluxes.carbon_use_efficiency.get(class).ok_or_else(|| {
                SimError::Invariant(format!(
                    "microbe {} has an uptake flux but no efficiency on class {}",
                    self.species, class
                ))
            })?;
            total += efficiency.mul(uptake)?.integral();
        }
        Ok(total)
    }
}
