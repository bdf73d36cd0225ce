//! Simulation state at one date.
//!
//! A [`State`] owns its substrate and a fresh instance of every microbe,
//! enzyme and pool transfer. Derived values (fluxes, activities,
//! respiration) are filled in by [`State::evaluate`], exactly once.

mod enzyme;
mod microbe;
mod pool;
mod substrate;
mod transfer;

pub use enzyme::{Enzyme, EnzymeActivity};
pub use microbe::{Microbe, MicrobeFluxes};
pub use pool::Pool;
pub use substrate::Substrate;
pub use transfer::PoolTransfer;

use std::collections::BTreeMap;
use std::mem;

use crate::context::Context;
use crate::error::{Result, SimError};
use crate::parameters::{Parameters, TransferKey};

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    date: f64,
    substrate: Substrate,
    microbes: BTreeMap<String, Microbe>,
    enzymes: BTreeMap<String, Enzyme>,
    transfers: BTreeMap<TransferKey, PoolTransfer>,
    /// Σ microbial respiration, set by `evaluate`
    respiration: Option<f64>,
}

impl State {
    pub fn new(date: f64, substrate: Substrate) -> Self {
        Self {
            date,
            substrate,
            microbes: BTreeMap::new(),
            enzymes: BTreeMap::new(),
            transfers: BTreeMap::new(),
            respiration: None,
        }
    }

    /// State with empty pools, one enzyme per declared enzyme and one
    /// transfer per declared pool transfer. Microbes are added by the caller.
    pub fn from_parameters(parameters: &Parameters, date: f64) -> Result<Self> {
        let mut state = Self::new(date, Substrate::from_parameters(parameters)?);
        for name in parameters.enzymes().keys() {
            state.add_enzyme(Enzyme::new(name.clone()))?;
        }
        for key in parameters.transfers().keys() {
            state.add_transfer(PoolTransfer::new(key.clone()))?;
        }
        Ok(state)
    }

    pub fn add_microbe(&mut self, microbe: Microbe) -> Result<()> {
        let name = microbe.species().to_string();
        if self.microbes.contains_key(&name) {
            return Err(SimError::Invariant(format!("microbe {} already in state", name)));
        }
        self.microbes.insert(name, microbe);
        Ok(())
    }

    pub fn add_enzyme(&mut self, enzyme: Enzyme) -> Result<()> {
        let name = enzyme.name().to_string();
        if self.enzymes.contains_key(&name) {
            return Err(SimError::Invariant(format!("enzyme {} already in state", name)));
        }
        self.enzymes.insert(name, enzyme);
        Ok(())
    }

    pub fn add_transfer(&mut self, transfer: PoolTransfer) -> Result<()> {
        let key = transfer.key().clone();
        if self.transfers.contains_key(&key) {
            return Err(SimError::Invariant(format!("pool transfer {} already in state", key)));
        }
        self.transfers.insert(key, transfer);
        Ok(())
    }

    /// Evaluate microbes, then enzymes (production depends on microbial
    /// mass), then pool transfers (which may read enzyme activities).
    pub fn evaluate(&mut self, parameters: &Parameters, context: &Context) -> Result<()> {
        if self.respiration.is_some() {
            return Err(SimError::Invariant(format!(
                "state at date {} is evaluated twice",
                self.date
            )));
        }

        let mut microbes = mem::take(&mut self.microbes);
        let evaluated = microbes
            .values_mut()
            .try_for_each(|m| m.evaluate(parameters, context, self));
        self.microbes = microbes;
        evaluated?;

        let mut enzymes = mem::take(&mut self.enzymes);
        let evaluated = enzymes
            .values_mut()
            .try_for_each(|e| e.evaluate(parameters, context, self));
        self.enzymes = enzymes;
        evaluated?;

        let mut transfers = mem::take(&mut self.transfers);
        let evaluated = transfers
            .values_mut()
            .try_for_each(|t| t.evaluate(parameters, context, self));
        self.transfers = transfers;
        evaluated?;

        let mut respiration = 0.0;
        for microbe in self.microbes.values() {
            respiration += microbe.respiration()?;
        }
        self.respiration = Some(respiration);
        Ok(())
    }

    pub fn is_evaluated(&self) -> bool {
        self.respiration.is_some()
    }

    pub fn date(&self) -> f64 {
        self.date
    }

    pub fn substrate(&self) -> &Substrate {
        &self.substrate
    }

    pub fn substrate_mut(&mut self) -> &mut Substrate {
        &mut self.substrate
    }

    pub fn microbe(&self, name: &str) -> Result<&Microbe> {
        self.microbes
            .get(name)
            .ok_or_else(|| SimError::Setup(format!("no microbe {} in state", name)))
    }

    pub fn microbes(&self) -> &BTreeMap<String, Microbe> {
        &self.microbes
    }

    pub fn enzyme(&self, name: &str) -> Result<&Enzyme> {
        self.enzymes
            .get(name)
            .ok_or_else(|| SimError::Setup(format!("no enzyme {} in state", name)))
    }

    pub fn enzymes(&self) -> &BTreeMap<String, Enzyme> {
        &self.enzymes
    }

    pub fn transfer(&self, key: &TransferKey) -> Result<&PoolTransfer> {
        self.transfers
            .get(key)
            .ok_or_else(|| SimError::Setup(format!("no pool transfer {} in state", key)))
    }

    pub fn transfers(&self) -> &BTreeMap<TransferKey, PoolTransfer> {
        &self.transfers
    }

    /// Total respiration flux of all microbes (g C per time unit).
    pub fn respiration(&self) -> Result<f64> {
        self.respiration
            .ok_or_else(|| SimError::Invariant(format!("state at date {} is not evaluated", self.date)))
    }

    /// Carbon in every pool plus microbial biomass.
    pub fn total_carbon(&self) -> f64 {
        self.substrate.mass() + self.microbes.values().map(Microbe::mass).sum::<f64>()
    }
}
