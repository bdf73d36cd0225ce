//! Immutable per-species and per-enzyme configuration.

use std::collections::BTreeMap;

use crate::distribution::{Interval, PositiveDistribution};
use crate::error::{Result, SimError};
use crate::function::Function;
use crate::matrix::KernelIntegration;

use super::{Accessibility, TransferKey};

/// Tolerance on the total mass of a species signature.
pub const SIGNATURE_TOLERANCE: f64 = 1e-8;

/// Uptake and carbon-use efficiency of one species on one class.
#[derive(Debug, Clone, PartialEq)]
pub struct Assimilation {
    pub uptake_flux: Function,
    pub carbon_use_efficiency: Function,
}

/// Microbial species traits, shared by every microbe of that species.
#[derive(Debug, Clone, PartialEq)]
pub struct MicrobeSpecies {
    name: String,
    /// Where carbon released by mortality goes, per class. Masses sum to 1.
    signature: BTreeMap<String, PositiveDistribution>,
    /// Enzyme name → production as a function of microbial mass.
    enzyme_production: BTreeMap<String, Function>,
    /// Class name → assimilation functions.
    assimilation: BTreeMap<String, Assimilation>,
    /// Mortality flux as a function of microbial mass.
    mortality: Function,
}

impl MicrobeSpecies {
    pub fn new(name: impl Into<String>, mortality: Function) -> Self {
        Self {
            name: name.into(),
            signature: BTreeMap::new(),
            enzyme_production: BTreeMap::new(),
            assimilation: BTreeMap::new(),
            mortality,
        }
    }

    pub fn add_signature(&mut self, class: impl Into<String>, distribution: PositiveDistribution) -> Result<()> {
        let class = class.into();
        if self.signature.contains_key(&class) {
            return Err(SimError::Invariant(format!(
                "species {}: signature for class {} is defined twice",
                self.name, class
            )));
        }
        self.signature.insert(class, distribution);
        Ok(())
    }

    pub fn add_enzyme_production(&mut self, enzyme: impl Into<String>, production: Function) -> Result<()> {
        let enzyme = enzyme.into();
        if self.enzyme_production.contains_key(&enzyme) {
            return Err(SimError::Invariant(format!(
                "species {}: production of enzyme {} is defined twice",
                self.name, enzyme
            )));
        }
        self.enzyme_production.insert(enzyme, production);
        Ok(())
    }

    pub fn add_assimilation(&mut self, class: impl Into<String>, assimilation: Assimilation) -> Result<()> {
        let class = class.into();
        if self.assimilation.contains_key(&class) {
            return Err(SimError::Invariant(format!(
                "species {}: assimilation of class {} is defined twice",
                self.name, class
            )));
        }
        self.assimilation.insert(class, assimilation);
        Ok(())
    }

    /// Fails unless the signature masses sum to 1.
    pub fn check_signature(&self) -> Result<()> {
        let total: f64 = self.signature.values().map(|d| d.integral()).sum();
        if (total - 1.0).abs() > SIGNATURE_TOLERANCE {
            return Err(SimError::Setup(format!(
                "species {}: signature mass is {} instead of 1",
                self.name, total
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &BTreeMap<String, PositiveDistribution> {
        &self.signature
    }

    pub fn enzyme_production(&self) -> &BTreeMap<String, Function> {
        &self.enzyme_production
    }

    pub fn assimilation(&self) -> &BTreeMap<String, Assimilation> {
        &self.assimilation
    }

    pub fn mortality(&self) -> &Function {
        &self.mortality
    }
}

/// Enzyme configuration. The kernel matrix itself is built once the whole
/// setup is known and stored on [`super::Parameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeTraits {
    pub name: String,
    pub class: String,
    /// Part of the class domain where activity is integrated.
    pub depolymerization_domain: Interval,
    /// Rate as a function of (polymerization, production).
    pub rate: Function,
    pub kernel: Function,
    pub kernel_integration: KernelIntegration,
}

/// Transfer between two accessibility states of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolTransferTraits {
    pub class: String,
    pub origin: Accessibility,
    pub arrival: Accessibility,
    /// Flux applied pointwise to the origin pool.
    pub function: Function,
}

impl PoolTransferTraits {
    pub fn key(&self) -> TransferKey {
        TransferKey::new(self.class.clone(), self.origin, self.arrival)
    }
}
