//! Static simulation parameters.
//!
//! Everything here is read-only once [`Parameters::finalize`] has run:
//! biochemical classes and their grids, declared pool accessibilities,
//! microbial species, enzyme traits with their kernel matrices, pool
//! transfers, and the enzyme → producing species map.

mod accessibility;
mod polymerization;
mod species;

pub use accessibility::{Accessibility, PoolKey, TransferKey};
pub use polymerization::{BiochemicalClass, Polymerization};
pub use species::{Assimilation, EnzymeTraits, MicrobeSpecies, PoolTransferTraits, SIGNATURE_TOLERANCE};

use std::collections::BTreeMap;

use crate::context::Context;
use crate::distribution::{DiscreteDistribution, IntegrationMethod, Interval};
use crate::error::{Result, SimError};
use crate::matrix::EnzymeKernelMatrix;

/// Top-level parameters container.
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Quadrature rule shared by every distribution
    integration_method: IntegrationMethod,
    /// Requested polymerization step, shrunk per class to fit its domain
    user_polymerization_step: f64,
    classes: BTreeMap<String, BiochemicalClass>,
    /// Class name → declared accessibilities, in declaration order
    accessibilities: BTreeMap<String, Vec<Accessibility>>,
    species: BTreeMap<String, MicrobeSpecies>,
    enzymes: BTreeMap<String, EnzymeTraits>,
    transfers: BTreeMap<TransferKey, PoolTransferTraits>,
    /// Built by `finalize`
    kernels: BTreeMap<String, EnzymeKernelMatrix>,
    /// Built by `finalize`: enzyme → producing species, sorted
    enzyme_producers: BTreeMap<String, Vec<String>>,
    finalized: bool,
}

impl Parameters {
    pub fn new(integration_method: IntegrationMethod, user_polymerization_step: f64) -> Self {
        Self {
            integration_method,
            user_polymerization_step,
            classes: BTreeMap::new(),
            accessibilities: BTreeMap::new(),
            species: BTreeMap::new(),
            enzymes: BTreeMap::new(),
            transfers: BTreeMap::new(),
            kernels: BTreeMap::new(),
            enzyme_producers: BTreeMap::new(),
            finalized: false,
        }
    }

    /// Declare a class over `domain`, discretized with the user step.
    pub fn add_class(&mut self, name: impl Into<String>, domain: Interval) -> Result<()> {
        let name = name.into();
        if self.classes.contains_key(&name) {
            return Err(SimError::Setup(format!("biochemical class {} is defined twice", name)));
        }
        let polymerization =
            Polymerization::new(domain.min(), domain.max(), self.user_polymerization_step)?;
        self.classes
            .insert(name.clone(), BiochemicalClass::new(name, polymerization));
        Ok(())
    }

    pub fn add_accessibility(&mut self, class: &str, accessibility: Accessibility) -> Result<()> {
        self.class(class)?;
        let list = self.accessibilities.entry(class.to_string()).or_default();
        if list.contains(&accessibility) {
            return Err(SimError::Invariant(format!(
                "accessibility {} of class {} is declared twice",
                accessibility, class
            )));
        }
        list.push(accessibility);
        Ok(())
    }

    pub fn add_enzyme(&mut self, traits: EnzymeTraits) -> Result<()> {
        if self.enzymes.contains_key(&traits.name) {
            return Err(SimError::Setup(format!("enzyme {} is defined twice", traits.name)));
        }
        let class = self.class(&traits.class)?;
        if !class
            .polymerization()
            .domain()
            .includes(&traits.depolymerization_domain)
        {
            return Err(SimError::Setup(format!(
                "enzyme {}: depolymerization domain {} exceeds the domain {} of class {}",
                traits.name,
                traits.depolymerization_domain,
                class.polymerization().domain(),
                traits.class
            )));
        }
        self.enzymes.insert(traits.name.clone(), traits);
        Ok(())
    }

    /// Register a species. Its enzymes must already be declared.
    pub fn add_species(&mut self, species: MicrobeSpecies) -> Result<()> {
        if self.species.contains_key(species.name()) {
            return Err(SimError::Setup(format!(
                "microbe species {} is defined twice",
                species.name()
            )));
        }
        for enzyme in species.enzyme_production().keys() {
            if !self.enzymes.contains_key(enzyme) {
                return Err(SimError::Setup(format!(
                    "unknown enzyme {} produced by species {}",
                    enzyme,
                    species.name()
                )));
            }
        }
        for class in species.signature().keys().chain(species.assimilation().keys()) {
            self.class(class)?;
        }
        species.check_signature()?;
        self.species.insert(species.name().to_string(), species);
        Ok(())
    }

    pub fn add_transfer(&mut self, traits: PoolTransferTraits) -> Result<()> {
        self.class(&traits.class)?;
        let declared = self.accessibilities(&traits.class);
        for end in [traits.origin, traits.arrival] {
            if !declared.contains(&end) {
                return Err(SimError::Setup(format!(
                    "pool transfer {}: accessibility {} is not declared for class {}",
                    traits.key(),
                    end,
                    traits.class
                )));
            }
        }
        if traits.origin == traits.arrival {
            return Err(SimError::Setup(format!(
                "pool transfer {} has the same origin and arrival",
                traits.key()
            )));
        }
        let key = traits.key();
        if self.transfers.contains_key(&key) {
            return Err(SimError::Setup(format!("pool transfer {} is defined twice", key)));
        }
        self.transfers.insert(key, traits);
        Ok(())
    }

    /// Cross-check the setup, build the kernel matrices and the enzyme
    /// producer map. Must run once, after every declaration.
    pub fn finalize(&mut self, context: &Context) -> Result<()> {
        if self.finalized {
            return Err(SimError::Invariant("parameters are already finalized".to_string()));
        }
        for species in self.species.values() {
            for class in species.signature().keys().chain(species.assimilation().keys()) {
                self.require_accessible(class, || format!("species {}", species.name()))?;
            }
        }
        for traits in self.enzymes.values() {
            self.require_accessible(&traits.class, || format!("enzyme {}", traits.name))?;
        }

        let kernels = self
            .enzymes
            .values()
            .map(|traits| {
                let class = self.class(&traits.class)?;
                let kernel = EnzymeKernelMatrix::build(
                    &traits.name,
                    &traits.kernel,
                    traits.kernel_integration,
                    class.polymerization(),
                    self,
                    context,
                )?;
                log::debug!(
                    "Built {:?} kernel for enzyme {} ({}x{})",
                    traits.kernel_integration,
                    traits.name,
                    kernel.size(),
                    kernel.size()
                );
                Ok((traits.name.clone(), kernel))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let mut producers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for species in self.species.values() {
            for enzyme in species.enzyme_production().keys() {
                producers
                    .entry(enzyme.clone())
                    .or_default()
                    .push(species.name().to_string());
            }
        }
        // species are visited in name order, so each list is already sorted

        self.kernels = kernels;
        self.enzyme_producers = producers;
        self.finalized = true;
        log::info!(
            "Parameters ready: {} classes, {} species, {} enzymes, {} pool transfers",
            self.classes.len(),
            self.species.len(),
            self.enzymes.len(),
            self.transfers.len()
        );
        Ok(())
    }

    fn require_accessible<F>(&self, class: &str, who: F) -> Result<()>
    where
        F: Fn() -> String,
    {
        if self.accessibilities(class).contains(&Accessibility::Accessible) {
            Ok(())
        } else {
            Err(SimError::Setup(format!(
                "{} uses class {} which has no ACCESSIBLE pool",
                who(),
                class
            )))
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn integration_method(&self) -> IntegrationMethod {
        self.integration_method
    }

    pub fn user_polymerization_step(&self) -> f64 {
        self.user_polymerization_step
    }

    pub fn class(&self, name: &str) -> Result<&BiochemicalClass> {
        self.classes
            .get(name)
            .ok_or_else(|| SimError::Setup(format!("unknown biochemical class {}", name)))
    }

    pub fn classes(&self) -> &BTreeMap<String, BiochemicalClass> {
        &self.classes
    }

    /// Declared accessibilities of `class`, empty when none.
    pub fn accessibilities(&self, class: &str) -> &[Accessibility] {
        self.accessibilities
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn accessibility_map(&self) -> &BTreeMap<String, Vec<Accessibility>> {
        &self.accessibilities
    }

    pub fn species(&self, name: &str) -> Result<&MicrobeSpecies> {
        self.species
            .get(name)
            .ok_or_else(|| SimError::Setup(format!("unknown microbe species {}", name)))
    }

    pub fn species_map(&self) -> &BTreeMap<String, MicrobeSpecies> {
        &self.species
    }

    pub fn enzyme(&self, name: &str) -> Result<&EnzymeTraits> {
        self.enzymes
            .get(name)
            .ok_or_else(|| SimError::Setup(format!("unknown enzyme {}", name)))
    }

    pub fn enzymes(&self) -> &BTreeMap<String, EnzymeTraits> {
        &self.enzymes
    }

    pub fn transfer(&self, key: &TransferKey) -> Result<&PoolTransferTraits> {
        self.transfers
            .get(key)
            .ok_or_else(|| SimError::Setup(format!("unknown pool transfer {}", key)))
    }

    pub fn transfers(&self) -> &BTreeMap<TransferKey, PoolTransferTraits> {
        &self.transfers
    }

    pub fn kernel(&self, enzyme: &str) -> Result<&EnzymeKernelMatrix> {
        self.kernels.get(enzyme).ok_or_else(|| {
            SimError::Setup(format!(
                "no kernel matrix for enzyme {}, parameters not finalized?",
                enzyme
            ))
        })
    }

    /// Species producing `enzyme`, in name order.
    pub fn enzyme_producers(&self, enzyme: &str) -> &[String] {
        self.enzyme_producers
            .get(enzyme)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All-zero distribution on the grid of `class`.
    pub fn zero_distribution(&self, class: &str) -> Result<DiscreteDistribution> {
        let grid = self.class(class)?.polymerization().grid().to_vec();
        DiscreteDistribution::zeros(grid, self.integration_method)
    }
}
