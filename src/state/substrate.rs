//! Substrate: every carbon pool of the system.

use std::collections::BTreeMap;

use super::{Pool, State};
use crate::context::Context;
use crate::distribution::PositiveDistribution;
use crate::error::{Result, SimError};
use crate::parameters::{Accessibility, Parameters, PoolKey};

/// One accessible pool per class plus zero or more inaccessible pools with
/// distinct accessibilities. `Clone` is a deep copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substrate {
    accessible: BTreeMap<String, Pool>,
    inaccessible: BTreeMap<String, Vec<Pool>>,
}

impl Substrate {
    /// Empty pools for every declared (class, accessibility).
    pub fn from_parameters(parameters: &Parameters) -> Result<Self> {
        let mut substrate = Self::default();
        for (class, accessibilities) in parameters.accessibility_map() {
            for accessibility in accessibilities {
                let grid = parameters.class(class)?.polymerization().grid().to_vec();
                let distribution =
                    PositiveDistribution::zeros(grid, parameters.integration_method())?;
                substrate.add_pool(Pool::new(class.clone(), *accessibility, distribution))?;
            }
        }
        Ok(substrate)
    }

    pub fn add_pool(&mut self, pool: Pool) -> Result<()> {
        let class = pool.class().to_string();
        if pool.is_accessible() {
            if self.accessible.contains_key(&class) {
                return Err(SimError::Invariant(format!(
                    "accessible pool of class {} already exists",
                    class
                )));
            }
            self.accessible.insert(class, pool);
        } else {
            let pools = self.inaccessible.entry(class).or_default();
            if pools.iter().any(|p| p.accessibility() == pool.accessibility()) {
                return Err(SimError::Invariant(format!(
                    "pool {} already exists",
                    pool.key()
                )));
            }
            pools.push(pool);
        }
        Ok(())
    }

    pub fn pool(&self, class: &str, accessibility: Accessibility) -> Result<&Pool> {
        let found = if accessibility.is_accessible() {
            self.accessible.get(class)
        } else {
            self.inaccessible
                .get(class)
                .and_then(|pools| pools.iter().find(|p| p.accessibility() == accessibility))
        };
        found.ok_or_else(|| missing_pool(class, accessibility))
    }

    pub fn pool_mut(&mut self, class: &str, accessibility: Accessibility) -> Result<&mut Pool> {
        let found = if accessibility.is_accessible() {
            self.accessible.get_mut(class)
        } else {
            self.inaccessible
                .get_mut(class)
                .and_then(|pools| pools.iter_mut().find(|p| p.accessibility() == accessibility))
        };
        found.ok_or_else(|| missing_pool(class, accessibility))
    }

    pub fn pool_by_key(&self, key: &PoolKey) -> Result<&Pool> {
        self.pool(&key.class, key.accessibility)
    }

    pub fn accessible_pool(&self, class: &str) -> Result<&Pool> {
        self.pool(class, Accessibility::Accessible)
    }

    pub fn accessible_pool_mut(&mut self, class: &str) -> Result<&mut Pool> {
        self.pool_mut(class, Accessibility::Accessible)
    }

    /// Classes owning an accessible pool, in name order.
    pub fn accessible_classes(&self) -> impl Iterator<Item = &String> {
        self.accessible.keys()
    }

    pub fn inaccessible_pools(&self, class: &str) -> &[Pool] {
        self.inaccessible
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every pool: accessible ones by class, then inaccessible ones by class.
    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.accessible
            .values()
            .chain(self.inaccessible.values().flatten())
    }

    pub fn pools_mut(&mut self) -> impl Iterator<Item = &mut Pool> {
        self.accessible
            .values_mut()
            .chain(self.inaccessible.values_mut().flatten())
    }

    /// Total carbon mass over all pools.
    pub fn mass(&self) -> f64 {
        self.pools().map(Pool::mass).sum()
    }

    /// Add `dt · input(date)` to every pool that has a registered input.
    /// Inputs are evaluated against `state`.
    pub fn add_inputs(
        &mut self,
        parameters: &Parameters,
        context: &Context,
        state: &State,
        date: f64,
        dt: f64,
    ) -> Result<()> {
        let inputs = context.inputs();
        if inputs.is_empty() {
            return Ok(());
        }
        for pool in self.pools_mut() {
            if let Some(flux) = inputs.input(parameters, context, state, pool, date)? {
                pool.add(&flux.scaled(dt))?;
            }
        }
        Ok(())
    }
}

fn missing_pool(class: &str, accessibility: Accessibility) -> SimError {
    SimError::Setup(format!("no {} pool for class {}", accessibility, class))
}
