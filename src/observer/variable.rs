//! What can be observed, and on which item.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::parameters::{Accessibility, Parameters, PoolKey, TransferKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservableVariable {
    /// State or microbe respiration flux
    Respiration,
    /// Pool or microbe mass
    Mass,
    MassDistribution,
    FluxDistribution,
    UptakeFluxDistributionMap,
    CarbonUseEfficiencyDistributionMap,
    MortalityFlux,
    DepolymerizationRateDistribution,
    ActivityDistribution,
    Activity,
}

impl ObservableVariable {
    pub fn name(self) -> &'static str {
        match self {
            ObservableVariable::Respiration => "respiration",
            ObservableVariable::Mass => "mass",
            ObservableVariable::MassDistribution => "mass_distribution",
            ObservableVariable::FluxDistribution => "flux_distribution",
            ObservableVariable::UptakeFluxDistributionMap => "uptake_flux_distribution_map",
            ObservableVariable::CarbonUseEfficiencyDistributionMap => {
                "carbon_use_efficiency_distribution_map"
            }
            ObservableVariable::MortalityFlux => "mortality_flux",
            ObservableVariable::DepolymerizationRateDistribution => {
                "depolymerization_rate_distribution"
            }
            ObservableVariable::ActivityDistribution => "activity_distribution",
            ObservableVariable::Activity => "activity",
        }
    }

    /// Column label of the observed values.
    pub fn value_label(self) -> &'static str {
        match self {
            ObservableVariable::Mass | ObservableVariable::MassDistribution => "mass",
            ObservableVariable::FluxDistribution => "flux",
            ObservableVariable::UptakeFluxDistributionMap => "uptake_flux",
            ObservableVariable::CarbonUseEfficiencyDistributionMap => "carbon_use_efficiency",
            ObservableVariable::DepolymerizationRateDistribution => "depolymerization_rate",
            ObservableVariable::ActivityDistribution | ObservableVariable::Activity => "activity",
            other => other.name(),
        }
    }
}

impl fmt::Display for ObservableVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Entity an observer is attached to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ObservedItem {
    State,
    Pool(PoolKey),
    Microbe(String),
    Enzyme(String),
    PoolTransfer(TransferKey),
}

impl ObservedItem {
    pub fn kind(&self) -> &'static str {
        match self {
            ObservedItem::State => "state",
            ObservedItem::Pool(_) => "pool",
            ObservedItem::Microbe(_) => "microbe",
            ObservedItem::Enzyme(_) => "enzyme",
            ObservedItem::PoolTransfer(_) => "pool_transfer",
        }
    }

    /// Item label used in file names, `None` for the state.
    pub fn label(&self) -> Option<String> {
        match self {
            ObservedItem::State => None,
            ObservedItem::Pool(key) => Some(key.label()),
            ObservedItem::Microbe(name) | ObservedItem::Enzyme(name) => Some(name.clone()),
            ObservedItem::PoolTransfer(key) => Some(key.label()),
        }
    }

    pub fn variables(&self) -> &'static [ObservableVariable] {
        use ObservableVariable::*;
        match self {
            ObservedItem::State => &[Respiration],
            ObservedItem::Pool(_) => &[Mass, MassDistribution],
            ObservedItem::Microbe(_) => &[
                Mass,
                UptakeFluxDistributionMap,
                CarbonUseEfficiencyDistributionMap,
                Respiration,
                MortalityFlux,
            ],
            ObservedItem::Enzyme(_) => &[DepolymerizationRateDistribution, ActivityDistribution, Activity],
            ObservedItem::PoolTransfer(_) => &[FluxDistribution],
        }
    }

    /// Fails unless the item is declared in `parameters`.
    pub fn check(&self, parameters: &Parameters) -> Result<()> {
        match self {
            ObservedItem::State => Ok(()),
            ObservedItem::Pool(key) => {
                if parameters.accessibilities(&key.class).contains(&key.accessibility) {
                    Ok(())
                } else {
                    Err(SimError::Setup(format!("observer on unknown pool {}", key)))
                }
            }
            ObservedItem::Microbe(name) => parameters.species(name).map(|_| ()),
            ObservedItem::Enzyme(name) => parameters.enzyme(name).map(|_| ()),
            ObservedItem::PoolTransfer(key) => parameters.transfer(key).map(|_| ()),
        }
    }

    /// Every observable item of a setup: the state, then pools, microbes,
    /// enzymes and pool transfers in name order.
    pub fn all(parameters: &Parameters) -> Vec<ObservedItem> {
        let mut items = vec![ObservedItem::State];
        for (class, accessibilities) in parameters.accessibility_map() {
            let mut sorted: Vec<Accessibility> = accessibilities.clone();
            sorted.sort();
            items.extend(
                sorted
                    .into_iter()
                    .map(|a| ObservedItem::Pool(PoolKey::new(class.clone(), a))),
            );
        }
        items.extend(parameters.species_map().keys().cloned().map(ObservedItem::Microbe));
        items.extend(parameters.enzymes().keys().cloned().map(ObservedItem::Enzyme));
        items.extend(parameters.transfers().keys().cloned().map(ObservedItem::PoolTransfer));
        items
    }
}

impl fmt::Display for ObservedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{} {}", self.kind(), label),
            None => f.write_str(self.kind()),
        }
    }
}
