//! Setup file schema and its conversion into runtime objects.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context as _, Result};
use serde::{Deserialize, Serialize};

use super::{FunctionSpec, ObservedDates};
use crate::context::{Context, SubstrateInputManager};
use crate::distribution::{IntegrationMethod, Interval, PositiveDistribution};
use crate::matrix::KernelIntegration;
use crate::observer::{ObservableVariable, ObservedItem, Observer, ObserverList};
use crate::parameters::{
    Accessibility, Assimilation, EnzymeTraits, MicrobeSpecies, Parameters, PoolKey, PoolTransferTraits,
    TransferKey,
};
use crate::simulator::Simulator;
use crate::state::{Microbe, State};

/// Top-level setup file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupFile {
    /// e.g. "day"
    pub time_unit: String,
    pub initial_date: i64,
    pub final_date: i64,
    /// Shrunk so that a whole number of steps fits in one time unit
    pub user_time_step: f64,
    /// Shrunk per class so that a whole number of steps fits its domain
    pub user_polymerization_step: f64,
    #[serde(default)]
    pub integration_method: IntegrationMethod,
    pub biochemical_classes: Vec<ClassSpec>,
    pub pools: Vec<PoolSpec>,
    #[serde(default)]
    pub pool_initializations: Vec<PoolFunctionSpec>,
    #[serde(default)]
    pub enzymes: Vec<EnzymeSpec>,
    #[serde(default)]
    pub microbes: Vec<MicrobeSpec>,
    #[serde(default)]
    pub pool_transfers: Vec<TransferSpec>,
    #[serde(default)]
    pub pool_inputs: Vec<PoolFunctionSpec>,
    /// Every variable at every integral date when empty
    #[serde(default)]
    pub observers: Vec<ObserverSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
    pub name: String,
    pub domain: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolSpec {
    pub class: String,
    pub accessibilities: Vec<Accessibility>,
}

/// A function attached to one pool: initial values or external input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolFunctionSpec {
    pub class: String,
    pub accessibility: Accessibility,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnzymeSpec {
    pub name: String,
    pub class: String,
    pub depolymerization_domain: [f64; 2],
    pub rate: FunctionSpec,
    pub kernel: FunctionSpec,
    #[serde(default)]
    pub kernel_integration: KernelIntegration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MicrobeSpec {
    pub name: String,
    pub initial_mass: f64,
    pub signature: Vec<SignatureSpec>,
    #[serde(default)]
    pub enzyme_production: BTreeMap<String, FunctionSpec>,
    #[serde(default)]
    pub assimilation: Vec<AssimilationSpec>,
    pub mortality: FunctionSpec,
}

/// Polymerization profile sampled on the class grid, rescaled to `proportion`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureSpec {
    pub class: String,
    pub proportion: f64,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssimilationSpec {
    pub class: String,
    pub uptake_flux: FunctionSpec,
    pub carbon_use_efficiency: FunctionSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferSpec {
    pub class: String,
    pub origin: Accessibility,
    pub arrival: Accessibility,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverKind {
    State,
    Pool,
    Microbe,
    Enzyme,
    PoolTransfer,
}

/// `item` is a species or enzyme name, `<class>_<ACCESSIBILITY>` for a pool
/// and `<class>_<ORIGIN>_<ARRIVAL>` for a pool transfer. The state has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverSpec {
    pub kind: ObserverKind,
    pub variable: ObservableVariable,
    #[serde(default)]
    pub item: Option<String>,
    pub dates: ObservedDates,
}

impl ObserverSpec {
    fn observed_item(&self) -> Result<ObservedItem> {
        let name = || {
            self.item
                .clone()
                .ok_or_else(|| anyhow!("{:?} observer needs an item", self.kind))
        };
        Ok(match self.kind {
            ObserverKind::State => ObservedItem::State,
            ObserverKind::Pool => ObservedItem::Pool(parse_pool_key(&name()?)?),
            ObserverKind::Microbe => ObservedItem::Microbe(name()?),
            ObserverKind::Enzyme => ObservedItem::Enzyme(name()?),
            ObserverKind::PoolTransfer => ObservedItem::PoolTransfer(parse_transfer_key(&name()?)?),
        })
    }
}

fn parse_pool_key(item: &str) -> Result<PoolKey> {
    Accessibility::ALL
        .into_iter()
        .filter_map(|a| {
            item.strip_suffix(a.key())
                .and_then(|rest| rest.strip_suffix('_'))
                .map(|class| PoolKey::new(class, a))
        })
        .min_by_key(|key| key.class.len())
        .ok_or_else(|| anyhow!("cannot read pool {}, expected <class>_<ACCESSIBILITY>", item))
}

fn parse_transfer_key(item: &str) -> Result<TransferKey> {
    let mut found: Option<TransferKey> = None;
    for origin in Accessibility::ALL {
        for arrival in Accessibility::ALL {
            let suffix = format!("_{}_{}", origin.key(), arrival.key());
            if let Some(class) = item.strip_suffix(suffix.as_str()) {
                let shorter = found.as_ref().map_or(true, |k| class.len() < k.class.len());
                if shorter {
                    found = Some(TransferKey::new(class, origin, arrival));
                }
            }
        }
    }
    found.ok_or_else(|| {
        anyhow!(
            "cannot read pool transfer {}, expected <class>_<ORIGIN>_<ARRIVAL>",
            item
        )
    })
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct Setup {
    pub parameters: Parameters,
    pub context: Context,
    pub initial_state: State,
    pub observers: ObserverList,
}

impl Setup {
    pub fn into_simulator(self) -> crate::Result<Simulator> {
        Simulator::new(self.parameters, self.context, self.initial_state, self.observers)
    }
}

impl SetupFile {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid setup file")
    }

    /// Validate every declaration and build parameters, context, initial
    /// state and observers.
    pub fn build(&self) -> Result<Setup> {
        let context = Context::new(
            self.time_unit.clone(),
            self.initial_date,
            self.final_date,
            self.user_time_step,
        )
        .context("invalid time settings")?;

        let mut parameters = Parameters::new(self.integration_method, self.user_polymerization_step);
        for class in &self.biochemical_classes {
            let domain = Interval::try_from(class.domain)
                .with_context(|| format!("biochemical class {}", class.name))?;
            parameters
                .add_class(class.name.clone(), domain)
                .with_context(|| format!("biochemical class {}", class.name))?;
        }
        for pool in &self.pools {
            for accessibility in &pool.accessibilities {
                parameters
                    .add_accessibility(&pool.class, *accessibility)
                    .with_context(|| format!("pools of class {}", pool.class))?;
            }
        }

        for enzyme in &self.enzymes {
            let traits = self
                .enzyme_traits(enzyme, &parameters)
                .with_context(|| format!("enzyme {}", enzyme.name))?;
            parameters.add_enzyme(traits)?;
        }
        for microbe in &self.microbes {
            let species = self
                .species(microbe, &parameters, &context)
                .with_context(|| format!("microbe {}", microbe.name))?;
            parameters
                .add_species(species)
                .with_context(|| format!("microbe {}", microbe.name))?;
        }
        for transfer in &self.pool_transfers {
            let traits = PoolTransferTraits {
                class: transfer.class.clone(),
                origin: transfer.origin,
                arrival: transfer.arrival,
                function: transfer.function.resolve(&parameters)?,
            };
            let key = traits.key();
            parameters
                .add_transfer(traits)
                .with_context(|| format!("pool transfer {}", key))?;
        }

        let mut inputs = SubstrateInputManager::default();
        for input in &self.pool_inputs {
            let key = PoolKey::new(input.class.clone(), input.accessibility);
            if !parameters
                .accessibilities(&input.class)
                .contains(&input.accessibility)
            {
                return Err(anyhow!("input on undeclared pool {}", key));
            }
            let function = input.function.resolve(&parameters)?;
            inputs
                .add(key.clone(), function)
                .with_context(|| format!("input on pool {}", key))?;
        }
        let context = context.with_inputs(inputs);

        parameters.finalize(&context)?;

        let initial_state = self.initial_state(&parameters, &context)?;
        let observers = self.observer_list(&parameters, &context)?;

        Ok(Setup {
            parameters,
            context,
            initial_state,
            observers,
        })
    }

    fn enzyme_traits(&self, enzyme: &EnzymeSpec, parameters: &Parameters) -> Result<EnzymeTraits> {
        Ok(EnzymeTraits {
            name: enzyme.name.clone(),
            class: enzyme.class.clone(),
            depolymerization_domain: Interval::try_from(enzyme.depolymerization_domain)?,
            rate: enzyme.rate.resolve(parameters).context("rate")?,
            kernel: enzyme.kernel.resolve(parameters).context("kernel")?,
            kernel_integration: enzyme.kernel_integration,
        })
    }

    fn species(&self, microbe: &MicrobeSpec, parameters: &Parameters, context: &Context) -> Result<MicrobeSpecies> {
        let mut species = MicrobeSpecies::new(microbe.name.clone(), microbe.mortality.resolve(parameters)?);
        for element in &microbe.signature {
            let function = element.function.resolve(parameters)?;
            let grid = parameters.zero_distribution(&element.class)?;
            let sampled = function.sample(parameters, context, None, &grid)?;
            let mut signature = PositiveDistribution::try_from(sampled)
                .with_context(|| format!("signature on class {}", element.class))?;
            signature.proportionalize(element.proportion)?;
            species.add_signature(element.class.clone(), signature)?;
        }
        for (enzyme, production) in &microbe.enzyme_production {
            species.add_enzyme_production(enzyme.clone(), production.resolve(parameters)?)?;
        }
        for assimilation in &microbe.assimilation {
            species.add_assimilation(
                assimilation.class.clone(),
                Assimilation {
                    uptake_flux: assimilation.uptake_flux.resolve(parameters)?,
                    carbon_use_efficiency: assimilation.carbon_use_efficiency.resolve(parameters)?,
                },
            )?;
        }
        Ok(species)
    }

    fn initial_state(&self, parameters: &Parameters, context: &Context) -> Result<State> {
        let mut state = State::from_parameters(parameters, context.initial_date() as f64)?;
        for init in &self.pool_initializations {
            let function = init.function.resolve(parameters)?;
            let pool = state
                .substrate_mut()
                .pool_mut(&init.class, init.accessibility)
                .with_context(|| format!("initialization of {} {} pool", init.class, init.accessibility))?;
            let values = function.sample(parameters, context, None, pool.distribution())?;
            pool.set_values(values.y().to_vec())
                .with_context(|| format!("initialization of pool {}", pool.key()))?;
        }
        for microbe in &self.microbes {
            state.add_microbe(Microbe::new(microbe.name.clone(), microbe.initial_mass))?;
        }
        Ok(state)
    }

    fn observer_list(&self, parameters: &Parameters, context: &Context) -> Result<ObserverList> {
        if self.observers.is_empty() {
            log::info!("No observer declared, observing every variable at every date");
            return Ok(ObserverList::default_for(parameters, context)?);
        }
        let mut list = ObserverList::default();
        for spec in &self.observers {
            let item = spec.observed_item()?;
            let dates = spec.dates.resolve()?;
            let observer = Observer::new(parameters, item, spec.variable, dates)
                .with_context(|| format!("{:?} observer of {}", spec.kind, spec.variable))?;
            list.push(observer);
        }
        Ok(list)
    }
}

/// Read and build a setup file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Setup> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("could not read setup file {}", path.display()))?;
    let file = SetupFile::from_json(&contents)
        .with_context(|| format!("could not parse setup file {}", path.display()))?;
    let setup = file
        .build()
        .with_context(|| format!("inconsistent setup file {}", path.display()))?;
    log::info!(
        "Loaded setup from {:?}: {} classes, {} microbes, {} enzymes, {} observers",
        path,
        setup.parameters.classes().len(),
        setup.parameters.species_map().len(),
        setup.parameters.enzymes().len(),
        setup.observers.len()
    );
    Ok(setup)
}
