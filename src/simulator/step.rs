//! One explicit Euler step.
//!
//! Every flux is taken from the evaluated current state (start-of-step
//! rates) and accumulated into a copy of its substrate, in a fixed order:
//! 1. external inputs
//! 2. microbial uptake and mortality
//! 3. pool transfers
//! 4. enzymatic depolymerization
//!
//! The resulting state is then evaluated so the next step can use it.

use std::collections::BTreeMap;

use crate::context::Context;
use crate::error::{Result, SimError};
use crate::matrix::Matrix;
use crate::parameters::Parameters;
use crate::state::{Enzyme, Microbe, PoolTransfer, State, Substrate};

/// Build and evaluate the state at timeline index `it` from `current`,
/// which must be the evaluated state at index `it - 1`.
pub fn advance(parameters: &Parameters, context: &Context, current: &State, it: usize) -> Result<State> {
    let timeline = context.timeline();
    let date = *timeline.dates().get(it).ok_or_else(|| {
        SimError::Domain(format!(
            "iteration {} is past the end of a timeline of {} dates",
            it,
            timeline.len()
        ))
    })?;
    if !current.is_evaluated() {
        return Err(SimError::Invariant(format!(
            "cannot advance from unevaluated state at date {}",
            current.date()
        )));
    }
    let dt = timeline.step();

    let mut substrate = current.substrate().clone();
    substrate.add_inputs(parameters, context, current, date, dt)?;

    let microbes = apply_microbes(parameters, current, &mut substrate, dt)?;
    apply_transfers(current, &mut substrate, dt)?;
    apply_depolymerization(parameters, current, &mut substrate, dt)?;

    let mut next = State::new(date, substrate);
    for microbe in microbes {
        next.add_microbe(microbe)?;
    }
    for name in current.enzymes().keys() {
        next.add_enzyme(Enzyme::new(name.clone()))?;
    }
    for key in current.transfers().keys() {
        next.add_transfer(PoolTransfer::new(key.clone()))?;
    }
    next.evaluate(parameters, context)?;
    Ok(next)
}

/// Uptake leaves the accessible pools, mortality returns carbon along the
/// species signature. Returns the microbes of the next step.
fn apply_microbes(
    parameters: &Parameters,
    current: &State,
    substrate: &mut Substrate,
    dt: f64,
) -> Result<Vec<Microbe>> {
    let mut next = Vec::with_capacity(current.microbes().len());
    for (name, microbe) in current.microbes() {
        let species = parameters.species(name)?;
        let assimilation = microbe.assimilation_flux()?;
        for (class, uptake) in microbe.uptake_flux()? {
            substrate.accessible_pool_mut(class)?.remove(&uptake.scaled(dt))?;
        }
        let mortality = microbe.mortality_flux()?;
        for (class, signature) in species.signature() {
            substrate
                .accessible_pool_mut(class)?
                .add(&signature.scaled(dt * mortality))?;
        }
        let mass = microbe.mass() + dt * (assimilation - mortality);
        log::trace!(
            "date {}: microbe {} mass {} -> {}",
            current.date(),
            name,
            microbe.mass(),
            mass
        );
        next.push(Microbe::new(name.clone(), mass));
    }
    Ok(next)
}

fn apply_transfers(current: &State, substrate: &mut Substrate, dt: f64) -> Result<()> {
    for (key, transfer) in current.transfers() {
        let delta = transfer.flux()?.scaled(dt);
        substrate.pool_mut(&key.class, key.origin)?.remove(&delta)?;
        substrate.pool_mut(&key.class, key.arrival)?.add(&delta)?;
    }
    Ok(())
}

/// Enzymes sharing a class are summed into one operator per class, in
/// enzyme name order, and applied to the current accessible pool.
fn apply_depolymerization(
    parameters: &Parameters,
    current: &State,
    substrate: &mut Substrate,
    dt: f64,
) -> Result<()> {
    let mut operators: BTreeMap<&str, Matrix> = BTreeMap::new();
    for (name, enzyme) in current.enzymes() {
        let class = parameters.enzyme(name)?.class.as_str();
        let operator = parameters
            .kernel(name)?
            .depolymerization_operator(enzyme.depolymerization_rate()?.y())?;
        match operators.get_mut(class) {
            Some(sum) => sum.add_assign(&operator)?,
            None => {
                operators.insert(class, operator);
            }
        }
    }
    for (class, operator) in operators {
        let pool = current.substrate().accessible_pool(class)?.distribution();
        let delta = pool.transform(&operator)?.scaled(dt);
        substrate.accessible_pool_mut(class)?.add(&delta)?;
    }
    Ok(())
}
