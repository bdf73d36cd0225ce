//! External carbon inputs onto substrate pools.

use std::collections::BTreeMap;

use super::Context;
use crate::distribution::DiscreteDistribution;
use crate::error::{Result, SimError};
use crate::function::{Args, Arity, Function};
use crate::parameters::{Parameters, PoolKey};
use crate::state::{Pool, State};

/// Pool → input flux function of `(date, polymerization)`.
#[derive(Debug, Clone, Default)]
pub struct SubstrateInputManager {
    inputs: BTreeMap<PoolKey, Function>,
}

impl SubstrateInputManager {
    pub fn add(&mut self, pool: PoolKey, function: Function) -> Result<()> {
        if function.arity() != Arity::Two {
            return Err(SimError::Setup(format!(
                "input on pool {} must be a function of (date, x), {} takes {} argument(s)",
                pool,
                function,
                function.arity()
            )));
        }
        if self.inputs.contains_key(&pool) {
            return Err(SimError::Invariant(format!("input on pool {} is defined twice", pool)));
        }
        self.inputs.insert(pool, function);
        Ok(())
    }

    pub fn get(&self, pool: &PoolKey) -> Option<&Function> {
        self.inputs.get(pool)
    }

    pub fn pools(&self) -> impl Iterator<Item = &PoolKey> {
        self.inputs.keys()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Input flux onto `pool` at `date`, on the pool grid. `None` when the
    /// pool has no registered input.
    pub fn input(
        &self,
        parameters: &Parameters,
        context: &Context,
        state: &State,
        pool: &Pool,
        date: f64,
    ) -> Result<Option<DiscreteDistribution>> {
        let function = match self.inputs.get(&pool.key()) {
            Some(f) => f,
            None => return Ok(None),
        };
        let flux = pool.distribution().from_fn(|_, x| {
            function.execute(parameters, context, Some(state), Args::Two(date, x))
        })?;
        Ok(Some(flux))
    }
}
