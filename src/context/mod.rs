//! Run context: time discretization and external substrate inputs.

mod inputs;
mod timeline;

pub use inputs::SubstrateInputManager;
pub use timeline::{integral_date, Timeline};

use crate::error::{Result, SimError};

/// Read-only run context.
#[derive(Debug, Clone)]
pub struct Context {
    /// Unit of one time step, e.g. "day"
    time_unit: String,
    initial_date: i64,
    final_date: i64,
    user_time_step: f64,
    timeline: Timeline,
    inputs: SubstrateInputManager,
}

impl Context {
    /// Build a context without substrate inputs.
    pub fn new(
        time_unit: impl Into<String>,
        initial_date: i64,
        final_date: i64,
        user_time_step: f64,
    ) -> Result<Self> {
        if initial_date < 0 {
            return Err(SimError::Construction(format!(
                "initial date {} must be non negative",
                initial_date
            )));
        }
        if final_date < initial_date {
            return Err(SimError::Construction(format!(
                "final date {} is before initial date {}",
                final_date, initial_date
            )));
        }
        if !(user_time_step > 0.0) {
            return Err(SimError::Construction(format!(
                "user time step {} must be positive",
                user_time_step
            )));
        }
        let time_unit = time_unit.into();
        let timeline = Timeline::new(time_unit.clone(), initial_date, final_date, user_time_step)?;
        Ok(Self {
            time_unit,
            initial_date,
            final_date,
            user_time_step,
            timeline,
            inputs: SubstrateInputManager::default(),
        })
    }

    pub fn with_inputs(mut self, inputs: SubstrateInputManager) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn time_unit(&self) -> &str {
        &self.time_unit
    }

    pub fn initial_date(&self) -> i64 {
        self.initial_date
    }

    pub fn final_date(&self) -> i64 {
        self.final_date
    }

    pub fn user_time_step(&self) -> f64 {
        self.user_time_step
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn inputs(&self) -> &SubstrateInputManager {
        &self.inputs
    }
}
