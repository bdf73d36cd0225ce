//! Time-stepping driver.
//!
//! [`advance`] is the pure step function. [`Simulator`] walks the timeline
//! with it, keeps only the current state, feeds observers at every integral
//! date and then notifies listeners of the new state.

mod step;

pub use step::advance;

use std::path::{Path, PathBuf};

use crate::context::{integral_date, Context};
use crate::error::{Result, SimError};
use crate::observer::ObserverList;
use crate::parameters::Parameters;
use crate::state::State;

/// Receives every new state right after it replaces the previous one.
///
/// The state is borrowed: anything needed later must be copied out.
pub trait StateListener {
    fn state_changed(&mut self, state: &State) -> Result<()>;
}

pub struct Simulator {
    parameters: Parameters,
    context: Context,
    state: State,
    observers: ObserverList,
    listeners: Vec<Box<dyn StateListener>>,
    /// Timeline index of `state`
    iteration: usize,
    started: bool,
    /// ∫ respiration dt since the initial date (g C)
    respired: f64,
}

impl Simulator {
    /// `parameters` must be finalized. The initial state is evaluated here
    /// unless the caller already did it.
    pub fn new(
        parameters: Parameters,
        context: Context,
        mut initial_state: State,
        observers: ObserverList,
    ) -> Result<Self> {
        if !parameters.is_finalized() {
            return Err(SimError::Setup(
                "parameters must be finalized before simulating".to_string(),
            ));
        }
        let first = context.timeline().dates().first().copied();
        if first != Some(initial_state.date()) {
            return Err(SimError::Setup(format!(
                "initial state date {} does not start the timeline",
                initial_state.date()
            )));
        }
        if !initial_state.is_evaluated() {
            initial_state.evaluate(&parameters, &context)?;
        }
        Ok(Self {
            parameters,
            context,
            state: initial_state,
            observers,
            listeners: Vec::new(),
            iteration: 0,
            started: false,
            respired: 0.0,
        })
    }

    pub fn add_listener(&mut self, listener: Box<dyn StateListener>) {
        self.listeners.push(listener);
    }

    /// Run until the final date of the timeline.
    pub fn run(&mut self) -> Result<()> {
        log::info!(
            "Simulating {} to {} {} with dt = {}",
            self.context.initial_date(),
            self.context.final_date(),
            self.context.time_unit(),
            self.context.timeline().step()
        );
        while self.step()? {}
        Ok(())
    }

    /// Advance one time step. Returns `false` once the timeline is done.
    pub fn step(&mut self) -> Result<bool> {
        if !self.started {
            self.started = true;
            self.observe_current()?;
        }
        let it = self.iteration + 1;
        if it >= self.context.timeline().len() {
            return Ok(false);
        }
        let next = advance(&self.parameters, &self.context, &self.state, it)?;
        self.respired += self.context.timeline().step() * self.state.respiration()?;
        self.state = next;
        self.iteration = it;

        self.observe_current()?;
        for listener in self.listeners.iter_mut() {
            listener.state_changed(&self.state)?;
        }
        Ok(true)
    }

    fn observe_current(&mut self) -> Result<()> {
        let day = match integral_date(self.state.date()) {
            Some(day) => day,
            None => return Ok(()),
        };
        self.observers.observe(&self.state, day)?;
        log::info!(
            "simulation time {} / {} {}",
            day,
            self.context.final_date(),
            self.context.time_unit()
        );
        log::debug!(
            "date {}: carbon in pools and biomass {:.6} g, respired {:.6} g",
            day,
            self.state.total_carbon(),
            self.respired
        );
        Ok(())
    }

    pub fn current_state(&self) -> &State {
        &self.state
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn observers(&self) -> &ObserverList {
        &self.observers
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> usize {
        self.iteration
    }

    pub fn is_finished(&self) -> bool {
        self.iteration + 1 >= self.context.timeline().len()
    }

    /// Carbon respired since the initial date (g C).
    pub fn cumulative_respiration(&self) -> f64 {
        self.respired
    }

    pub fn write_observations(&self, output_dir: &Path, append: bool) -> anyhow::Result<Vec<PathBuf>> {
        self.observers.write(output_dir, append)
    }
}
