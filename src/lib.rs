//! Carbon Stability - soil organic carbon decomposition simulator
//!
//! Substrate carbon is held in pools discretized along a polymerization
//! axis. Microbes take it up and return it on death, enzymes depolymerize
//! it through kernel matrices, and it moves between accessibility states.
//! All fluxes are integrated with a fixed-step explicit Euler scheme.

pub mod config;
pub mod context;
pub mod distribution;
pub mod error;
pub mod export;
pub mod function;
pub mod matrix;
pub mod observer;
pub mod parameters;
pub mod simulator;
pub mod state;

pub use context::{Context, SubstrateInputManager, Timeline};
pub use distribution::{DiscreteDistribution, IntegrationMethod, Interval, PositiveDistribution};
pub use error::{Result, SimError};
pub use function::{Args, Arity, Function};
pub use matrix::{EnzymeKernelMatrix, KernelIntegration, Matrix};
pub use observer::{ObservableVariable, ObservedItem, Observer, ObserverList};
pub use parameters::{Accessibility, Parameters, PoolKey, TransferKey};
pub use simulator::{advance, Simulator, StateListener};
pub use state::{Pool, State, Substrate};
