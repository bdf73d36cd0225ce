//! Discretized distribution algebra.
//!
//! Every carbon quantity in the simulator that varies along the
//! polymerization axis is one of these types:
//! - [`Interval`]: closed numeric range
//! - [`DiscreteDistribution`]: grid + values + integration rule
//! - [`PositiveDistribution`]: the same with a non-negativity invariant

mod discrete;
mod interval;
mod positive;

pub use discrete::{DiscreteDistribution, IntegrationMethod};
pub use interval::Interval;
pub use positive::PositiveDistribution;
