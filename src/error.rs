//! Error taxonomy for the simulation core.
//!
//! Every failure inside the core is fatal: the time-stepping loop never
//! catches and continues. The outer layers (setup loading, observation
//! writing, CLI) wrap these errors with `anyhow` context.

use thiserror::Error;

/// Errors raised by the numerical core and the per-step evaluation logic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Malformed grid, interval or matrix parameters.
    #[error("construction error: {0}")]
    Construction(String),

    /// Negative value in a positive distribution, duplicate key insertion,
    /// double evaluation.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Interpolation/integration outside support, grid mismatch between
    /// combined distributions, wrong function arity.
    #[error("domain error: {0}")]
    Domain(String),

    /// Unknown referenced name or otherwise inconsistent setup.
    #[error("setup inconsistency: {0}")]
    Setup(String),

    /// A capability required by the setup is not provided (e.g. a kernel
    /// function without primitive used in integral mode).
    #[error("missing capability: {0}")]
    MissingCapability(String),
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, SimError>;
