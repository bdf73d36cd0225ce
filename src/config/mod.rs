//! Configuration module for loading a simulation setup.
//!
//! The setup is a single JSON document. It is validated here, once; the
//! simulation core only sees the resulting runtime objects.

mod dates;
mod function;
mod setup;

pub use dates::ObservedDates;
pub use function::FunctionSpec;
pub use setup::{
    load, AssimilationSpec, ClassSpec, EnzymeSpec, MicrobeSpec, ObserverKind, ObserverSpec, PoolFunctionSpec,
    PoolSpec, Setup, SetupFile, SignatureSpec, TransferSpec,
};
