//! Function declarations of the setup file.

use serde::{Deserialize, Serialize};

use crate::distribution::Interval;
use crate::error::{Result, SimError};
use crate::function::Function;
use crate::parameters::Parameters;

/// A function as written in the setup file, e.g.
/// `{"type": "gaussian", "mean": 1.2, "sd": 0.1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum FunctionSpec {
    Constant {
        value: f64,
    },
    Linear {
        slope: f64,
    },
    Gaussian {
        mean: f64,
        sd: f64,
    },
    GaussianTruncatedNormalized {
        class: String,
        mean: f64,
        sd: f64,
        domain: [f64; 2],
    },
    GaussianTruncatedProportionalized {
        class: String,
        proportion: f64,
        mean: f64,
        sd: f64,
        domain: [f64; 2],
    },
    UniformLinear {
        domain: [f64; 2],
        slope: f64,
    },
    KernelAlpha {
        domain: [f64; 2],
        alpha: f64,
    },
    EnzymaticLinearTransfer {
        enzyme: String,
        rate: f64,
    },
    ConstantInput {
        value: f64,
        signature: Box<FunctionSpec>,
    },
}

impl FunctionSpec {
    /// Build the runtime function. Classes and enzymes it names must
    /// already be declared in `parameters`.
    pub fn resolve(&self, parameters: &Parameters) -> Result<Function> {
        match self {
            FunctionSpec::Constant { value } => Ok(Function::constant(*value)),
            FunctionSpec::Linear { slope } => Ok(Function::linear(*slope)),
            FunctionSpec::Gaussian { mean, sd } => Function::gaussian(*mean, *sd),
            FunctionSpec::GaussianTruncatedNormalized {
                class,
                mean,
                sd,
                domain,
            } => Function::gaussian_truncated_normalized(
                parameters.class(class)?,
                parameters.integration_method(),
                *mean,
                *sd,
                Interval::try_from(*domain)?,
            ),
            FunctionSpec::GaussianTruncatedProportionalized {
                class,
                proportion,
                mean,
                sd,
                domain,
            } => Function::gaussian_truncated_proportionalized(
                parameters.class(class)?,
                parameters.integration_method(),
                *proportion,
                *mean,
                *sd,
                Interval::try_from(*domain)?,
            ),
            FunctionSpec::UniformLinear { domain, slope } => {
                Ok(Function::uniform_linear(Interval::try_from(*domain)?, *slope))
            }
            FunctionSpec::KernelAlpha { domain, alpha } => {
                Function::kernel_alpha(Interval::try_from(*domain)?, *alpha)
            }
            FunctionSpec::EnzymaticLinearTransfer { enzyme, rate } => {
                if parameters.enzymes().contains_key(enzyme) {
                    Ok(Function::enzymatic_linear_transfer(enzyme.clone(), *rate))
                } else {
                    Err(SimError::Setup(format!(
                        "enzymatic_linear_transfer refers to unknown enzyme {}",
                        enzyme
                    )))
                }
            }
            FunctionSpec::ConstantInput { value, signature } => {
                Function::constant_input(*value, signature.resolve(parameters)?)
            }
        }
    }
}
