//! Closed library of scalar functions used throughout a setup.
//!
//! Every function declares an [`Arity`] (zero, one or two real arguments)
//! and is evaluated with [`Function::execute`]. Setup-dependent constants
//! (truncated-gaussian normalisation coefficients) are resolved when the
//! function is built, so evaluation never mutates the function.
//!
//! Variants:
//! - `Constant`: c
//! - `Linear`: slope·x
//! - `Gaussian`: normal density
//! - `GaussianTruncatedNormalized`: gaussian restricted to a domain, unit mass on a class grid
//! - `GaussianTruncatedProportionalized`: same, with mass `proportion`
//! - `UniformLinear`: indicator(domain, x1)·slope·x2
//! - `KernelAlpha`: depolymerization kernel with a closed-form primitive
//! - `EnzymaticLinearTransfer`: rate·activity(enzyme)·x
//! - `ConstantInput`: value·signature(x), evaluated at (date, x)

pub mod basic;

use std::fmt;

use crate::context::Context;
use crate::distribution::{DiscreteDistribution, IntegrationMethod, Interval};
use crate::error::{Result, SimError};
use crate::parameters::{BiochemicalClass, Parameters};
use crate::state::State;

use basic::{check_sd, gaussian, indicator};

/// Number of real arguments a function expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Zero,
    One,
    Two,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Arity::Zero => 0,
            Arity::One => 1,
            Arity::Two => 2,
        };
        write!(f, "{}", n)
    }
}

/// Argument tuple handed to [`Function::execute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Args {
    Zero,
    One(f64),
    Two(f64, f64),
}

impl Args {
    pub fn arity(&self) -> Arity {
        match self {
            Args::Zero => Arity::Zero,
            Args::One(_) => Arity::One,
            Args::Two(_, _) => Arity::Two,
        }
    }
}

/// A function declared in the setup.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
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
        domain: Interval,
        /// 1 / mass of the truncated gaussian on the class grid
        coefficient: f64,
    },
    GaussianTruncatedProportionalized {
        class: String,
        proportion: f64,
        mean: f64,
        sd: f64,
        domain: Interval,
        /// proportion / mass of the truncated gaussian on the class grid
        coefficient: f64,
    },
    UniformLinear {
        domain: Interval,
        slope: f64,
    },
    KernelAlpha {
        domain: Interval,
        alpha: f64,
    },
    EnzymaticLinearTransfer {
        enzyme: String,
        rate: f64,
    },
    ConstantInput {
        value: f64,
        signature: Box<Function>,
    },
}

impl Function {
    pub fn constant(value: f64) -> Self {
        Function::Constant { value }
    }

    pub fn linear(slope: f64) -> Self {
        Function::Linear { slope }
    }

    pub fn gaussian(mean: f64, sd: f64) -> Result<Self> {
        check_sd(sd)?;
        Ok(Function::Gaussian { mean, sd })
    }

    /// Truncated gaussian with unit mass on the grid of `class`.
    pub fn gaussian_truncated_normalized(
        class: &BiochemicalClass,
        method: IntegrationMethod,
        mean: f64,
        sd: f64,
        domain: Interval,
    ) -> Result<Self> {
        check_sd(sd)?;
        let mass = truncated_gaussian_mass(class, method, mean, sd, &domain)?;
        Ok(Function::GaussianTruncatedNormalized {
            class: class.name().to_string(),
            mean,
            sd,
            domain,
            coefficient: 1.0 / mass,
        })
    }

    /// Truncated gaussian with mass `proportion` on the grid of `class`.
    pub fn gaussian_truncated_proportionalized(
        class: &BiochemicalClass,
        method: IntegrationMethod,
        proportion: f64,
        mean: f64,
        sd: f64,
        domain: Interval,
    ) -> Result<Self> {
        check_sd(sd)?;
        let mass = truncated_gaussian_mass(class, method, mean, sd, &domain)?;
        Ok(Function::GaussianTruncatedProportionalized {
            class: class.name().to_string(),
            proportion,
            mean,
            sd,
            domain,
            coefficient: proportion / mass,
        })
    }

    pub fn uniform_linear(domain: Interval, slope: f64) -> Self {
        Function::UniformLinear { domain, slope }
    }

    pub fn kernel_alpha(domain: Interval, alpha: f64) -> Result<Self> {
        if !(alpha > 0.0) {
            return Err(SimError::Construction(format!(
                "kernel_alpha needs alpha > 0, got {}",
                alpha
            )));
        }
        Ok(Function::KernelAlpha { domain, alpha })
    }

    pub fn enzymatic_linear_transfer(enzyme: impl Into<String>, rate: f64) -> Self {
        Function::EnzymaticLinearTransfer {
            enzyme: enzyme.into(),
            rate,
        }
    }

    /// Input flux `value·signature(x)`; the signature takes at most one argument.
    pub fn constant_input(value: f64, signature: Function) -> Result<Self> {
        if signature.arity() == Arity::Two {
            return Err(SimError::Construction(format!(
                "constant_input signature must take at most one argument, got {}",
                signature.name()
            )));
        }
        Ok(Function::ConstantInput {
            value,
            signature: Box::new(signature),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Constant { .. } => "constant",
            Function::Linear { .. } => "linear",
            Function::Gaussian { .. } => "gaussian",
            Function::GaussianTruncatedNormalized { .. } => "gaussian_truncated_normalized",
            Function::GaussianTruncatedProportionalized { .. } => {
                "gaussian_truncated_proportionalized"
            }
            Function::UniformLinear { .. } => "uniform_linear",
            Function::KernelAlpha { .. } => "kernel_alpha",
            Function::EnzymaticLinearTransfer { .. } => "enzymatic_linear_transfer",
            Function::ConstantInput { .. } => "constant_input",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Function::Constant { .. } => Arity::Zero,
            Function::Linear { .. }
            | Function::Gaussian { .. }
            | Function::GaussianTruncatedNormalized { .. }
            | Function::GaussianTruncatedProportionalized { .. }
            | Function::EnzymaticLinearTransfer { .. } => Arity::One,
            Function::UniformLinear { .. }
            | Function::KernelAlpha { .. }
            | Function::ConstantInput { .. } => Arity::Two,
        }
    }

    /// Evaluate the function. `state` is `None` during setup.
    pub fn execute(
        &self,
        parameters: &Parameters,
        context: &Context,
        state: Option<&State>,
        args: Args,
    ) -> Result<f64> {
        if args.arity() != self.arity() {
            return Err(self.arity_error(args.arity()));
        }
        let value = match (self, args) {
            (Function::Constant { value }, Args::Zero) => *value,
            (Function::Linear { slope }, Args::One(x)) => slope * x,
            (Function::Gaussian { mean, sd }, Args::One(x)) => gaussian(*mean, *sd, x),
            (
                Function::GaussianTruncatedNormalized {
                    mean,
                    sd,
                    domain,
                    coefficient,
                    ..
                }
                | Function::GaussianTruncatedProportionalized {
                    mean,
                    sd,
                    domain,
                    coefficient,
                    ..
                },
                Args::One(x),
            ) => indicator(domain, x) * gaussian(*mean, *sd, x) * coefficient,
            (Function::UniformLinear { domain, slope }, Args::Two(x1, x2)) => {
                indicator(domain, x1) * slope * x2
            }
            (Function::KernelAlpha { domain, alpha }, Args::Two(pi, pj)) => {
                kernel_alpha(domain, *alpha, parameters.user_polymerization_step(), pi, pj)
            }
            (Function::EnzymaticLinearTransfer { enzyme, rate }, Args::One(x)) => {
                let state = state.ok_or_else(|| {
                    SimError::Domain(format!(
                        "enzymatic_linear_transfer on {} needs a simulation state",
                        enzyme
                    ))
                })?;
                rate * state.enzyme(enzyme)?.activity()? * x
            }
            (Function::ConstantInput { value, signature }, Args::Two(_date, x)) => {
                value * signature.execute_at(parameters, context, state, x)?
            }
            (_, args) => return Err(self.arity_error(args.arity())),
        };
        Ok(value)
    }

    /// Evaluate at a grid abscissa: `f()` for arity 0, `f(x)` for arity 1.
    pub fn execute_at(
        &self,
        parameters: &Parameters,
        context: &Context,
        state: Option<&State>,
        x: f64,
    ) -> Result<f64> {
        match self.arity() {
            Arity::Zero => self.execute(parameters, context, state, Args::Zero),
            Arity::One => self.execute(parameters, context, state, Args::One(x)),
            Arity::Two => Err(self.arity_error(Arity::One)),
        }
    }

    /// Pointwise application on the values of `distribution`.
    ///
    /// Arity 0 gives `f()`, arity 1 gives `f(y_i)` and arity 2 gives
    /// `f(x_i, y_i)`. The result lives on the same grid.
    pub fn apply(
        &self,
        parameters: &Parameters,
        context: &Context,
        state: Option<&State>,
        distribution: &DiscreteDistribution,
    ) -> Result<DiscreteDistribution> {
        let y = distribution.y();
        distribution.from_fn(|i, x| {
            let args = match self.arity() {
                Arity::Zero => Args::Zero,
                Arity::One => Args::One(y[i]),
                Arity::Two => Args::Two(x, y[i]),
            };
            self.execute(parameters, context, state, args)
        })
    }

    /// Sample the function on the grid of `grid` (see [`Function::execute_at`]).
    pub fn sample(
        &self,
        parameters: &Parameters,
        context: &Context,
        state: Option<&State>,
        grid: &DiscreteDistribution,
    ) -> Result<DiscreteDistribution> {
        grid.from_fn(|_, x| self.execute_at(parameters, context, state, x))
    }

    /// Whether [`Function::primitive`] is available.
    pub fn has_primitive(&self) -> bool {
        matches!(self, Function::KernelAlpha { .. })
    }

    /// Primitive with respect to the second argument, between grid points
    /// `j` and `j + 1`, for the first argument at grid point `i`.
    pub fn primitive(&self, grid: &[f64], i: usize, j: usize) -> Result<f64> {
        match self {
            Function::KernelAlpha { domain, alpha } => {
                if i >= grid.len() || j + 1 >= grid.len() {
                    return Err(SimError::Domain(format!(
                        "primitive indices ({}, {}) out of a grid of {} points",
                        i,
                        j,
                        grid.len()
                    )));
                }
                Ok(kernel_alpha_primitive(domain, *alpha, grid, i, j))
            }
            _ => Err(SimError::MissingCapability(format!(
                "function {} has no primitive",
                self.name()
            ))),
        }
    }

    fn arity_error(&self, given: Arity) -> SimError {
        SimError::Domain(format!(
            "function {} expects {} argument(s), got {}",
            self.name(),
            self.arity(),
            given
        ))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn kernel_alpha(domain: &Interval, alpha: f64, step: f64, pi: f64, pj: f64) -> f64 {
    let (pmin, pmax) = (domain.min(), domain.max());
    if pmin < pi && pi <= pj && pj <= pmax {
        (alpha + 1.0) * (pi - pmin).powf(alpha) / (pj - pmin).powf(alpha + 1.0)
    } else if pi == pmin && pj == pmin {
        1.0 / step
    } else {
        0.0
    }
}

fn kernel_alpha_primitive(domain: &Interval, alpha: f64, grid: &[f64], i: usize, j: usize) -> f64 {
    if j < i {
        return 0.0;
    }
    let factor = (alpha + 1.0) / alpha;
    if j == 0 {
        return factor;
    }
    let pmin = domain.min();
    let (pi, pj, pnext) = (grid[i], grid[j], grid[j + 1]);
    factor * (((pi - pmin) / (pj - pmin)).powf(alpha) - ((pi - pmin) / (pnext - pmin)).powf(alpha))
}

fn truncated_gaussian_mass(
    class: &BiochemicalClass,
    method: IntegrationMethod,
    mean: f64,
    sd: f64,
    domain: &Interval,
) -> Result<f64> {
    let grid = class.polymerization().grid().to_vec();
    let values = grid
        .iter()
        .map(|x| indicator(domain, *x) * gaussian(mean, sd, *x))
        .collect();
    let mass = DiscreteDistribution::new(grid, values, method)?.integral();
    if mass > 0.0 {
        Ok(mass)
    } else {
        Err(SimError::Construction(format!(
            "truncated gaussian on {} has no mass on the grid of class {}",
            domain,
            class.name()
        )))
    }
}
