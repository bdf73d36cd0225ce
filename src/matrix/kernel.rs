//! Depolymerization kernel matrices.
//!
//! Entry `(i, j)` is the share of mass at polymerization `x_j` that an enzyme
//! sends to `x_i`. Columns are normalised so that mass is conserved. The
//! matrix is built once per enzyme and reused at every time step.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::Matrix;
use crate::context::Context;
use crate::distribution::IntegrationMethod;
use crate::error::{Result, SimError};
use crate::function::{Args, Arity, Function};
use crate::parameters::{Parameters, Polymerization};

/// Relative tolerance on column mass before a warning is logged.
const MASS_CONSERVATION_TOLERANCE: f64 = 0.01;

/// How kernel entries are computed from the kernel function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelIntegration {
    /// Kernel evaluated at grid-point pairs with quadrature weights.
    Standard,
    /// Half-sums of closed-form primitives over consecutive grid bins.
    Integral,
}

impl Default for KernelIntegration {
    fn default() -> Self {
        KernelIntegration::Standard
    }
}

/// Column-normalised transition operator of one enzyme.
#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeKernelMatrix {
    matrix: Matrix,
    integration: KernelIntegration,
}

impl EnzymeKernelMatrix {
    /// Build the kernel of `enzyme` over `polymerization`.
    pub fn build(
        enzyme: &str,
        kernel: &Function,
        integration: KernelIntegration,
        polymerization: &Polymerization,
        parameters: &Parameters,
        context: &Context,
    ) -> Result<Self> {
        if kernel.arity() != Arity::Two {
            return Err(SimError::Setup(format!(
                "kernel of enzyme {} must take two arguments, {} takes {}",
                enzyme,
                kernel,
                kernel.arity()
            )));
        }
        match integration {
            KernelIntegration::Standard => Self::standard(
                enzyme,
                polymerization.grid(),
                polymerization.step(),
                parameters.integration_method(),
                |xi, xj| kernel.execute(parameters, context, None, Args::Two(xi, xj)),
            ),
            KernelIntegration::Integral => {
                if !kernel.has_primitive() {
                    return Err(SimError::MissingCapability(format!(
                        "integral kernel of enzyme {} needs a primitive, {} has none",
                        enzyme, kernel
                    )));
                }
                let grid = polymerization.grid();
                Self::integral(enzyme, grid.len(), |i, j| kernel.primitive(grid, i, j))
            }
        }
    }

    /// Pointwise kernel with quadrature weights.
    ///
    /// Rectangle-left leaves the last row and column empty, rectangle-right
    /// the first ones, trapezoid halves the first and last columns. Each
    /// filled column is then rescaled to unit mass (`sum · step == 1`) and
    /// the whole matrix is multiplied by `step`.
    pub fn standard<F>(
        enzyme: &str,
        grid: &[f64],
        step: f64,
        method: IntegrationMethod,
        kernel: F,
    ) -> Result<Self>
    where
        F: Fn(f64, f64) -> Result<f64>,
    {
        let (mut matrix, filled) = standard_entries(enzyme, grid, method, kernel)?;
        for j in filled {
            normalize_column(enzyme, &mut matrix, j, step);
        }
        matrix.scale(step);
        Ok(Self {
            matrix,
            integration: KernelIntegration::Standard,
        })
    }

    /// Pre-integrated kernel from the primitive `L(i, j)` of the kernel
    /// over `[x_j, x_{j+1}]`.
    ///
    /// Entry `(i, 0)` is `L(i, 0)/2`, entry `(i, j)` is
    /// `(L(i, j-1) + L(i, j))/2` and entry `(i, n-1)` is `L(i, n-2)/2`.
    /// Columns are then rescaled to unit sum.
    pub fn integral<P>(enzyme: &str, n: usize, primitive: P) -> Result<Self>
    where
        P: Fn(usize, usize) -> Result<f64>,
    {
        if n < 2 {
            return Err(SimError::Construction(format!(
                "kernel of enzyme {} needs at least 2 grid points",
                enzyme
            )));
        }
        let mut matrix = Matrix::zeros(n, n);
        for i in 0..n {
            let l = (0..n - 1)
                .map(|j| primitive(i, j))
                .collect::<Result<Vec<f64>>>()?;
            matrix.set(i, 0, 0.5 * l[0]);
            for j in 1..n - 1 {
                matrix.set(i, j, 0.5 * (l[j - 1] + l[j]));
            }
            matrix.set(i, n - 1, 0.5 * l[n - 2]);
        }
        for j in 0..n {
            normalize_column(enzyme, &mut matrix, j, 1.0);
        }
        Ok(Self {
            matrix,
            integration: KernelIntegration::Integral,
        })
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn integration(&self) -> KernelIntegration {
        self.integration
    }

    pub fn size(&self) -> usize {
        self.matrix.rows()
    }

    /// `(K - I)·diag(rate)`: the net depolymerization operator for one step.
    pub fn depolymerization_operator(&self, rate: &[f64]) -> Result<Matrix> {
        let n = self.size();
        if rate.len() != n {
            return Err(SimError::Domain(format!(
                "depolymerization rate has {} values, kernel is {}x{}",
                rate.len(),
                n,
                n
            )));
        }
        let mut operator = self.matrix.sub(&Matrix::identity(n))?;
        for (j, r) in rate.iter().enumerate() {
            operator.scale_column(j, *r);
        }
        Ok(operator)
    }
}

/// Raw pointwise entries of a standard kernel, with quadrature weights
/// but before normalization, and the range of filled rows and columns.
fn standard_entries<F>(
    enzyme: &str,
    grid: &[f64],
    method: IntegrationMethod,
    kernel: F,
) -> Result<(Matrix, Range<usize>)>
where
    F: Fn(f64, f64) -> Result<f64>,
{
    let n = grid.len();
    if n < 2 {
        return Err(SimError::Construction(format!(
            "kernel of enzyme {} needs at least 2 grid points",
            enzyme
        )));
    }
    let mut matrix = Matrix::zeros(n, n);
    let filled = match method {
        IntegrationMethod::RectangleLeft => 0..n - 1,
        IntegrationMethod::RectangleRight => 1..n,
        IntegrationMethod::Trapezoid => 0..n,
    };
    for i in filled.clone() {
        for j in filled.clone() {
            let mut value = kernel(grid[i], grid[j])?;
            if method == IntegrationMethod::Trapezoid && (j == 0 || j == n - 1) {
                value *= 0.5;
            }
            matrix.set(i, j, value);
        }
    }
    Ok((matrix, filled))
}

fn conserves_mass(mass: f64) -> bool {
    (mass - 1.0).abs() <= MASS_CONSERVATION_TOLERANCE
}

/// Rescale column `j` so that `sum · weight == 1`, warning when the raw
/// mass is off by more than the tolerance. Empty columns are left as is.
/// Returns the raw mass.
fn normalize_column(enzyme: &str, matrix: &mut Matrix, j: usize, weight: f64) -> f64 {
    let mass = matrix.column_sum(j) * weight;
    if !conserves_mass(mass) {
        log::warn!(
            "Kernel of enzyme {}: column {} has mass {:.6}, expected 1 (check kernel for mass conservation)",
            enzyme,
            j,
            mass
        );
    }
    if mass != 0.0 {
        matrix.scale_column(j, 1.0 / mass);
    }
    mass
}
