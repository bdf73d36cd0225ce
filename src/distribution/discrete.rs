//! Sampled distribution on a strictly increasing grid.
//!
//! A `DiscreteDistribution` owns its grid `x`, its values `y`, the
//! integration rule used to compute its mass and a cached integral that is
//! refreshed after every mutation. Binary operations require the two
//! operands to share the exact same grid and integration rule: there is no
//! resampling anywhere in the engine.

use serde::{Deserialize, Serialize};

use super::Interval;
use crate::error::{Result, SimError};
use crate::matrix::Matrix;

/// Quadrature rule used to integrate sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    /// f(x_i)·Δx over [x_i, x_{i+1})
    RectangleLeft,
    /// f(x_{i+1})·Δx over [x_i, x_{i+1})
    RectangleRight,
    /// (f(x_i) + f(x_{i+1}))/2·Δx
    Trapezoid,
}

impl IntegrationMethod {
    /// Integral of one bin `[x0, x1]` with endpoint values `y0`, `y1`.
    #[inline]
    pub fn segment(self, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
        let dx = x1 - x0;
        match self {
            IntegrationMethod::RectangleLeft => y0 * dx,
            IntegrationMethod::RectangleRight => y1 * dx,
            IntegrationMethod::Trapezoid => 0.5 * (y0 + y1) * dx,
        }
    }

    /// Integral over whole bins of `x`/`y` (slices of equal length).
    pub fn integrate(self, x: &[f64], y: &[f64]) -> f64 {
        x.windows(2)
            .zip(y.windows(2))
            .map(|(xs, ys)| self.segment(xs[0], xs[1], ys[0], ys[1]))
            .sum()
    }
}

impl Default for IntegrationMethod {
    fn default() -> Self {
        IntegrationMethod::RectangleLeft
    }
}

/// Discretized distribution with a cached integral.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteDistribution {
    x: Vec<f64>,
    y: Vec<f64>,
    method: IntegrationMethod,
    integral: f64,
}

impl DiscreteDistribution {
    /// Build a distribution, validating the grid and the value vector.
    pub fn new(x: Vec<f64>, y: Vec<f64>, method: IntegrationMethod) -> Result<Self> {
        validate_grid(&x)?;
        if x.len() != y.len() {
            return Err(SimError::Construction(format!(
                "x and y have different lengths ({} != {})",
                x.len(),
                y.len()
            )));
        }
        let integral = method.integrate(&x, &y);
        Ok(Self { x, y, method, integral })
    }

    /// All-zero distribution on the given grid.
    pub fn zeros(x: Vec<f64>, method: IntegrationMethod) -> Result<Self> {
        let y = vec![0.0; x.len()];
        Self::new(x, y, method)
    }

    /// All-zero distribution on the same grid and rule as `self`.
    pub fn zeros_like(&self) -> Self {
        Self {
            x: self.x.clone(),
            y: vec![0.0; self.x.len()],
            method: self.method,
            integral: 0.0,
        }
    }

    /// Distribution on the same grid whose values are `f(x_i)`.
    pub fn from_fn<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, f64) -> Result<f64>,
    {
        let y = self
            .x
            .iter()
            .enumerate()
            .map(|(i, &xi)| f(i, xi))
            .collect::<Result<Vec<f64>>>()?;
        Ok(self.with_values_unchecked(y))
    }

    #[inline]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[inline]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[inline]
    pub fn method(&self) -> IntegrationMethod {
        self.method
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Support `[x_0, x_{n-1}]`.
    pub fn support(&self) -> Interval {
        Interval::from_ordered(self.x[0], self.x[self.x.len() - 1])
    }

    /// Cached integral over the full support.
    #[inline]
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Integral over a sub-interval of the support.
    ///
    /// Partial bins at either end are integrated on linearly interpolated
    /// boundary values with the same rule as whole bins.
    pub fn integral_over(&self, interval: &Interval) -> Result<f64> {
        let support = self.support();
        if !support.includes(interval) {
            return Err(SimError::Domain(format!(
                "cannot integrate over {}, support is {}",
                interval, support
            )));
        }
        let (a, b) = (interval.min(), interval.max());
        if a == b {
            return Ok(0.0);
        }

        // first grid point >= a, last grid point <= b
        let first = self.x.partition_point(|&v| v < a);
        let last = self.x.partition_point(|&v| v <= b) - 1;

        if first > last {
            // a and b fall in the same bin
            let ya = self.interpolate(a)?;
            let yb = self.interpolate(b)?;
            return Ok(self.method.segment(a, b, ya, yb));
        }

        let mut total = 0.0;
        if self.x[first] > a {
            let ya = self.interpolate(a)?;
            total += self.method.segment(a, self.x[first], ya, self.y[first]);
        }
        if last > first {
            total += self
                .method
                .integrate(&self.x[first..=last], &self.y[first..=last]);
        }
        if self.x[last] < b {
            let yb = self.interpolate(b)?;
            total += self.method.segment(self.x[last], b, self.y[last], yb);
        }
        Ok(total)
    }

    /// Linear interpolation of the values at `at`.
    pub fn interpolate(&self, at: f64) -> Result<f64> {
        let n = self.x.len();
        if !(self.x[0] <= at && at <= self.x[n - 1]) {
            return Err(SimError::Domain(format!(
                "cannot interpolate at {}, support is {}",
                at,
                self.support()
            )));
        }
        if at == self.x[n - 1] {
            return Ok(self.y[n - 1]);
        }
        let i = self.x.partition_point(|&v| v <= at) - 1;
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        Ok(y0 + (y1 - y0) * (at - x0) / (x1 - x0))
    }

    /// Replace the values, keeping grid and rule.
    pub fn set_values(&mut self, y: Vec<f64>) -> Result<()> {
        if y.len() != self.x.len() {
            return Err(SimError::Domain(format!(
                "expected {} values, got {}",
                self.x.len(),
                y.len()
            )));
        }
        self.y = y;
        self.refresh();
        Ok(())
    }

    /// Divide values by the integral. No-op when the integral is zero.
    pub fn normalize(&mut self) {
        if self.integral != 0.0 {
            let integral = self.integral;
            self.y.iter_mut().for_each(|v| *v /= integral);
            self.refresh();
        }
    }

    /// Rescale values so that the integral equals `target`.
    ///
    /// Fails when the integral is zero and the target is not.
    pub fn proportionalize(&mut self, target: f64) -> Result<()> {
        if self.integral == 0.0 {
            if target == 0.0 {
                return Ok(());
            }
            return Err(SimError::Domain(format!(
                "cannot rescale a zero-mass distribution to {}",
                target
            )));
        }
        let factor = target / self.integral;
        self.scale(factor);
        Ok(())
    }

    /// Fails unless `other` lives on the same grid with the same rule.
    pub fn check_compatible(&self, other: &DiscreteDistribution) -> Result<()> {
        if self.method != other.method {
            return Err(SimError::Domain(format!(
                "integration methods differ ({:?} != {:?})",
                self.method, other.method
            )));
        }
        if self.x != other.x {
            return Err(SimError::Domain(
                "distributions are defined on different grids".to_string(),
            ));
        }
        Ok(())
    }

    /// `self += other`
    pub fn add_assign(&mut self, other: &DiscreteDistribution) -> Result<()> {
        self.check_compatible(other)?;
        self.y.iter_mut().zip(&other.y).for_each(|(a, b)| *a += b);
        self.refresh();
        Ok(())
    }

    /// `self -= other`
    pub fn sub_assign(&mut self, other: &DiscreteDistribution) -> Result<()> {
        self.check_compatible(other)?;
        self.y.iter_mut().zip(&other.y).for_each(|(a, b)| *a -= b);
        self.refresh();
        Ok(())
    }

    /// Elementwise `self *= other`
    pub fn mul_assign(&mut self, other: &DiscreteDistribution) -> Result<()> {
        self.check_compatible(other)?;
        self.y.iter_mut().zip(&other.y).for_each(|(a, b)| *a *= b);
        self.refresh();
        Ok(())
    }

    /// `self *= factor`
    pub fn scale(&mut self, factor: f64) {
        self.y.iter_mut().for_each(|v| *v *= factor);
        self.refresh();
    }

    pub fn add(&self, other: &DiscreteDistribution) -> Result<Self> {
        let mut out = self.clone();
        out.add_assign(other)?;
        Ok(out)
    }

    pub fn sub(&self, other: &DiscreteDistribution) -> Result<Self> {
        let mut out = self.clone();
        out.sub_assign(other)?;
        Ok(out)
    }

    /// Elementwise product.
    pub fn mul(&self, other: &DiscreteDistribution) -> Result<Self> {
        let mut out = self.clone();
        out.mul_assign(other)?;
        Ok(out)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = self.clone();
        out.scale(factor);
        out
    }

    /// `1 - y` on the same grid. Values must lie in `[0, 1]`.
    pub fn complement(&self) -> Result<Self> {
        if let Some(v) = self.y.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(SimError::Domain(format!(
                "complement needs values in [0, 1], found {}",
                v
            )));
        }
        Ok(self.with_values_unchecked(self.y.iter().map(|v| 1.0 - v).collect()))
    }

    /// `M · y`, treating the values as a column vector.
    pub fn transform(&self, matrix: &Matrix) -> Result<Self> {
        let y = matrix.mul_vec(&self.y)?;
        Ok(self.with_values_unchecked(y))
    }

    fn with_values_unchecked(&self, y: Vec<f64>) -> Self {
        let integral = self.method.integrate(&self.x, &y);
        Self {
            x: self.x.clone(),
            y,
            method: self.method,
            integral,
        }
    }

    fn refresh(&mut self) {
        self.integral = self.method.integrate(&self.x, &self.y);
    }
}

fn validate_grid(x: &[f64]) -> Result<()> {
    if x.len() < 2 {
        return Err(SimError::Construction(format!(
            "grid needs at least 2 points, got {}",
            x.len()
        )));
    }
    if let Some(v) = x.iter().find(|v| !v.is_finite()) {
        return Err(SimError::Construction(format!("grid value {} is not finite", v)));
    }
    if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
        return Err(SimError::Construction(format!(
            "grid is not strictly increasing at index {} ({} >= {})",
            i,
            x[i],
            x[i + 1]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * step).collect()
    }

    fn ramp(method: IntegrationMethod) -> DiscreteDistribution {
        let x = grid(11, 0.1);
        let y = x.iter().map(|v| 2.0 * v).collect();
        DiscreteDistribution::new(x, y, method).unwrap()
    }

    #[test]
    fn test_construction_validation() {
        let m = IntegrationMethod::Trapezoid;
        assert!(matches!(
            DiscreteDistribution::new(vec![0.0], vec![1.0], m),
            Err(SimError::Construction(_))
        ));
        assert!(matches!(
            DiscreteDistribution::new(vec![0.0, 0.0], vec![1.0, 1.0], m),
            Err(SimError::Construction(_))
        ));
        assert!(matches!(
            DiscreteDistribution::new(vec![0.0, 1.0], vec![1.0], m),
            Err(SimError::Construction(_))
        ));
    }

    #[test]
    fn test_integration_rules() {
        // y = 2x on [0, 1]; exact integral 1
        assert_relative_eq!(ramp(IntegrationMethod::Trapezoid).integral(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(ramp(IntegrationMethod::RectangleLeft).integral(), 0.9, epsilon = 1e-12);
        assert_relative_eq!(ramp(IntegrationMethod::RectangleRight).integral(), 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_is_cached_and_reproducible() {
        let d = ramp(IntegrationMethod::Trapezoid);
        let first = d.integral();
        assert_eq!(first.to_bits(), d.integral().to_bits());
        let rebuilt =
            DiscreteDistribution::new(d.x().to_vec(), d.y().to_vec(), d.method()).unwrap();
        assert_eq!(first.to_bits(), rebuilt.integral().to_bits());
    }

    #[test]
    fn test_integral_over_full_support_matches_integral() {
        for method in [
            IntegrationMethod::RectangleLeft,
            IntegrationMethod::RectangleRight,
            IntegrationMethod::Trapezoid,
        ] {
            let d = ramp(method);
            let full = d.integral_over(&d.support()).unwrap();
            assert_relative_eq!(full, d.integral(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_integral_over_degenerate_interval_is_zero() {
        let d = ramp(IntegrationMethod::Trapezoid);
        let point = Interval::new(0.55, 0.55).unwrap();
        assert_eq!(d.integral_over(&point).unwrap(), 0.0);
    }

    #[test]
    fn test_integral_over_partial_bins() {
        // Trapezoid is exact for a linear function.
        let d = ramp(IntegrationMethod::Trapezoid);
        let sub = Interval::new(0.25, 0.75).unwrap();
        assert_relative_eq!(d.integral_over(&sub).unwrap(), 0.5, epsilon = 1e-12);

        let inside_one_bin = Interval::new(0.32, 0.38).unwrap();
        assert_relative_eq!(
            d.integral_over(&inside_one_bin).unwrap(),
            0.38 * 0.38 - 0.32 * 0.32,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_integral_over_outside_support_fails() {
        let d = ramp(IntegrationMethod::Trapezoid);
        let wide = Interval::new(-0.1, 0.5).unwrap();
        assert!(matches!(d.integral_over(&wide), Err(SimError::Domain(_))));
    }

    #[test]
    fn test_interpolation() {
        let d = ramp(IntegrationMethod::Trapezoid);
        assert_relative_eq!(d.interpolate(0.35).unwrap(), 0.7, epsilon = 1e-12);
        assert_relative_eq!(d.interpolate(1.0).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(d.interpolate(0.0).unwrap(), 0.0, epsilon = 1e-12);
        assert!(matches!(d.interpolate(1.01), Err(SimError::Domain(_))));
    }

    #[test]
    fn test_normalize_then_rescale_restores_values() {
        let original = ramp(IntegrationMethod::RectangleLeft);
        let mut d = original.clone();
        d.normalize();
        assert_relative_eq!(d.integral(), 1.0, epsilon = 1e-12);
        d.scale(original.integral());
        for (a, b) in d.y().iter().zip(original.y()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_normalize_zero_is_noop() {
        let mut d = DiscreteDistribution::zeros(grid(5, 1.0), IntegrationMethod::Trapezoid).unwrap();
        d.normalize();
        assert!(d.y().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_proportionalize() {
        let mut d = ramp(IntegrationMethod::Trapezoid);
        d.proportionalize(3.0).unwrap();
        assert_relative_eq!(d.integral(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mismatched_grids_rejected() {
        let a = ramp(IntegrationMethod::Trapezoid);
        let b = DiscreteDistribution::zeros(grid(11, 0.2), IntegrationMethod::Trapezoid).unwrap();
        let c = ramp(IntegrationMethod::RectangleLeft);
        assert!(matches!(a.add(&b), Err(SimError::Domain(_))));
        assert!(matches!(a.sub(&c), Err(SimError::Domain(_))));
        assert!(matches!(a.mul(&c), Err(SimError::Domain(_))));
    }

    #[test]
    fn test_elementwise_algebra() {
        let a = ramp(IntegrationMethod::Trapezoid);
        let sum = a.add(&a).unwrap();
        assert_relative_eq!(sum.integral(), 2.0, epsilon = 1e-12);
        let diff = sum.sub(&a).unwrap();
        assert_relative_eq!(diff.integral(), 1.0, epsilon = 1e-12);
        let prod = a.mul(&a).unwrap();
        assert_relative_eq!(prod.y()[10], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_complement() {
        let x = grid(3, 1.0);
        let d = DiscreteDistribution::new(x.clone(), vec![0.25, 0.5, 1.0], IntegrationMethod::Trapezoid)
            .unwrap();
        assert_eq!(d.complement().unwrap().y(), &[0.75, 0.5, 0.0]);
        let bad = DiscreteDistribution::new(x, vec![0.0, 1.5, 0.0], IntegrationMethod::Trapezoid)
            .unwrap();
        assert!(matches!(bad.complement(), Err(SimError::Domain(_))));
    }

    #[test]
    fn test_transform_by_identity() {
        let d = ramp(IntegrationMethod::Trapezoid);
        let out = d.transform(&Matrix::identity(d.len())).unwrap();
        assert_eq!(out, d);
        assert!(matches!(
            d.transform(&Matrix::identity(3)),
            Err(SimError::Domain(_))
        ));
    }
}
