//! Properties of discretized distributions.

use approx::assert_relative_eq;
use carbon_stability::{DiscreteDistribution, IntegrationMethod, Interval, PositiveDistribution, SimError};

const METHODS: [IntegrationMethod; 3] = [
    IntegrationMethod::RectangleLeft,
    IntegrationMethod::RectangleRight,
    IntegrationMethod::Trapezoid,
];

fn grid(n: usize, step: f64) -> Vec<f64> {
    (0..n).map(|i| i as f64 * step).collect()
}

fn bumpy(x: &[f64]) -> Vec<f64> {
    x.iter().map(|x| 1.0 + (3.0 * x).sin().abs() + x * x).collect()
}

#[test]
fn test_cached_integral_follows_mutations() {
    for method in METHODS {
        let x = grid(21, 0.1);
        let mut d = DiscreteDistribution::new(x.clone(), bumpy(&x), method).unwrap();
        assert_relative_eq!(d.integral(), method.integrate(d.x(), d.y()), max_relative = 1e-12);

        d.scale(3.0);
        assert_relative_eq!(d.integral(), method.integrate(d.x(), d.y()), max_relative = 1e-12);

        let other = d.zeros_like().from_fn(|_, x| Ok(x)).unwrap();
        d.add_assign(&other).unwrap();
        assert_relative_eq!(d.integral(), method.integrate(d.x(), d.y()), max_relative = 1e-12);

        d.set_values(vec![2.0; x.len()]).unwrap();
        assert_relative_eq!(d.integral(), method.integrate(d.x(), d.y()), max_relative = 1e-12);
    }
}

#[test]
fn test_normalize_then_rescale() {
    for method in METHODS {
        let x = grid(11, 0.2);
        let mut d = DiscreteDistribution::new(x.clone(), bumpy(&x), method).unwrap();
        d.normalize();
        assert_relative_eq!(d.integral(), 1.0, max_relative = 1e-12);
        d.proportionalize(0.35).unwrap();
        assert_relative_eq!(d.integral(), 0.35, max_relative = 1e-12);
    }
}

#[test]
fn test_zero_distribution_cannot_be_rescaled() {
    let mut d = DiscreteDistribution::zeros(grid(5, 0.5), IntegrationMethod::Trapezoid).unwrap();
    d.normalize();
    assert_eq!(d.integral(), 0.0);
    assert!(d.proportionalize(0.0).is_ok());
    assert!(matches!(d.proportionalize(1.0), Err(SimError::Domain(_))));
}

#[test]
fn test_full_support_sub_integral() {
    for method in METHODS {
        let x = grid(17, 0.125);
        let d = DiscreteDistribution::new(x.clone(), bumpy(&x), method).unwrap();
        let full = d.integral_over(&d.support()).unwrap();
        assert_relative_eq!(full, d.integral(), max_relative = 1e-12);

        let point = Interval::new(0.3, 0.3).unwrap();
        assert_eq!(d.integral_over(&point).unwrap(), 0.0);
    }
}

#[test]
fn test_trapezoid_sub_integrals_add_up() {
    let x = grid(17, 0.125);
    let d = DiscreteDistribution::new(x.clone(), bumpy(&x), IntegrationMethod::Trapezoid).unwrap();
    for split in [0.1, 0.5, 0.61, 1.3] {
        let left = d.integral_over(&Interval::new(0.0, split).unwrap()).unwrap();
        let right = d.integral_over(&Interval::new(split, 2.0).unwrap()).unwrap();
        assert_relative_eq!(left + right, d.integral(), max_relative = 1e-12);
    }
}

#[test]
fn test_sub_integral_outside_support() {
    let d = DiscreteDistribution::zeros(grid(5, 0.25), IntegrationMethod::Trapezoid).unwrap();
    let outside = Interval::new(0.5, 1.5).unwrap();
    assert!(matches!(d.integral_over(&outside), Err(SimError::Domain(_))));
}

#[test]
fn test_positive_distribution_rejects_negative_results() {
    let x = grid(5, 0.25);
    let mut p = PositiveDistribution::new(x.clone(), vec![1.0; 5], IntegrationMethod::Trapezoid).unwrap();
    let small = DiscreteDistribution::new(x.clone(), vec![0.5; 5], IntegrationMethod::Trapezoid).unwrap();
    p.sub_assign(&small).unwrap();
    assert!(p.y().iter().all(|v| *v >= 0.0));

    let large = DiscreteDistribution::new(x.clone(), vec![0.0, 0.0, 1.0, 0.0, 0.0], IntegrationMethod::Trapezoid)
        .unwrap();
    assert!(matches!(p.sub_assign(&large), Err(SimError::Invariant(_))));
    assert!(matches!(p.scale(-1.0), Err(SimError::Invariant(_))));
    assert!(PositiveDistribution::new(x, vec![0.0, -1e-3, 0.0, 0.0, 0.0], IntegrationMethod::Trapezoid).is_err());
}

#[test]
fn test_mismatched_grids_are_rejected() {
    let mut a = DiscreteDistribution::zeros(grid(5, 0.25), IntegrationMethod::Trapezoid).unwrap();
    let b = DiscreteDistribution::zeros(grid(5, 0.5), IntegrationMethod::Trapezoid).unwrap();
    let c = DiscreteDistribution::zeros(grid(5, 0.25), IntegrationMethod::RectangleLeft).unwrap();
    assert!(a.add_assign(&b).is_err());
    assert!(a.add_assign(&c).is_err());
}
