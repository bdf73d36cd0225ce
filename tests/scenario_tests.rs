//! Reference scenarios with closed-form results.
//!
//! - constant input onto an empty pool
//! - one explicit Euler step of a single microbe
//! - integral kernel built from kernel_alpha

use approx::assert_relative_eq;
use carbon_stability::{
    parameters::{Assimilation, EnzymeTraits, MicrobeSpecies},
    state::Microbe,
    Accessibility, Context, Function, IntegrationMethod, Interval, KernelIntegration, ObserverList,
    Parameters, PoolKey, PositiveDistribution, SimError, Simulator, State, SubstrateInputManager,
};

/// Input of 0.1 g per day onto a zero accessible pool: mass = 0.1 · N · dt
#[test]
fn test_constant_input_accumulates_linearly() {
    let mut parameters = Parameters::new(IntegrationMethod::Trapezoid, 0.1);
    parameters
        .add_class("cellulose", Interval::new(0.0, 2.0).unwrap())
        .unwrap();
    parameters
        .add_accessibility("cellulose", Accessibility::Accessible)
        .unwrap();

    // signature of unit mass over [0, 2]
    let input = Function::constant_input(0.1, Function::constant(0.5)).unwrap();
    let mut inputs = SubstrateInputManager::default();
    inputs
        .add(PoolKey::new("cellulose", Accessibility::Accessible), input)
        .unwrap();
    let context = Context::new("day", 0, 10, 0.1).unwrap().with_inputs(inputs);
    parameters.finalize(&context).unwrap();

    let state = State::from_parameters(&parameters, 0.0).unwrap();
    let mut sim = Simulator::new(parameters, context, state, ObserverList::default()).unwrap();
    sim.run().unwrap();

    let n = sim.steps() as f64;
    let dt = sim.context().timeline().step();
    assert_eq!(sim.steps(), 100);
    let mass = sim
        .current_state()
        .substrate()
        .accessible_pool("cellulose")
        .unwrap()
        .mass();
    assert_relative_eq!(mass, 0.1 * n * dt, max_relative = 1e-9);
}

/// new mass = m0 + dt · (e · c · (xmax - xmin) - k · m0)
#[test]
fn test_single_microbe_step() {
    let (c, e, k, m0) = (0.2, 0.4, 0.05, 2.0);
    let mut parameters = Parameters::new(IntegrationMethod::Trapezoid, 0.25);
    parameters
        .add_class("cellulose", Interval::new(0.0, 2.0).unwrap())
        .unwrap();
    parameters
        .add_accessibility("cellulose", Accessibility::Accessible)
        .unwrap();

    let grid = parameters
        .class("cellulose")
        .unwrap()
        .polymerization()
        .grid()
        .to_vec();
    let n = grid.len();
    let signature = PositiveDistribution::new(grid, vec![0.5; n], IntegrationMethod::Trapezoid).unwrap();
    let mut species = MicrobeSpecies::new("bacteria", Function::linear(k));
    species.add_signature("cellulose", signature).unwrap();
    species
        .add_assimilation(
            "cellulose",
            Assimilation {
                uptake_flux: Function::constant(c),
                carbon_use_efficiency: Function::constant(e),
            },
        )
        .unwrap();
    parameters.add_species(species).unwrap();

    let context = Context::new("day", 0, 1, 0.5).unwrap();
    parameters.finalize(&context).unwrap();

    let mut state = State::from_parameters(&parameters, 0.0).unwrap();
    state
        .substrate_mut()
        .accessible_pool_mut("cellulose")
        .unwrap()
        .set_values(vec![1.0; n])
        .unwrap();
    state.add_microbe(Microbe::new("bacteria", m0)).unwrap();

    let mut sim = Simulator::new(parameters, context, state, ObserverList::default()).unwrap();
    assert!(sim.step().unwrap());

    let dt = 0.5;
    let expected = m0 + dt * (e * c * 2.0 - k * m0);
    let mass = sim.current_state().microbe("bacteria").unwrap().mass();
    assert_relative_eq!(mass, expected, max_relative = 1e-12);
}

fn alpha_parameters(integration: KernelIntegration, kernel: Function) -> Parameters {
    let mut parameters = Parameters::new(IntegrationMethod::Trapezoid, 0.1);
    parameters
        .add_class("lipid", Interval::new(0.0, 1.0).unwrap())
        .unwrap();
    parameters
        .add_accessibility("lipid", Accessibility::Accessible)
        .unwrap();
    parameters
        .add_enzyme(EnzymeTraits {
            name: "lipase".to_string(),
            class: "lipid".to_string(),
            depolymerization_domain: Interval::new(0.0, 1.0).unwrap(),
            rate: Function::uniform_linear(Interval::new(0.0, 1.0).unwrap(), 1.0),
            kernel,
            kernel_integration: integration,
        })
        .unwrap();
    parameters
}

/// kernel_alpha exposes a primitive, columns have unit sum
#[test]
fn test_integral_kernel_alpha() {
    let kernel = Function::kernel_alpha(Interval::new(0.0, 1.0).unwrap(), 2.0).unwrap();
    let mut parameters = alpha_parameters(KernelIntegration::Integral, kernel);
    let context = Context::new("day", 0, 1, 1.0).unwrap();
    parameters.finalize(&context).unwrap();

    let kernel = parameters.kernel("lipase").unwrap();
    assert_eq!(kernel.integration(), KernelIntegration::Integral);
    for j in 0..kernel.size() {
        assert_relative_eq!(kernel.matrix().column_sum(j), 1.0, max_relative = 1e-12);
    }
    // depolymerization only moves mass toward lower polymerization
    for j in 0..kernel.size() {
        for i in j + 1..kernel.size() {
            assert_eq!(kernel.matrix().get(i, j), 0.0);
        }
    }
}

#[test]
fn test_integral_kernel_without_primitive_fails() {
    let kernel = Function::uniform_linear(Interval::new(0.0, 1.0).unwrap(), 1.0);
    let mut parameters = alpha_parameters(KernelIntegration::Integral, kernel);
    let context = Context::new("day", 0, 1, 1.0).unwrap();
    assert!(matches!(
        parameters.finalize(&context),
        Err(SimError::MissingCapability(_))
    ));
}

/// Enzyme over the whole class domain on a grid whose last point is
/// computed as 3 · 0.3.
#[test]
fn test_enzyme_over_full_rounded_domain() {
    let domain = Interval::new(0.0, 0.9).unwrap();
    let mut parameters = Parameters::new(IntegrationMethod::Trapezoid, 0.25);
    parameters.add_class("lipid", domain).unwrap();
    parameters
        .add_accessibility("lipid", Accessibility::Accessible)
        .unwrap();
    parameters
        .add_enzyme(EnzymeTraits {
            name: "lipase".to_string(),
            class: "lipid".to_string(),
            depolymerization_domain: domain,
            rate: Function::uniform_linear(domain, 1.0),
            kernel: Function::kernel_alpha(domain, 2.0).unwrap(),
            kernel_integration: KernelIntegration::Integral,
        })
        .unwrap();
    let context = Context::new("day", 0, 1, 0.5).unwrap();
    parameters.finalize(&context).unwrap();

    let grid = parameters.class("lipid").unwrap().polymerization().grid().to_vec();
    assert_eq!(grid.last().copied(), Some(0.9));

    let state = State::from_parameters(&parameters, 0.0).unwrap();
    let mut sim = Simulator::new(parameters, context, state, ObserverList::default()).unwrap();
    sim.run().unwrap();
    assert!(sim.is_finished());
    assert_eq!(sim.current_state().enzyme("lipase").unwrap().activity().unwrap(), 0.0);
}
