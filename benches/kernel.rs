//! Kernel and time step benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use carbon_stability::config::SetupFile;
use carbon_stability::parameters::Polymerization;
use carbon_stability::{
    advance, Context, EnzymeKernelMatrix, Function, IntegrationMethod, Interval, KernelIntegration, Parameters,
};

const STEP_SETUP: &str = r#"{
    "time_unit": "day",
    "initial_date": 0,
    "final_date": 1,
    "user_time_step": 0.1,
    "user_polymerization_step": 0.01,
    "integration_method": "trapezoid",
    "biochemical_classes": [{"name": "cellulose", "domain": [0, 2]}],
    "pools": [{"class": "cellulose", "accessibilities": ["ACCESSIBLE", "INACCESSIBLE_AGGREGATION"]}],
    "pool_initializations": [{"class": "cellulose", "accessibility": "ACCESSIBLE",
        "function": {"type": "gaussian", "mean": 1.0, "sd": 0.3}}],
    "enzymes": [{"name": "cellulase", "class": "cellulose", "depolymerization_domain": [0.2, 2],
        "rate": {"type": "uniform_linear", "domain": [0.2, 2], "slope": 0.01},
        "kernel": {"type": "kernel_alpha", "domain": [0, 2], "alpha": 2},
        "kernel_integration": "integral"}],
    "microbes": [{"name": "fungi", "initial_mass": 0.5,
        "signature": [{"class": "cellulose", "proportion": 1.0, "function": {"type": "constant", "value": 1}}],
        "enzyme_production": {"cellulase": {"type": "linear", "slope": 1.0}},
        "assimilation": [{"class": "cellulose", "uptake_flux": {"type": "linear", "slope": 0.1},
            "carbon_use_efficiency": {"type": "constant", "value": 0.4}}],
        "mortality": {"type": "linear", "slope": 0.05}}],
    "pool_transfers": [{"class": "cellulose", "origin": "ACCESSIBLE", "arrival": "INACCESSIBLE_AGGREGATION",
        "function": {"type": "enzymatic_linear_transfer", "enzyme": "cellulase", "rate": 0.01}}]
}"#;

fn kernel_inputs() -> (Parameters, Context, Polymerization, Function) {
    let parameters = Parameters::new(IntegrationMethod::Trapezoid, 0.01);
    let context = Context::new("day", 0, 1, 1.0).unwrap();
    let polymerization = Polymerization::new(0.0, 2.0, 0.01).unwrap();
    let kernel = Function::kernel_alpha(Interval::new(0.0, 2.0).unwrap(), 2.0).unwrap();
    (parameters, context, polymerization, kernel)
}

fn bench_standard_kernel(c: &mut Criterion) {
    let (parameters, context, polymerization, kernel) = kernel_inputs();

    c.bench_function("standard_kernel_200", |b| {
        b.iter(|| {
            EnzymeKernelMatrix::build(
                "cellulase",
                black_box(&kernel),
                KernelIntegration::Standard,
                black_box(&polymerization),
                &parameters,
                &context,
            )
        })
    });
}

fn bench_integral_kernel(c: &mut Criterion) {
    let (parameters, context, polymerization, kernel) = kernel_inputs();

    c.bench_function("integral_kernel_200", |b| {
        b.iter(|| {
            EnzymeKernelMatrix::build(
                "cellulase",
                black_box(&kernel),
                KernelIntegration::Integral,
                black_box(&polymerization),
                &parameters,
                &context,
            )
        })
    });
}

fn bench_time_step(c: &mut Criterion) {
    let setup = SetupFile::from_json(STEP_SETUP).unwrap().build().unwrap();
    let mut current = setup.initial_state.clone();
    current.evaluate(&setup.parameters, &setup.context).unwrap();

    c.bench_function("time_step", |b| {
        b.iter(|| advance(&setup.parameters, &setup.context, black_box(&current), 1))
    });
}

criterion_group!(
    benches,
    bench_standard_kernel,
    bench_integral_kernel,
    bench_time_step
);
criterion_main!(benches);
