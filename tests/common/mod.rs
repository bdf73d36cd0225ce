//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use carbon_stability::config::SetupFile;

/// Two classes, one fungal species producing one enzyme, an enzyme-driven
/// pool transfer and a constant lignin input.
pub const FULL_SETUP: &str = r#"{
    "time_unit": "day",
    "initial_date": 0,
    "final_date": 5,
    "user_time_step": 0.25,
    "user_polymerization_step": 0.25,
    "integration_method": "trapezoid",
    "biochemical_classes": [
        {"name": "cellulose", "domain": [0, 2]},
        {"name": "lignin", "domain": [0, 1]}
    ],
    "pools": [
        {"class": "cellulose", "accessibilities": ["ACCESSIBLE", "INACCESSIBLE_AGGREGATION"]},
        {"class": "lignin", "accessibilities": ["ACCESSIBLE"]}
    ],
    "pool_initializations": [
        {"class": "cellulose", "accessibility": "ACCESSIBLE",
         "function": {"type": "gaussian", "mean": 1.0, "sd": 0.4}},
        {"class": "lignin", "accessibility": "ACCESSIBLE",
         "function": {"type": "constant", "value": 2.0}}
    ],
    "enzymes": [{
        "name": "cellulase",
        "class": "cellulose",
        "depolymerization_domain": [0.5, 2],
        "rate": {"type": "uniform_linear", "domain": [0.5, 2], "slope": 0.05},
        "kernel": {"type": "kernel_alpha", "domain": [0, 2], "alpha": 2},
        "kernel_integration": "integral"
    }],
    "microbes": [{
        "name": "fungi",
        "initial_mass": 0.5,
        "signature": [
            {"class": "cellulose", "proportion": 0.6, "function": {"type": "constant", "value": 1}},
            {"class": "lignin", "proportion": 0.4, "function": {"type": "constant", "value": 1}}
        ],
        "enzyme_production": {"cellulase": {"type": "linear", "slope": 1.0}},
        "assimilation": [{
            "class": "cellulose",
            "uptake_flux": {"type": "linear", "slope": 0.1},
            "carbon_use_efficiency": {"type": "constant", "value": 0.4}
        }],
        "mortality": {"type": "linear", "slope": 0.05}
    }],
    "pool_transfers": [{
        "class": "cellulose",
        "origin": "ACCESSIBLE",
        "arrival": "INACCESSIBLE_AGGREGATION",
        "function": {"type": "enzymatic_linear_transfer", "enzyme": "cellulase", "rate": 0.01}
    }],
    "pool_inputs": [{
        "class": "lignin",
        "accessibility": "ACCESSIBLE",
        "function": {"type": "constant_input", "value": 0.2, "signature": {"type": "constant", "value": 1.0}}
    }]
}"#;

pub fn full_setup() -> SetupFile {
    SetupFile::from_json(FULL_SETUP).unwrap()
}

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("carbon_stability_{}_{}", name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
