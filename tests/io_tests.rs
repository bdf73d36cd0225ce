//! Setup files in, observation files and run summary out.

mod common;

use std::fs;

use carbon_stability::config::{self, ObservedDates, ObserverKind, ObserverSpec};
use carbon_stability::export::RunSummary;
use carbon_stability::ObservableVariable;

use common::{full_setup, temp_dir, FULL_SETUP};

#[test]
fn test_load_setup_file() {
    let dir = temp_dir("load");
    let path = dir.join("setup.json");
    fs::write(&path, FULL_SETUP).unwrap();

    let setup = config::load(&path).unwrap();
    assert_eq!(setup.parameters.classes().len(), 2);
    assert_eq!(setup.parameters.enzyme_producers("cellulase"), ["fungi".to_string()]);
    assert_eq!(setup.context.timeline().len(), 21);
    // no observers declared: every variable of every item
    assert!(!setup.observers.is_empty());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_reports_missing_file() {
    let dir = temp_dir("missing");
    let err = config::load(dir.join("nowhere.json")).unwrap_err();
    assert!(format!("{:#}", err).contains("could not read setup file"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_rejects_unknown_fields() {
    let dir = temp_dir("unknown");
    let path = dir.join("setup.json");
    let json = FULL_SETUP.replacen("\"time_unit\"", "\"colour\": \"red\", \"time_unit\"", 1);
    fs::write(&path, json).unwrap();
    assert!(config::load(&path).is_err());
    fs::remove_dir_all(&dir).unwrap();
}

fn observed_run() -> carbon_stability::Simulator {
    let mut file = full_setup();
    file.observers = vec![
        ObserverSpec {
            kind: ObserverKind::State,
            variable: ObservableVariable::Respiration,
            item: None,
            dates: ObservedDates::Pattern("[0:1:5]".to_string()),
        },
        ObserverSpec {
            kind: ObserverKind::Microbe,
            variable: ObservableVariable::Mass,
            item: Some("fungi".to_string()),
            dates: ObservedDates::List(vec![0, 5]),
        },
        ObserverSpec {
            kind: ObserverKind::Pool,
            variable: ObservableVariable::MassDistribution,
            item: Some("cellulose_INACCESSIBLE_AGGREGATION".to_string()),
            dates: ObservedDates::List(vec![5]),
        },
    ];
    let mut sim = file.build().unwrap().into_simulator().unwrap();
    sim.run().unwrap();
    sim
}

fn lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_observation_files() {
    let sim = observed_run();
    let dir = temp_dir("observations");
    let files = sim.write_observations(&dir, false).unwrap();
    assert_eq!(files.len(), 3);

    let respiration = lines(&dir.join("state_respiration.csv"));
    assert_eq!(respiration.len(), 1 + 6);
    assert!(respiration[0].starts_with("date\t"));
    assert!(respiration[1].starts_with("0\t"));

    let mass = lines(&dir.join("microbe_fungi_mass.csv"));
    assert_eq!(mass.len(), 3);
    assert!(mass[2].starts_with("5\t"));

    let pool = files
        .iter()
        .find(|p| p.to_string_lossy().contains("cellulose"))
        .unwrap();
    let pool = lines(pool);
    // header + one row per grid point of [0, 2] with step 0.25
    assert_eq!(pool.len(), 1 + 9);
    assert_eq!(pool[0].split('\t').count(), 3);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_append_writes_header_once() {
    let sim = observed_run();
    let dir = temp_dir("append");
    sim.write_observations(&dir, true).unwrap();
    sim.write_observations(&dir, true).unwrap();

    let respiration = lines(&dir.join("state_respiration.csv"));
    assert_eq!(respiration.len(), 1 + 2 * 6);
    let headers = respiration.iter().filter(|l| l.starts_with("date")).count();
    assert_eq!(headers, 1);

    // without append the file is rewritten
    sim.write_observations(&dir, false).unwrap();
    assert_eq!(lines(&dir.join("state_respiration.csv")).len(), 1 + 6);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_run_summary() {
    let sim = observed_run();
    let dir = temp_dir("summary");
    let summary = RunSummary::from_simulator(&sim);
    assert_eq!(summary.steps, 20);
    assert_eq!(summary.time_unit, "day");
    assert!(summary.microbe_masses.contains_key("fungi"));

    let path = summary.write(&dir).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["steps"], 20);
    assert_eq!(json["time_unit"], "day");

    fs::remove_dir_all(&dir).unwrap();
}
