//! JSON summary of a finished run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::simulator::Simulator;

/// Final masses and totals of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: &'static str,
    pub time_unit: String,
    pub final_date: f64,
    pub steps: usize,
    /// Pool label → mass (g C)
    pub pool_masses: BTreeMap<String, f64>,
    /// Species → biomass (g C)
    pub microbe_masses: BTreeMap<String, f64>,
    /// Carbon respired since the initial date (g C)
    pub cumulative_respiration: f64,
    /// Pools plus biomass at the final date (g C)
    pub total_carbon: f64,
}

impl RunSummary {
    pub fn from_simulator(simulator: &Simulator) -> Self {
        let state = simulator.current_state();
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            time_unit: simulator.context().time_unit().to_string(),
            final_date: state.date(),
            steps: simulator.steps(),
            pool_masses: state
                .substrate()
                .pools()
                .map(|pool| (pool.key().label(), pool.mass()))
                .collect(),
            microbe_masses: state
                .microbes()
                .iter()
                .map(|(name, microbe)| (name.clone(), microbe.mass()))
                .collect(),
            cumulative_respiration: simulator.cumulative_respiration(),
            total_carbon: state.total_carbon(),
        }
    }

    /// Write `run_summary.json` in `dir`.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("run_summary.json");
        let file = std::fs::File::create(&path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)?;

        log::info!("Run summary exported: {}", path.display());
        Ok(path)
    }
}
