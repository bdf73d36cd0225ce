//! Carbon Stability - Entry point
//!
//! Soil organic carbon decomposition and stabilization simulator.
//!
//! CLI Usage:
//!   carbon-stability setup.json                     # Run, write to ./output_setup
//!   carbon-stability setup.json --append            # Append to existing observations
//!   carbon-stability setup.json --output-dir out    # Custom output directory

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use carbon_stability::{config, export::RunSummary};

struct Options {
    setup_file: PathBuf,
    output_dir: Option<PathBuf>,
    append: bool,
}

fn print_help() {
    println!("Carbon Stability");
    println!();
    println!("Usage: carbon-stability <SETUP_FILE> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --output-dir, -o DIR   Output directory (default: <setup dir>/output_<setup name>)");
    println!("  --append, -a           Append to existing observation files");
    println!("  --help, -h             Show this help");
}

/// Parse CLI arguments
fn parse_args() -> Result<Options> {
    let args: Vec<String> = std::env::args().collect();
    let mut setup_file = None;
    let mut output_dir = None;
    let mut append = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--append" | "-a" => append = true,
            "--output-dir" | "-o" => {
                i += 1;
                match args.get(i) {
                    Some(dir) => output_dir = Some(PathBuf::from(dir)),
                    None => bail!("--output-dir needs a directory"),
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown option {}", other),
            other => {
                if setup_file.is_some() {
                    bail!("only one setup file can be given, got {}", other);
                }
                setup_file = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }

    match setup_file {
        Some(setup_file) => Ok(Options {
            setup_file,
            output_dir,
            append,
        }),
        None => {
            print_help();
            bail!("missing setup file")
        }
    }
}

/// `<setup dir>/output_<setup stem>`
fn default_output_dir(setup_file: &Path) -> PathBuf {
    let stem = setup_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "setup".to_string());
    let parent = setup_file.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("output_{}", stem))
}

/// Create the directory, or clear the files it holds unless appending.
fn prepare_output_dir(dir: &Path, append: bool) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create output directory {}", dir.display()))?;
        return Ok(());
    }
    if append {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("cannot remove {}", path.display()))?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args()?;
    log::info!("Carbon Stability starting...");

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&options.setup_file));
    prepare_output_dir(&output_dir, options.append)?;

    let setup = config::load(&options.setup_file)?;
    let mut simulator = setup.into_simulator().context("cannot start simulation")?;

    let start_time = Instant::now();
    simulator.run().context("simulation failed")?;
    let elapsed = start_time.elapsed();

    let files = simulator
        .write_observations(&output_dir, options.append)
        .context("cannot write observations")?;
    let summary = RunSummary::from_simulator(&simulator);
    summary.write(&output_dir)?;

    println!("=== Carbon Stability ===");
    println!(
        "Simulated {} to {} {} in {} steps ({:.2?})",
        simulator.context().initial_date(),
        summary.final_date,
        summary.time_unit,
        summary.steps,
        elapsed
    );
    for (pool, mass) in &summary.pool_masses {
        println!("  pool {:<40} {:>14.6} g", pool, mass);
    }
    for (microbe, mass) in &summary.microbe_masses {
        println!("  microbe {:<37} {:>14.6} g", microbe, mass);
    }
    println!("  respired carbon {:>44.6} g", summary.cumulative_respiration);
    println!("{} observation files in {}", files.len(), output_dir.display());

    Ok(())
}
