//! Print kinematic maneuver bands for an encounter.
//!
//! Usage:
//!   cargo run -p daa-cli --bin daa_bands -- --scenario demos/converging.json

use clap::Parser;
use daa_cli::{band_reports, format_bands, init_tracing, load_parameters, load_scenario};
use std::path::PathBuf;

/// Kinematic bands for the ownship of a scenario
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scenario JSON file
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Built-in scenario used when no file is given
    #[arg(long, default_value = "converging")]
    builtin: String,

    /// Parameters JSON file, overriding the scenario's
    #[arg(long)]
    params: Option<PathBuf>,

    /// Seconds after the ownship time to project the encounter to
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let scenario = load_scenario(args.scenario.as_ref(), &args.builtin)?;
    let params = load_parameters(args.params.as_ref())?;
    let monitor = scenario.monitor(params)?;
    let mut bands = monitor.kinematic_bands_at(monitor.current_time() + args.at)?;
    tracing::info!(
        scenario = %scenario.name,
        traffic = bands.traffic().len(),
        criteria = ?bands.criteria_aircraft(),
        "computing bands"
    );

    let reports = band_reports(&mut bands);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", format_bands(&reports));
    }
    Ok(())
}
