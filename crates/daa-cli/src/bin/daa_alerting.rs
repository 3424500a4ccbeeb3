//! Print the alert level and time to violation of every traffic aircraft.
//!
//! Usage:
//!   cargo run -p daa-cli --bin daa_alerting -- --builtin head_on

use clap::Parser;
use daa_cli::{alert_reports, format_alerts, init_tracing, load_parameters, load_scenario};
use std::path::PathBuf;

/// Alerting for the traffic of a scenario
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

    /// Use the threshold table instead of bands-based alerting
    #[arg(long)]
    thresholds: bool,

    /// Print the monitor configuration first
    #[arg(long)]
    verbose: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let scenario = load_scenario(args.scenario.as_ref(), &args.builtin)?;
    let mut params = load_parameters(args.params.as_ref())?
        .or_else(|| scenario.parameters.clone())
        .unwrap_or_default();
    if args.thresholds {
        params.bands_alerting = false;
    }
    let mut monitor = scenario.monitor(Some(params))?;
    if args.verbose {
        print!("{}", monitor);
    }

    let reports = alert_reports(&mut monitor)?;
    tracing::info!(scenario = %scenario.name, traffic = reports.len(), "alerting computed");
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", format_alerts(&reports));
    }
    Ok(())
}
