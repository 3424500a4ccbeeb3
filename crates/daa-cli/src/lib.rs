//! DAA CLI - scenario loading and reports for the detect-and-avoid tools.
//!
//! Binaries:
//! - daa_bands: kinematic maneuver bands for every dimension
//! - daa_alerting: alert level and time to violation per traffic aircraft

pub mod report;
pub mod scenario;

pub use report::{alert_reports, band_reports, format_alerts, format_bands};
pub use scenario::Scenario;

use anyhow::Result;
use daa_core::DaaParameters;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber; `RUST_LOG` adds to the default directives.
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("daa_cli=info".parse()?)
                .add_directive("daa_core=warn".parse()?),
        )
        .init();
    Ok(())
}

/// Scenario from a file when given, otherwise the named built-in one.
pub fn load_scenario(path: Option<&PathBuf>, builtin: &str) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path),
        None => Scenario::builtin(builtin),
    }
}

pub fn load_parameters(path: Option<&PathBuf>) -> Result<Option<DaaParameters>> {
    path.map(|p| DaaParameters::load_json(p).map_err(anyhow::Error::from))
        .transpose()
}
