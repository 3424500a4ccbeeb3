//! Encounter scenarios in pilot units, loaded from JSON or built in.

use anyhow::{bail, Context, Result};
use daa_core::units::{from_deg, from_fpm, from_ft, from_knots, from_nmi};
use daa_core::{DaaMonitor, DaaParameters, Position, TrafficState, UrgencyStrategy, Vect3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Horizontal position: geodetic degrees or a flat frame in nautical miles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HorizontalPosition {
    LatLon { lat_deg: f64, lon_deg: f64 },
    Xy { x_nmi: f64, y_nmi: f64 },
}

/// One aircraft observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftInput {
    pub id: String,
    #[serde(flatten)]
    pub position: HorizontalPosition,
    pub alt_ft: f64,
    pub trk_deg: f64,
    pub gs_kn: f64,
    #[serde(default)]
    pub vs_fpm: f64,
    /// Observation time in seconds.
    #[serde(default)]
    pub time: f64,
}

impl AircraftInput {
    pub fn to_state(&self) -> TrafficState {
        let alt = from_ft(self.alt_ft);
        let position = match self.position {
            HorizontalPosition::LatLon { lat_deg, lon_deg } => {
                Position::lat_lon(lat_deg, lon_deg, alt)
            }
            HorizontalPosition::Xy { x_nmi, y_nmi } => {
                Position::xyz(from_nmi(x_nmi), from_nmi(y_nmi), alt)
            }
        };
        let velocity = Vect3::from_trk_gs_vs(
            from_deg(self.trk_deg),
            from_knots(self.gs_kn),
            from_fpm(self.vs_fpm),
        );
        TrafficState::new(self.id.clone(), position, velocity)
    }
}

/// Wind in pilot units: direction the air mass moves towards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindInput {
    pub to_deg: f64,
    pub speed_kn: f64,
}

/// A named encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub ownship: AircraftInput,
    #[serde(default)]
    pub traffic: Vec<AircraftInput>,
    #[serde(default)]
    pub wind: Option<WindInput>,
    #[serde(default)]
    pub urgency: UrgencyStrategy,
    /// Overrides of the default parameters.
    #[serde(default)]
    pub parameters: Option<DaaParameters>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&text)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        tracing::info!(name = %scenario.name, traffic = scenario.traffic.len(), "scenario loaded");
        Ok(scenario)
    }

    /// Built-in encounter by name.
    pub fn builtin(name: &str) -> Result<Self> {
        match name {
            "converging" => Ok(create_converging_scenario()),
            "head_on" => Ok(create_head_on_scenario()),
            "clear" => Ok(create_clear_scenario()),
            other => bail!("unknown scenario '{}' (converging, head_on, clear)", other),
        }
    }

    /// Monitor loaded with this scenario. `params` wins over the scenario's
    /// own parameters.
    pub fn monitor(&self, params: Option<DaaParameters>) -> Result<DaaMonitor> {
        let mut monitor = DaaMonitor::new();
        if let Some(p) = params.or_else(|| self.parameters.clone()) {
            monitor.set_parameters(p)?;
        }
        monitor.set_urgency_strategy(self.urgency.clone());
        monitor.set_ownship_state(self.ownship.to_state(), self.ownship.time);
        if let Some(wind) = self.wind {
            monitor.set_wind_field(Vect3::from_trk_gs_vs(
                from_deg(wind.to_deg),
                from_knots(wind.speed_kn),
                0.0,
            ));
        }
        for ac in &self.traffic {
            monitor.add_traffic_state(ac.to_state(), ac.time);
        }
        Ok(monitor)
    }
}

/// Geodetic encounter with an intruder converging from the south.
pub fn create_converging_scenario() -> Scenario {
    Scenario {
        name: "converging".to_string(),
        ownship: AircraftInput {
            id: "ownship".to_string(),
            position: HorizontalPosition::LatLon {
                lat_deg: 33.95,
                lon_deg: -96.7,
            },
            alt_ft: 8700.0,
            trk_deg: 206.0,
            gs_kn: 151.0,
            vs_fpm: 0.0,
            time: 0.0,
        },
        traffic: vec![AircraftInput {
            id: "intruder".to_string(),
            position: HorizontalPosition::LatLon {
                lat_deg: 33.8619,
                lon_deg: -96.7327,
            },
            alt_ft: 9000.0,
            trk_deg: 0.0,
            gs_kn: 210.0,
            vs_fpm: 0.0,
            time: 0.0,
        }],
        wind: None,
        urgency: UrgencyStrategy::Dcpa,
        parameters: None,
    }
}

/// Flat-frame head-on encounter 5 nmi out, co-altitude.
pub fn create_head_on_scenario() -> Scenario {
    let aircraft = |id: &str, y_nmi: f64, trk_deg: f64| AircraftInput {
        id: id.to_string(),
        position: HorizontalPosition::Xy { x_nmi: 0.0, y_nmi },
        alt_ft: 10000.0,
        trk_deg,
        gs_kn: 200.0,
        vs_fpm: 0.0,
        time: 0.0,
    };
    Scenario {
        name: "head_on".to_string(),
        ownship: aircraft("ownship", 0.0, 0.0),
        traffic: vec![aircraft("intruder", 5.0, 180.0)],
        wind: None,
        urgency: UrgencyStrategy::Dcpa,
        parameters: None,
    }
}

/// Ownship alone.
pub fn create_clear_scenario() -> Scenario {
    let mut scenario = create_head_on_scenario();
    scenario.name = "clear".to_string();
    scenario.traffic.clear();
    scenario
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenarios() {
        assert_eq!(Scenario::builtin("head_on").unwrap().traffic.len(), 1);
        assert!(Scenario::builtin("clear").unwrap().traffic.is_empty());
        assert!(Scenario::builtin("missing").is_err());
    }

    #[test]
    fn test_scenario_json_accepts_both_positions() {
        let text = r#"{
            "name": "mixed",
            "ownship": {"id": "own", "x_nmi": 0.0, "y_nmi": 0.0, "alt_ft": 5000.0,
                        "trk_deg": 90.0, "gs_kn": 120.0},
            "traffic": [{"id": "ac", "x_nmi": 3.0, "y_nmi": 0.0, "alt_ft": 5000.0,
                         "trk_deg": 270.0, "gs_kn": 120.0, "time": -2.0}],
            "urgency": {"strategy": "fixed", "aircraft": "ac"}
        }"#;
        let scenario: Scenario = serde_json::from_str(text).unwrap();
        assert_eq!(
            scenario.ownship.position,
            HorizontalPosition::Xy {
                x_nmi: 0.0,
                y_nmi: 0.0
            }
        );
        assert_eq!(scenario.urgency, UrgencyStrategy::Fixed("ac".into()));
        let monitor = scenario.monitor(None).unwrap();
        assert_eq!(monitor.number_of_aircraft(), 2);

        let geo = serde_json::to_string(&create_converging_scenario()).unwrap();
        let back: Scenario = serde_json::from_str(&geo).unwrap();
        assert!(matches!(
            back.ownship.position,
            HorizontalPosition::LatLon { .. }
        ));
    }

    #[test]
    fn test_head_on_monitor_alerts() {
        let mut monitor = create_head_on_scenario().monitor(None).unwrap();
        assert!(monitor.alerting(1).unwrap() >= 3);
        assert!(monitor.time_to_violation(1).unwrap().is_some());
    }
}
