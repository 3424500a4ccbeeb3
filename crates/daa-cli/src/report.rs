//! Text and JSON reports over a loaded monitor.

use anyhow::Result;
use daa_core::{DaaMonitor, Dimension, KinematicBands};
use serde::Serialize;

/// Alerting summary of one traffic aircraft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertReport {
    pub id: String,
    pub alert_level: usize,
    /// Seconds, absent when no violation is predicted.
    pub time_to_violation: Option<f64>,
    pub violation: bool,
}

pub fn alert_reports(monitor: &mut DaaMonitor) -> Result<Vec<AlertReport>> {
    let mut reports = Vec::with_capacity(monitor.number_of_aircraft().saturating_sub(1));
    for ac in 1..monitor.number_of_aircraft() {
        let id = monitor.aircraft()[ac].id.clone();
        let alert_level = monitor.alerting(ac)?;
        let time_to_violation = monitor.time_to_violation(ac)?;
        reports.push(AlertReport {
            id,
            alert_level,
            time_to_violation,
            violation: time_to_violation == Some(0.0),
        });
    }
    Ok(reports)
}

pub fn format_alerts(reports: &[AlertReport]) -> String {
    let mut out = String::new();
    for r in reports {
        let t2v = match r.time_to_violation {
            Some(t) => format!("{:.2} [s]", t),
            None => "none".to_string(),
        };
        out.push_str(&format!(
            "{}: alert level {}, time to violation {}{}\n",
            r.id,
            r.alert_level,
            t2v,
            if r.violation { " (in violation)" } else { "" }
        ));
    }
    out
}

/// Bands of one dimension in display units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionReport {
    pub dimension: Dimension,
    pub unit: &'static str,
    pub ownship: Option<f64>,
    pub bands: Vec<(f64, f64, String)>,
    pub recovery_time: f64,
    pub preventive: Vec<String>,
    pub corrective: Vec<String>,
}

fn dimension_report(bands: &mut KinematicBands, dim: Dimension) -> DimensionReport {
    let (unit, conv) = dim.display_unit();
    let out = bands.bands(dim).cloned().unwrap_or_default();
    let ownship = bands.ownship_value(dim).map(conv);
    let (preventive, corrective) = bands.alerting_aircraft(dim);
    DimensionReport {
        dimension: dim,
        unit,
        ownship,
        bands: out
            .iter()
            .map(|(iv, region)| (conv(iv.low), conv(iv.up), region.to_string()))
            .collect(),
        recovery_time: out.recovery_time,
        preventive,
        corrective,
    }
}

pub fn band_reports(bands: &mut KinematicBands) -> Vec<DimensionReport> {
    Dimension::ALL
        .into_iter()
        .map(|dim| dimension_report(bands, dim))
        .collect()
}

pub fn format_bands(reports: &[DimensionReport]) -> String {
    let mut out = String::new();
    for r in reports {
        out.push_str(&format!("{} [{}]", r.dimension, r.unit));
        if let Some(own) = r.ownship {
            out.push_str(&format!(" ownship {:.2}", own));
        }
        out.push('\n');
        for (low, up, region) in &r.bands {
            out.push_str(&format!("  [{:.2}, {:.2}] {}\n", low, up, region));
        }
        if r.recovery_time != 0.0 {
            out.push_str(&format!("  recovery time {:.2} [s]\n", r.recovery_time));
        }
        if !r.corrective.is_empty() {
            out.push_str(&format!("  corrective: {}\n", r.corrective.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{create_clear_scenario, create_head_on_scenario};

    #[test]
    fn test_alert_reports_cover_traffic() {
        let mut monitor = create_head_on_scenario().monitor(None).unwrap();
        let reports = alert_reports(&mut monitor).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, "intruder");
        assert!(!reports[0].violation);
        assert!(format_alerts(&reports).contains("intruder: alert level"));
    }

    #[test]
    fn test_clear_scenario_band_report() {
        let monitor = create_clear_scenario().monitor(None).unwrap();
        let mut bands = monitor.kinematic_bands().unwrap();
        let reports = band_reports(&mut bands);
        assert_eq!(reports.len(), 4);
        for r in &reports {
            assert_eq!(r.bands.len(), 1);
            assert_eq!(r.bands[0].2, "NONE");
        }
        let text = format_bands(&reports);
        assert!(text.contains("Track [deg]"));
        assert!(serde_json::to_string(&reports).is_ok());
    }
}
