//! Tunable parameters of bands and alerting.
//!
//! Every value is stored in internal units (m, m/s, m/s^2, rad, rad/s, s);
//! [`crate::units`] converts from aviation units.

use crate::alerting::AlertThresholds;
use crate::detector::{CdCylinder, WcvTable};
use crate::error::{check_less_than, check_non_negative, check_ordered, check_positive, Result};
use crate::units::{from_deg, from_fpm, from_ft, from_knots, from_nmi};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

/// Configuration for kinematic bands and alerting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaaParameters {
    /// Well-clear horizontal distance threshold
    pub dthr: f64,
    /// Well-clear vertical distance threshold
    pub zthr: f64,
    /// Well-clear horizontal time threshold
    pub tthr: f64,
    /// Well-clear time to co-altitude threshold
    pub tcoa: f64,
    /// Cylinder horizontal radius
    pub d: f64,
    /// Cylinder half height
    pub h: f64,

    /// Alerting time for preventive traffic; 0 means lookahead time
    pub alerting_time: f64,
    pub lookahead_time: f64,

    pub min_gs: f64,
    pub max_gs: f64,
    pub min_vs: f64,
    pub max_vs: f64,
    pub min_alt: f64,
    pub max_alt: f64,

    /// Report only conflict bands; conflict-free values are implicit
    pub implicit_bands: bool,

    pub trk_step: f64,
    pub gs_step: f64,
    pub vs_step: f64,
    pub alt_step: f64,

    pub horizontal_accel: f64,
    pub vertical_accel: f64,
    /// Turn rate; 0 means derive it from the bank angle
    pub turn_rate: f64,
    pub bank_angle: f64,
    /// Climb rate used by altitude bands; 0 means use the vertical speed
    pub vertical_rate: f64,

    /// Extra time added to the earliest recovery time
    pub recovery_stability_time: f64,
    /// Recovery time horizon; 0 means lookahead time
    pub max_recovery_time: f64,
    /// Minimum horizontal recovery separation; 0 means TCAS RA HMD
    pub min_horizontal_recovery: f64,
    /// Minimum vertical recovery separation; 0 means TCAS RA ZTHR
    pub min_vertical_recovery: f64,

    pub conflict_crit: bool,
    pub recovery_crit: bool,
    pub recovery_trk: bool,
    pub recovery_gs: bool,
    pub recovery_vs: bool,

    /// Alerting uses bands instead of threshold tables
    pub bands_alerting: bool,
    pub trk_alerting: bool,
    pub gs_alerting: bool,
    pub vs_alerting: bool,

    /// Negative means always preventive, 0 never
    pub preventive_alt: f64,
    pub preventive_trk: f64,
    pub preventive_gs: f64,
    pub preventive_vs: f64,
    /// Time to violation below which a corrective alert is a warning
    pub time_to_warning: f64,
    pub warning_when_recovery: bool,
    /// Keep shrinking the recovery volume until bands appear
    pub ca_bands: bool,

    /// Alert levels for threshold-based alerting, least severe first
    pub alertor: Vec<AlertThresholds>,
}

impl Default for DaaParameters {
    fn default() -> Self {
        Self {
            dthr: from_ft(4000.0),
            zthr: from_ft(450.0),
            tthr: 35.0,
            tcoa: 0.0,
            d: from_nmi(5.0),
            h: from_ft(1000.0),

            alerting_time: 0.0,
            lookahead_time: 180.0,

            min_gs: 0.0,
            max_gs: from_knots(700.0),
            min_vs: from_fpm(-5000.0),
            max_vs: from_fpm(5000.0),
            min_alt: from_ft(500.0),
            max_alt: from_ft(50000.0),

            implicit_bands: false,

            trk_step: from_deg(1.0),
            gs_step: from_knots(1.0),
            vs_step: from_fpm(10.0),
            alt_step: from_ft(500.0),

            horizontal_accel: 2.0,
            vertical_accel: 2.0,
            turn_rate: from_deg(3.0),
            bank_angle: from_deg(30.0),
            vertical_rate: 0.0,

            recovery_stability_time: 2.0,
            max_recovery_time: 0.0,
            min_horizontal_recovery: 0.0,
            min_vertical_recovery: 0.0,

            conflict_crit: false,
            recovery_crit: false,
            recovery_trk: true,
            recovery_gs: true,
            recovery_vs: true,

            bands_alerting: true,
            trk_alerting: true,
            gs_alerting: false,
            vs_alerting: true,

            preventive_alt: from_ft(700.0),
            preventive_trk: from_deg(10.0),
            preventive_gs: from_knots(100.0),
            preventive_vs: from_fpm(500.0),
            time_to_warning: 15.0,
            warning_when_recovery: false,
            ca_bands: false,

            alertor: AlertThresholds::mops(),
        }
    }
}

impl DaaParameters {
    /// Check every value the setters would reject.
    pub fn validate(&self) -> Result<()> {
        check_positive("dthr", self.dthr)?;
        check_positive("zthr", self.zthr)?;
        check_non_negative("tthr", self.tthr)?;
        check_non_negative("tcoa", self.tcoa)?;
        check_positive("d", self.d)?;
        check_positive("h", self.h)?;
        check_non_negative("alerting_time", self.alerting_time)?;
        check_positive("lookahead_time", self.lookahead_time)?;
        check_non_negative("min_gs", self.min_gs)?;
        check_ordered("min_gs", self.min_gs, self.max_gs)?;
        check_ordered("min_vs", self.min_vs, self.max_vs)?;
        check_ordered("min_alt", self.min_alt, self.max_alt)?;
        check_positive("trk_step", self.trk_step)?;
        check_less_than("trk_step", self.trk_step, PI)?;
        check_positive("gs_step", self.gs_step)?;
        check_positive("vs_step", self.vs_step)?;
        check_positive("alt_step", self.alt_step)?;
        check_non_negative("horizontal_accel", self.horizontal_accel)?;
        check_non_negative("vertical_accel", self.vertical_accel)?;
        check_non_negative("turn_rate", self.turn_rate)?;
        check_non_negative("bank_angle", self.bank_angle)?;
        check_non_negative("vertical_rate", self.vertical_rate)?;
        check_non_negative("recovery_stability_time", self.recovery_stability_time)?;
        check_non_negative("max_recovery_time", self.max_recovery_time)?;
        check_non_negative("min_horizontal_recovery", self.min_horizontal_recovery)?;
        check_non_negative("min_vertical_recovery", self.min_vertical_recovery)?;
        check_positive("time_to_warning", self.time_to_warning)?;
        for thr in &self.alertor {
            thr.validate()?;
        }
        Ok(())
    }

    /// Read parameters from a JSON file. Missing fields keep their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: DaaParameters = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Well-clear thresholds as a WCV table.
    pub fn wcv_table(&self) -> WcvTable {
        WcvTable {
            dthr: self.dthr,
            zthr: self.zthr,
            tthr: self.tthr,
            tcoa: self.tcoa,
        }
    }

    pub fn cylinder(&self) -> CdCylinder {
        CdCylinder::new(self.d, self.h)
    }

    /// Alerting time, or lookahead time when unset.
    pub fn actual_alerting_time(&self) -> f64 {
        if self.alerting_time > 0.0 {
            self.alerting_time
        } else {
            self.lookahead_time
        }
    }
}
