//! Alerting: threshold tables and the bands-based alert levels.
//!
//! Levels are integers, 0 meaning no alert. For bands-based alerting the
//! levels are 1 proximate, 2 preventive, 3 corrective and 4 warning; for
//! threshold-based alerting the level is the 1-based index of the most
//! severe table entry that fires.

use crate::bands::BandsQuery;
use crate::detector::{Detector, NMAC_D, NMAC_H, TimeVariable, Wcv, WcvTable};
use crate::error::{check_non_negative, Result};
use crate::geometry::{tccpa, Vect3, Velocity};
use crate::kinematic_bands::{Dimension, KinematicBands};
use crate::params::DaaParameters;
use crate::state::{OwnshipState, TrafficState};
use crate::units::{from_ft, from_nmi};
use serde::{Deserialize, Serialize};

/// Upper bound on time-to-maneuver bisection steps.
const MAX_MANEUVER_STEPS: usize = 64;

/// One alert level: a detector checked over `[0, alerting_time]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub detector: Detector,
    /// 0 means the level fires only on a current violation.
    pub alerting_time: f64,
    /// Conflicts not lasting longer than this are ignored.
    #[serde(default)]
    pub duration_thr: f64,
}

impl AlertThresholds {
    pub fn new(detector: impl Into<Detector>, alerting_time: f64, duration_thr: f64) -> Self {
        Self {
            detector: detector.into(),
            alerting_time,
            duration_thr,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("alerting_time", self.alerting_time)?;
        check_non_negative("duration_thr", self.duration_thr)?;
        Ok(())
    }

    /// Whether this level fires, plus the time to violation.
    pub fn alerting(&self, so: &Vect3, vo: &Velocity, si: &Vect3, vi: &Velocity) -> (bool, f64) {
        if self.alerting_time == 0.0 {
            // Empty window: only a current violation counts.
            let alert = self.detector.violation(so, vo, si, vi);
            return (alert, if alert { 0.0 } else { f64::INFINITY });
        }
        let det = self
            .detector
            .conflict_detection(so, vo, si, vi, 0.0, self.alerting_time);
        (det.conflict_longer_than(self.duration_thr), det.time_in())
    }

    /// Four-level table of the DO-365 MOPS: proximate, preventive,
    /// corrective and warning.
    pub fn mops() -> Vec<AlertThresholds> {
        let level = |dthr_nmi: f64, zthr_ft: f64, alerting_time: f64| {
            let table = WcvTable {
                dthr: from_nmi(dthr_nmi),
                zthr: from_ft(zthr_ft),
                tthr: 35.0,
                tcoa: 0.0,
            };
            AlertThresholds::new(Wcv::new(table, TimeVariable::TauMod), alerting_time, 0.0)
        };
        vec![
            level(2.0, 1200.0, 60.0),
            level(0.66, 700.0, 55.0),
            level(0.66, 450.0, 40.0),
            level(0.66, 450.0, 20.0),
        ]
    }
}

/// Geometry recorded when a threshold level fired.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertInfo {
    pub alert_type: usize,
    /// Relative position `so - si`.
    pub s: Vect3,
    pub vo: Velocity,
    pub vi: Velocity,
    pub time_in: f64,
}

impl AlertInfo {
    pub fn new(
        alert_type: usize,
        so: &Vect3,
        vo: &Velocity,
        si: &Vect3,
        vi: &Velocity,
        tin: f64,
    ) -> Self {
        Self {
            alert_type,
            s: *so - *si,
            vo: *vo,
            vi: *vi,
            time_in: tin,
        }
    }

    pub fn time_to_violation(&self) -> f64 {
        self.time_in
    }

    pub fn horizontal_range(&self) -> f64 {
        self.s.vect2().norm()
    }

    pub fn vertical_range(&self) -> f64 {
        self.s.z.abs()
    }

    /// Relative position at the time of closest cylindrical approach.
    fn at_closest_approach(&self) -> Vect3 {
        let t = tccpa(&self.s, &self.vo, &self.vi, NMAC_D, NMAC_H);
        (self.vo - self.vi).scal_add(t, &self.s)
    }

    pub fn horizontal_miss_distance(&self) -> f64 {
        self.at_closest_approach().vect2().norm()
    }

    pub fn vertical_miss_distance(&self) -> f64 {
        self.at_closest_approach().z.abs()
    }

    pub fn cylindrical_norm(&self, d: f64, h: f64) -> f64 {
        self.s.cyl_norm(d, h)
    }
}

/// Most severe threshold level firing for `ac`, scanning from the most
/// severe entry down. Returns 0 and a default info when none fires.
pub fn thresholds_alerting(
    alertor: &[AlertThresholds],
    own: &OwnshipState,
    ac: &TrafficState,
) -> (usize, AlertInfo) {
    let so = own.s();
    let vo = own.v();
    let si = own.traffic_s(ac);
    let vi = own.traffic_v(ac);
    for (i, thr) in alertor.iter().enumerate().rev() {
        let (alert, tin) = thr.alerting(&so, &vo, &si, &vi);
        if alert {
            let level = i + 1;
            return (level, AlertInfo::new(level, &so, &vo, &si, &vi, tin));
        }
    }
    (0, AlertInfo::default())
}

fn enabled_dimensions(params: &DaaParameters) -> impl Iterator<Item = Dimension> + '_ {
    [
        (Dimension::Track, params.trk_alerting),
        (Dimension::GroundSpeed, params.gs_alerting),
        (Dimension::VerticalSpeed, params.vs_alerting),
    ]
    .into_iter()
    .filter_map(|(dim, on)| on.then_some(dim))
}

/// Latest time, within `[0, t2v]`, at which some enabled dimension still has
/// a conflict-free maneuver against `ac`.
pub fn last_time_to_maneuver(
    params: &DaaParameters,
    detector: &Detector,
    own: &OwnshipState,
    ac: &TrafficState,
    t2v: f64,
) -> Result<f64> {
    let bands = KinematicBands::with_parameters(detector.clone(), params)?;
    let alerting_time = params.actual_alerting_time();
    let mut pivot_green = 0.0;
    let mut pivot_red = t2v;
    let mut pivot = pivot_green + 1.0;
    for _ in 0..MAX_MANEUVER_STEPS {
        if pivot_red - pivot_green <= 1.0 {
            break;
        }
        let op = own.linear_projection(pivot);
        let ap = ac.linear_projection(pivot);
        let traffic = std::slice::from_ref(&ap);
        let q = BandsQuery::new(detector, 0.0, alerting_time, &op, traffic);
        let all_red = enabled_dimensions(params).all(|dim| bands.dimension(dim).all_red(&q));
        if all_red {
            pivot_red = pivot;
        } else {
            pivot_green = pivot;
        }
        pivot = (pivot_red + pivot_green) / 2.0;
    }
    Ok(pivot_red)
}

/// Bands-based alert level of `ac`, with `repac` as criteria aircraft.
pub fn bands_alerting(
    params: &DaaParameters,
    detector: &Detector,
    own: &OwnshipState,
    ac: &TrafficState,
    repac: Option<&TrafficState>,
) -> Result<usize> {
    let mut bands = KinematicBands::with_parameters(detector.clone(), params)?;
    bands.set_criteria_aircraft(repac.map(|r| r.id.clone()));
    bands.set_recovery_bands(false);
    bands.set_implicit_bands(true);
    bands.set_ownship(own.clone());
    if bands.add_traffic(ac.clone()).is_err() {
        return Ok(0);
    }
    let dims: Vec<Dimension> = enabled_dimensions(params).collect();
    if dims.iter().all(|&dim| bands.length(dim) <= 0) {
        return Ok(0);
    }
    let so = own.s();
    let vo = own.v();
    let si = own.traffic_s(ac);
    let vi = own.traffic_v(ac);
    let det = detector.conflict_detection(&so, &vo, &si, &vi, 0.0, params.actual_alerting_time());
    if det.conflict() {
        let time_to_warning = if params.warning_when_recovery {
            last_time_to_maneuver(params, detector, own, ac, det.time_in())?
        } else {
            det.time_in()
        };
        return Ok(if time_to_warning <= params.time_to_warning { 4 } else { 3 });
    }
    if params.preventive_alt >= 0.0 && (so.z - si.z).abs() > params.preventive_alt {
        return Ok(1);
    }
    let preventive = dims.iter().any(|&dim| {
        let thr = match dim {
            Dimension::Track => params.preventive_trk,
            Dimension::GroundSpeed => params.preventive_gs,
            _ => params.preventive_vs,
        };
        if bands.length(dim) <= 0 {
            return false;
        }
        if thr < 0.0 {
            return true;
        }
        let val = bands.ownship_value(dim).unwrap_or_default();
        bands.near_conflict(dim, val, thr)
    });
    Ok(if preventive { 2 } else { 1 })
}
