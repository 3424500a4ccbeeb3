//! Detect-and-avoid monitor: the aircraft list, wind, detector and
//! parameters behind alert levels and kinematic bands.
//!
//! Index 0 of the aircraft list is the ownship. Every aircraft keeps the time
//! of its observation; traffic observed at other times is projected to the
//! ownship time when added. Velocities are stored relative to the air mass,
//! i.e. with the wind vector removed.

use crate::alerting::{bands_alerting, thresholds_alerting, AlertInfo, AlertThresholds};
use crate::detector::{Detector, Wcv};
use crate::error::{check_non_negative, check_positive, DaaError, Result};
use crate::geometry::{Vect3, Velocity};
use crate::kinematic_bands::KinematicBands;
use crate::loss::ConflictData;
use crate::params::DaaParameters;
use crate::state::{OwnshipState, TrafficState};
use crate::units::{to_ft, to_knots};
use crate::urgency::UrgencyStrategy;
use std::fmt;
use std::path::Path;

fn rejected_logged(res: Result<f64>) -> Result<f64> {
    res.inspect_err(|e| tracing::warn!(error = %e, "setting rejected, keeping previous value"))
}

/// Monitor over one ownship and its traffic.
#[derive(Debug, Clone)]
pub struct DaaMonitor {
    aircraft: Vec<TrafficState>,
    times: Vec<f64>,
    wind: Velocity,
    detector: Detector,
    params: DaaParameters,
    urgency: UrgencyStrategy,
    info: AlertInfo,
}

impl Default for DaaMonitor {
    fn default() -> Self {
        let params = DaaParameters::default();
        Self {
            aircraft: Vec::new(),
            times: Vec::new(),
            wind: Vect3::ZERO,
            detector: Wcv::taumod(params.wcv_table()).into(),
            params,
            urgency: UrgencyStrategy::None,
            info: AlertInfo::default(),
        }
    }
}

impl DaaMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monitor using `detector`; its thresholds overwrite the parameters.
    pub fn with_detector(detector: Detector) -> Self {
        let mut monitor = Self::default();
        monitor.set_detector(detector);
        monitor
    }

    // Configuration

    pub fn parameters(&self) -> &DaaParameters {
        &self.params
    }

    /// Replace the parameters after validation and push the thresholds into
    /// the detector. Invalid parameters are rejected as a whole.
    pub fn set_parameters(&mut self, params: DaaParameters) -> Result<()> {
        params
            .validate()
            .inspect_err(|e| tracing::warn!(error = %e, "parameters rejected"))?;
        self.params = params;
        self.set_detector_from_parameters();
        Ok(())
    }

    pub fn load_parameters(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let params = DaaParameters::load_json(path)?;
        self.set_parameters(params)
    }

    pub fn save_parameters(&self, path: impl AsRef<Path>) -> Result<()> {
        self.params.save_json(path)
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Use `detector` and copy its thresholds into the parameters.
    pub fn set_detector(&mut self, detector: Detector) {
        self.detector = detector;
        match &self.detector {
            Detector::Wcv(wcv) => {
                self.params.dthr = wcv.table.dthr;
                self.params.zthr = wcv.table.zthr;
                self.params.tthr = wcv.table.tthr;
                self.params.tcoa = wcv.table.tcoa;
            }
            Detector::Cylinder(cyl) => {
                self.params.d = cyl.d;
                self.params.h = cyl.h;
            }
        }
    }

    fn set_detector_from_parameters(&mut self) {
        match &mut self.detector {
            Detector::Wcv(wcv) => wcv.table = self.params.wcv_table(),
            Detector::Cylinder(cyl) => {
                cyl.d = self.params.d;
                cyl.h = self.params.h;
            }
        }
    }

    fn set_wcv_threshold(&mut self, name: &'static str, val: f64, zero_ok: bool) -> Result<()> {
        let checked = if zero_ok {
            check_non_negative(name, val)
        } else {
            check_positive(name, val)
        };
        let val = rejected_logged(checked)?;
        match name {
            "dthr" => self.params.dthr = val,
            "zthr" => self.params.zthr = val,
            "tthr" => self.params.tthr = val,
            _ => self.params.tcoa = val,
        }
        match &mut self.detector {
            Detector::Wcv(wcv) => wcv.table = self.params.wcv_table(),
            other => tracing::warn!(detector = %other, threshold = name, "not a WCV detector"),
        }
        Ok(())
    }

    pub fn set_dthr(&mut self, val: f64) -> Result<()> {
        self.set_wcv_threshold("dthr", val, false)
    }

    pub fn set_zthr(&mut self, val: f64) -> Result<()> {
        self.set_wcv_threshold("zthr", val, false)
    }

    pub fn set_tthr(&mut self, val: f64) -> Result<()> {
        self.set_wcv_threshold("tthr", val, true)
    }

    pub fn set_tcoa(&mut self, val: f64) -> Result<()> {
        self.set_wcv_threshold("tcoa", val, true)
    }

    /// Horizontal and vertical size of the cylinder detector.
    pub fn set_cylinder(&mut self, d: f64, h: f64) -> Result<()> {
        let d = rejected_logged(check_positive("d", d))?;
        let h = rejected_logged(check_positive("h", h))?;
        self.params.d = d;
        self.params.h = h;
        match &mut self.detector {
            Detector::Cylinder(cyl) => {
                cyl.d = d;
                cyl.h = h;
            }
            other => tracing::warn!(detector = %other, "detector is not a cylinder detector"),
        }
        Ok(())
    }

    pub fn urgency_strategy(&self) -> &UrgencyStrategy {
        &self.urgency
    }

    pub fn set_urgency_strategy(&mut self, strat: UrgencyStrategy) {
        self.urgency = strat;
    }

    // Alert thresholds

    pub fn alertor(&self) -> &[AlertThresholds] {
        &self.params.alertor
    }

    pub fn clear_alert_thresholds(&mut self) {
        self.params.alertor.clear();
    }

    /// Append a level and return its number.
    pub fn add_alert_thresholds(&mut self, thr: AlertThresholds) -> usize {
        self.params.alertor.push(thr);
        self.params.alertor.len()
    }

    /// Replace level `level` (1-based).
    pub fn set_alert_thresholds(&mut self, level: usize, thr: AlertThresholds) -> Result<()> {
        let len = self.params.alertor.len();
        match level.checked_sub(1).and_then(|i| self.params.alertor.get_mut(i)) {
            Some(slot) => {
                *slot = thr;
                Ok(())
            }
            None => Err(DaaError::InvalidParameter {
                name: "alert_level",
                value: level as f64,
                reason: if len == 0 {
                    "no alert levels configured"
                } else {
                    "no such alert level"
                },
            }),
        }
    }

    pub fn most_severe_alert_level(&self) -> usize {
        self.params.alertor.len()
    }

    /// Geometry of the last threshold alert.
    pub fn last_alert_info(&self) -> &AlertInfo {
        &self.info
    }

    // Aircraft

    /// Drop aircraft, times and wind.
    pub fn reset(&mut self) {
        self.aircraft.clear();
        self.times.clear();
        self.wind = Vect3::ZERO;
    }

    pub fn number_of_aircraft(&self) -> usize {
        self.aircraft.len()
    }

    pub fn aircraft(&self) -> &[TrafficState] {
        &self.aircraft
    }

    /// Time of the ownship observation, 0 when empty.
    pub fn current_time(&self) -> f64 {
        self.times.first().copied().unwrap_or(0.0)
    }

    pub fn wind_field(&self) -> Velocity {
        self.wind
    }

    /// Change the wind, re-deriving every stored air velocity and the
    /// projected positions.
    pub fn set_wind_field(&mut self, wind: Velocity) {
        let current = self.current_time();
        for (ac, &time) in self.aircraft.iter_mut().zip(&self.times) {
            let dt = current - time;
            let pos = ac.position.linear(&ac.velocity, -dt);
            let ground = ac.velocity + self.wind;
            let vt = ground - wind;
            *ac = TrafficState::new(ac.id.clone(), pos.linear(&vt, dt), vt);
        }
        self.wind = wind;
    }

    /// Clear the aircraft list and set the ownship. `state.velocity` is the
    /// ground velocity.
    pub fn set_ownship_state(&mut self, state: TrafficState, time: f64) {
        self.aircraft.clear();
        self.times.clear();
        let vt = state.velocity - self.wind;
        self.aircraft
            .push(TrafficState::new(state.id, state.position, vt));
        self.times.push(time);
    }

    /// Add traffic observed at `time`, projecting it to the current time.
    /// The first aircraft added becomes the ownship. Returns its index.
    pub fn add_traffic_state(&mut self, state: TrafficState, time: f64) -> usize {
        if self.aircraft.is_empty() {
            self.set_ownship_state(state, time);
            return 0;
        }
        let dt = self.current_time() - time;
        let vt = state.velocity - self.wind;
        let pt = state.position.linear(&vt, dt);
        self.aircraft.push(TrafficState::new(state.id, pt, vt));
        self.times.push(time);
        self.aircraft.len() - 1
    }

    pub fn aircraft_index(&self, name: &str) -> Option<usize> {
        self.aircraft.iter().position(|ac| ac.id == name)
    }

    /// Swap the ownship with aircraft `i`. When their times differ, every
    /// aircraft is projected to the new current time.
    pub fn reset_ownship(&mut self, i: usize) {
        if i == 0 || i >= self.aircraft.len() {
            return;
        }
        self.aircraft.swap(0, i);
        if self.times[0] != self.times[i] {
            let old_time0 = self.times[0];
            self.times.swap(0, i);
            let dt = self.current_time() - old_time0;
            for ac in self.aircraft.iter_mut() {
                *ac = ac.linear_projection(dt);
            }
        }
    }

    pub fn reset_ownship_by_name(&mut self, name: &str) {
        if let Some(i) = self.aircraft_index(name) {
            self.reset_ownship(i);
        }
    }

    fn check_time(&self, time: f64) -> Result<()> {
        let current = self.current_time();
        let lookahead = self.params.lookahead_time;
        if time < current || time > current + lookahead {
            tracing::warn!(time, current, lookahead, "query time outside the time horizon");
            return Err(DaaError::TimeOutOfHorizon {
                time,
                current,
                lookahead,
            });
        }
        Ok(())
    }

    fn check_traffic_index(&self, ac: usize) -> Result<()> {
        if self.aircraft.is_empty() {
            tracing::warn!("no aircraft loaded");
            return Err(DaaError::NoOwnship);
        }
        if ac == 0 || ac >= self.aircraft.len() {
            tracing::warn!(index = ac, "aircraft index out of bounds");
            return Err(DaaError::AircraftIndex {
                index: ac,
                len: self.aircraft.len(),
            });
        }
        Ok(())
    }

    pub fn ownship_state_at(&self, time: f64) -> Result<OwnshipState> {
        let own = self.aircraft.first().ok_or(DaaError::NoOwnship)?;
        let dt = time - self.current_time();
        Ok(OwnshipState::new(own.linear_projection(dt)))
    }

    pub fn ownship_state(&self) -> Result<OwnshipState> {
        self.ownship_state_at(self.current_time())
    }

    pub fn traffic_state_at(&self, ac: usize, time: f64) -> Result<TrafficState> {
        let state = self.aircraft.get(ac).ok_or(DaaError::AircraftIndex {
            index: ac,
            len: self.aircraft.len(),
        })?;
        Ok(state.linear_projection(time - self.current_time()))
    }

    /// Most urgent aircraft at `time` under the urgency strategy, when
    /// repulsive criteria are enabled.
    pub fn most_urgent_aircraft_at(&self, time: f64) -> Option<TrafficState> {
        if !(self.params.conflict_crit || self.params.recovery_crit) {
            return None;
        }
        let own = self.ownship_state_at(time).ok()?;
        let dt = time - self.current_time();
        let traffic: Vec<TrafficState> = self
            .aircraft
            .iter()
            .skip(1)
            .map(|ac| ac.linear_projection(dt))
            .collect();
        self.urgency
            .most_urgent(
                &self.detector,
                &own,
                &traffic,
                self.params.actual_alerting_time(),
            )
            .cloned()
    }

    pub fn most_urgent_aircraft(&self) -> Option<TrafficState> {
        self.most_urgent_aircraft_at(self.current_time())
    }

    // Alerting

    /// Alert level of aircraft `ac` with every state projected to `time`.
    pub fn alerting_at(&mut self, ac: usize, time: f64) -> Result<usize> {
        self.check_traffic_index(ac)?;
        self.check_time(time)?;
        let own = self.ownship_state_at(time)?;
        let aci = self.traffic_state_at(ac, time)?;
        let level = if self.params.bands_alerting {
            let repac = self.most_urgent_aircraft_at(time);
            bands_alerting(&self.params, &self.detector, &own, &aci, repac.as_ref())?
        } else {
            let (level, info) = thresholds_alerting(&self.params.alertor, &own, &aci);
            self.info = info;
            level
        };
        tracing::debug!(aircraft = %aci.id, time, level, "alert level computed");
        Ok(level)
    }

    pub fn alerting(&mut self, ac: usize) -> Result<usize> {
        self.alerting_at(ac, self.current_time())
    }

    /// Violation interval of `ac` over the lookahead time, relative to
    /// `time`.
    pub fn time_interval_of_violation_at(&self, ac: usize, time: f64) -> Result<ConflictData> {
        self.check_traffic_index(ac)?;
        self.check_time(time)?;
        let own = self.ownship_state_at(time)?;
        let aci = self.traffic_state_at(ac, time)?;
        Ok(self.detector.conflict_detection(
            &own.s(),
            &own.v(),
            &own.traffic_s(&aci),
            &own.traffic_v(&aci),
            0.0,
            self.params.lookahead_time,
        ))
    }

    pub fn time_interval_of_violation(&self, ac: usize) -> Result<ConflictData> {
        self.time_interval_of_violation_at(ac, self.current_time())
    }

    /// Time to violation relative to `time`; `None` when no violation is
    /// predicted within the lookahead time.
    pub fn time_to_violation_at(&self, ac: usize, time: f64) -> Result<Option<f64>> {
        let det = self.time_interval_of_violation_at(ac, time)?;
        Ok(det.conflict().then(|| det.time_in()))
    }

    pub fn time_to_violation(&self, ac: usize) -> Result<Option<f64>> {
        self.time_to_violation_at(ac, self.current_time())
    }

    // Bands

    /// Bands session over every aircraft projected to `time`, with the
    /// criteria aircraft chosen by the urgency strategy.
    pub fn kinematic_bands_at(&self, time: f64) -> Result<KinematicBands> {
        if self.aircraft.is_empty() {
            tracing::warn!("no aircraft loaded");
            return Err(DaaError::NoOwnship);
        }
        self.check_time(time)?;
        let dt = time - self.current_time();
        let mut bands = KinematicBands::with_parameters(self.detector.clone(), &self.params)?;
        bands.set_ownship(self.ownship_state_at(time)?);
        for ac in self.aircraft.iter().skip(1) {
            bands.add_traffic(ac.linear_projection(dt))?;
        }
        bands.set_criteria_from(&self.urgency);
        Ok(bands)
    }

    pub fn kinematic_bands(&self) -> Result<KinematicBands> {
        self.kinematic_bands_at(self.current_time())
    }
}

impl fmt::Display for DaaMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Monitor {}", self.detector)?;
        for (i, thr) in self.params.alertor.iter().enumerate() {
            writeln!(
                f,
                "alert level {}: {} alerting_time={:.1} [s] duration_thr={:.1} [s]",
                i + 1,
                thr.detector,
                thr.alerting_time,
                thr.duration_thr
            )?;
        }
        if self.aircraft.is_empty() {
            return Ok(());
        }
        writeln!(f, "NAME alt trk gs vs time")?;
        writeln!(f, "[none] [ft] [deg] [knot] [fpm] [s]")?;
        for (ac, time) in self.aircraft.iter().zip(&self.times) {
            let v = ac.velocity + self.wind;
            writeln!(
                f,
                "{}, {:.2}, {:.2}, {:.2}, {:.2}, {:.2}",
                ac.id,
                to_ft(ac.position.alt()),
                v.trk().to_degrees(),
                to_knots(v.gs()),
                crate::units::to_fpm(v.vs()),
                time
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::CdCylinder;
    use crate::state::Position;
    use crate::units::{from_ft, from_knots, from_nmi};

    fn own_state() -> TrafficState {
        TrafficState::new(
            "own",
            Position::xyz(0.0, 0.0, from_ft(10000.0)),
            Vect3::from_trk_gs_vs(0.0, from_knots(200.0), 0.0),
        )
    }

    fn head_on(id: &str, range: f64) -> TrafficState {
        TrafficState::new(
            id,
            Position::xyz(0.0, range, from_ft(10000.0)),
            Vect3::from_trk_gs_vs(std::f64::consts::PI, from_knots(200.0), 0.0),
        )
    }

    #[test]
    fn test_first_aircraft_becomes_ownship() {
        let mut monitor = DaaMonitor::new();
        assert_eq!(monitor.add_traffic_state(own_state(), 10.0), 0);
        assert_eq!(monitor.add_traffic_state(head_on("a", 12000.0), 10.0), 1);
        assert_eq!(monitor.current_time(), 10.0);
        assert_eq!(monitor.aircraft_index("a"), Some(1));
        assert_eq!(monitor.aircraft_index("b"), None);
    }

    #[test]
    fn test_stale_traffic_projected_to_current_time() {
        let mut monitor = DaaMonitor::new();
        monitor.set_ownship_state(own_state(), 10.0);
        monitor.add_traffic_state(head_on("a", 12000.0), 5.0);
        let ac = &monitor.aircraft()[1];
        let expected = 12000.0 - from_knots(200.0) * 5.0;
        assert!((ac.position.alt() - from_ft(10000.0)).abs() < 1e-9);
        match ac.position {
            Position::Euclidean { y, .. } => assert!((y - expected).abs() < 1e-6),
            _ => panic!("expected a Euclidean position"),
        }
    }

    #[test]
    fn test_wind_is_removed_and_restored() {
        let mut monitor = DaaMonitor::new();
        let wind = Vect3::new(10.0, 0.0, 0.0);
        monitor.set_ownship_state(own_state(), 0.0);
        monitor.set_wind_field(wind);
        let air = monitor.aircraft()[0].velocity;
        assert!((air.x + 10.0).abs() < 1e-9);
        monitor.set_wind_field(Vect3::ZERO);
        let ground = monitor.aircraft()[0].velocity;
        assert!(ground.x.abs() < 1e-9);
        assert!((ground.y - from_knots(200.0)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_queries_are_errors() {
        let mut monitor = DaaMonitor::new();
        assert!(matches!(monitor.alerting(1), Err(DaaError::NoOwnship)));
        monitor.set_ownship_state(own_state(), 0.0);
        monitor.add_traffic_state(head_on("a", 12000.0), 0.0);
        assert!(matches!(
            monitor.alerting(0),
            Err(DaaError::AircraftIndex { index: 0, len: 2 })
        ));
        assert!(matches!(
            monitor.alerting(2),
            Err(DaaError::AircraftIndex { index: 2, .. })
        ));
        assert!(matches!(
            monitor.alerting_at(1, 500.0),
            Err(DaaError::TimeOutOfHorizon { .. })
        ));
    }

    #[test]
    fn test_head_on_alerts_and_time_to_violation() {
        let mut monitor = DaaMonitor::new();
        monitor.set_ownship_state(own_state(), 0.0);
        monitor.add_traffic_state(head_on("a", 12000.0), 0.0);
        monitor.add_traffic_state(head_on("b", 3000.0), 0.0);
        assert_eq!(monitor.alerting(1).unwrap(), 3);
        assert_eq!(monitor.alerting(2).unwrap(), 4);
        let t = monitor.time_to_violation(1).unwrap().unwrap();
        assert!(t > 15.0 && t < 30.0);
        let now = monitor.time_to_violation(2).unwrap().unwrap();
        assert!(now.abs() < 1e-9);
    }

    #[test]
    fn test_threshold_alerting_records_info() {
        let mut monitor = DaaMonitor::new();
        let mut params = DaaParameters::default();
        params.bands_alerting = false;
        monitor.set_parameters(params).unwrap();
        monitor.set_ownship_state(own_state(), 0.0);
        monitor.add_traffic_state(head_on("a", 3000.0), 0.0);
        assert_eq!(monitor.alerting(1).unwrap(), 4);
        assert_eq!(monitor.last_alert_info().alert_type, 4);
        assert_eq!(monitor.most_severe_alert_level(), 4);
    }

    #[test]
    fn test_detector_thresholds_stay_in_sync() {
        let mut monitor = DaaMonitor::new();
        monitor.set_dthr(from_nmi(1.0)).unwrap();
        assert_eq!(monitor.detector().wcv_table().unwrap().dthr, from_nmi(1.0));
        assert!(monitor.set_zthr(-1.0).is_err());
        assert_eq!(monitor.parameters().zthr, from_ft(450.0));

        monitor.set_detector(CdCylinder::new(from_nmi(2.0), from_ft(800.0)).into());
        assert_eq!(monitor.parameters().d, from_nmi(2.0));
        monitor.set_dthr(from_nmi(3.0)).unwrap();
        assert!(monitor.detector().wcv_table().is_none());
        assert_eq!(monitor.parameters().dthr, from_nmi(3.0));
    }

    #[test]
    fn test_reset_ownship_swaps_and_projects() {
        let mut monitor = DaaMonitor::new();
        monitor.set_ownship_state(own_state(), 10.0);
        monitor.add_traffic_state(head_on("a", 12000.0), 10.0);
        monitor.reset_ownship(1);
        assert_eq!(monitor.aircraft()[0].id, "a");
        assert_eq!(monitor.current_time(), 10.0);
        monitor.reset_ownship_by_name("own");
        assert_eq!(monitor.aircraft()[0].id, "own");
    }

    #[test]
    fn test_kinematic_bands_from_monitor() {
        let mut monitor = DaaMonitor::new();
        monitor.set_ownship_state(own_state(), 0.0);
        monitor.add_traffic_state(head_on("a", 12000.0), 0.0);
        let mut bands = monitor.kinematic_bands().unwrap();
        assert_eq!(bands.traffic().len(), 1);
        assert!(bands.length(crate::kinematic_bands::Dimension::Track) > 1);
    }

    #[test]
    fn test_alert_threshold_table_management() {
        let mut monitor =
            DaaMonitor::with_detector(CdCylinder::new(from_nmi(1.0), 300.0).into());
        assert_eq!(monitor.parameters().d, from_nmi(1.0));
        monitor.clear_alert_thresholds();
        assert_eq!(monitor.most_severe_alert_level(), 0);
        let cyl = CdCylinder::new(from_nmi(1.0), from_ft(1000.0));
        let level = |t: f64| AlertThresholds::new(cyl.clone(), t, 0.0);
        assert_eq!(monitor.add_alert_thresholds(level(60.0)), 1);
        assert_eq!(monitor.add_alert_thresholds(level(30.0)), 2);
        monitor.set_alert_thresholds(2, level(20.0)).unwrap();
        assert_eq!(monitor.alertor()[1].alerting_time, 20.0);
        assert!(monitor.set_alert_thresholds(0, level(20.0)).is_err());
        assert!(monitor.set_alert_thresholds(3, level(20.0)).is_err());
    }

    #[test]
    fn test_cylinder_and_wcv_setters() {
        let mut monitor = DaaMonitor::with_detector(CdCylinder::nmac().into());
        monitor.set_cylinder(from_nmi(2.0), from_ft(700.0)).unwrap();
        let expected = CdCylinder::new(from_nmi(2.0), from_ft(700.0));
        assert_eq!(monitor.detector(), &Detector::from(expected));
        assert!(monitor.set_cylinder(-1.0, 100.0).is_err());
        assert_eq!(monitor.parameters().d, from_nmi(2.0));

        let mut monitor = DaaMonitor::new();
        monitor.set_tthr(20.0).unwrap();
        monitor.set_tcoa(5.0).unwrap();
        let table = monitor.detector().wcv_table().unwrap();
        assert_eq!((table.tthr, table.tcoa), (20.0, 5.0));
        assert!(monitor.set_tthr(f64::NAN).is_err());
    }

    #[test]
    fn test_parameters_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("daa_monitor_params_{}.json", std::process::id()));
        let mut monitor = DaaMonitor::new();
        monitor.set_dthr(from_nmi(1.5)).unwrap();
        monitor.save_parameters(&path).unwrap();

        let mut other = DaaMonitor::new();
        other.load_parameters(&path).unwrap();
        let table = other.detector().wcv_table().unwrap();
        assert!((table.dthr - from_nmi(1.5)).abs() < 1e-9);
        std::fs::remove_file(&path).ok();

        let mut bad = DaaParameters::default();
        bad.lookahead_time = -1.0;
        assert!(other.set_parameters(bad).is_err());
        assert_eq!(other.parameters().lookahead_time, 180.0);
    }

    #[test]
    fn test_fixed_urgency_reaches_bands() {
        let mut monitor = DaaMonitor::new();
        let mut params = DaaParameters::default();
        params.conflict_crit = true;
        monitor.set_parameters(params).unwrap();
        monitor.set_urgency_strategy(UrgencyStrategy::Fixed("b".into()));
        assert_eq!(monitor.urgency_strategy(), &UrgencyStrategy::Fixed("b".into()));
        monitor.set_ownship_state(own_state(), 0.0);
        monitor.add_traffic_state(head_on("a", 12000.0), 0.0);
        monitor.add_traffic_state(head_on("b", 20000.0), 0.0);
        let urgent = monitor.most_urgent_aircraft().map(|ac| ac.id);
        assert_eq!(urgent.as_deref(), Some("b"));
        let bands = monitor.kinematic_bands().unwrap();
        assert_eq!(bands.criteria_aircraft(), Some("b"));
        assert_eq!(monitor.wind_field(), Vect3::ZERO);
    }
}
