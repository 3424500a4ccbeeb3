//! Shared inputs of every band dimension: ownship, traffic, detector and the
//! time and recovery settings.

use crate::detector::Detector;
use crate::loss::ConflictData;
use crate::params::DaaParameters;
use crate::state::{OwnshipState, TrafficState};
use crate::tcas::{ra_hmd, ra_zthr, sensitivity_level};

/// State common to the four dimensions of a bands session.
#[derive(Debug, Clone, PartialEq)]
pub struct BandsCore {
    pub ownship: Option<OwnshipState>,
    pub traffic: Vec<TrafficState>,
    pub detector: Detector,
    pub implicit_bands: bool,
    pub lookahead: f64,
    /// 0 means lookahead time.
    pub alerting_time: f64,
    /// 0 means lookahead time.
    pub max_recovery_time: f64,
    pub recovery_stability_time: f64,
    /// Aircraft the repulsiveness criteria are computed against.
    pub criteria_ac: Option<String>,
    pub conflict_crit: bool,
    pub recovery_crit: bool,
    /// 0 means TCAS RA HMD at the ownship's sensitivity level.
    pub min_horizontal_recovery: f64,
    /// 0 means TCAS RA ZTHR at the ownship's sensitivity level.
    pub min_vertical_recovery: f64,
    pub ca_bands: bool,
}

impl Default for BandsCore {
    fn default() -> Self {
        Self::new(Detector::default())
    }
}

impl BandsCore {
    pub fn new(detector: Detector) -> Self {
        let params = DaaParameters::default();
        Self {
            ownship: None,
            traffic: Vec::new(),
            detector,
            implicit_bands: params.implicit_bands,
            lookahead: params.lookahead_time,
            alerting_time: params.alerting_time,
            max_recovery_time: params.max_recovery_time,
            recovery_stability_time: params.recovery_stability_time,
            criteria_ac: None,
            conflict_crit: params.conflict_crit,
            recovery_crit: params.recovery_crit,
            min_horizontal_recovery: params.min_horizontal_recovery,
            min_vertical_recovery: params.min_vertical_recovery,
            ca_bands: params.ca_bands,
        }
    }

    /// Copy the core settings of `params`. Aircraft and detector are kept.
    pub fn apply(&mut self, params: &DaaParameters) {
        self.implicit_bands = params.implicit_bands;
        self.lookahead = params.lookahead_time;
        self.alerting_time = params.alerting_time;
        self.max_recovery_time = params.max_recovery_time;
        self.recovery_stability_time = params.recovery_stability_time;
        self.conflict_crit = params.conflict_crit;
        self.recovery_crit = params.recovery_crit;
        self.min_horizontal_recovery = params.min_horizontal_recovery;
        self.min_vertical_recovery = params.min_vertical_recovery;
        self.ca_bands = params.ca_bands;
    }

    pub fn has_ownship(&self) -> bool {
        self.ownship.is_some()
    }

    pub fn has_traffic(&self) -> bool {
        !self.traffic.is_empty()
    }

    /// Drop ownship and traffic.
    pub fn clear(&mut self) {
        self.ownship = None;
        self.traffic.clear();
    }

    pub fn actual_alerting_time(&self) -> f64 {
        if self.alerting_time > 0.0 {
            self.alerting_time
        } else {
            self.lookahead
        }
    }

    pub fn actual_max_recovery_time(&self) -> f64 {
        if self.max_recovery_time > 0.0 {
            self.max_recovery_time
        } else {
            self.lookahead
        }
    }

    fn ownship_sensitivity_level(&self) -> usize {
        self.ownship
            .as_ref()
            .map_or(3, |own| sensitivity_level(own.position().alt()).max(3))
    }

    pub fn actual_min_horizontal_recovery(&self) -> f64 {
        if self.min_horizontal_recovery > 0.0 {
            self.min_horizontal_recovery
        } else {
            ra_hmd(self.ownship_sensitivity_level())
        }
    }

    pub fn actual_min_vertical_recovery(&self) -> f64 {
        if self.min_vertical_recovery > 0.0 {
            self.min_vertical_recovery
        } else {
            ra_zthr(self.ownship_sensitivity_level())
        }
    }

    pub fn criteria_aircraft(&self) -> Option<&TrafficState> {
        let id = self.criteria_ac.as_deref()?;
        self.traffic.iter().find(|ac| ac.id == id)
    }

    /// Conflict between the ownship and `ac` within `[b, t]`.
    pub fn check_conflict(&self, ac: &TrafficState, b: f64, t: f64) -> ConflictData {
        let Some(own) = self.ownship.as_ref() else {
            return ConflictData::none();
        };
        self.detector.conflict_detection(
            &own.s(),
            &own.v(),
            &own.traffic_s(ac),
            &own.traffic_v(ac),
            b,
            t,
        )
    }

    pub fn check_violation(&self, ac: &TrafficState) -> bool {
        let Some(own) = self.ownship.as_ref() else {
            return false;
        };
        self.detector
            .violation(&own.s(), &own.v(), &own.traffic_s(ac), &own.traffic_v(ac))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vect3;
    use crate::state::Position;
    use crate::units::{from_ft, to_ft};

    fn ownship_at(alt_ft: f64) -> OwnshipState {
        OwnshipState::new(TrafficState::new(
            "own",
            Position::xyz(0.0, 0.0, from_ft(alt_ft)),
            Vect3::new(0.0, 100.0, 0.0),
        ))
    }

    #[test]
    fn test_zero_times_fall_back_to_lookahead() {
        let mut core = BandsCore::default();
        assert_eq!(core.actual_alerting_time(), 180.0);
        assert_eq!(core.actual_max_recovery_time(), 180.0);
        core.alerting_time = 60.0;
        assert_eq!(core.actual_alerting_time(), 60.0);
    }

    #[test]
    fn test_recovery_separation_defaults_to_tcas() {
        let mut core = BandsCore::default();
        assert!((to_ft(core.actual_min_horizontal_recovery()) - 1215.0).abs() < 1e-6);

        core.ownship = Some(ownship_at(30000.0));
        assert!((to_ft(core.actual_min_horizontal_recovery()) - 6683.0).abs() < 1e-6);
        assert!((to_ft(core.actual_min_vertical_recovery()) - 700.0).abs() < 1e-6);

        core.ownship = Some(ownship_at(200.0));
        assert!((to_ft(core.actual_min_vertical_recovery()) - 600.0).abs() < 1e-6);

        core.min_horizontal_recovery = 500.0;
        assert_eq!(core.actual_min_horizontal_recovery(), 500.0);
    }

    #[test]
    fn test_check_conflict_head_on() {
        let mut core = BandsCore::default();
        let parked = TrafficState::new("x", Position::xyz(0.0, 0.0, 0.0), Vect3::ZERO);
        assert!(!core.check_conflict(&parked, 0.0, 180.0).conflict());
        core.ownship = Some(ownship_at(5000.0));
        let ac = TrafficState::new(
            "ac",
            Position::xyz(0.0, 10000.0, from_ft(5000.0)),
            Vect3::new(0.0, -100.0, 0.0),
        );
        let det = core.check_conflict(&ac, 0.0, 180.0);
        assert!(det.conflict());
        assert!(det.time_in() > 0.0 && det.time_in() < 50.0);
        assert!(!core.check_violation(&ac));
    }

    #[test]
    fn test_criteria_aircraft_lookup() {
        let mut core = BandsCore::default();
        core.traffic.push(TrafficState::new(
            "a",
            Position::xyz(0.0, 0.0, 0.0),
            Vect3::ZERO,
        ));
        core.criteria_ac = Some("b".into());
        assert!(core.criteria_aircraft().is_none());
        core.criteria_ac = Some("a".into());
        assert_eq!(core.criteria_aircraft().map(|ac| ac.id.as_str()), Some("a"));
    }
}
