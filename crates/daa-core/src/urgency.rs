//! Selection of the most urgent traffic aircraft, the one repulsiveness
//! criteria are computed against.

use crate::detector::{Detector, NMAC_D, NMAC_H};
use crate::geometry::tccpa;
use crate::numeric::{almost_equals_prec, PRECISION5};
use crate::state::{OwnshipState, TrafficState};
use serde::{Deserialize, Serialize};

/// Policy used to pick the most urgent aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "aircraft", rename_all = "snake_case")]
pub enum UrgencyStrategy {
    /// No aircraft is ever urgent.
    #[default]
    None,
    /// Always the aircraft with this identifier, if present.
    Fixed(String),
    /// Conflict aircraft with the smallest cylindrical miss distance, ties
    /// broken by time of closest approach.
    Dcpa,
}

impl UrgencyStrategy {
    /// Most urgent aircraft of `traffic` over the window `[0, t]`.
    pub fn most_urgent<'a>(
        &self,
        detector: &Detector,
        ownship: &OwnshipState,
        traffic: &'a [TrafficState],
        t: f64,
    ) -> Option<&'a TrafficState> {
        match self {
            UrgencyStrategy::None => None,
            UrgencyStrategy::Fixed(id) => traffic.iter().find(|ac| &ac.id == id),
            UrgencyStrategy::Dcpa => most_urgent_dcpa(detector, ownship, traffic, t),
        }
    }
}

fn most_urgent_dcpa<'a>(
    detector: &Detector,
    ownship: &OwnshipState,
    traffic: &'a [TrafficState],
    t: f64,
) -> Option<&'a TrafficState> {
    let so = ownship.s();
    let vo = ownship.v();
    let mut repac: Option<&TrafficState> = None;
    let mut mindcpa = 0.0;
    let mut mintcpa = 0.0;
    for ac in traffic {
        let si = ownship.traffic_s(ac);
        let vi = ownship.traffic_v(ac);
        if !detector.conflict(&so, &vo, &si, &vi, 0.0, t) {
            continue;
        }
        let s = so - si;
        let v = vo - vi;
        let tcpa = tccpa(&s, &vo, &vi, NMAC_D, NMAC_H);
        let dcpa = v.scal_add(tcpa, &s).cyl_norm(NMAC_D, NMAC_H);
        // Same tcpa: smaller dcpa wins; otherwise earlier tcpa.
        let tcpa_strategy = if almost_equals_prec(tcpa, mintcpa, PRECISION5) {
            dcpa < mindcpa
        } else {
            tcpa < mintcpa
        };
        // Same dcpa: earlier tcpa wins; otherwise smaller dcpa.
        let dcpa_strategy = if almost_equals_prec(dcpa, mindcpa, PRECISION5) {
            tcpa < mintcpa
        } else {
            dcpa < mindcpa
        };
        // Aircraft penetrating the NMAC volume are ranked by tcpa.
        let better = if dcpa <= 1.0 {
            mindcpa > 1.0 || tcpa_strategy
        } else {
            dcpa_strategy
        };
        if repac.is_none() || better {
            repac = Some(ac);
            mindcpa = dcpa;
            mintcpa = tcpa;
        }
    }
    repac
}
