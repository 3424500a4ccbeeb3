//! Altitude bands.
//!
//! Each candidate altitude is reached with a climb or descent that levels
//! out at the target. A level is red if the leveled trajectory conflicts
//! within the alerting time, or if the transition itself passes through a
//! loss of separation. Unlike the other dimensions the result is built from
//! red sets, and recovery bands are never computed.

use super::{BandsOutput, BandsQuery, BandsState, DimensionBands};
use crate::core::BandsCore;
use crate::detector::Detector;
use crate::intervals::IntervalSet;
use crate::kinematics::{vs_level_out, vs_level_out_final, vs_level_out_time};
use crate::numeric::{almost_equals, almost_leq, almost_less, PRECISION_DEFAULT};
use crate::state::{OwnshipState, TrafficState};

/// Time step used when sampling level-out transitions.
const TRANSITION_STEP: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AltitudeBands {
    state: BandsState,
    /// Climb/descent rate; 0 means altitude changes are instantaneous.
    vertical_rate: f64,
    vertical_accel: f64,
}

impl AltitudeBands {
    pub fn new(min: f64, max: f64, step: f64, vertical_rate: f64, vertical_accel: f64) -> Self {
        Self {
            state: BandsState::new(min, max, step, false),
            vertical_rate,
            vertical_accel,
        }
    }

    pub fn vertical_rate(&self) -> f64 {
        self.vertical_rate
    }

    pub fn vertical_accel(&self) -> f64 {
        self.vertical_accel
    }

    pub fn set_vertical_rate(&mut self, val: f64) {
        if val >= 0.0 && val != self.vertical_rate {
            self.vertical_rate = val;
            self.reset();
        }
    }

    pub fn set_vertical_accel(&mut self, val: f64) {
        if val >= 0.0 && val != self.vertical_accel {
            self.vertical_accel = val;
            self.reset();
        }
    }

    /// Candidate altitudes `min, min + step, ...` up to `max`.
    fn levels(&self, include_max: bool) -> Vec<f64> {
        let BandsState { min, max, step, .. } = self.state;
        (0..)
            .map(|n| min + f64::from(n) * step)
            .take_while(|a| {
                if include_max {
                    almost_leq(*a, max, PRECISION_DEFAULT)
                } else {
                    almost_less(*a, max, PRECISION_DEFAULT)
                }
            })
            .collect()
    }

    /// Red altitudes for conflicts within `[b, t]`.
    pub fn red_bands(
        &self,
        detector: &Detector,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> IntervalSet {
        let step = self.state.step;
        let so = ownship.s();
        let vo = ownship.v();
        let mut redset = IntervalSet::new();
        for a in self.levels(false) {
            match vs_level_out_final(&so, &vo, self.vertical_rate, a, self.vertical_accel) {
                None => redset.union(a - step, a + step),
                Some((sf, vf, tf)) if tf < t => {
                    let red = traffic.iter().any(|ac| {
                        let vi = ownship.traffic_v(ac);
                        let si = ownship.traffic_s(ac).linear(&vi, tf);
                        detector.conflict(&sf, &vf, &si, &vi, (b - tf).max(0.0), (t - tf).max(1.0))
                    });
                    if red {
                        redset.union(a - step, a + step);
                    }
                }
                Some(_) => {}
            }
        }
        if self.vertical_rate != 0.0 {
            let los = self.los_set_during_transition(detector, b, t, ownship, traffic, &redset);
            for iv in los.iter() {
                redset.union(iv.low, iv.up);
            }
        }
        redset
    }

    /// Levels whose transition passes through a loss of separation. Walking
    /// outward from the current altitude, a violation found while climbing
    /// or descending at the constant rate makes every further level in that
    /// direction red.
    fn los_set_during_transition(
        &self,
        detector: &Detector,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
        conflict_set: &IntervalSet,
    ) -> IntervalSet {
        let step = self.state.step;
        let so = ownship.s();
        let vo = ownship.v();
        let levels = self.levels(true);
        let mut los = IntervalSet::new();

        let scan = |fl: f64, rate: f64, go: &mut bool, const_t: &mut f64, los: &mut IntervalSet| {
            let dt = vs_level_out_time(&so, &vo, self.vertical_rate, fl, self.vertical_accel)
                .map_or(-1.0, |x| x.min(t));
            for ac in traffic {
                if !*go || conflict_set.in_set(fl) {
                    los.union(fl - step, fl + step);
                    continue;
                }
                let vi = ownship.traffic_v(ac);
                let si = ownship.traffic_s(ac);
                let mut tt = *const_t;
                while *go && tt <= dt {
                    let Some((se, ve)) =
                        vs_level_out(&so, &vo, tt, self.vertical_rate, fl, self.vertical_accel)
                    else {
                        break;
                    };
                    let const_vs = almost_equals(ve.z, rate);
                    if const_vs {
                        *const_t = tt;
                    }
                    if tt >= b && detector.violation(&se, &ve, &si.linear(&vi, tt), &vi) {
                        los.union(fl - step, fl + step);
                        if const_vs {
                            *go = false;
                        }
                    }
                    tt += TRANSITION_STEP;
                }
            }
        };

        let (mut go_up, mut const_up) = (true, 0.0);
        for &fl in levels.iter().filter(|fl| **fl >= so.z) {
            scan(fl, self.vertical_rate, &mut go_up, &mut const_up, &mut los);
        }
        let (mut go_down, mut const_down) = (true, 0.0);
        for &fl in levels.iter().rev().filter(|fl| **fl < so.z) {
            scan(fl, -self.vertical_rate, &mut go_down, &mut const_down, &mut los);
        }
        los
    }
}

impl DimensionBands for AltitudeBands {
    fn state(&self) -> &BandsState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BandsState {
        &mut self.state
    }

    fn name(&self) -> &'static str {
        "altitude"
    }

    fn current_value(&self, ownship: &OwnshipState) -> f64 {
        ownship.position().alt()
    }

    fn none_bands(&self, _q: &BandsQuery<'_>) -> IntervalSet {
        IntervalSet::new()
    }

    fn any_red(&self, _q: &BandsQuery<'_>) -> bool {
        true
    }

    fn all_red(&self, _q: &BandsQuery<'_>) -> bool {
        false
    }

    fn compute(&self, core: &BandsCore) -> BandsOutput {
        let Some(ownship) = core.ownship.as_ref() else {
            return BandsOutput::default();
        };
        let redset = if core.traffic.is_empty() {
            IntervalSet::new()
        } else {
            self.red_bands(
                &core.detector,
                0.0,
                core.actual_alerting_time(),
                ownship,
                &core.traffic,
            )
        };
        let out = self
            .state
            .color_bands(&redset, false, core.implicit_bands, false);
        tracing::debug!(dimension = self.name(), bands = out.len(), "bands computed");
        out
    }
}
