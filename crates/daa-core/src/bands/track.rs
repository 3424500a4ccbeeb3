//! Track bands: constant bank or constant rate turns to either side.

use super::integer::{IntegerSearch, TrajectoryModel};
use super::{epsilon_h, BandsQuery, BandsState, DimensionBands};
use crate::core::BandsCore;
use crate::geometry::{Vect3, Velocity};
use crate::intervals::{to_interval_set_0_2pi, IntervalSet};
use crate::kinematics::{turn, turn_rate};
use crate::numeric::{to_2pi, to_pi};
use crate::state::OwnshipState;
use crate::units::from_knots;
use std::f64::consts::PI;

/// Track bands over `[0, 2*pi]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackBands {
    state: BandsState,
    /// Turn rate in rad/s; 0 means use the bank angle.
    turn_rate: f64,
    /// Bank angle in rad, used when the turn rate is 0.
    bank_angle: f64,
}

impl TrackBands {
    pub fn new(step: f64, do_recovery: bool, turn_rate: f64, bank_angle: f64) -> Self {
        Self {
            state: BandsState::new(0.0, 2.0 * PI, step, do_recovery),
            turn_rate,
            bank_angle,
        }
    }

    pub fn turn_rate(&self) -> f64 {
        self.turn_rate
    }

    pub fn bank_angle(&self) -> f64 {
        self.bank_angle
    }

    pub fn set_turn_rate(&mut self, val: f64) {
        if val >= 0.0 && val != self.turn_rate {
            self.turn_rate = val;
            self.reset();
        }
    }

    pub fn set_bank_angle(&mut self, val: f64) {
        if val >= 0.0 && val != self.bank_angle {
            self.bank_angle = val;
            self.reset();
        }
    }

    /// Turn rate flown at ground speed `gso`. Near-zero speeds fall back to
    /// the bank angle.
    fn omega(&self, gso: f64) -> f64 {
        if self.turn_rate == 0.0 || gso <= from_knots(1.0) {
            turn_rate(gso, self.bank_angle)
        } else {
            self.turn_rate
        }
    }

    fn search<'a>(&'a self, q: &BandsQuery<'a>) -> (IntegerSearch<'a, Self>, i32) {
        let omega = self.omega(q.ownship.v().gs());
        let maxn = ((PI / self.state.step).round() as i32).max(1);
        let tstep = self.state.step / omega;
        let epsh = q.repac.map_or(0, |ac| epsilon_h(q.ownship, ac));
        (IntegerSearch::new(self, q, tstep, epsh, 0), maxn)
    }
}

impl TrajectoryModel for TrackBands {
    fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity) {
        let v = ownship.v();
        let omega = self.omega(v.gs());
        turn(&ownship.s(), &v, t, if dir { omega } else { -omega })
    }
}

impl DimensionBands for TrackBands {
    fn state(&self) -> &BandsState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BandsState {
        &mut self.state
    }

    fn name(&self) -> &'static str {
        "track"
    }

    fn current_value(&self, ownship: &OwnshipState) -> f64 {
        ownship.v().trk()
    }

    fn none_bands(&self, q: &BandsQuery<'_>) -> IntervalSet {
        let (search, maxn) = self.search(q);
        let runs = search.kinematic_bands_combine(maxn, maxn);
        to_interval_set_0_2pi(&runs, PI / f64::from(maxn), q.ownship.v().trk())
    }

    fn any_red(&self, q: &BandsQuery<'_>) -> bool {
        let (search, maxn) = self.search(q);
        search.any_int_red(maxn, maxn, 0)
    }

    fn all_red(&self, q: &BandsQuery<'_>) -> bool {
        let (search, maxn) = self.search(q);
        search.all_int_red(maxn, maxn, 0)
    }

    /// Track values wrap, so proximity is measured on the circle and values
    /// inside a NEAR band do not count.
    fn almost_near(&mut self, core: &BandsCore, val: f64, thr: f64) -> bool {
        let val = to_2pi(val);
        let Some(out) = self.output(core) else {
            return false;
        };
        out.iter().any(|(iv, region)| {
            *region == super::BandsRegion::Near
                && !iv.in_oo(val)
                && ((to_pi(iv.low - val)).abs() < thr || (to_pi(iv.up - val)).abs() < thr)
        })
    }
}
