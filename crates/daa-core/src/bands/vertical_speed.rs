//! Vertical speed bands: constant vertical acceleration with the horizontal
//! velocity held.

use super::integer::{IntegerSearch, TrajectoryModel};
use super::{epsilon_v, BandsQuery, BandsState, DimensionBands};
use crate::geometry::{Vect3, Velocity};
use crate::intervals::{to_interval_set, IntervalSet};
use crate::kinematics::vs_accel;
use crate::state::OwnshipState;

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalSpeedBands {
    state: BandsState,
    vertical_accel: f64,
}

impl VerticalSpeedBands {
    pub fn new(min: f64, max: f64, step: f64, do_recovery: bool, vertical_accel: f64) -> Self {
        Self {
            state: BandsState::new(min, max, step, do_recovery),
            vertical_accel,
        }
    }

    pub fn vertical_accel(&self) -> f64 {
        self.vertical_accel
    }

    pub fn set_vertical_accel(&mut self, val: f64) {
        if val >= 0.0 && val != self.vertical_accel {
            self.vertical_accel = val;
            self.reset();
        }
    }

    fn search<'a>(&'a self, q: &BandsQuery<'a>) -> (IntegerSearch<'a, Self>, i32, i32) {
        let vso = q.ownship.v().vs();
        let BandsState { min, max, step, .. } = self.state;
        let maxdown = ((vso - min) / step).ceil().max(0.0) as i32 + 1;
        let maxup = ((max - vso) / step).ceil().max(0.0) as i32 + 1;
        let epsv = q.repac.map_or(0, |ac| epsilon_v(q.ownship, ac));
        let search = IntegerSearch::new(self, q, step / self.vertical_accel, 0, epsv);
        (search, maxdown, maxup)
    }
}

impl TrajectoryModel for VerticalSpeedBands {
    fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity) {
        let a = if dir {
            self.vertical_accel
        } else {
            -self.vertical_accel
        };
        vs_accel(&ownship.s(), &ownship.v(), t, a)
    }
}

impl DimensionBands for VerticalSpeedBands {
    fn state(&self) -> &BandsState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BandsState {
        &mut self.state
    }

    fn name(&self) -> &'static str {
        "vertical_speed"
    }

    fn current_value(&self, ownship: &OwnshipState) -> f64 {
        ownship.v().vs()
    }

    fn none_bands(&self, q: &BandsQuery<'_>) -> IntervalSet {
        let (search, maxdown, maxup) = self.search(q);
        let runs = search.kinematic_bands_combine(maxdown, maxup);
        to_interval_set(
            &runs,
            self.state.step,
            q.ownship.v().vs(),
            self.state.min,
            self.state.max,
        )
    }

    fn any_red(&self, q: &BandsQuery<'_>) -> bool {
        let (search, maxdown, maxup) = self.search(q);
        search.any_int_red(maxdown, maxup, 0)
    }

    fn all_red(&self, q: &BandsQuery<'_>) -> bool {
        let (search, maxdown, maxup) = self.search(q);
        search.all_int_red(maxdown, maxup, 0)
    }
}
