//! Ground speed bands: constant horizontal acceleration along the current
//! track.

use super::integer::{IntegerSearch, TrajectoryModel};
use super::{epsilon_h, BandsQuery, BandsState, DimensionBands};
use crate::geometry::{Vect3, Velocity};
use crate::intervals::{to_interval_set, IntervalSet};
use crate::kinematics::gs_accel;
use crate::state::OwnshipState;

#[derive(Debug, Clone, PartialEq)]
pub struct GroundSpeedBands {
    state: BandsState,
    horizontal_accel: f64,
}

impl GroundSpeedBands {
    pub fn new(min: f64, max: f64, step: f64, do_recovery: bool, horizontal_accel: f64) -> Self {
        Self {
            state: BandsState::new(min, max, step, do_recovery),
            horizontal_accel,
        }
    }

    pub fn horizontal_accel(&self) -> f64 {
        self.horizontal_accel
    }

    pub fn set_horizontal_accel(&mut self, val: f64) {
        if val >= 0.0 && val != self.horizontal_accel {
            self.horizontal_accel = val;
            self.reset();
        }
    }

    /// Search plus the step counts below and above the current speed.
    fn search<'a>(&'a self, q: &BandsQuery<'a>) -> (IntegerSearch<'a, Self>, i32, i32) {
        let gso = q.ownship.v().gs();
        let BandsState { min, max, step, .. } = self.state;
        let maxdown = ((gso - min) / step).ceil().max(0.0) as i32 + 1;
        let maxup = ((max - gso) / step).ceil().max(0.0) as i32 + 1;
        let epsh = q.repac.map_or(0, |ac| epsilon_h(q.ownship, ac));
        let search = IntegerSearch::new(self, q, step / self.horizontal_accel, epsh, 0);
        (search, maxdown, maxup)
    }
}

impl TrajectoryModel for GroundSpeedBands {
    fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity) {
        let a = if dir {
            self.horizontal_accel
        } else {
            -self.horizontal_accel
        };
        gs_accel(&ownship.s(), &ownship.v(), t, a)
    }
}

impl DimensionBands for GroundSpeedBands {
    fn state(&self) -> &BandsState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BandsState {
        &mut self.state
    }

    fn name(&self) -> &'static str {
        "ground_speed"
    }

    fn current_value(&self, ownship: &OwnshipState) -> f64 {
        ownship.v().gs()
    }

    fn none_bands(&self, q: &BandsQuery<'_>) -> IntervalSet {
        let (search, maxdown, maxup) = self.search(q);
        let runs = search.kinematic_bands_combine(maxdown, maxup);
        to_interval_set(
            &runs,
            self.state.step,
            q.ownship.v().gs(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::Detector;
    use crate::state::{Position, TrafficState};
    use crate::units::from_knots;

    fn ownship(gs: f64) -> OwnshipState {
        OwnshipState::new(TrafficState::new(
            "own",
            Position::xyz(0.0, 0.0, 1000.0),
            Vect3::from_trk_gs_vs(0.0, gs, 0.0),
        ))
    }

    fn bands() -> GroundSpeedBands {
        GroundSpeedBands::new(0.0, from_knots(700.0), from_knots(1.0), false, 2.0)
    }

    #[test]
    fn test_no_traffic_covers_range() {
        let own = ownship(100.0);
        let det = Detector::default();
        let q = BandsQuery::new(&det, 0.0, 180.0, &own, &[]);
        let set = bands().none_bands(&q);
        assert_eq!(set.len(), 1);
        let iv = set.get(0).unwrap();
        assert_eq!(iv.low, 0.0);
        assert_eq!(iv.up, from_knots(700.0));
    }

    #[test]
    fn test_overtaking_slower_traffic() {
        // Same track, traffic 3 km ahead flying 60 m/s slower.
        let own = ownship(100.0);
        let det = Detector::default();
        let traffic = vec![TrafficState::new(
            "slow",
            Position::xyz(0.0, 3000.0, 1000.0),
            Vect3::from_trk_gs_vs(0.0, 40.0, 0.0),
        )];
        let q = BandsQuery::new(&det, 0.0, 180.0, &own, &traffic);
        let b = bands();
        let set = b.none_bands(&q);
        assert!(!set.in_set(100.0));
        assert!(set.in_set(from_knots(10.0)));
        assert!(!set.in_set(from_knots(600.0)));
    }

    #[test]
    fn test_decelerating_stops_at_zero() {
        let own = ownship(10.0);
        let (s, v) = bands().trajectory(&own, 10.0, false);
        assert_eq!(v.gs(), 0.0);
        assert!((s.y - 25.0).abs() < 1e-9);
    }
}
