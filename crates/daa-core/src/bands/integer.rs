//! Discretized kinematic trajectory search.
//!
//! Ownship follows a constant-rate maneuver in one of two directions
//! (`dir = false` decreases the dimension value, `true` increases it). Step
//! `k` means maneuvering for `k * tstep` seconds and then holding. The search
//! returns runs of conflict-free steps, signed by direction.

use super::BandsQuery;
use crate::criteria::{horizontal_new_repulsive_criterion, vertical_new_repulsive_criterion};
use crate::detector::Detector;
use crate::geometry::{Vect3, Velocity};
use crate::intervals::{append_intband, neg, Integerval};
use crate::state::{OwnshipState, TrafficState};

/// Ownship trajectory for a dimension's maneuver.
pub trait TrajectoryModel {
    /// Ownship position and velocity, in the ownship frame, `t` seconds into
    /// the maneuver in direction `dir`.
    fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity);
}

/// One configured search: the query plus the dimension's time step and the
/// repulsiveness senses (0 disables a criterion).
pub struct IntegerSearch<'a, M: TrajectoryModel + ?Sized> {
    model: &'a M,
    conflict_det: &'a Detector,
    recovery_det: Option<&'a Detector>,
    tstep: f64,
    b: f64,
    t: f64,
    b2: f64,
    t2: f64,
    ownship: &'a OwnshipState,
    traffic: &'a [TrafficState],
    repac: Option<&'a TrafficState>,
    epsh: i32,
    epsv: i32,
    /// No maneuver authority: only the current value is evaluated.
    frozen: bool,
}

impl<'a, M: TrajectoryModel + ?Sized> IntegerSearch<'a, M> {
    /// The recovery detector, if any, is checked over `[0, q.b]`.
    pub fn new(model: &'a M, q: &BandsQuery<'a>, tstep: f64, epsh: i32, epsv: i32) -> Self {
        let frozen = !(tstep.is_finite() && tstep > 0.0);
        Self {
            model,
            conflict_det: q.detector,
            recovery_det: q.recovery,
            tstep: if frozen { 1.0 } else { tstep },
            b: q.b,
            t: q.t,
            b2: 0.0,
            t2: q.b,
            ownship: q.ownship,
            traffic: q.traffic,
            repac: q.repac,
            epsh,
            epsv,
            frozen,
        }
    }

    fn cap(&self, max: i32) -> i32 {
        if self.frozen {
            0
        } else {
            max
        }
    }

    fn time_of(&self, k: i32) -> f64 {
        f64::from(k) * self.tstep
    }

    fn trajectory(&self, t: f64, dir: bool) -> (Vect3, Velocity) {
        self.model.trajectory(self.ownship, t, dir)
    }

    fn hcrit(&self) -> Option<&'a TrafficState> {
        self.repac.filter(|_| self.epsh != 0)
    }

    fn vcrit(&self) -> Option<&'a TrafficState> {
        self.repac.filter(|_| self.epsv != 0)
    }

    /// Combined runs: left runs mirrored to negative steps, then right runs.
    pub fn kinematic_bands_combine(&self, maxl: i32, maxr: i32) -> Vec<Integerval> {
        let mut l = self.kinematic_bands(false, self.cap(maxl));
        let r = self.kinematic_bands(true, self.cap(maxr));
        neg(&mut l);
        append_intband(&mut l, r);
        l
    }

    /// True if no step is green on the requested side(s): `dir < 0` left only,
    /// `dir > 0` right only, `0` both.
    pub fn all_int_red(&self, maxl: i32, maxr: i32, dir: i32) -> bool {
        let left = dir > 0 || self.first_green(false, self.cap(maxl)).is_none();
        let right = dir < 0 || self.first_green(true, self.cap(maxr)).is_none();
        left && right
    }

    /// True if some step is red on the requested side(s).
    pub fn any_int_red(&self, maxl: i32, maxr: i32, dir: i32) -> bool {
        let left = dir <= 0 && self.red_band_exist(false, self.cap(maxl));
        let right = dir >= 0 && self.red_band_exist(true, self.cap(maxr));
        left || right
    }

    fn kinematic_bands(&self, dir: bool, max: i32) -> Vec<Integerval> {
        let bsi = self.bands_search_index(dir, max);
        if bsi != 0 {
            self.traj_conflict_only_bands(dir, bsi - 1)
        } else {
            Vec::new()
        }
    }

    fn first_los_step(&self, det: &Detector, dir: bool, min: i32, max: i32) -> Option<i32> {
        (min..=max).find(|&k| self.any_los_aircraft(det, dir, self.time_of(k)))
    }

    /// First step at which ownship is already in loss of separation.
    fn first_los_search_index(&self, dir: bool, max: i32) -> i32 {
        let first_k = (self.b / self.tstep).ceil() as i32;
        let last_k = ((self.t / self.tstep).floor() as i32).min(max);
        let first_k2 = (self.b2 / self.tstep).ceil() as i32;
        let last_k2 = ((self.t2 / self.tstep).floor() as i32).min(max);
        let los_init = self
            .recovery_det
            .and_then(|det| self.first_los_step(det, dir, first_k2, last_k2));
        let los = self.first_los_step(self.conflict_det, dir, first_k, last_k);
        los_init.unwrap_or(max + 1).min(los.unwrap_or(max + 1))
    }

    /// Steps beyond the returned index are never green in direction `dir`.
    fn bands_search_index(&self, dir: bool, max: i32) -> i32 {
        let first_los = self.first_los_search_index(dir, max);
        let first_prob_h = match self.hcrit() {
            Some(repac) if first_los != 0 => self
                .first_nonrepulsive_step(dir, first_los - 1, repac)
                .unwrap_or(max + 1),
            _ => first_los,
        };
        let first_prob_hl = first_los.min(first_prob_h);
        let first_prob_v = match self.vcrit() {
            Some(repac) if first_prob_hl != 0 => self
                .first_nonvert_repul_step(dir, first_prob_hl - 1, repac)
                .unwrap_or(max + 1),
            _ => first_prob_hl,
        };
        first_prob_hl.min(first_prob_v)
    }

    fn any_conflict(&self, dir: bool, tsk: f64) -> bool {
        self.any_conflict_aircraft(self.conflict_det, self.b, self.t, dir, tsk)
            || self
                .recovery_det
                .is_some_and(|det| self.any_conflict_aircraft(det, self.b2, self.t2, dir, tsk))
    }

    /// Maximal runs of conflict-free steps in `[0, max]`.
    fn traj_conflict_only_bands(&self, dir: bool, max: i32) -> Vec<Integerval> {
        let mut runs = Vec::new();
        let mut first: Option<i32> = None;
        for k in 0..=max {
            let conflict = self.any_conflict(dir, self.time_of(k));
            match (first, conflict) {
                (Some(f), true) => {
                    runs.push(Integerval::new(f, k - 1));
                    first = None;
                }
                (None, false) => first = Some(k),
                _ => {}
            }
        }
        if let Some(f) = first {
            runs.push(Integerval::new(f, max));
        }
        runs
    }

    fn any_los_aircraft(&self, det: &Detector, dir: bool, tsk: f64) -> bool {
        let (sot, vot) = self.trajectory(tsk, dir);
        self.traffic.iter().any(|ac| {
            let si = self.ownship.traffic_s(ac);
            let vi = self.ownship.traffic_v(ac);
            det.violation(&sot, &vot, &si.linear(&vi, tsk), &vi)
        })
    }

    /// First conflict-free step, stopping at loss of separation or at the
    /// first step that breaks a repulsiveness criterion.
    fn first_green(&self, dir: bool, max: i32) -> Option<i32> {
        for k in 0..=max {
            let tsk = self.time_of(k);
            let los = tsk >= self.b && tsk <= self.t && self.any_los_aircraft(self.conflict_det, dir, tsk);
            let los_init = self.recovery_det.is_some_and(|det| {
                tsk >= self.b2 && tsk <= self.t2 && self.any_los_aircraft(det, dir, tsk)
            });
            let nonrep_h = self
                .hcrit()
                .is_some_and(|repac| !self.repulsive_at(dir, k, repac));
            let nonrep_v = self
                .vcrit()
                .is_some_and(|repac| !self.vert_repul_at(dir, k, repac));
            if los || los_init || nonrep_h || nonrep_v {
                return None;
            }
            if !self.any_conflict(dir, tsk) {
                return Some(k);
            }
        }
        None
    }

    /// Average ownship velocity over step `k`.
    fn linvel(&self, dir: bool, k: i32) -> Vect3 {
        let (s1, _) = self.trajectory(self.time_of(k + 1), dir);
        let (s0, _) = self.trajectory(self.time_of(k), dir);
        (s1 - s0) * (1.0 / self.tstep)
    }

    fn repulsive_at(&self, dir: bool, k: i32, repac: &TrafficState) -> bool {
        if k == 0 {
            return true;
        }
        let (so, vo) = self.trajectory(0.0, dir);
        let si = self.ownship.traffic_s(repac);
        let vi = self.ownship.traffic_v(repac);
        if k == 1
            && !horizontal_new_repulsive_criterion(
                &(so - si).vect2(),
                &vo.vect2(),
                &vi.vect2(),
                &self.linvel(dir, 0).vect2(),
                self.epsh,
            )
        {
            return false;
        }
        let tk = self.time_of(k);
        let (sot, vot) = self.trajectory(tk, dir);
        let st = (sot - si.linear(&vi, tk)).vect2();
        let vop = self.linvel(dir, k - 1).vect2();
        let vok = self.linvel(dir, k).vect2();
        let (vot, vi) = (vot.vect2(), vi.vect2());
        horizontal_new_repulsive_criterion(&st, &vop, &vi, &vot, self.epsh)
            && horizontal_new_repulsive_criterion(&st, &vot, &vi, &vok, self.epsh)
            && horizontal_new_repulsive_criterion(&st, &vop, &vi, &vok, self.epsh)
    }

    fn first_nonrepulsive_step(&self, dir: bool, max: i32, repac: &TrafficState) -> Option<i32> {
        (0..=max).find(|&k| !self.repulsive_at(dir, k, repac))
    }

    fn vert_repul_at(&self, dir: bool, k: i32, repac: &TrafficState) -> bool {
        if k == 0 {
            return true;
        }
        let (so, vo) = self.trajectory(0.0, dir);
        let si = self.ownship.traffic_s(repac);
        let vi = self.ownship.traffic_v(repac);
        if k == 1
            && !vertical_new_repulsive_criterion(&(so - si), &vo, &vi, &self.linvel(dir, 0), self.epsv)
        {
            return false;
        }
        let tk = self.time_of(k);
        let (sot, vot) = self.trajectory(tk, dir);
        let st = sot - si.linear(&vi, tk);
        let vop = self.linvel(dir, k - 1);
        let vok = self.linvel(dir, k);
        vertical_new_repulsive_criterion(&st, &vop, &vi, &vot, self.epsv)
            && vertical_new_repulsive_criterion(&st, &vot, &vi, &vok, self.epsv)
            && vertical_new_repulsive_criterion(&st, &vop, &vi, &vok, self.epsv)
    }

    fn first_nonvert_repul_step(&self, dir: bool, max: i32, repac: &TrafficState) -> Option<i32> {
        (0..=max).find(|&k| !self.vert_repul_at(dir, k, repac))
    }

    /// Conflict with `ac` within `[b, t]` after maneuvering for `tsk` seconds.
    fn cd_future_traj(&self, det: &Detector, b: f64, t: f64, dir: bool, tsk: f64, ac: &TrafficState) -> bool {
        if tsk > t || b > t {
            return false;
        }
        let (sot, vot) = self.trajectory(tsk, dir);
        let si = self.ownship.traffic_s(ac);
        let vi = self.ownship.traffic_v(ac);
        let sit = si.linear(&vi, tsk);
        det.conflict(&sot, &vot, &sit, &vi, (b - tsk).max(0.0), t - tsk)
    }

    fn any_conflict_aircraft(&self, det: &Detector, b: f64, t: f64, dir: bool, tsk: f64) -> bool {
        self.traffic
            .iter()
            .any(|ac| self.cd_future_traj(det, b, t, dir, tsk, ac))
    }

    fn any_conflict_step(&self, det: &Detector, b: f64, t: f64, dir: bool, max: i32) -> bool {
        (0..=max).any(|k| self.any_conflict_aircraft(det, b, t, dir, self.time_of(k)))
    }

    fn red_band_exist(&self, dir: bool, max: i32) -> bool {
        self.hcrit()
            .is_some_and(|repac| self.first_nonrepulsive_step(dir, max, repac).is_some())
            || self
                .vcrit()
                .is_some_and(|repac| self.first_nonvert_repul_step(dir, max, repac).is_some())
            || self.any_conflict_step(self.conflict_det, self.b, self.t, dir, max)
            || self
                .recovery_det
                .is_some_and(|det| self.any_conflict_step(det, self.b2, self.t2, dir, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{CdCylinder, Detector};
    use crate::state::Position;

    /// Ownship slides sideways at 10 m/s per unit time in the chosen direction.
    struct Slide;

    impl TrajectoryModel for Slide {
        fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity) {
            let sign = if dir { 1.0 } else { -1.0 };
            let s = ownship.s();
            (Vect3::new(s.x + sign * 10.0 * t, s.y, s.z), ownship.v())
        }
    }

    fn ownship() -> OwnshipState {
        OwnshipState::new(TrafficState::new(
            "own",
            Position::xyz(0.0, 0.0, 1000.0),
            Vect3::ZERO,
        ))
    }

    fn parked(id: &str, x: f64) -> TrafficState {
        TrafficState::new(id, Position::xyz(x, 0.0, 1000.0), Vect3::ZERO)
    }

    #[test]
    fn test_no_traffic_is_all_green() {
        let own = ownship();
        let det = Detector::from(CdCylinder::new(25.0, 100.0));
        let q = BandsQuery::new(&det, 0.0, 10.0, &own, &[]);
        let search = IntegerSearch::new(&Slide, &q, 1.0, 0, 0);
        assert_eq!(search.kinematic_bands_combine(5, 5), vec![Integerval::new(-5, 5)]);
        assert!(!search.any_int_red(5, 5, 0));
        assert!(!search.all_int_red(5, 5, 0));
    }

    #[test]
    fn test_obstacle_on_the_right_cuts_runs() {
        let own = ownship();
        let det = Detector::from(CdCylinder::new(25.0, 100.0));
        // Parked 60 m east: steps whose end position is within 25 m are red.
        let traffic = vec![parked("ac", 60.0)];
        let q = BandsQuery::new(&det, 0.0, 10.0, &own, &traffic);
        let search = IntegerSearch::new(&Slide, &q, 1.0, 0, 0);
        let runs = search.kinematic_bands_combine(5, 8);
        // Holding at x = 10k is red for k = 4..=8; step 3 stops 30 m short.
        assert_eq!(runs, vec![Integerval::new(-5, 3)]);
        assert!(search.any_int_red(5, 8, 1));
        assert!(!search.any_int_red(5, 8, -1));
        assert!(!search.all_int_red(5, 8, 0));
    }

    #[test]
    fn test_loss_of_separation_blocks_direction() {
        let own = ownship();
        let det = Detector::from(CdCylinder::new(25.0, 100.0));
        // Already inside the cylinder: every step is red.
        let traffic = vec![parked("ac", 5.0)];
        let q = BandsQuery::new(&det, 0.0, 10.0, &own, &traffic);
        let search = IntegerSearch::new(&Slide, &q, 1.0, 0, 0);
        assert!(search.kinematic_bands_combine(3, 3).is_empty());
        assert!(search.all_int_red(3, 3, 0));
    }

    #[test]
    fn test_frozen_search_only_checks_current_value() {
        let own = ownship();
        let det = Detector::from(CdCylinder::new(25.0, 100.0));
        let q = BandsQuery::new(&det, 0.0, 10.0, &own, &[]);
        let search = IntegerSearch::new(&Slide, &q, f64::INFINITY, 0, 0);
        assert_eq!(search.kinematic_bands_combine(5, 5), vec![Integerval::new(0, 0)]);
    }
}
