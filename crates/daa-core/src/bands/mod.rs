//! Kinematic maneuver bands.
//!
//! Every dimension (track, ground speed, vertical speed, altitude) implements
//! [`DimensionBands`]: the dimension supplies its none-bands search and the
//! trait provides the shared lazy computation, band coloring, recovery search
//! and query surface. Results are cached in [`BandsState`] until a mutator
//! marks them stale.

pub mod altitude;
pub mod ground_speed;
pub mod integer;
pub mod track;
pub mod vertical_speed;

pub use altitude::AltitudeBands;
pub use ground_speed::GroundSpeedBands;
pub use integer::{IntegerSearch, TrajectoryModel};
pub use track::TrackBands;
pub use vertical_speed::VerticalSpeedBands;

use crate::core::BandsCore;
use crate::detector::{CdCylinder, Detector, NMAC_D, NMAC_H};
use crate::geometry::Velocity;
use crate::intervals::{Interval, IntervalSet};
use crate::numeric::{almost_less, PRECISION_DEFAULT};
use crate::state::{OwnshipState, TrafficState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on recovery bisection steps; the bracket halves every step.
const MAX_BISECTION_STEPS: usize = 64;
/// Shrink factor applied to the recovery volume between attempts.
const RECOVERY_SHRINK: f64 = 0.8;

/// Classification of a band interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BandsRegion {
    /// Conflict free.
    None,
    /// Flying this value leads to a conflict.
    Near,
    /// Currently in violation; this range restores separation by the
    /// recovery time.
    Recovery,
    Unknown,
}

impl fmt::Display for BandsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BandsRegion::None => "NONE",
            BandsRegion::Near => "NEAR",
            BandsRegion::Recovery => "RECOVERY",
            BandsRegion::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Colored bands of one dimension plus its recovery time.
///
/// `recovery_time` is 0 when no recovery is needed, positive when recovery
/// bands were found, and -1 when every maneuver stays in conflict.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BandsOutput {
    pub intervals: Vec<Interval>,
    pub regions: Vec<BandsRegion>,
    pub recovery_time: f64,
}

impl BandsOutput {
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Interval, &BandsRegion)> {
        self.intervals.iter().zip(self.regions.iter())
    }

    fn push(&mut self, low: f64, up: f64, region: BandsRegion) {
        self.intervals.push(Interval::new(low, up));
        self.regions.push(region);
    }
}

impl fmt::Display for BandsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (iv, region) in self.iter() {
            writeln!(f, "{} {}", iv, region)?;
        }
        write!(f, "Recovery time: {:.4} [s]", self.recovery_time)
    }
}

/// Lazy result of a band computation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BandsCache {
    #[default]
    Stale,
    Fresh(BandsOutput),
}

/// Range, step and cache shared by every dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct BandsState {
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) step: f64,
    pub(crate) do_recovery: bool,
    pub(crate) cache: BandsCache,
}

impl BandsState {
    pub fn new(min: f64, max: f64, step: f64, do_recovery: bool) -> Self {
        Self {
            min,
            max,
            step,
            do_recovery,
            cache: BandsCache::Stale,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_enabled_recovery(&self) -> bool {
        self.do_recovery
    }

    pub fn set_min(&mut self, val: f64) {
        if val != self.min {
            self.min = val;
            self.reset();
        }
    }

    pub fn set_max(&mut self, val: f64) {
        if val != self.max {
            self.max = val;
            self.reset();
        }
    }

    /// Non-positive steps are ignored.
    pub fn set_step(&mut self, val: f64) {
        if val > 0.0 && val != self.step {
            self.step = val;
            self.reset();
        }
    }

    pub fn set_recovery(&mut self, flag: bool) {
        if flag != self.do_recovery {
            self.do_recovery = flag;
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.cache = BandsCache::Stale;
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self.cache, BandsCache::Fresh(_))
    }

    /// Turn a set of conflict-free (`greenbands`) or conflict values into a
    /// partition of `[min, max]`. With `nearonly`, only the conflict side is
    /// reported.
    pub fn color_bands(
        &self,
        bands: &IntervalSet,
        greenbands: bool,
        nearonly: bool,
        recovery: bool,
    ) -> BandsOutput {
        let mut out = BandsOutput::default();
        let add_band = greenbands || !nearonly;
        let gap_region = if greenbands {
            BandsRegion::Near
        } else if recovery {
            BandsRegion::Recovery
        } else {
            BandsRegion::None
        };
        let band_region = if !greenbands {
            BandsRegion::Near
        } else if recovery {
            BandsRegion::Recovery
        } else {
            BandsRegion::None
        };
        if bands.is_empty() {
            if add_band {
                out.push(self.min, self.max, gap_region);
            }
            return out;
        }
        let mut l = self.min;
        for ii in bands.iter() {
            if almost_less(l, ii.low, PRECISION_DEFAULT) && add_band {
                out.push(l, ii.low, gap_region);
            }
            let u = if almost_less(ii.up, self.max, PRECISION_DEFAULT) {
                ii.up
            } else {
                self.max
            };
            if !greenbands || !nearonly {
                out.push(ii.low.max(l), u, band_region);
            }
            l = u;
        }
        if almost_less(l, self.max, PRECISION_DEFAULT) && add_band {
            out.push(l, self.max, gap_region);
        }
        out
    }
}

/// Inputs of one none-bands search: detectors, criteria aircraft, relative
/// time window and the aircraft involved.
#[derive(Debug, Clone, Copy)]
pub struct BandsQuery<'a> {
    pub detector: &'a Detector,
    /// Detector checked over `[0, b]` for recovery bands.
    pub recovery: Option<&'a Detector>,
    /// Most urgent aircraft when repulsiveness criteria apply.
    pub repac: Option<&'a TrafficState>,
    pub b: f64,
    pub t: f64,
    pub ownship: &'a OwnshipState,
    pub traffic: &'a [TrafficState],
}

impl<'a> BandsQuery<'a> {
    pub fn new(
        detector: &'a Detector,
        b: f64,
        t: f64,
        ownship: &'a OwnshipState,
        traffic: &'a [TrafficState],
    ) -> Self {
        Self {
            detector,
            recovery: None,
            repac: None,
            b,
            t,
            ownship,
            traffic,
        }
    }

    pub fn with_recovery(mut self, recovery: Option<&'a Detector>) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_criteria(mut self, repac: Option<&'a TrafficState>) -> Self {
        self.repac = repac;
        self
    }

    pub fn with_window(mut self, b: f64, t: f64) -> Self {
        self.b = b;
        self.t = t;
        self
    }
}

/// One maneuver dimension of the kinematic bands.
pub trait DimensionBands {
    fn state(&self) -> &BandsState;

    fn state_mut(&mut self) -> &mut BandsState;

    /// Human readable dimension name used in logs.
    fn name(&self) -> &'static str;

    /// Ownship's current value in this dimension.
    fn current_value(&self, ownship: &OwnshipState) -> f64;

    /// Conflict-free values for `q.traffic`.
    fn none_bands(&self, q: &BandsQuery<'_>) -> IntervalSet;

    /// True if some reachable value of this dimension is in conflict.
    fn any_red(&self, q: &BandsQuery<'_>) -> bool;

    /// True if every reachable value of this dimension is in conflict.
    fn all_red(&self, q: &BandsQuery<'_>) -> bool;

    fn solid_red(&self, q: &BandsQuery<'_>) -> bool {
        self.none_bands(q).is_empty()
    }

    fn all_green(&self, q: &BandsQuery<'_>) -> bool {
        !self.any_red(q)
    }

    fn any_green(&self, q: &BandsQuery<'_>) -> bool {
        !self.all_red(q)
    }

    fn min(&self) -> f64 {
        self.state().min
    }

    fn max(&self) -> f64 {
        self.state().max
    }

    fn step(&self) -> f64 {
        self.state().step
    }

    fn reset(&mut self) {
        self.state_mut().reset();
    }

    /// True if maneuvering `ac` alone yields conflict values within `[0, t]`.
    fn kinematic_conflict(
        &self,
        core: &BandsCore,
        ownship: &OwnshipState,
        ac: &TrafficState,
        repac: Option<&TrafficState>,
        t: f64,
    ) -> bool {
        let q = BandsQuery::new(&core.detector, 0.0, t, ownship, std::slice::from_ref(ac))
            .with_criteria(repac);
        self.any_red(&q)
    }

    /// Traffic contributing to this dimension's bands, split into preventive
    /// (conflict only if ownship maneuvers) and corrective (conflict on the
    /// current trajectory) aircraft.
    fn alerting_aircraft(&self, core: &BandsCore) -> (Vec<TrafficState>, Vec<TrafficState>) {
        let mut preventive = Vec::new();
        let mut corrective = Vec::new();
        let Some(ownship) = core.ownship.as_ref() else {
            return (preventive, corrective);
        };
        let alerting_time = core.actual_alerting_time();
        for ac in &core.traffic {
            if core.check_conflict(ac, 0.0, alerting_time).conflict() {
                corrective.push(ac.clone());
            } else if self.kinematic_conflict(core, ownship, ac, None, alerting_time) {
                preventive.push(ac.clone());
            }
        }
        (preventive, corrective)
    }

    fn alerting_aircraft_names(&self, core: &BandsCore) -> (Vec<String>, Vec<String>) {
        let (preventive, corrective) = self.alerting_aircraft(core);
        (
            preventive.into_iter().map(|ac| ac.id).collect(),
            corrective.into_iter().map(|ac| ac.id).collect(),
        )
    }

    /// Recompute from `core`, ignoring the cache.
    fn compute(&self, core: &BandsCore) -> BandsOutput {
        let Some(ownship) = core.ownship.as_ref() else {
            return BandsOutput::default();
        };
        let state = self.state();
        let (preventive, corrective) = self.alerting_aircraft(core);
        let mut recovery_time = 0.0;
        let noneset = if preventive.is_empty() && corrective.is_empty() {
            let mut set = IntervalSet::new();
            set.almost_add(state.min, state.max);
            set
        } else {
            let repac = if core.conflict_crit {
                core.criteria_aircraft()
            } else {
                None
            };
            let prev = self.none_bands(
                &BandsQuery::new(
                    &core.detector,
                    0.0,
                    core.actual_alerting_time(),
                    ownship,
                    &preventive,
                )
                .with_criteria(repac),
            );
            let corr = self.none_bands(
                &BandsQuery::new(&core.detector, 0.0, core.lookahead, ownship, &corrective)
                    .with_criteria(repac),
            );
            let noneset = prev.almost_intersect(&corr);
            if noneset.is_empty() {
                recovery_time = -1.0;
                if state.do_recovery {
                    let alerting_set: Vec<TrafficState> =
                        preventive.into_iter().chain(corrective).collect();
                    let (set, time) = self.compute_recovery_bands(core, ownship, &alerting_set);
                    recovery_time = time;
                    set
                } else {
                    noneset
                }
            } else {
                noneset
            }
        };
        let mut out = state.color_bands(&noneset, true, core.implicit_bands, recovery_time > 0.0);
        out.recovery_time = recovery_time;
        tracing::debug!(
            dimension = self.name(),
            bands = out.len(),
            recovery_time,
            "bands computed"
        );
        out
    }

    /// Search for the earliest time at which some maneuver restores
    /// separation, shrinking the recovery volume toward the NMAC cylinder.
    /// Returns the last none set and the recovery time (-1 when none).
    fn compute_recovery_bands(
        &self,
        core: &BandsCore,
        ownship: &OwnshipState,
        alerting_set: &[TrafficState],
    ) -> (IntervalSet, f64) {
        let t = core.actual_max_recovery_time();
        let repac = if core.recovery_crit {
            core.criteria_aircraft()
        } else {
            None
        };
        let nmac = Detector::from(CdCylinder::nmac());
        let base = BandsQuery::new(&nmac, 0.0, t, ownship, alerting_set).with_criteria(repac);
        let mut noneset = self.none_bands(&base);
        let mut recovery_time = -1.0;
        if noneset.is_empty() {
            // Even the NMAC cylinder cannot be avoided.
            return (noneset, recovery_time);
        }
        let mut d = core.actual_min_horizontal_recovery();
        let mut h = core.actual_min_vertical_recovery();
        while d > NMAC_D || h > NMAC_H {
            let cyl = Detector::from(CdCylinder::new(d, h));
            noneset = self.none_bands(&BandsQuery { detector: &cyl, ..base });
            let solidred = noneset.is_empty();
            if solidred && !core.ca_bands {
                return (noneset, recovery_time);
            }
            if !solidred {
                let recovery = BandsQuery::new(&core.detector, 0.0, t, ownship, alerting_set)
                    .with_recovery(Some(&cyl))
                    .with_criteria(repac);
                let mut pivot_red = 0.0;
                let mut pivot_green = t + 1.0;
                let mut pivot = t;
                for _ in 0..MAX_BISECTION_STEPS {
                    if pivot_green - pivot_red <= 1.0 {
                        break;
                    }
                    let red = self.solid_red(&recovery.with_window(pivot, t));
                    tracing::trace!(dimension = self.name(), pivot, red, "recovery bisection");
                    if red {
                        pivot_red = pivot;
                    } else {
                        pivot_green = pivot;
                    }
                    pivot = (pivot_red + pivot_green) / 2.0;
                }
                recovery_time = if pivot_green <= t {
                    t.min(pivot_green + core.recovery_stability_time)
                } else {
                    pivot_red
                };
                noneset = self.none_bands(&recovery.with_window(recovery_time, t));
                let solidred = noneset.is_empty();
                if solidred {
                    recovery_time = -1.0;
                }
                if !solidred || !core.ca_bands {
                    return (noneset, recovery_time);
                }
            }
            d *= RECOVERY_SHRINK;
            h *= RECOVERY_SHRINK;
        }
        (noneset, recovery_time)
    }

    /// Cached bands, computed on first use. `None` without an ownship.
    fn output(&mut self, core: &BandsCore) -> Option<&BandsOutput> {
        core.ownship.as_ref()?;
        if !self.state().is_fresh() {
            let out = self.compute(core);
            self.state_mut().cache = BandsCache::Fresh(out);
        }
        match &self.state().cache {
            BandsCache::Fresh(out) => Some(out),
            BandsCache::Stale => None,
        }
    }

    fn force_compute(&mut self, core: &BandsCore) {
        self.reset();
        self.output(core);
    }

    /// Number of band intervals, -1 without an ownship.
    fn bands_length(&mut self, core: &BandsCore) -> i32 {
        self.output(core).map_or(-1, |out| out.len() as i32)
    }

    /// Interval `i`, empty when out of range.
    fn interval(&mut self, core: &BandsCore, i: usize) -> Interval {
        self.output(core)
            .and_then(|out| out.intervals.get(i).copied())
            .unwrap_or(Interval::EMPTY)
    }

    /// Region of interval `i`, unknown when out of range.
    fn region(&mut self, core: &BandsCore, i: usize) -> BandsRegion {
        self.output(core)
            .and_then(|out| out.regions.get(i).copied())
            .unwrap_or(BandsRegion::Unknown)
    }

    fn recovery_time(&mut self, core: &BandsCore) -> f64 {
        self.output(core).map_or(0.0, |out| out.recovery_time)
    }

    /// Region containing `val`. Values outside every reported interval are
    /// implicit when implicit bands are enabled.
    fn region_of(&mut self, core: &BandsCore, val: f64) -> BandsRegion {
        let (min, max) = (self.min(), self.max());
        if val < min || val > max {
            return BandsRegion::Unknown;
        }
        let implicit = core.implicit_bands;
        let Some(out) = self.output(core) else {
            return BandsRegion::Unknown;
        };
        if let Some((_, region)) = out.iter().find(|(iv, _)| iv.in_cc(val)) {
            return *region;
        }
        if !implicit {
            BandsRegion::Unknown
        } else if out.recovery_time > 0.0 {
            BandsRegion::Recovery
        } else {
            BandsRegion::None
        }
    }

    /// True if `val` lies within `thr` outside the boundary of a NEAR band.
    fn almost_near(&mut self, core: &BandsCore, val: f64, thr: f64) -> bool {
        let (min, max) = (self.min(), self.max());
        if val < min || val > max {
            return false;
        }
        let Some(out) = self.output(core) else {
            return false;
        };
        out.iter().any(|(iv, region)| {
            *region == BandsRegion::Near
                && ((iv.low - thr < val && val <= iv.low) || (iv.up <= val && val < iv.up + thr))
        })
    }
}

/// Horizontal sense of the repulsiveness criteria against `ac`.
pub(crate) fn epsilon_h(ownship: &OwnshipState, ac: &TrafficState) -> i32 {
    let s = ownship.s() - ownship.traffic_s(ac);
    let v: Velocity = ownship.v() - ownship.traffic_v(ac);
    crate::criteria::horizontal_coordination(&s.vect2(), &v.vect2())
}

/// Vertical sense of the repulsiveness criteria against `ac`.
pub(crate) fn epsilon_v(ownship: &OwnshipState, ac: &TrafficState) -> i32 {
    let s = ownship.s() - ownship.traffic_s(ac);
    crate::criteria::vertical_coordination_los(
        &s,
        &ownship.v(),
        &ownship.traffic_v(ac),
        ownship.id(),
        &ac.id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> BandsState {
        BandsState::new(0.0, 100.0, 1.0, false)
    }

    fn set(ivs: &[(f64, f64)]) -> IntervalSet {
        let mut s = IntervalSet::new();
        for &(l, u) in ivs {
            s.almost_add(l, u);
        }
        s
    }

    #[test]
    fn test_color_green_bands_partition_range() {
        let out = state().color_bands(&set(&[(10.0, 20.0), (50.0, 100.0)]), true, false, false);
        let expected = vec![
            (Interval::new(0.0, 10.0), BandsRegion::Near),
            (Interval::new(10.0, 20.0), BandsRegion::None),
            (Interval::new(20.0, 50.0), BandsRegion::Near),
            (Interval::new(50.0, 100.0), BandsRegion::None),
        ];
        let got: Vec<_> = out.iter().map(|(i, r)| (*i, *r)).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_color_empty_green_set_is_all_near() {
        let out = state().color_bands(&IntervalSet::new(), true, false, false);
        assert_eq!(out.intervals, vec![Interval::new(0.0, 100.0)]);
        assert_eq!(out.regions, vec![BandsRegion::Near]);
    }

    #[test]
    fn test_color_recovery_marks_green_as_recovery() {
        let out = state().color_bands(&set(&[(40.0, 60.0)]), true, false, true);
        assert_eq!(
            out.regions,
            vec![BandsRegion::Near, BandsRegion::Recovery, BandsRegion::Near]
        );
    }

    #[test]
    fn test_color_implicit_reports_near_only() {
        let out = state().color_bands(&set(&[(40.0, 60.0)]), true, true, false);
        assert_eq!(
            out.intervals,
            vec![Interval::new(0.0, 40.0), Interval::new(60.0, 100.0)]
        );
        assert!(out.regions.iter().all(|r| *r == BandsRegion::Near));
    }

    #[test]
    fn test_color_red_bands_clip_to_range() {
        // Red sets may extend one step beyond the range.
        let out = state().color_bands(&set(&[(-1.0, 1.0), (49.0, 51.0)]), false, false, false);
        let got: Vec<_> = out.iter().map(|(i, r)| (*i, *r)).collect();
        assert_eq!(
            got,
            vec![
                (Interval::new(0.0, 1.0), BandsRegion::Near),
                (Interval::new(1.0, 49.0), BandsRegion::None),
                (Interval::new(49.0, 51.0), BandsRegion::Near),
                (Interval::new(51.0, 100.0), BandsRegion::None),
            ]
        );
    }

    #[test]
    fn test_setters_mark_stale() {
        let mut s = state();
        s.cache = BandsCache::Fresh(BandsOutput::default());
        s.set_step(-1.0);
        assert!(s.is_fresh());
        s.set_step(2.0);
        assert!(!s.is_fresh());
        assert_eq!(s.step(), 2.0);
    }

    #[test]
    fn test_region_serde_uppercase() {
        assert_eq!(serde_json::to_string(&BandsRegion::Near).unwrap(), "\"NEAR\"");
    }
}
