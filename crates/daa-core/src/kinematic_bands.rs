//! Kinematic bands session: one ownship, its traffic and the four maneuver
//! dimensions computed against them.

use crate::bands::{
    AltitudeBands, BandsCache, BandsOutput, BandsRegion, BandsState, DimensionBands,
    GroundSpeedBands, TrackBands, VerticalSpeedBands,
};
use crate::core::BandsCore;
use crate::detector::Detector;
use crate::error::{
    check_less_than, check_non_negative, check_ordered, check_positive, DaaError, Result,
};
use crate::intervals::Interval;
use crate::numeric::to_2pi;
use crate::params::DaaParameters;
use crate::state::{OwnshipState, TrafficState};
use crate::units::{to_deg, to_fpm, to_ft, to_knots, to_nmi};
use crate::urgency::UrgencyStrategy;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Maneuver dimension selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Track,
    GroundSpeed,
    VerticalSpeed,
    Altitude,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Track,
        Dimension::GroundSpeed,
        Dimension::VerticalSpeed,
        Dimension::Altitude,
    ];

    /// Display unit and conversion from internal units.
    pub fn display_unit(&self) -> (&'static str, fn(f64) -> f64) {
        match self {
            Dimension::Track => ("deg", to_deg),
            Dimension::GroundSpeed => ("knot", to_knots),
            Dimension::VerticalSpeed => ("fpm", to_fpm),
            Dimension::Altitude => ("ft", to_ft),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dimension::Track => "Track",
            Dimension::GroundSpeed => "Ground Speed",
            Dimension::VerticalSpeed => "Vertical Speed",
            Dimension::Altitude => "Altitude",
        };
        write!(f, "{}", s)
    }
}

/// Log a rejected setting and hand the error back.
fn checked(res: Result<f64>) -> Result<f64> {
    res.inspect_err(|e| tracing::warn!(error = %e, "setting rejected, keeping previous value"))
}

/// Bands session. Results are computed lazily per dimension and cached
/// until the next mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBands {
    core: BandsCore,
    trk: TrackBands,
    gs: GroundSpeedBands,
    vs: VerticalSpeedBands,
    alt: AltitudeBands,
}

impl Default for KinematicBands {
    fn default() -> Self {
        Self::new(Detector::default())
    }
}

impl KinematicBands {
    /// Session with default parameters and recovery bands disabled.
    pub fn new(detector: Detector) -> Self {
        let p = DaaParameters::default();
        Self {
            core: BandsCore::new(detector),
            trk: TrackBands::new(p.trk_step, false, p.turn_rate, p.bank_angle),
            gs: GroundSpeedBands::new(p.min_gs, p.max_gs, p.gs_step, false, p.horizontal_accel),
            vs: VerticalSpeedBands::new(p.min_vs, p.max_vs, p.vs_step, false, p.vertical_accel),
            alt: AltitudeBands::new(
                p.min_alt,
                p.max_alt,
                p.alt_step,
                p.vertical_rate,
                p.vertical_accel,
            ),
        }
    }

    pub fn with_parameters(detector: Detector, params: &DaaParameters) -> Result<Self> {
        let mut bands = Self::new(detector);
        bands.set_parameters(params)?;
        Ok(bands)
    }

    pub fn core(&self) -> &BandsCore {
        &self.core
    }

    /// Copy every bands setting of `params`. Aircraft and detector are kept.
    /// Invalid parameters are rejected as a whole.
    pub fn set_parameters(&mut self, p: &DaaParameters) -> Result<()> {
        p.validate()
            .inspect_err(|e| tracing::warn!(error = %e, "parameters rejected"))?;
        self.core.apply(p);
        self.gs.state_mut().set_min(p.min_gs);
        self.gs.state_mut().set_max(p.max_gs);
        self.vs.state_mut().set_min(p.min_vs);
        self.vs.state_mut().set_max(p.max_vs);
        self.alt.state_mut().set_min(p.min_alt);
        self.alt.state_mut().set_max(p.max_alt);
        self.trk.state_mut().set_step(p.trk_step);
        self.gs.state_mut().set_step(p.gs_step);
        self.vs.state_mut().set_step(p.vs_step);
        self.alt.state_mut().set_step(p.alt_step);
        self.gs.set_horizontal_accel(p.horizontal_accel);
        self.vs.set_vertical_accel(p.vertical_accel);
        self.alt.set_vertical_accel(p.vertical_accel);
        self.trk.set_turn_rate(p.turn_rate);
        self.trk.set_bank_angle(p.bank_angle);
        self.alt.set_vertical_rate(p.vertical_rate);
        self.trk.state_mut().set_recovery(p.recovery_trk);
        self.gs.state_mut().set_recovery(p.recovery_gs);
        self.vs.state_mut().set_recovery(p.recovery_vs);
        self.reset();
        Ok(())
    }

    // Aircraft

    pub fn ownship(&self) -> Option<&OwnshipState> {
        self.core.ownship.as_ref()
    }

    pub fn set_ownship(&mut self, own: OwnshipState) {
        self.core.ownship = Some(own);
        self.reset();
    }

    pub fn has_ownship(&self) -> bool {
        self.core.has_ownship()
    }

    pub fn has_traffic(&self) -> bool {
        self.core.has_traffic()
    }

    pub fn traffic(&self) -> &[TrafficState] {
        &self.core.traffic
    }

    pub fn traffic_by_id(&self, id: &str) -> Option<&TrafficState> {
        self.core.traffic.iter().find(|ac| ac.id == id)
    }

    pub fn is_lat_lon(&self) -> bool {
        self.core.ownship.as_ref().is_some_and(|own| own.is_lat_lon())
    }

    /// Add a traffic aircraft. Requires an ownship using the same kind of
    /// coordinates.
    pub fn add_traffic(&mut self, ac: TrafficState) -> Result<()> {
        let Some(own) = self.core.ownship.as_ref() else {
            tracing::warn!(aircraft = %ac.id, "traffic added before ownship");
            return Err(DaaError::NoOwnship);
        };
        if own.is_lat_lon() != ac.is_lat_lon() {
            tracing::warn!(aircraft = %ac.id, "traffic coordinates do not match ownship");
            return Err(DaaError::MixedCoordinates);
        }
        self.core.traffic.push(ac);
        self.reset();
        Ok(())
    }

    /// Drop ownship and traffic.
    pub fn clear(&mut self) {
        self.core.clear();
        self.reset();
    }

    /// Project ownship and traffic `dt` seconds along their velocities.
    pub fn linear_projection(&mut self, dt: f64) {
        if dt == 0.0 {
            return;
        }
        if let Some(own) = self.core.ownship.as_mut() {
            *own = own.linear_projection(dt);
        }
        for ac in self.core.traffic.iter_mut() {
            *ac = ac.linear_projection(dt);
        }
        self.reset();
    }

    // Detector and criteria

    pub fn detector(&self) -> &Detector {
        &self.core.detector
    }

    pub fn set_detector(&mut self, detector: Detector) {
        self.core.detector = detector;
        self.reset();
    }

    pub fn criteria_aircraft(&self) -> Option<&str> {
        self.core.criteria_ac.as_deref()
    }

    pub fn set_criteria_aircraft(&mut self, id: Option<String>) {
        self.core.criteria_ac = id;
        self.reset();
    }

    /// Most urgent aircraft under `strat`. Only defined when some criteria
    /// are enabled and both ownship and traffic are present.
    pub fn most_urgent_aircraft(&self, strat: &UrgencyStrategy) -> Option<&TrafficState> {
        if !(self.core.conflict_crit || self.core.recovery_crit) {
            return None;
        }
        let own = self.core.ownship.as_ref()?;
        strat.most_urgent(
            &self.core.detector,
            own,
            &self.core.traffic,
            self.core.actual_alerting_time(),
        )
    }

    pub fn set_criteria_from(&mut self, strat: &UrgencyStrategy) {
        let id = self.most_urgent_aircraft(strat).map(|ac| ac.id.clone());
        self.set_criteria_aircraft(id);
    }

    pub fn is_enabled_conflict_criteria(&self) -> bool {
        self.core.conflict_crit
    }

    pub fn set_conflict_criteria(&mut self, flag: bool) {
        self.core.conflict_crit = flag;
        self.reset();
    }

    pub fn is_enabled_recovery_criteria(&self) -> bool {
        self.core.recovery_crit
    }

    pub fn set_recovery_criteria(&mut self, flag: bool) {
        self.core.recovery_crit = flag;
        self.reset();
    }

    /// Conflict and recovery criteria together.
    pub fn set_repulsive_criteria(&mut self, flag: bool) {
        self.set_conflict_criteria(flag);
        self.set_recovery_criteria(flag);
    }

    // Time settings

    pub fn is_enabled_implicit_bands(&self) -> bool {
        self.core.implicit_bands
    }

    pub fn set_implicit_bands(&mut self, flag: bool) {
        if flag != self.core.implicit_bands {
            self.core.implicit_bands = flag;
            self.reset();
        }
    }

    pub fn lookahead_time(&self) -> f64 {
        self.core.lookahead
    }

    pub fn set_lookahead_time(&mut self, t: f64) -> Result<()> {
        let t = checked(check_positive("lookahead_time", t))?;
        if t != self.core.lookahead {
            self.core.lookahead = t;
            self.reset();
        }
        Ok(())
    }

    pub fn alerting_time(&self) -> f64 {
        self.core.alerting_time
    }

    pub fn set_alerting_time(&mut self, t: f64) -> Result<()> {
        let t = checked(check_non_negative("alerting_time", t))?;
        if t != self.core.alerting_time {
            self.core.alerting_time = t;
            self.reset();
        }
        Ok(())
    }

    pub fn max_recovery_time(&self) -> f64 {
        self.core.max_recovery_time
    }

    pub fn set_max_recovery_time(&mut self, t: f64) -> Result<()> {
        let t = checked(check_non_negative("max_recovery_time", t))?;
        if t != self.core.max_recovery_time {
            self.core.max_recovery_time = t;
            self.reset();
        }
        Ok(())
    }

    pub fn recovery_stability_time(&self) -> f64 {
        self.core.recovery_stability_time
    }

    pub fn set_recovery_stability_time(&mut self, t: f64) -> Result<()> {
        let t = checked(check_non_negative("recovery_stability_time", t))?;
        if t != self.core.recovery_stability_time {
            self.core.recovery_stability_time = t;
            self.reset();
        }
        Ok(())
    }

    // Recovery settings

    pub fn min_horizontal_recovery(&self) -> f64 {
        self.core.min_horizontal_recovery
    }

    pub fn set_min_horizontal_recovery(&mut self, val: f64) -> Result<()> {
        let val = checked(check_non_negative("min_horizontal_recovery", val))?;
        if val != self.core.min_horizontal_recovery {
            self.core.min_horizontal_recovery = val;
            self.reset();
        }
        Ok(())
    }

    pub fn min_vertical_recovery(&self) -> f64 {
        self.core.min_vertical_recovery
    }

    pub fn set_min_vertical_recovery(&mut self, val: f64) -> Result<()> {
        let val = checked(check_non_negative("min_vertical_recovery", val))?;
        if val != self.core.min_vertical_recovery {
            self.core.min_vertical_recovery = val;
            self.reset();
        }
        Ok(())
    }

    pub fn is_enabled_collision_avoidance_bands(&self) -> bool {
        self.core.ca_bands
    }

    pub fn set_collision_avoidance_bands(&mut self, flag: bool) {
        if flag != self.core.ca_bands {
            self.core.ca_bands = flag;
            self.reset();
        }
    }

    /// Recovery bands for track, ground speed and vertical speed.
    pub fn set_recovery_bands(&mut self, flag: bool) {
        self.trk.state_mut().set_recovery(flag);
        self.gs.state_mut().set_recovery(flag);
        self.vs.state_mut().set_recovery(flag);
    }

    pub fn is_enabled_recovery(&self, dim: Dimension) -> bool {
        self.dimension(dim).state().is_enabled_recovery()
    }

    /// Altitude bands never compute recovery; the flag is ignored there.
    pub fn set_recovery(&mut self, dim: Dimension, flag: bool) {
        if dim != Dimension::Altitude {
            self.dimension_mut(dim).state_mut().set_recovery(flag);
        }
    }

    // Range and kinematic settings

    pub fn step(&self, dim: Dimension) -> f64 {
        self.dimension(dim).step()
    }

    pub fn set_step(&mut self, dim: Dimension, val: f64) -> Result<()> {
        let name = match dim {
            Dimension::Track => "trk_step",
            Dimension::GroundSpeed => "gs_step",
            Dimension::VerticalSpeed => "vs_step",
            Dimension::Altitude => "alt_step",
        };
        let val = checked(check_positive(name, val))?;
        if dim == Dimension::Track {
            checked(check_less_than(name, val, PI))?;
        }
        self.dimension_mut(dim).state_mut().set_step(val);
        Ok(())
    }

    /// Range of the dimension; track is always `[0, 2*pi]`.
    pub fn range(&self, dim: Dimension) -> (f64, f64) {
        let band = self.dimension(dim);
        (band.min(), band.max())
    }

    /// Lower bound of `dim`; must not exceed the current upper bound. Track
    /// ignores it.
    pub fn set_min(&mut self, dim: Dimension, val: f64) -> Result<()> {
        let name = match dim {
            Dimension::Track => return Ok(()),
            Dimension::GroundSpeed => "min_gs",
            Dimension::VerticalSpeed => "min_vs",
            Dimension::Altitude => "min_alt",
        };
        if dim == Dimension::GroundSpeed {
            checked(check_non_negative(name, val))?;
        }
        let max = self.dimension(dim).max();
        checked(check_ordered(name, val, max).map(|_| val))?;
        self.dimension_mut(dim).state_mut().set_min(val);
        Ok(())
    }

    /// Upper bound of `dim`; must not fall below the current lower bound.
    /// Track ignores it.
    pub fn set_max(&mut self, dim: Dimension, val: f64) -> Result<()> {
        let name = match dim {
            Dimension::Track => return Ok(()),
            Dimension::GroundSpeed => "max_gs",
            Dimension::VerticalSpeed => "max_vs",
            Dimension::Altitude => "max_alt",
        };
        let min = self.dimension(dim).min();
        checked(check_ordered(name, min, val).map(|_| val))?;
        self.dimension_mut(dim).state_mut().set_max(val);
        Ok(())
    }

    pub fn horizontal_accel(&self) -> f64 {
        self.gs.horizontal_accel()
    }

    pub fn set_horizontal_accel(&mut self, val: f64) -> Result<()> {
        let val = checked(check_non_negative("horizontal_accel", val))?;
        self.gs.set_horizontal_accel(val);
        Ok(())
    }

    pub fn vertical_accel(&self) -> f64 {
        self.vs.vertical_accel()
    }

    /// Applies to vertical speed and altitude bands.
    pub fn set_vertical_accel(&mut self, val: f64) -> Result<()> {
        let val = checked(check_non_negative("vertical_accel", val))?;
        self.vs.set_vertical_accel(val);
        self.alt.set_vertical_accel(val);
        Ok(())
    }

    pub fn turn_rate(&self) -> f64 {
        self.trk.turn_rate()
    }

    pub fn set_turn_rate(&mut self, val: f64) -> Result<()> {
        let val = checked(check_non_negative("turn_rate", val))?;
        self.trk.set_turn_rate(val);
        Ok(())
    }

    pub fn bank_angle(&self) -> f64 {
        self.trk.bank_angle()
    }

    pub fn set_bank_angle(&mut self, val: f64) -> Result<()> {
        let val = checked(check_non_negative("bank_angle", val))?;
        self.trk.set_bank_angle(val);
        Ok(())
    }

    pub fn vertical_rate(&self) -> f64 {
        self.alt.vertical_rate()
    }

    pub fn set_vertical_rate(&mut self, val: f64) -> Result<()> {
        let val = checked(check_non_negative("vertical_rate", val))?;
        self.alt.set_vertical_rate(val);
        Ok(())
    }

    // Band queries

    pub fn dimension(&self, dim: Dimension) -> &dyn DimensionBands {
        match dim {
            Dimension::Track => &self.trk,
            Dimension::GroundSpeed => &self.gs,
            Dimension::VerticalSpeed => &self.vs,
            Dimension::Altitude => &self.alt,
        }
    }

    fn dimension_mut(&mut self, dim: Dimension) -> &mut dyn DimensionBands {
        match dim {
            Dimension::Track => &mut self.trk,
            Dimension::GroundSpeed => &mut self.gs,
            Dimension::VerticalSpeed => &mut self.vs,
            Dimension::Altitude => &mut self.alt,
        }
    }

    /// Split borrow of one dimension and the shared core.
    fn split(&mut self, dim: Dimension) -> (&mut dyn DimensionBands, &BandsCore) {
        let band: &mut dyn DimensionBands = match dim {
            Dimension::Track => &mut self.trk,
            Dimension::GroundSpeed => &mut self.gs,
            Dimension::VerticalSpeed => &mut self.vs,
            Dimension::Altitude => &mut self.alt,
        };
        (band, &self.core)
    }

    /// Mark every dimension stale.
    pub fn reset(&mut self) {
        for dim in Dimension::ALL {
            self.dimension_mut(dim).reset();
        }
    }

    /// Bands of `dim`, computing them if needed. `None` without an ownship.
    pub fn bands(&mut self, dim: Dimension) -> Option<&BandsOutput> {
        let (band, core) = self.split(dim);
        band.output(core)
    }

    /// Number of intervals, -1 without an ownship.
    pub fn length(&mut self, dim: Dimension) -> i32 {
        let (band, core) = self.split(dim);
        band.bands_length(core)
    }

    pub fn interval(&mut self, dim: Dimension, i: usize) -> Interval {
        let (band, core) = self.split(dim);
        band.interval(core, i)
    }

    pub fn region(&mut self, dim: Dimension, i: usize) -> BandsRegion {
        let (band, core) = self.split(dim);
        band.region(core, i)
    }

    /// Region containing `val`; track values are normalized first.
    pub fn region_of(&mut self, dim: Dimension, val: f64) -> BandsRegion {
        let val = if dim == Dimension::Track { to_2pi(val) } else { val };
        let (band, core) = self.split(dim);
        band.region_of(core, val)
    }

    /// True if `val` is within `thr` of a conflict band.
    pub fn near_conflict(&mut self, dim: Dimension, val: f64, thr: f64) -> bool {
        let (band, core) = self.split(dim);
        band.almost_near(core, val, thr)
    }

    pub fn recovery_time(&mut self, dim: Dimension) -> f64 {
        let (band, core) = self.split(dim);
        band.recovery_time(core)
    }

    /// Identifiers of the aircraft behind the preventive and corrective bands
    /// of `dim`.
    pub fn alerting_aircraft(&self, dim: Dimension) -> (Vec<String>, Vec<String>) {
        self.dimension(dim).alerting_aircraft_names(&self.core)
    }

    pub fn force_computation(&mut self, dim: Dimension) {
        let (band, core) = self.split(dim);
        band.force_compute(core);
    }

    /// Ownship value of `dim` in internal units.
    pub fn ownship_value(&self, dim: Dimension) -> Option<f64> {
        let own = self.core.ownship.as_ref()?;
        Some(match dim {
            Dimension::Altitude => own.position().alt(),
            _ => self.dimension(dim).current_value(own),
        })
    }

    /// Human readable report of every dimension in aviation units.
    pub fn pretty_print(&mut self) -> String {
        let mut s = String::from("Type: KinematicBands\n");
        for dim in Dimension::ALL {
            let (unit, conv) = dim.display_unit();
            if let Some(val) = self.ownship_value(dim) {
                s += &format!("Ownship {}: {:.1} [{}]\n", dim, conv(val), unit);
            }
            s += &format!("{} Bands [{},{}]:\n", dim, unit, unit);
            let n = self.length(dim).max(0) as usize;
            for i in 0..n {
                let iv = self.interval(dim, i);
                let region = self.region(dim, i);
                s += &format!("  [{:.1}, {:.1}] {}\n", conv(iv.low), conv(iv.up), region);
            }
            if dim == Dimension::Altitude {
                continue;
            }
            let recovery = self.recovery_time(dim);
            if recovery > 0.0 {
                s += &format!("{} Recovery Time: {:.2} [s]\n", dim, recovery);
            }
            let (preventive, corrective) = self.alerting_aircraft(dim);
            if !preventive.is_empty() {
                s += &format!(
                    "Set of aircraft contributing to preventive {} bands: {:?}\n",
                    dim.to_string().to_lowercase(),
                    preventive
                );
            }
            if !corrective.is_empty() {
                s += &format!(
                    "Set of aircraft contributing to corrective {} bands: {:?}\n",
                    dim.to_string().to_lowercase(),
                    corrective
                );
            }
        }
        s
    }
}

fn fmt_cached(f: &mut fmt::Formatter<'_>, state: &BandsState) -> fmt::Result {
    match &state.cache {
        BandsCache::Fresh(out) => writeln!(f, "{}", out),
        BandsCache::Stale => writeln!(f, "(not computed)"),
    }
}

impl fmt::Display for KinematicBands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = &self.core;
        writeln!(f, "{}", core.detector)?;
        writeln!(f, "# Bands")?;
        writeln!(
            f,
            "alerting_time = {:.4} [s] ({:.4} [s])",
            core.alerting_time,
            core.actual_alerting_time()
        )?;
        writeln!(f, "lookahead_time = {:.4} [s]", core.lookahead)?;
        writeln!(f, "min_gs = {:.4} [knot]", to_knots(self.gs.min()))?;
        writeln!(f, "max_gs = {:.4} [knot]", to_knots(self.gs.max()))?;
        writeln!(f, "min_vs = {:.4} [fpm]", to_fpm(self.vs.min()))?;
        writeln!(f, "max_vs = {:.4} [fpm]", to_fpm(self.vs.max()))?;
        writeln!(f, "min_alt = {:.4} [ft]", to_ft(self.alt.min()))?;
        writeln!(f, "max_alt = {:.4} [ft]", to_ft(self.alt.max()))?;
        writeln!(f, "implicit_bands = {}", core.implicit_bands)?;
        writeln!(f, "# Kinematic Bands")?;
        writeln!(f, "trk_step = {:.4} [deg]", to_deg(self.trk.step()))?;
        writeln!(f, "gs_step = {:.4} [knot]", to_knots(self.gs.step()))?;
        writeln!(f, "vs_step = {:.4} [fpm]", to_fpm(self.vs.step()))?;
        writeln!(f, "alt_step = {:.4} [ft]", to_ft(self.alt.step()))?;
        writeln!(f, "horizontal_accel = {:.4} [m/s^2]", self.gs.horizontal_accel())?;
        writeln!(f, "vertical_accel = {:.4} [m/s^2]", self.vs.vertical_accel())?;
        writeln!(f, "turn_rate = {:.4} [deg/s]", to_deg(self.trk.turn_rate()))?;
        writeln!(f, "bank_angle = {:.4} [deg]", to_deg(self.trk.bank_angle()))?;
        writeln!(f, "vertical_rate = {:.4} [fpm]", to_fpm(self.alt.vertical_rate()))?;
        writeln!(f, "# Recovery Bands")?;
        writeln!(
            f,
            "recovery_stability_time = {:.4} [s]",
            core.recovery_stability_time
        )?;
        writeln!(
            f,
            "max_recovery_time = {:.4} [s] ({:.4} [s])",
            core.max_recovery_time,
            core.actual_max_recovery_time()
        )?;
        writeln!(
            f,
            "min_horizontal_recovery = {:.4} [nmi] ({:.4} [nmi])",
            to_nmi(core.min_horizontal_recovery),
            to_nmi(core.actual_min_horizontal_recovery())
        )?;
        writeln!(
            f,
            "min_vertical_recovery = {:.4} [ft] ({:.4} [ft])",
            to_ft(core.min_vertical_recovery),
            to_ft(core.actual_min_vertical_recovery())
        )?;
        writeln!(f, "criteria_ac = {}", core.criteria_ac.as_deref().unwrap_or("none"))?;
        writeln!(f, "conflict_crit = {}", core.conflict_crit)?;
        writeln!(f, "recovery_crit = {}", core.recovery_crit)?;
        writeln!(f, "recovery_trk = {}", self.trk.state().is_enabled_recovery())?;
        writeln!(f, "recovery_gs = {}", self.gs.state().is_enabled_recovery())?;
        writeln!(f, "recovery_vs = {}", self.vs.state().is_enabled_recovery())?;
        writeln!(f, "#")?;
        writeln!(f, "NAME sx sy sz vx vy vz")?;
        writeln!(f, "[none] [m] [m] [m] [m/s] [m/s] [m/s]")?;
        if let Some(own) = core.ownship.as_ref() {
            let (s, v) = (own.s(), own.v());
            writeln!(
                f,
                "{}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}",
                own.id(),
                s.x,
                s.y,
                s.z,
                v.x,
                v.y,
                v.z
            )?;
            for ac in &core.traffic {
                let (s, v) = (own.traffic_s(ac), own.traffic_v(ac));
                writeln!(
                    f,
                    "{}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}",
                    ac.id, s.x, s.y, s.z, v.x, v.y, v.z
                )?;
            }
        }
        writeln!(f, "Track bands [rad,rad]:")?;
        fmt_cached(f, self.trk.state())?;
        writeln!(f, "Ground speed bands [m/s,m/s]:")?;
        fmt_cached(f, self.gs.state())?;
        writeln!(f, "Vertical speed bands [m/s,m/s]:")?;
        fmt_cached(f, self.vs.state())?;
        writeln!(f, "Altitude bands [m,m]:")?;
        fmt_cached(f, self.alt.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vect3;
    use crate::state::Position;
    use crate::units::{from_deg, from_ft, from_knots};

    fn ownship() -> OwnshipState {
        OwnshipState::new(TrafficState::new(
            "own",
            Position::xyz(0.0, 0.0, from_ft(10000.0)),
            Vect3::from_trk_gs_vs(0.0, from_knots(200.0), 0.0),
        ))
    }

    fn head_on(id: &str) -> TrafficState {
        TrafficState::new(
            id,
            Position::xyz(0.0, 12000.0, from_ft(10000.0)),
            Vect3::from_trk_gs_vs(PI, from_knots(200.0), 0.0),
        )
    }

    #[test]
    fn test_no_ownship_reports_negative_length() {
        let mut bands = KinematicBands::default();
        assert_eq!(bands.length(Dimension::Track), -1);
        assert_eq!(bands.region(Dimension::Track, 0), BandsRegion::Unknown);
        assert!(bands.interval(Dimension::Track, 0).is_empty());
        assert!(matches!(
            bands.add_traffic(head_on("a")),
            Err(DaaError::NoOwnship)
        ));
    }

    #[test]
    fn test_mixed_coordinates_rejected() {
        let mut bands = KinematicBands::default();
        bands.set_ownship(ownship());
        let geo = TrafficState::new(
            "geo",
            Position::lat_lon(0.0, 0.0, 1000.0),
            Vect3::ZERO,
        );
        assert!(matches!(
            bands.add_traffic(geo),
            Err(DaaError::MixedCoordinates)
        ));
        assert!(!bands.has_traffic());
    }

    #[test]
    fn test_no_traffic_single_none_band() {
        let mut bands = KinematicBands::default();
        bands.set_ownship(ownship());
        for dim in Dimension::ALL {
            assert_eq!(bands.length(dim), 1, "{}", dim);
            assert_eq!(bands.region(dim, 0), BandsRegion::None);
            let (min, max) = bands.range(dim);
            let iv = bands.interval(dim, 0);
            assert_eq!((iv.low, iv.up), (min, max));
            assert_eq!(bands.recovery_time(dim), 0.0);
        }
    }

    #[test]
    fn test_head_on_track_bands_red_ahead() {
        let mut bands = KinematicBands::default();
        bands.set_ownship(ownship());
        bands.add_traffic(head_on("intruder")).unwrap();
        assert_eq!(bands.region_of(Dimension::Track, 0.0), BandsRegion::Near);
        assert_eq!(bands.region_of(Dimension::Track, PI), BandsRegion::None);
        assert_eq!(
            bands.region_of(Dimension::Track, -from_deg(1.0)),
            BandsRegion::Near
        );
        let (_, corrective) = bands.alerting_aircraft(Dimension::Track);
        assert_eq!(corrective, vec!["intruder".to_string()]);
    }

    #[test]
    fn test_cache_and_reset() {
        let mut bands = KinematicBands::default();
        bands.set_ownship(ownship());
        bands.add_traffic(head_on("intruder")).unwrap();
        let first = bands.bands(Dimension::GroundSpeed).cloned();
        assert!(bands.dimension(Dimension::GroundSpeed).state().is_fresh());
        assert_eq!(bands.bands(Dimension::GroundSpeed).cloned(), first);
        bands.set_lookahead_time(60.0).unwrap();
        assert!(!bands.dimension(Dimension::GroundSpeed).state().is_fresh());
    }

    #[test]
    fn test_rejected_setters_keep_value() {
        let mut bands = KinematicBands::default();
        assert!(bands.set_lookahead_time(-5.0).is_err());
        assert_eq!(bands.lookahead_time(), 180.0);
        assert!(bands.set_step(Dimension::Track, 4.0).is_err());
        assert_eq!(bands.step(Dimension::Track), from_deg(1.0));
        assert!(bands.set_vertical_accel(-1.0).is_err());
        assert_eq!(bands.vertical_accel(), 2.0);
        bands.set_step(Dimension::Altitude, 100.0).unwrap();
        assert_eq!(bands.step(Dimension::Altitude), 100.0);

        bands.set_alerting_time(60.0).unwrap();
        bands.set_max_recovery_time(120.0).unwrap();
        bands.set_recovery_stability_time(3.0).unwrap();
        bands.set_min_horizontal_recovery(1000.0).unwrap();
        bands.set_min_vertical_recovery(150.0).unwrap();
        assert!(bands.set_alerting_time(-1.0).is_err());
        assert!(bands.set_min_vertical_recovery(f64::INFINITY).is_err());
        assert_eq!(bands.alerting_time(), 60.0);
        assert_eq!(bands.max_recovery_time(), 120.0);
        assert_eq!(bands.recovery_stability_time(), 3.0);
        assert_eq!(bands.min_horizontal_recovery(), 1000.0);
        assert_eq!(bands.min_vertical_recovery(), 150.0);

        bands.set_collision_avoidance_bands(true);
        bands.set_conflict_criteria(true);
        assert!(bands.is_enabled_collision_avoidance_bands());
        assert!(bands.is_enabled_conflict_criteria());
        assert!(!bands.is_enabled_recovery_criteria());
    }

    #[test]
    fn test_set_parameters_copies_everything() {
        let mut params = DaaParameters::default();
        params.lookahead_time = 90.0;
        params.gs_step = from_knots(5.0);
        params.recovery_vs = false;
        params.implicit_bands = true;
        let bands = KinematicBands::with_parameters(Detector::default(), &params).unwrap();
        assert_eq!(bands.lookahead_time(), 90.0);
        assert_eq!(bands.step(Dimension::GroundSpeed), from_knots(5.0));
        assert!(bands.is_enabled_recovery(Dimension::Track));
        assert!(!bands.is_enabled_recovery(Dimension::VerticalSpeed));
        assert!(bands.is_enabled_implicit_bands());
    }

    #[test]
    fn test_invalid_parameters_keep_session_settings() {
        let mut bands = KinematicBands::default();
        bands.set_lookahead_time(120.0).unwrap();
        let mut params = DaaParameters::default();
        params.lookahead_time = -5.0;
        params.gs_step = from_knots(5.0);
        assert!(bands.set_parameters(&params).is_err());
        assert_eq!(bands.lookahead_time(), 120.0);
        assert_eq!(bands.step(Dimension::GroundSpeed), from_knots(1.0));
        assert!(KinematicBands::with_parameters(Detector::default(), &params).is_err());
    }

    #[test]
    fn test_range_bounds_stay_ordered() {
        let mut bands = KinematicBands::default();
        let (min_vs, max_vs) = bands.range(Dimension::VerticalSpeed);
        assert!(bands.set_max(Dimension::VerticalSpeed, min_vs - 1.0).is_err());
        assert!(bands.set_min(Dimension::VerticalSpeed, max_vs + 1.0).is_err());
        assert_eq!(bands.range(Dimension::VerticalSpeed), (min_vs, max_vs));
        assert!(bands.set_min(Dimension::GroundSpeed, -1.0).is_err());
        bands.set_max(Dimension::GroundSpeed, from_knots(300.0)).unwrap();
        bands.set_min(Dimension::GroundSpeed, from_knots(100.0)).unwrap();
        assert_eq!(
            bands.range(Dimension::GroundSpeed),
            (from_knots(100.0), from_knots(300.0))
        );
        bands.set_max(Dimension::Track, 1.0).unwrap();
        assert_eq!(bands.range(Dimension::Track), (0.0, 2.0 * PI));
    }

    fn parallel(alt_ft: f64) -> (OwnshipState, TrafficState) {
        let v = Vect3::from_trk_gs_vs(0.0, from_knots(200.0), 0.0);
        let own = TrafficState::new("own", Position::xyz(0.0, 0.0, from_ft(alt_ft)), v);
        let ac = TrafficState::new("ac", Position::xyz(600.0, 0.0, from_ft(alt_ft)), v);
        (OwnshipState::new(own), ac)
    }

    #[test]
    fn test_recovery_bands_inside_well_clear_violation() {
        let params = DaaParameters::default();
        let mut bands = KinematicBands::with_parameters(Detector::default(), &params).unwrap();
        let (own, ac) = parallel(2000.0);
        bands.set_ownship(own);
        bands.add_traffic(ac).unwrap();
        for dim in [Dimension::Track, Dimension::GroundSpeed, Dimension::VerticalSpeed] {
            assert!(bands.recovery_time(dim) > 0.0, "{}", dim);
            let out = bands.bands(dim).unwrap();
            assert!(
                out.iter().any(|(_, region)| *region == BandsRegion::Recovery),
                "{}: {}",
                dim,
                out
            );
            assert!(out.iter().all(|(_, region)| *region != BandsRegion::None));
        }
    }

    #[test]
    fn test_recovery_impossible_reports_negative_time() {
        let params = DaaParameters::default();
        let mut bands = KinematicBands::with_parameters(Detector::default(), &params).unwrap();
        assert!(!bands.is_enabled_collision_avoidance_bands());
        // 600 m is inside the RA horizontal miss distance at 10000 ft.
        let (own, ac) = parallel(10000.0);
        bands.set_ownship(own);
        bands.add_traffic(ac).unwrap();
        assert_eq!(bands.recovery_time(Dimension::Track), -1.0);
        assert_eq!(bands.length(Dimension::Track), 1);
        assert_eq!(bands.region(Dimension::Track, 0), BandsRegion::Near);
    }

    #[test]
    fn test_criteria_require_flags() {
        let mut bands = KinematicBands::default();
        bands.set_ownship(ownship());
        bands.add_traffic(head_on("intruder")).unwrap();
        assert!(bands.traffic_by_id("intruder").is_some());
        assert!(bands.traffic_by_id("other").is_none());
        bands.set_criteria_from(&UrgencyStrategy::Dcpa);
        assert_eq!(bands.criteria_aircraft(), None);
        bands.set_repulsive_criteria(true);
        bands.set_criteria_from(&UrgencyStrategy::Dcpa);
        assert_eq!(bands.criteria_aircraft(), Some("intruder"));
    }

    #[test]
    fn test_linear_projection_moves_aircraft() {
        let mut bands = KinematicBands::default();
        bands.set_ownship(ownship());
        bands.add_traffic(head_on("intruder")).unwrap();
        bands.linear_projection(10.0);
        let own = bands.ownship().unwrap();
        assert!((own.s().y - from_knots(200.0) * 10.0).abs() < 1e-6);
        let ac = &bands.traffic()[0];
        let si = bands.ownship().unwrap().traffic_s(ac);
        assert!((si.y - (12000.0 - from_knots(200.0) * 10.0)).abs() < 1e-6);
    }

    #[test]
    fn test_pretty_print_mentions_every_dimension() {
        let mut bands = KinematicBands::default();
        bands.set_ownship(ownship());
        let text = bands.pretty_print();
        for dim in Dimension::ALL {
            assert!(text.contains(&format!("{} Bands", dim)));
        }
        assert!(bands.to_string().contains("lookahead_time = 180.0000 [s]"));
    }
}
