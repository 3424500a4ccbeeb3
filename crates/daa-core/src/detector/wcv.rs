//! Well-clear volume with a time-variable horizontal threshold.

use super::vertical::{vertical_wcv, vertical_wcv_interval};
use crate::geometry::{dcpa, delta, tcpa, theta_d, Vect2, Vect3, Velocity};
use crate::loss::{ConflictData, LossData};
use crate::numeric::{almost_equals, sq};
use crate::units::{from_ft, to_ft};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Thresholds of a well-clear volume (meters, seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WcvTable {
    /// Horizontal distance threshold
    pub dthr: f64,
    /// Vertical distance threshold
    pub zthr: f64,
    /// Horizontal time threshold
    pub tthr: f64,
    /// Time to co-altitude threshold
    pub tcoa: f64,
}

impl Default for WcvTable {
    fn default() -> Self {
        Self {
            dthr: from_ft(4000.0),
            zthr: from_ft(450.0),
            tthr: 35.0,
            tcoa: 0.0,
        }
    }
}

impl fmt::Display for WcvTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DTHR = {:.1} [ft], ZTHR = {:.1} [ft], TTHR = {:.1} [s], TCOA = {:.1} [s]",
            to_ft(self.dthr),
            to_ft(self.zthr),
            self.tthr,
            self.tcoa
        )
    }
}

/// Horizontal time variable used against TTHR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeVariable {
    /// Modified tau, `(DTHR^2 - |s|^2) / (s . v)`.
    #[default]
    TauMod,
    /// Time to horizontal closest point of approach.
    Tcpa,
}

/// Time-variable well-clear detector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wcv {
    pub table: WcvTable,
    #[serde(default)]
    pub tvar: TimeVariable,
    #[serde(default)]
    pub id: String,
}

impl Wcv {
    pub fn new(table: WcvTable, tvar: TimeVariable) -> Self {
        Self {
            table,
            tvar,
            id: String::new(),
        }
    }

    pub fn taumod(table: WcvTable) -> Self {
        Self::new(table, TimeVariable::TauMod)
    }

    pub fn tcpa(table: WcvTable) -> Self {
        Self::new(table, TimeVariable::Tcpa)
    }

    pub fn horizontal_tvar(&self, s: &Vect2, v: &Vect2) -> f64 {
        match self.tvar {
            TimeVariable::TauMod => {
                let sdotv = s.dot(v);
                if sdotv < 0.0 {
                    (sq(self.table.dthr) - s.sqv()) / sdotv
                } else {
                    -1.0
                }
            }
            TimeVariable::Tcpa => tcpa(s, v),
        }
    }

    pub fn horizontal_wcv(&self, s: &Vect2, v: &Vect2) -> bool {
        if s.norm() <= self.table.dthr {
            return true;
        }
        if dcpa(s, v) <= self.table.dthr {
            let tvar = self.horizontal_tvar(s, v);
            return 0.0 <= tvar && tvar <= self.table.tthr;
        }
        false
    }

    /// Horizontal violation interval within `[0, t]`.
    pub fn horizontal_wcv_interval(&self, t: f64, s: &Vect2, v: &Vect2) -> LossData {
        match self.tvar {
            TimeVariable::TauMod => self.taumod_interval(t, s, v),
            TimeVariable::Tcpa => self.tcpa_interval(t, s, v),
        }
    }

    fn taumod_interval(&self, t: f64, s: &Vect2, v: &Vect2) -> LossData {
        let dthr = self.table.dthr;
        let tthr = self.table.tthr;
        let sqs = s.sqv();
        let sdotv = s.dot(v);
        let a = v.sqv();
        let exit = |t: f64| theta_d(s, v, 1, dthr).map_or(t, |x| t.min(x));

        if almost_equals(a, 0.0) && sqs <= sq(dthr) {
            return LossData::new(0.0, t);
        }
        if sqs <= sq(dthr) {
            return LossData::new(0.0, exit(t));
        }
        let b = 2.0 * sdotv + tthr * a;
        let c = sqs + tthr * sdotv - sq(dthr);
        let discr = sq(b) - 4.0 * a * c;
        if sdotv >= 0.0 || discr < 0.0 {
            return LossData::new(t, 0.0);
        }
        let tin = (-b - discr.sqrt()) / (2.0 * a);
        if delta(s, v, dthr) >= 0.0 && tin <= t {
            return LossData::new(tin.max(0.0), exit(t));
        }
        LossData::new(t, 0.0)
    }

    fn tcpa_interval(&self, t: f64, s: &Vect2, v: &Vect2) -> LossData {
        let dthr = self.table.dthr;
        let sqs = s.sqv();
        let exit = |t: f64| theta_d(s, v, 1, dthr).map_or(t, |x| t.min(x));

        if almost_equals(v.sqv(), 0.0) {
            return if sqs <= sq(dthr) {
                LossData::new(0.0, t)
            } else {
                LossData::new(t, 0.0)
            };
        }
        if sqs <= sq(dthr) {
            return LossData::new(0.0, exit(t));
        }
        if s.dot(v) > 0.0 || dcpa(s, v) > dthr {
            return LossData::new(t, 0.0);
        }
        let tc = tcpa(s, v);
        let entry = theta_d(s, v, -1, dthr).unwrap_or(tc);
        let tmin = entry.min(tc - self.table.tthr);
        if tmin > t {
            return LossData::new(t, 0.0);
        }
        LossData::new(tmin.max(0.0), exit(t).max(tmin.max(0.0)))
    }

    pub fn violation(&self, so: &Vect3, vo: &Velocity, si: &Vect3, vi: &Velocity) -> bool {
        let s2 = so.vect2() - si.vect2();
        let v2 = vo.vect2() - vi.vect2();
        self.horizontal_wcv(&s2, &v2)
            && vertical_wcv(self.table.zthr, self.table.tcoa, so.z - si.z, vo.z - vi.z)
    }

    /// Violation interval within `[b, t]`: vertical interval first, then the
    /// horizontal interval restricted to it.
    pub fn wcv_interval(
        &self,
        so: &Vect3,
        vo: &Velocity,
        si: &Vect3,
        vi: &Velocity,
        b: f64,
        t: f64,
    ) -> LossData {
        let s2 = so.vect2() - si.vect2();
        let v2 = vo.vect2() - vi.vect2();
        let sz = so.z - si.z;
        let vz = vo.z - vi.z;

        let (vin, vout) = vertical_wcv_interval(self.table.zthr, self.table.tcoa, b, t, sz, vz);
        if vin > vout {
            return LossData::new(t, b);
        }
        let step = v2.scal_add(vin, &s2);
        if almost_equals(vin, vout) {
            if self.horizontal_wcv(&step, &v2) {
                return LossData::new(vin, vout);
            }
            return LossData::new(t, b);
        }
        let ld = self.horizontal_wcv_interval(vout - vin, &step, &v2);
        LossData::new(ld.time_in() + vin, ld.time_out() + vin)
    }

    pub fn conflict_detection(
        &self,
        so: &Vect3,
        vo: &Velocity,
        si: &Vect3,
        vi: &Velocity,
        b: f64,
        t: f64,
    ) -> ConflictData {
        let ld = self.wcv_interval(so, vo, si, vi, b, t);
        let t_crit = (ld.time_in() + ld.time_out()) / 2.0;
        let dist = (so.linear(vo, t_crit) - si.linear(vi, t_crit))
            .cyl_norm(self.table.dthr, self.table.zthr);
        ConflictData::new(ld, t_crit, dist)
    }
}

impl fmt::Display for Wcv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.tvar {
            TimeVariable::TauMod => "WCV_TAUMOD",
            TimeVariable::Tcpa => "WCV_TCPA",
        };
        if !self.id.is_empty() {
            write!(f, "{} = ", self.id)?;
        }
        write!(f, "{}: {{{}}}", name, self.table)
    }
}
