//! Fixed cylindrical protection volume.

use super::vertical::theta_h;
use crate::geometry::{tccpa, theta_d, Vect3, Velocity};
use crate::loss::{ConflictData, LossData};
use crate::numeric::{almost_equals, sq};
use crate::units::{from_ft, from_nmi, to_ft, to_nmi};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Near mid-air collision cylinder radius (500 ft).
pub const NMAC_D: f64 = 152.4;
/// Near mid-air collision cylinder half height (100 ft).
pub const NMAC_H: f64 = 30.48;

/// Cylinder of radius `d` and half height `h` around ownship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdCylinder {
    pub d: f64,
    pub h: f64,
    #[serde(default)]
    pub id: String,
}

impl Default for CdCylinder {
    fn default() -> Self {
        Self::new(from_nmi(5.0), from_ft(1000.0))
    }
}

impl CdCylinder {
    pub fn new(d: f64, h: f64) -> Self {
        Self {
            d,
            h,
            id: String::new(),
        }
    }

    /// Near mid-air collision volume.
    pub fn nmac() -> Self {
        Self::new(NMAC_D, NMAC_H)
    }

    pub fn violation(&self, so: &Vect3, _vo: &Velocity, si: &Vect3, _vi: &Velocity) -> bool {
        let s = *so - *si;
        s.vect2().sqv() < sq(self.d) && s.z.abs() < self.h
    }

    /// Interval within `[b, t]` during which the relative trajectory is
    /// strictly inside the cylinder.
    pub fn loss_interval(
        &self,
        so: &Vect3,
        vo: &Velocity,
        si: &Vect3,
        vi: &Velocity,
        b: f64,
        t: f64,
    ) -> LossData {
        let s = *so - *si;
        let v = *vo - *vi;
        let (s2, v2) = (s.vect2(), v.vect2());

        let (hin, hout) = if almost_equals(v2.sqv(), 0.0) {
            if s2.sqv() < sq(self.d) {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                return LossData::new(t, b);
            }
        } else {
            match (theta_d(&s2, &v2, -1, self.d), theta_d(&s2, &v2, 1, self.d)) {
                (Some(tin), Some(tout)) => (tin, tout),
                _ => return LossData::new(t, b),
            }
        };
        let (vin, vout) = if almost_equals(v.z, 0.0) {
            if s.z.abs() < self.h {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                return LossData::new(t, b);
            }
        } else {
            (theta_h(s.z, v.z, -1, self.h), theta_h(s.z, v.z, 1, self.h))
        };

        let tin = b.max(hin).max(vin);
        let tout = t.min(hout).min(vout);
        if tin < tout {
            LossData::new(tin, tout)
        } else {
            LossData::new(t, b)
        }
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
        let ld = self.loss_interval(so, vo, si, vi, b, t);
        let s = *so - *si;
        let tcpa = tccpa(&s, vo, vi, self.d, self.h);
        let t_crit = if ld.conflict() {
            tcpa.clamp(ld.time_in(), ld.time_out())
        } else {
            tcpa.clamp(b, t.max(b))
        };
        let dist = (*vo - *vi).scal_add(t_crit, &s).cyl_norm(self.d, self.h);
        ConflictData::new(ld, t_crit, dist)
    }
}

impl fmt::Display for CdCylinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.id.is_empty() {
            write!(f, "{} = ", self.id)?;
        }
        write!(
            f,
            "CDCylinder: {{D = {:.3} [nmi], H = {:.1} [ft]}}",
            to_nmi(self.d),
            to_ft(self.h)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_through_cylinder() {
        let cyl = CdCylinder::new(1000.0, 100.0);
        let so = Vect3::new(-5000.0, 0.0, 0.0);
        let vo = Vect3::new(100.0, 0.0, 0.0);
        let cd = cyl.conflict_detection(&so, &vo, &Vect3::ZERO, &Vect3::ZERO, 0.0, 300.0);
        assert!(cd.conflict());
        assert!((cd.time_in() - 40.0).abs() < 1e-9);
        assert!((cd.time_out() - 60.0).abs() < 1e-9);
        assert!((cd.critical_time() - 50.0).abs() < 1e-6);
        assert!(cd.distance_at_critical_time() < 1e-9);
    }

    #[test]
    fn test_window_clips_interval() {
        let cyl = CdCylinder::new(1000.0, 100.0);
        let so = Vect3::new(-5000.0, 0.0, 0.0);
        let vo = Vect3::new(100.0, 0.0, 0.0);
        let cd = cyl.conflict_detection(&so, &vo, &Vect3::ZERO, &Vect3::ZERO, 0.0, 45.0);
        assert!(cd.conflict());
        assert_eq!(cd.time_out(), 45.0);
        assert!(!cyl
            .conflict_detection(&so, &vo, &Vect3::ZERO, &Vect3::ZERO, 0.0, 30.0)
            .conflict());
    }

    #[test]
    fn test_vertical_pass_above() {
        let cyl = CdCylinder::nmac();
        let so = Vect3::new(-5000.0, 0.0, 200.0);
        let vo = Vect3::new(100.0, 0.0, 0.0);
        assert!(!cyl
            .conflict_detection(&so, &vo, &Vect3::ZERO, &Vect3::ZERO, 0.0, 300.0)
            .conflict());
        assert!(!cyl.violation(&Vect3::new(0.0, 0.0, 200.0), &vo, &Vect3::ZERO, &Vect3::ZERO));
    }
}
