//! Conflict detectors.
//!
//! A [`Detector`] is a plain value: cloning it yields an independent copy, so
//! sessions and threshold tables never share detector state.

pub mod cylinder;
pub mod vertical;
pub mod wcv;

pub use cylinder::{CdCylinder, NMAC_D, NMAC_H};
pub use wcv::{TimeVariable, Wcv, WcvTable};

use crate::geometry::{Vect3, Velocity};
use crate::loss::ConflictData;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interchangeable state-based conflict detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Detector {
    Wcv(Wcv),
    Cylinder(CdCylinder),
}

impl Default for Detector {
    fn default() -> Self {
        Detector::Wcv(Wcv::default())
    }
}

impl Detector {
    /// Instantaneous loss of separation.
    pub fn violation(&self, so: &Vect3, vo: &Velocity, si: &Vect3, vi: &Velocity) -> bool {
        match self {
            Detector::Wcv(d) => d.violation(so, vo, si, vi),
            Detector::Cylinder(d) => d.violation(so, vo, si, vi),
        }
    }

    /// Violation interval within the relative window `[b, t]`.
    pub fn conflict_detection(
        &self,
        so: &Vect3,
        vo: &Velocity,
        si: &Vect3,
        vi: &Velocity,
        b: f64,
        t: f64,
    ) -> ConflictData {
        match self {
            Detector::Wcv(d) => d.conflict_detection(so, vo, si, vi, b, t),
            Detector::Cylinder(d) => d.conflict_detection(so, vo, si, vi, b, t),
        }
    }

    pub fn conflict(
        &self,
        so: &Vect3,
        vo: &Velocity,
        si: &Vect3,
        vi: &Velocity,
        b: f64,
        t: f64,
    ) -> bool {
        self.conflict_detection(so, vo, si, vi, b, t).conflict()
    }

    pub fn identifier(&self) -> &str {
        match self {
            Detector::Wcv(d) => &d.id,
            Detector::Cylinder(d) => &d.id,
        }
    }

    pub fn set_identifier(&mut self, id: impl Into<String>) {
        match self {
            Detector::Wcv(d) => d.id = id.into(),
            Detector::Cylinder(d) => d.id = id.into(),
        }
    }

    /// Well-clear table, when this is a well-clear detector.
    pub fn wcv_table(&self) -> Option<&WcvTable> {
        match self {
            Detector::Wcv(d) => Some(&d.table),
            Detector::Cylinder(_) => None,
        }
    }
}

impl From<Wcv> for Detector {
    fn from(d: Wcv) -> Self {
        Detector::Wcv(d)
    }
}

impl From<CdCylinder> for Detector {
    fn from(d: CdCylinder) -> Self {
        Detector::Cylinder(d)
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detector::Wcv(d) => d.fmt(f),
            Detector::Cylinder(d) => d.fmt(f),
        }
    }
}
