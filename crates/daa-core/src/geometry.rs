//! Vector algebra and closest-point-of-approach formulas.
//!
//! Coordinates are local Euclidean: `x` east, `y` north, `z` up. A velocity is
//! a [`Vect3`] in the same frame; track angles are measured clockwise from
//! true north.

use crate::numeric::{sq, to_2pi};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Horizontal vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vect2 {
    pub x: f64,
    pub y: f64,
}

/// Three dimensional vector, also used for velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vect3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Velocity alias for readability in signatures.
pub type Velocity = Vect3;

impl Vect2 {
    pub const ZERO: Vect2 = Vect2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vect2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Determinant (2D cross product) of `self` and `other`.
    pub fn det(&self, other: &Vect2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn sqv(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        self.sqv().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// `self * k + s`
    pub fn scal_add(&self, k: f64, s: &Vect2) -> Vect2 {
        Vect2::new(self.x * k + s.x, self.y * k + s.y)
    }
}

impl Vect3 {
    pub const ZERO: Vect3 = Vect3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Build a velocity from track (rad), ground speed (m/s) and vertical speed (m/s).
    pub fn from_trk_gs_vs(trk: f64, gs: f64, vs: f64) -> Self {
        Self::new(gs * trk.sin(), gs * trk.cos(), vs)
    }

    pub fn vect2(&self) -> Vect2 {
        Vect2::new(self.x, self.y)
    }

    pub fn dot(&self, other: &Vect3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn sqv(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        self.sqv().sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// `self * k + s`
    pub fn scal_add(&self, k: f64, s: &Vect3) -> Vect3 {
        Vect3::new(self.x * k + s.x, self.y * k + s.y, self.z * k + s.z)
    }

    /// Position after flying `v` for `t` seconds.
    pub fn linear(&self, v: &Velocity, t: f64) -> Vect3 {
        v.scal_add(t, self)
    }

    /// Cylindrical norm: 1.0 on the surface of the `d` x `h` cylinder.
    pub fn cyl_norm(&self, d: f64, h: f64) -> f64 {
        (self.vect2().sqv() / sq(d)).max(sq(self.z / h))
    }

    /// Track angle in `[0, 2*pi)`.
    pub fn trk(&self) -> f64 {
        to_2pi(self.x.atan2(self.y))
    }

    /// Ground speed.
    pub fn gs(&self) -> f64 {
        self.vect2().norm()
    }

    /// Vertical speed.
    pub fn vs(&self) -> f64 {
        self.z
    }
}

macro_rules! impl_vector_ops {
    ($t:ident { $($f:ident),+ }) => {
        impl Add for $t {
            type Output = $t;
            fn add(self, o: $t) -> $t {
                $t { $($f: self.$f + o.$f),+ }
            }
        }

        impl Sub for $t {
            type Output = $t;
            fn sub(self, o: $t) -> $t {
                $t { $($f: self.$f - o.$f),+ }
            }
        }

        impl Mul<f64> for $t {
            type Output = $t;
            fn mul(self, k: f64) -> $t {
                $t { $($f: self.$f * k),+ }
            }
        }

        impl Neg for $t {
            type Output = $t;
            fn neg(self) -> $t {
                $t { $($f: -self.$f),+ }
            }
        }
    };
}

impl_vector_ops!(Vect2 { x, y });
impl_vector_ops!(Vect3 { x, y, z });

/// Time of horizontal closest point of approach, 0 for zero relative velocity.
pub fn tcpa(s: &Vect2, v: &Vect2) -> f64 {
    if v.is_zero() {
        0.0
    } else {
        -s.dot(v) / v.sqv()
    }
}

/// Horizontal distance at closest point of approach.
pub fn dcpa(s: &Vect2, v: &Vect2) -> f64 {
    v.scal_add(tcpa(s, v), s).norm()
}

/// Discriminant of the horizontal circle crossing, `D^2 v^2 - det(s, v)^2`.
pub fn delta(s: &Vect2, v: &Vect2, d: f64) -> f64 {
    sq(d) * v.sqv() - sq(s.det(v))
}

/// Time at which the relative trajectory crosses the circle of radius `d`;
/// `eps = -1` for entry, `+1` for exit. `None` when there is no crossing.
pub fn theta_d(s: &Vect2, v: &Vect2, eps: i32, d: f64) -> Option<f64> {
    let a = v.sqv();
    let b = s.dot(v);
    let c = s.sqv() - sq(d);
    let disc = sq(b) - a * c;
    if a == 0.0 || disc < 0.0 {
        return None;
    }
    Some((-b + f64::from(eps) * disc.sqrt()) / a)
}

/// Time of closest cylindrical approach: minimizes the cylindrical norm of
/// `s + (vo - vi) t` over `t >= 0`.
pub fn tccpa(s: &Vect3, vo: &Velocity, vi: &Velocity, d: f64, h: f64) -> f64 {
    let v = *vo - *vi;
    // f(t) = max(p(t), q(t)), both convex quadratics in t.
    let (pa, pb, pc) = (
        v.vect2().sqv() / sq(d),
        2.0 * s.vect2().dot(&v.vect2()) / sq(d),
        s.vect2().sqv() / sq(d),
    );
    let (qa, qb, qc) = (sq(v.z / h), 2.0 * s.z * v.z / sq(h), sq(s.z / h));
    let norm_at = |t: f64| (pa * t * t + pb * t + pc).max(qa * t * t + qb * t + qc);

    let mut candidates = vec![0.0];
    if pa > 0.0 {
        candidates.push(-pb / (2.0 * pa));
    }
    if qa > 0.0 {
        candidates.push(-qb / (2.0 * qa));
    }
    let (ra, rb, rc) = (pa - qa, pb - qb, pc - qc);
    if ra.abs() > f64::EPSILON {
        let disc = rb * rb - 4.0 * ra * rc;
        if disc >= 0.0 {
            candidates.push((-rb - disc.sqrt()) / (2.0 * ra));
            candidates.push((-rb + disc.sqrt()) / (2.0 * ra));
        }
    } else if rb.abs() > f64::EPSILON {
        candidates.push(-rc / rb);
    }

    candidates
        .into_iter()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .fold((0.0, norm_at(0.0)), |(best_t, best), t| {
            let n = norm_at(t);
            if n < best {
                (t, n)
            } else {
                (best_t, best)
            }
        })
        .0
}
