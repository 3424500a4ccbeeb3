//! Interval algebra for bands.
//!
//! [`IntervalSet`] keeps closed intervals sorted and disjoint. The `almost_*`
//! operations treat gaps and overlaps below [`PRECISION_DEFAULT`] as noise.
//! [`Integerval`] runs are the integer step ranges produced by the trajectory
//! search before they are mapped back to physical units.

use crate::numeric::{almost_equals, almost_leq, almost_less, to_2pi, PRECISION_DEFAULT};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Closed interval `[low, up]`; empty when `low > up`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub up: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval { low: 0.0, up: -1.0 };

    pub fn new(low: f64, up: f64) -> Self {
        Self { low, up }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.up
    }

    /// Closed membership.
    pub fn in_cc(&self, x: f64) -> bool {
        self.low <= x && x <= self.up
    }

    /// Open membership.
    pub fn in_oo(&self, x: f64) -> bool {
        self.low < x && x < self.up
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else {
            write!(f, "[{:.4}, {:.4}]", self.low, self.up)
        }
    }
}

/// Ordered set of disjoint closed intervals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntervalSet {
    r: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.r.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn get(&self, i: usize) -> Option<Interval> {
        self.r.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.r.iter()
    }

    /// Closed membership in any interval.
    pub fn in_set(&self, x: f64) -> bool {
        self.r.iter().any(|i| i.in_cc(x))
    }

    /// Add `[lb, ub]`, merging every interval it overlaps or touches.
    pub fn union(&mut self, lb: f64, ub: f64) {
        if lb > ub {
            return;
        }
        self.insert_merging(lb, ub, |a, b| a < b);
    }

    /// Add `[lb, ub]`, merging intervals separated by an almost-zero gap.
    /// Bounds that are almost equal but inverted are taken as a point.
    pub fn almost_add(&mut self, lb: f64, ub: f64) {
        if lb > ub && !almost_equals(lb, ub) {
            return;
        }
        self.insert_merging(lb, ub.max(lb), |a, b| almost_less(a, b, PRECISION_DEFAULT));
    }

    fn insert_merging(&mut self, lb: f64, ub: f64, before: impl Fn(f64, f64) -> bool) {
        let (mut lo, mut hi) = (lb, ub);
        let mut out = Vec::with_capacity(self.r.len() + 1);
        let mut pending = true;
        for iv in std::mem::take(&mut self.r) {
            if before(iv.up, lo) {
                out.push(iv);
            } else if before(hi, iv.low) {
                if pending {
                    out.push(Interval::new(lo, hi));
                    pending = false;
                }
                out.push(iv);
            } else {
                lo = lo.min(iv.low);
                hi = hi.max(iv.up);
            }
        }
        if pending {
            out.push(Interval::new(lo, hi));
        }
        self.r = out;
    }

    /// Intersection, keeping pieces whose bounds are almost ordered.
    pub fn almost_intersect(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = IntervalSet::new();
        let (mut i, mut j) = (0, 0);
        while i < self.r.len() && j < other.r.len() {
            let a = self.r[i];
            let b = other.r[j];
            let lo = a.low.max(b.low);
            let hi = a.up.min(b.up);
            if almost_leq(lo, hi, PRECISION_DEFAULT) {
                out.almost_add(lo, hi.max(lo));
            }
            if a.up < b.up {
                i += 1;
            } else {
                j += 1;
            }
        }
        out
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (n, iv) in self.r.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", iv)?;
        }
        write!(f, ">")
    }
}

/// Integer step interval `[lb, ub]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integerval {
    pub lb: i32,
    pub ub: i32,
}

impl Integerval {
    pub fn new(lb: i32, ub: i32) -> Self {
        Self { lb, ub }
    }
}

impl fmt::Display for Integerval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.lb, self.ub)
    }
}

/// Mirror a list of runs about zero, keeping it sorted.
pub fn neg(l: &mut [Integerval]) {
    l.reverse();
    for iv in l.iter_mut() {
        *iv = Integerval::new(-iv.ub, -iv.lb);
    }
}

/// Append `r` to `l`, fusing the seam when the runs are adjacent.
pub fn append_intband(l: &mut Vec<Integerval>, mut r: Vec<Integerval>) {
    if let (Some(last), Some(first)) = (l.last_mut(), r.first()) {
        if first.lb - last.ub <= 1 {
            last.ub = first.ub;
            r.remove(0);
        }
    }
    l.extend(r);
}

/// Map runs to `[scal * lb + add, scal * ub + add]`, clipped to `[min, max]`.
pub fn to_interval_set(l: &[Integerval], scal: f64, add: f64, min: f64, max: f64) -> IntervalSet {
    let mut set = IntervalSet::new();
    for iv in l {
        let lb = scal * f64::from(iv.lb) + add;
        let ub = scal * f64::from(iv.ub) + add;
        if min <= ub && lb <= max {
            set.almost_add(min.max(lb), max.min(ub));
        }
    }
    set
}

/// Map runs to angles and wrap them into `[0, 2*pi]`.
pub fn to_interval_set_0_2pi(l: &[Integerval], scal: f64, add: f64) -> IntervalSet {
    let twopi = 2.0 * PI;
    let mut set = IntervalSet::new();
    for iv in l {
        let mut lb = scal * f64::from(iv.lb) + add;
        let mut ub = scal * f64::from(iv.ub) + add;
        if 0.0 <= lb && ub <= twopi {
            set.almost_add(lb, ub);
        } else if ub < 0.0 || lb > twopi {
            set.almost_add(to_2pi(lb), to_2pi(ub));
        } else {
            if lb < 0.0 {
                set.almost_add(to_2pi(lb), twopi);
                lb = 0.0;
            }
            if ub > twopi {
                set.almost_add(0.0, to_2pi(ub));
                ub = twopi;
            }
            set.almost_add(lb, ub);
        }
    }
    set
}
