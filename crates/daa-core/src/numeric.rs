//! Floating point comparisons tolerant of accumulated rounding noise.
//!
//! Tolerances are relative to the larger magnitude with an absolute floor of
//! one: values below one unit (seconds, meters) compare within `prec`
//! absolute.

use std::f64::consts::PI;

/// Default relative tolerance used by interval bookkeeping and loss snapping.
pub const PRECISION_DEFAULT: f64 = 1e-9;
/// Coarse tolerance used when ranking aircraft by closest approach.
pub const PRECISION5: f64 = 1e-5;

/// True when `a` and `b` agree within [`PRECISION_DEFAULT`].
pub fn almost_equals(a: f64, b: f64) -> bool {
    almost_equals_prec(a, b, PRECISION_DEFAULT)
}

/// True when `a` and `b` agree within `prec`, relative to the larger magnitude
/// (absolute for magnitudes below one).
pub fn almost_equals_prec(a: f64, b: f64, prec: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= prec * a.abs().max(b.abs()).max(1.0)
}

/// Strictly less and not almost equal.
pub fn almost_less(a: f64, b: f64, prec: f64) -> bool {
    a < b && !almost_equals_prec(a, b, prec)
}

/// Less than or almost equal.
pub fn almost_leq(a: f64, b: f64, prec: f64) -> bool {
    a <= b || almost_equals_prec(a, b, prec)
}

pub fn sq(x: f64) -> f64 {
    x * x
}

/// Sign with zero mapped to +1.
pub fn sign(x: f64) -> i32 {
    if x >= 0.0 {
        1
    } else {
        -1
    }
}

/// Normalize an angle into `[0, 2*pi)`.
pub fn to_2pi(rad: f64) -> f64 {
    let r = rad.rem_euclid(2.0 * PI);
    if r >= 2.0 * PI {
        0.0
    } else {
        r
    }
}

/// Normalize an angle into `(-pi, pi]`.
pub fn to_pi(rad: f64) -> f64 {
    let r = to_2pi(rad);
    if r > PI {
        r - 2.0 * PI
    } else {
        r
    }
}
