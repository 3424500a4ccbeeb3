//! Vertical well-clear test based on time to co-altitude.

use crate::numeric::{almost_equals, sign};

/// Time to reach relative altitude `eps * H` (sign taken from `vz`).
pub fn theta_h(sz: f64, vz: f64, eps: i32, h: f64) -> f64 {
    (f64::from(eps * sign(vz)) * h - sz) / vz
}

/// Time to co-altitude, meaningful only when the aircraft are converging.
pub fn tcoa(sz: f64, vz: f64) -> f64 {
    -sz / vz
}

/// Vertical well-clear violation for relative altitude `sz` and rate `vz`.
pub fn vertical_wcv(zthr: f64, tcoa_thr: f64, sz: f64, vz: f64) -> bool {
    sz.abs() <= zthr || (!almost_equals(vz, 0.0) && sz * vz <= 0.0 && tcoa(sz, vz) <= tcoa_thr)
}

/// Interval within `[b, t]` during which the vertical test holds. Returned as
/// `(time_in, time_out)`; empty when `time_in > time_out`.
pub fn vertical_wcv_interval(zthr: f64, tcoa_thr: f64, b: f64, t: f64, sz: f64, vz: f64) -> (f64, f64) {
    if almost_equals(vz, 0.0) {
        return if sz.abs() <= zthr { (b, t) } else { (t, b) };
    }
    let act_h = zthr.max(vz.abs() * tcoa_thr);
    let tentry = theta_h(sz, vz, -1, act_h);
    let texit = theta_h(sz, vz, 1, zthr);
    if t < tentry || texit < b {
        return (t, b);
    }
    (b.max(tentry), t.min(texit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_aircraft_inside_or_outside() {
        assert_eq!(vertical_wcv_interval(100.0, 0.0, 0.0, 60.0, 50.0, 0.0), (0.0, 60.0));
        let (tin, tout) = vertical_wcv_interval(100.0, 0.0, 0.0, 60.0, 500.0, 0.0);
        assert!(tin > tout);
    }

    #[test]
    fn test_converging_vertically() {
        // 500 m above, closing at 10 m/s: inside 100 m band from 40 s to 60 s.
        let (tin, tout) = vertical_wcv_interval(100.0, 0.0, 0.0, 120.0, 500.0, -10.0);
        assert!((tin - 40.0).abs() < 1e-9);
        assert!((tout - 60.0).abs() < 1e-9);
        assert!(!vertical_wcv(100.0, 0.0, 500.0, -10.0));
        assert!(vertical_wcv(100.0, 60.0, 500.0, -10.0));
    }

    #[test]
    fn test_tcoa_threshold_widens_entry() {
        let (tin, _) = vertical_wcv_interval(100.0, 20.0, 0.0, 120.0, 500.0, -10.0);
        assert!((tin - 30.0).abs() < 1e-9);
    }
}
