//! Constant-rate ownship maneuvers in the local Euclidean frame.
//!
//! Each maneuver starts at `t = 0` from a position/velocity pair and returns
//! the pair reached after `t` seconds.

use crate::geometry::{Vect3, Velocity};
use crate::units::G;

/// Turn rate (rad/s) for a coordinated turn at `gs` with bank angle `bank`.
pub fn turn_rate(gs: f64, bank: f64) -> f64 {
    if bank.abs() < f64::EPSILON {
        return 0.0;
    }
    G * bank.abs().tan() / gs
}

/// Turn radius for a coordinated turn at `gs` with bank angle `bank`.
pub fn turn_radius(gs: f64, bank: f64) -> f64 {
    let tan_bank = bank.abs().tan();
    if tan_bank < f64::EPSILON {
        return f64::INFINITY;
    }
    gs * gs / (G * tan_bank)
}

/// Bank angle required to turn at `omega` rad/s with ground speed `gs`.
pub fn bank_angle(gs: f64, omega: f64) -> f64 {
    (omega * gs / G).atan()
}

/// Constant turn at `omega` rad/s; positive turns right (track increasing).
pub fn turn(s: &Vect3, v: &Velocity, t: f64, omega: f64) -> (Vect3, Velocity) {
    let gs = v.gs();
    if t == 0.0 || gs == 0.0 || omega == 0.0 || !omega.is_finite() {
        return (s.linear(v, t), *v);
    }
    let trk0 = v.trk();
    let trk = trk0 + omega * t;
    let r = gs / omega;
    let pos = Vect3::new(
        s.x + r * (trk0.cos() - trk.cos()),
        s.y + r * (trk.sin() - trk0.sin()),
        s.z + v.z * t,
    );
    (pos, Vect3::from_trk_gs_vs(trk, gs, v.z))
}

/// Constant ground speed acceleration along the current track. Ground speed
/// stops at zero when decelerating.
pub fn gs_accel(s: &Vect3, v: &Velocity, t: f64, a: f64) -> (Vect3, Velocity) {
    let gs0 = v.gs();
    let trk = v.trk();
    let (dist, gs) = if a < 0.0 && gs0 + a * t < 0.0 {
        let t_stop = -gs0 / a;
        (gs0 * t_stop / 2.0, 0.0)
    } else {
        (gs0 * t + 0.5 * a * t * t, gs0 + a * t)
    };
    let pos = Vect3::new(
        s.x + dist * trk.sin(),
        s.y + dist * trk.cos(),
        s.z + v.z * t,
    );
    (pos, Vect3::from_trk_gs_vs(trk, gs, v.z))
}

/// Constant vertical acceleration, horizontal velocity held.
pub fn vs_accel(s: &Vect3, v: &Velocity, t: f64, a: f64) -> (Vect3, Velocity) {
    let pos = Vect3::new(
        s.x + v.x * t,
        s.y + v.y * t,
        s.z + v.z * t + 0.5 * a * t * t,
    );
    (pos, Vect3::new(v.x, v.y, v.z + a * t))
}

/// Vertical profile that captures a target altitude: accelerate to the climb
/// rate, hold it, then decelerate to level flight exactly at the target.
/// A zero climb rate means the altitude change is taken as instantaneous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelOutProfile {
    z0: f64,
    target: f64,
    dir: f64,
    u0: f64,
    peak: f64,
    accel: f64,
    t1: f64,
    t2: f64,
    total: f64,
}

impl LevelOutProfile {
    /// Build the profile, or `None` when the target cannot be captured
    /// (no acceleration available or already too fast to stop in time).
    pub fn new(z0: f64, vz0: f64, climb_rate: f64, target: f64, accel: f64) -> Option<Self> {
        let dist = target - z0;
        let dir = if dist >= 0.0 { 1.0 } else { -1.0 };
        let d = dist.abs();
        let u0 = dir * vz0;
        if climb_rate <= 0.0 || (d == 0.0 && u0 == 0.0) {
            return Some(Self {
                z0,
                target,
                dir,
                u0,
                peak: 0.0,
                accel,
                t1: 0.0,
                t2: 0.0,
                total: 0.0,
            });
        }
        if accel <= 0.0 {
            return None;
        }
        let rate = climb_rate.max(u0);
        let d1 = (rate * rate - u0 * u0) / (2.0 * accel);
        let d3 = rate * rate / (2.0 * accel);
        let (peak, t2) = if d1 + d3 <= d {
            (rate, (d - d1 - d3) / rate)
        } else {
            if u0 > 0.0 && u0 * u0 / (2.0 * accel) > d {
                return None;
            }
            (((2.0 * accel * d + u0 * u0) / 2.0).sqrt(), 0.0)
        };
        let t1 = (peak - u0) / accel;
        let t3 = peak / accel;
        Some(Self {
            z0,
            target,
            dir,
            u0,
            peak,
            accel,
            t1,
            t2,
            total: t1 + t2 + t3,
        })
    }

    /// Time needed to level at the target altitude.
    pub fn total_time(&self) -> f64 {
        self.total
    }

    /// Altitude and vertical speed at time `t`.
    pub fn state_at(&self, t: f64) -> (f64, f64) {
        if t >= self.total {
            return (self.target, 0.0);
        }
        let a = self.accel;
        let (x, u) = if t <= self.t1 {
            (self.u0 * t + 0.5 * a * t * t, self.u0 + a * t)
        } else {
            let d1 = (self.peak * self.peak - self.u0 * self.u0) / (2.0 * a);
            if t <= self.t1 + self.t2 {
                (d1 + self.peak * (t - self.t1), self.peak)
            } else {
                let tau = t - self.t1 - self.t2;
                (
                    d1 + self.peak * self.t2 + self.peak * tau - 0.5 * a * tau * tau,
                    self.peak - a * tau,
                )
            }
        };
        (self.z0 + self.dir * x, self.dir * u)
    }
}

/// State at time `t` along the level-out maneuver to `target`.
pub fn vs_level_out(
    s: &Vect3,
    v: &Velocity,
    t: f64,
    climb_rate: f64,
    target: f64,
    accel: f64,
) -> Option<(Vect3, Velocity)> {
    let profile = LevelOutProfile::new(s.z, v.z, climb_rate, target, accel)?;
    let (z, vz) = profile.state_at(t);
    Some((
        Vect3::new(s.x + v.x * t, s.y + v.y * t, z),
        Vect3::new(v.x, v.y, vz),
    ))
}

/// Final leveled state and the time at which it is reached.
pub fn vs_level_out_final(
    s: &Vect3,
    v: &Velocity,
    climb_rate: f64,
    target: f64,
    accel: f64,
) -> Option<(Vect3, Velocity, f64)> {
    let profile = LevelOutProfile::new(s.z, v.z, climb_rate, target, accel)?;
    let t = profile.total_time();
    Some((
        Vect3::new(s.x + v.x * t, s.y + v.y * t, target),
        Vect3::new(v.x, v.y, 0.0),
        t,
    ))
}

/// Time to level at `target`, `None` when unreachable.
pub fn vs_level_out_time(
    s: &Vect3,
    v: &Velocity,
    climb_rate: f64,
    target: f64,
    accel: f64,
) -> Option<f64> {
    LevelOutProfile::new(s.z, v.z, climb_rate, target, accel).map(|p| p.total_time())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_half_turn_reverses_track() {
        let v = Vect3::from_trk_gs_vs(0.0, 100.0, 0.0);
        let omega = 0.05;
        let (p, nv) = turn(&Vect3::ZERO, &v, PI / omega, omega);
        // Right turn from north ends heading south, displaced east by a diameter.
        assert!((p.x - 2.0 * 100.0 / omega).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!((nv.trk() - PI).abs() < 1e-9);
        assert!((nv.gs() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_turn_rate_and_bank_are_inverse() {
        let gs = 80.0;
        let bank = 30_f64.to_radians();
        let omega = turn_rate(gs, bank);
        assert!((bank_angle(gs, omega) - bank).abs() < 1e-12);
        assert!((turn_radius(gs, bank) - gs / omega).abs() < 1e-9);
    }

    #[test]
    fn test_gs_accel_stops_at_zero() {
        let v = Vect3::from_trk_gs_vs(PI / 2.0, 10.0, 0.0);
        let (p, nv) = gs_accel(&Vect3::ZERO, &v, 20.0, -1.0);
        assert!((p.x - 50.0).abs() < 1e-9);
        assert_eq!(nv.gs(), 0.0);
    }

    #[test]
    fn test_vs_accel() {
        let (p, nv) = vs_accel(&Vect3::ZERO, &Vect3::new(1.0, 0.0, 0.0), 10.0, 2.0);
        assert_eq!(p, Vect3::new(10.0, 0.0, 100.0));
        assert_eq!(nv.z, 20.0);
    }

    #[test]
    fn test_level_out_trapezoid() {
        // 0 -> 1000 m at 10 m/s with 2 m/s^2: 5 s up, 95 s cruise, 5 s down.
        let profile = LevelOutProfile::new(0.0, 0.0, 10.0, 1000.0, 2.0);
        let Some(profile) = profile else {
            panic!("profile should be feasible");
        };
        assert!((profile.total_time() - 105.0).abs() < 1e-9);
        let (z, vz) = profile.state_at(50.0);
        assert!((z - 475.0).abs() < 1e-9);
        assert_eq!(vz, 10.0);
        assert_eq!(profile.state_at(200.0), (1000.0, 0.0));
    }

    #[test]
    fn test_level_out_descending_triangle() {
        let Some(profile) = LevelOutProfile::new(100.0, 0.0, 50.0, 0.0, 2.0) else {
            panic!("profile should be feasible");
        };
        // Never reaches the climb rate: peak sqrt(200) m/s at mid descent.
        let total = profile.total_time();
        assert!((total - 200_f64.sqrt()).abs() < 1e-9);
        let (z, vz) = profile.state_at(total / 2.0);
        assert!((z - 50.0).abs() < 1e-9);
        assert!((vz + 200_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_level_out_infeasible_when_overshooting() {
        assert!(LevelOutProfile::new(0.0, 20.0, 10.0, 10.0, 1.0).is_none());
        assert!(vs_level_out_time(&Vect3::ZERO, &Vect3::ZERO, 10.0, 100.0, 0.0).is_none());
    }

    #[test]
    fn test_zero_climb_rate_is_instantaneous() {
        let s = Vect3::new(0.0, 0.0, 100.0);
        let v = Vect3::new(5.0, 0.0, 0.0);
        let Some((p, nv, t)) = vs_level_out_final(&s, &v, 0.0, 500.0, 2.0) else {
            panic!("instantaneous level out is always feasible");
        };
        assert_eq!(t, 0.0);
        assert_eq!(p, Vect3::new(0.0, 0.0, 500.0));
        assert_eq!(nv.z, 0.0);
    }
}
