//! Repulsiveness criteria used to keep bands from offering maneuvers that
//! converge again on the most urgent aircraft.
//!
//! `s` is always ownship minus traffic; `vo`/`vi` are ownship and traffic
//! velocities, `nvo` a candidate ownship velocity.

use crate::detector::NMAC_H;
use crate::geometry::{Vect2, Vect3, Velocity};
use crate::numeric::sign;

/// Horizontal sense (+1 / -1) in which the relative velocity rotates about
/// the relative position.
pub fn horizontal_coordination(s: &Vect2, v: &Vect2) -> i32 {
    sign(s.det(v))
}

/// Vertical sense ownship should take against an aircraft that may already
/// be in loss of separation. Ties are broken by identifier so that both
/// aircraft pick opposite senses.
pub fn vertical_coordination_los(
    s: &Vect3,
    vo: &Velocity,
    vi: &Velocity,
    own_id: &str,
    ac_id: &str,
) -> i32 {
    if s.z.abs() >= NMAC_H {
        return sign(s.z);
    }
    let vz = vo.z - vi.z;
    if vz != 0.0 {
        return sign(vz);
    }
    if own_id <= ac_id {
        1
    } else {
        -1
    }
}

/// True when switching ownship from `vo` to `nvo` does not bring the relative
/// trajectory closer in the horizontal sense `eps`.
pub fn horizontal_new_repulsive_criterion(
    s: &Vect2,
    vo: &Vect2,
    vi: &Vect2,
    nvo: &Vect2,
    eps: i32,
) -> bool {
    let v = *vo - *vi;
    let nv = *nvo - *vi;
    let e = f64::from(eps);
    let diverging = s.dot(&nv) >= 0.0 && s.dot(&nv) >= s.dot(&v);
    let turning_away = e * s.det(&nv) > 0.0 && e * v.det(&nv) <= 0.0;
    diverging || turning_away
}

/// True when `nvo` moves the relative vertical speed in sense `eps` and the
/// relative trajectory is, or becomes, separated in that sense.
pub fn vertical_new_repulsive_criterion(
    s: &Vect3,
    vo: &Velocity,
    vi: &Velocity,
    nvo: &Velocity,
    eps: i32,
) -> bool {
    let v = *vo - *vi;
    let nv = *nvo - *vi;
    let e = f64::from(eps);
    e * (nv.z - v.z) >= 0.0 && (e * nv.z > 0.0 || e * s.z > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_coordination_sides() {
        // Intruder passing to the west, closing from the north.
        let s = Vect2::new(0.0, -1000.0);
        let v = Vect2::new(10.0, 100.0);
        assert_eq!(horizontal_coordination(&s, &v), 1);
        assert_eq!(horizontal_coordination(&s, &Vect2::new(-10.0, 100.0)), -1);
    }

    #[test]
    fn test_horizontal_repulsive_divergence() {
        let s = Vect2::new(0.0, -1000.0);
        let vo = Vect2::new(0.0, 100.0);
        let vi = Vect2::ZERO;
        // Reversing course opens the range.
        assert!(horizontal_new_repulsive_criterion(
            &s,
            &vo,
            &vi,
            &Vect2::new(0.0, -100.0),
            1
        ));
    }

    #[test]
    fn test_horizontal_repulsive_turn_direction() {
        let s = Vect2::new(0.0, -1000.0);
        let vo = Vect2::new(10.0, 100.0);
        let vi = Vect2::ZERO;
        let eps = horizontal_coordination(&s, &(vo - vi));
        // Turning further away from the intruder is repulsive.
        assert!(horizontal_new_repulsive_criterion(
            &s,
            &vo,
            &vi,
            &Vect2::new(30.0, 95.0),
            eps
        ));
        // Turning back across its nose is not.
        assert!(!horizontal_new_repulsive_criterion(
            &s,
            &vo,
            &vi,
            &Vect2::new(-30.0, 95.0),
            eps
        ));
    }

    #[test]
    fn test_vertical_coordination() {
        let vo = Vect3::ZERO;
        let vi = Vect3::ZERO;
        assert_eq!(
            vertical_coordination_los(&Vect3::new(0.0, 0.0, 100.0), &vo, &vi, "a", "b"),
            1
        );
        assert_eq!(
            vertical_coordination_los(&Vect3::new(0.0, 0.0, -100.0), &vo, &vi, "a", "b"),
            -1
        );
        // Co-altitude, no vertical motion: opposite senses for the pair.
        let s = Vect3::new(100.0, 0.0, 0.0);
        let a = vertical_coordination_los(&s, &vo, &vi, "a", "b");
        let b = vertical_coordination_los(&(-s), &vi, &vo, "b", "a");
        assert_eq!(a, -b);
    }

    #[test]
    fn test_vertical_repulsive() {
        let s = Vect3::new(0.0, 0.0, 100.0);
        let vo = Vect3::ZERO;
        let vi = Vect3::ZERO;
        assert!(vertical_new_repulsive_criterion(
            &s,
            &vo,
            &vi,
            &Vect3::new(0.0, 0.0, 5.0),
            1
        ));
        assert!(!vertical_new_repulsive_criterion(
            &s,
            &vo,
            &vi,
            &Vect3::new(0.0, 0.0, -5.0),
            1
        ));
    }
}
