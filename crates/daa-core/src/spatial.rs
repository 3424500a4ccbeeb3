//! Geodetic helpers and the local East-North-Up projection used to place
//! aircraft into the ownship-centered Euclidean frame.

use crate::geometry::{Vect3, Velocity};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

// ==== ENU (East-North-Up) Coordinate Conversion ====

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Calculate bearing from point 1 to point 2 in radians.
/// Returns bearing in radians, 0 = north, π/2 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Offset a position by distance and bearing along a great circle.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// Local tangent-plane projection about a reference point.
///
/// Altitude passes through unchanged, so the reference point itself maps to
/// `(0, 0, alt)`. Velocities are already expressed east/north/up and are
/// frame invariant under this projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnuProjection {
    ref_lat: f64,
    ref_lon: f64,
    m_per_deg_lat: f64,
    m_per_deg_lon: f64,
}

impl EnuProjection {
    pub fn new(ref_lat: f64, ref_lon: f64) -> Self {
        Self {
            ref_lat,
            ref_lon,
            m_per_deg_lat: meters_per_deg_lat(ref_lat),
            m_per_deg_lon: meters_per_deg_lon(ref_lat).max(1e-9),
        }
    }

    /// Project a geodetic point (degrees, meters) into the local frame.
    pub fn project(&self, lat: f64, lon: f64, alt_m: f64) -> Vect3 {
        let mut dlon = lon - self.ref_lon;
        if dlon > 180.0 {
            dlon -= 360.0;
        } else if dlon < -180.0 {
            dlon += 360.0;
        }
        Vect3::new(
            dlon * self.m_per_deg_lon,
            (lat - self.ref_lat) * self.m_per_deg_lat,
            alt_m,
        )
    }

    /// Inverse of [`EnuProjection::project`], returns `(lat, lon, alt)`.
    pub fn inverse(&self, s: &Vect3) -> (f64, f64, f64) {
        (
            self.ref_lat + s.y / self.m_per_deg_lat,
            self.ref_lon + s.x / self.m_per_deg_lon,
            s.z,
        )
    }

    pub fn project_velocity(&self, v: &Velocity) -> Velocity {
        *v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_projection_agrees_with_great_circle() {
        let proj = EnuProjection::new(33.95, -96.7);
        let (lat2, lon2) = offset_by_bearing(33.95, -96.7, 10_000.0, 206_f64.to_radians());
        let s = proj.project(lat2, lon2, 2651.76);
        assert!((s.vect2().norm() - 10_000.0).abs() < 50.0);
        assert!((s.z - 2651.76).abs() < 1e-12);

        let (lat, lon, alt) = proj.inverse(&s);
        assert!(haversine_distance(lat, lon, lat2, lon2) < 0.01);
        assert_eq!(alt, 2651.76);
    }

    #[test]
    fn test_reference_maps_to_origin() {
        let proj = EnuProjection::new(-12.0, 179.9);
        let s = proj.project(-12.0, 179.9, 100.0);
        assert_eq!(s, Vect3::new(0.0, 0.0, 100.0));
        // Crossing the antimeridian stays local.
        let east = proj.project(-12.0, -179.9, 0.0);
        assert!(east.x > 0.0 && east.x < 25_000.0);
    }

    #[test]
    fn test_bearing_matches_offset() {
        let (lat2, lon2) = offset_by_bearing(10.0, 20.0, 5_000.0, 1.0);
        assert!((bearing(10.0, 20.0, lat2, lon2) - 1.0).abs() < 1e-3);
    }
}
