//! Unit conversions. Everything inside the core is SI: meters, meters per
//! second, radians, seconds.

pub const FT: f64 = 0.3048;
pub const NMI: f64 = 1852.0;
pub const KNOT: f64 = NMI / 3600.0;
pub const FPM: f64 = FT / 60.0;
pub const DEG: f64 = std::f64::consts::PI / 180.0;

/// Standard gravity (m/s^2).
pub const G: f64 = 9.80665;

pub fn from_ft(val: f64) -> f64 {
    val * FT
}

pub fn to_ft(val: f64) -> f64 {
    val / FT
}

pub fn from_nmi(val: f64) -> f64 {
    val * NMI
}

pub fn to_nmi(val: f64) -> f64 {
    val / NMI
}

pub fn from_knots(val: f64) -> f64 {
    val * KNOT
}

pub fn to_knots(val: f64) -> f64 {
    val / KNOT
}

pub fn from_fpm(val: f64) -> f64 {
    val * FPM
}

pub fn to_fpm(val: f64) -> f64 {
    val / FPM
}

pub fn from_deg(val: f64) -> f64 {
    val * DEG
}

pub fn to_deg(val: f64) -> f64 {
    val / DEG
}

/// Unit symbols accepted by [`from_unit`] and [`to_unit`].
pub fn factor(unit: &str) -> Option<f64> {
    match unit {
        "m" | "m/s" | "m/s^2" | "s" | "rad" | "rad/s" | "unitless" => Some(1.0),
        "ft" => Some(FT),
        "nmi" | "NM" => Some(NMI),
        "km" => Some(1000.0),
        "kn" | "knot" => Some(KNOT),
        "fpm" | "ft/min" => Some(FPM),
        "deg" => Some(DEG),
        "deg/s" => Some(DEG),
        "G" => Some(G),
        "min" => Some(60.0),
        _ => None,
    }
}

/// Convert `val` expressed in `unit` into internal units.
pub fn from_unit(unit: &str, val: f64) -> Option<f64> {
    factor(unit).map(|f| val * f)
}

/// Convert `val` in internal units into `unit`.
pub fn to_unit(unit: &str, val: f64) -> Option<f64> {
    factor(unit).map(|f| val / f)
}
