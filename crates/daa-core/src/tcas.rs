//! TCAS II resolution advisory thresholds, used to default the minimum
//! separation targeted by recovery bands.

use crate::units::{from_ft, to_ft};

/// Sensitivity level for an altitude in meters.
pub fn sensitivity_level(alt_m: f64) -> usize {
    let alt_ft = to_ft(alt_m);
    match alt_ft {
        a if a < 1000.0 => 2,
        a if a < 2350.0 => 3,
        a if a < 5000.0 => 4,
        a if a < 10000.0 => 5,
        a if a < 20000.0 => 6,
        _ => 7,
    }
}

// Indexed by sensitivity level; levels below 3 issue no RA.
const HMD_RA_FT: [f64; 8] = [0.0, 0.0, 0.0, 1215.0, 2126.0, 3342.0, 4861.0, 6683.0];
const ZTHR_RA_FT: [f64; 8] = [0.0, 0.0, 0.0, 600.0, 600.0, 600.0, 600.0, 700.0];

/// RA horizontal miss distance filter threshold in meters.
pub fn ra_hmd(sl: usize) -> f64 {
    from_ft(HMD_RA_FT[sl.clamp(3, 7)])
}

/// RA vertical threshold in meters.
pub fn ra_zthr(sl: usize) -> f64 {
    from_ft(ZTHR_RA_FT[sl.clamp(3, 7)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitivity_levels() {
        assert_eq!(sensitivity_level(from_ft(500.0)), 2);
        assert_eq!(sensitivity_level(from_ft(2000.0)), 3);
        assert_eq!(sensitivity_level(from_ft(8700.0)), 5);
        assert_eq!(sensitivity_level(from_ft(35000.0)), 7);
    }

    #[test]
    fn test_thresholds_clamp_to_ra_levels() {
        assert_eq!(ra_hmd(2), ra_hmd(3));
        assert!((to_ft(ra_hmd(5)) - 3342.0).abs() < 1e-9);
        assert!((to_ft(ra_zthr(7)) - 700.0).abs() < 1e-9);
        assert_eq!(ra_zthr(9), ra_zthr(7));
    }
}
