//! Error types for the detect-and-avoid core.

use thiserror::Error;

/// Errors reported by sessions, parameter validation and the monitor facade.
#[derive(Debug, Error)]
pub enum DaaError {
    #[error("ownship state has not been set")]
    NoOwnship,

    #[error("no traffic aircraft loaded")]
    NoTraffic,

    #[error("aircraft index {index} out of bounds (aircraft list holds {len})")]
    AircraftIndex { index: usize, len: usize },

    #[error("time {time:.3} outside horizon [{current:.3}, {current:.3} + {lookahead:.3}]")]
    TimeOutOfHorizon {
        time: f64,
        current: f64,
        lookahead: f64,
    },

    #[error("invalid value {value} for {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("inconsistent use of lat/lon and Euclidean positions")]
    MixedCoordinates,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DaaError>;

/// Reject non-positive and non-finite values.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DaaError::InvalidParameter {
            name,
            value,
            reason: "must be positive and finite",
        })
    }
}

/// Reject negative and non-finite values.
pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DaaError::InvalidParameter {
            name,
            value,
            reason: "must be non-negative and finite",
        })
    }
}

/// Reject values not strictly below `bound`.
pub(crate) fn check_less_than(name: &'static str, value: f64, bound: f64) -> Result<f64> {
    if value < bound {
        Ok(value)
    } else {
        Err(DaaError::InvalidParameter {
            name,
            value,
            reason: "exceeds upper bound",
        })
    }
}

/// Reject a range whose lower bound exceeds its upper bound.
pub(crate) fn check_ordered(name: &'static str, min: f64, max: f64) -> Result<()> {
    if min <= max {
        Ok(())
    } else {
        Err(DaaError::InvalidParameter {
            name,
            value: min,
            reason: "lower bound exceeds upper bound",
        })
    }
}
