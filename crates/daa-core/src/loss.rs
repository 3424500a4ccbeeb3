//! Time intervals of loss of separation.

use crate::numeric::almost_equals;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative times `(time_in, time_out)` of a separation violation within a
/// queried window. A conflict exists iff `time_in < time_out`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossData {
    time_in: f64,
    time_out: f64,
}

impl LossData {
    /// Build an interval, snapping `time_in` onto `time_out` when they are
    /// almost equal so rounding noise never yields a sliver conflict.
    pub fn new(time_in: f64, time_out: f64) -> Self {
        let time_in = if almost_equals(time_in, time_out) {
            time_out
        } else {
            time_in
        };
        Self { time_in, time_out }
    }

    /// No conflict at all.
    pub fn none() -> Self {
        Self {
            time_in: f64::INFINITY,
            time_out: f64::NEG_INFINITY,
        }
    }

    pub fn time_in(&self) -> f64 {
        self.time_in
    }

    pub fn time_out(&self) -> f64 {
        self.time_out
    }

    pub fn conflict(&self) -> bool {
        self.time_in < self.time_out
    }

    /// Conflict lasting strictly longer than `min_duration`.
    pub fn conflict_longer_than(&self, min_duration: f64) -> bool {
        self.conflict() && self.time_out - self.time_in > min_duration
    }
}

impl Default for LossData {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for LossData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[time_in: {:.2}, time_out: {:.2}]",
            self.time_in, self.time_out
        )
    }
}

/// Loss interval plus the critical time and its severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConflictData {
    #[serde(flatten)]
    loss: LossData,
    /// Relative time of the most severe point of the violation.
    time_crit: f64,
    /// Severity at `time_crit`: 0 is most severe, infinity is none.
    dist_crit: f64,
}

impl ConflictData {
    pub fn new(loss: LossData, time_crit: f64, dist_crit: f64) -> Self {
        Self {
            loss,
            time_crit,
            dist_crit,
        }
    }

    pub fn none() -> Self {
        Self::new(LossData::none(), f64::INFINITY, f64::INFINITY)
    }

    pub fn loss(&self) -> &LossData {
        &self.loss
    }

    pub fn time_in(&self) -> f64 {
        self.loss.time_in()
    }

    pub fn time_out(&self) -> f64 {
        self.loss.time_out()
    }

    pub fn conflict(&self) -> bool {
        self.loss.conflict()
    }

    pub fn conflict_longer_than(&self, min_duration: f64) -> bool {
        self.loss.conflict_longer_than(min_duration)
    }

    pub fn critical_time(&self) -> f64 {
        self.time_crit
    }

    pub fn distance_at_critical_time(&self) -> f64 {
        self.dist_crit
    }
}

impl Default for ConflictData {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for ConflictData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [time_crit: {:.2}, dist_crit: {:.4}]",
            self.loss, self.time_crit, self.dist_crit
        )
    }
}
