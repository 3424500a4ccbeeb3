//! Detect-and-avoid core: well-clear conflict detection, kinematic maneuver
//! bands and alerting for one ownship against its traffic.
//!
//! All internal quantities are SI (meters, seconds, radians). Track is
//! measured clockwise from true north. Use [`units`] at the edges.

pub mod alerting;
pub mod bands;
pub mod core;
pub mod criteria;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod intervals;
pub mod kinematic_bands;
pub mod kinematics;
pub mod loss;
pub mod monitor;
pub mod numeric;
pub mod params;
pub mod spatial;
pub mod state;
pub mod tcas;
pub mod units;
pub mod urgency;

pub use alerting::{AlertInfo, AlertThresholds};
pub use bands::{BandsOutput, BandsRegion, DimensionBands};
pub use detector::{CdCylinder, Detector, TimeVariable, Wcv, WcvTable};
pub use error::{DaaError, Result};
pub use geometry::{Vect2, Vect3, Velocity};
pub use intervals::{Interval, IntervalSet};
pub use kinematic_bands::{Dimension, KinematicBands};
pub use loss::{ConflictData, LossData};
pub use monitor::DaaMonitor;
pub use params::DaaParameters;
pub use state::{OwnshipState, Position, TrafficState};
pub use urgency::UrgencyStrategy;
