//! Aircraft states and the ownship-centered frame.

use crate::geometry::{Vect3, Velocity};
use crate::spatial::{offset_by_bearing, EnuProjection};
use serde::{Deserialize, Serialize};

/// Absolute aircraft position, geodetic or flat Euclidean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Position {
    /// Degrees and meters above mean sea level.
    LatLon { lat_deg: f64, lon_deg: f64, alt_m: f64 },
    /// Meters in an arbitrary flat frame (x east, y north, z up).
    Euclidean { x: f64, y: f64, z: f64 },
}

impl Position {
    pub fn lat_lon(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Position::LatLon {
            lat_deg,
            lon_deg,
            alt_m,
        }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Position::Euclidean { x, y, z }
    }

    pub fn is_lat_lon(&self) -> bool {
        matches!(self, Position::LatLon { .. })
    }

    pub fn alt(&self) -> f64 {
        match *self {
            Position::LatLon { alt_m, .. } => alt_m,
            Position::Euclidean { z, .. } => z,
        }
    }

    /// Position reached after flying constant velocity `v` for `t` seconds.
    pub fn linear(&self, v: &Velocity, t: f64) -> Position {
        match *self {
            Position::LatLon {
                lat_deg,
                lon_deg,
                alt_m,
            } => {
                let (lat, lon) = offset_by_bearing(lat_deg, lon_deg, v.gs() * t, v.trk());
                Position::lat_lon(lat, lon, alt_m + v.z * t)
            }
            Position::Euclidean { x, y, z } => {
                let p = Vect3::new(x, y, z).linear(v, t);
                Position::xyz(p.x, p.y, p.z)
            }
        }
    }
}

/// Identified aircraft state at a common observation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficState {
    pub id: String,
    pub position: Position,
    /// Ground-referenced velocity, east/north/up in m/s.
    pub velocity: Velocity,
}

impl TrafficState {
    pub fn new(id: impl Into<String>, position: Position, velocity: Velocity) -> Self {
        Self {
            id: id.into(),
            position,
            velocity,
        }
    }

    pub fn is_lat_lon(&self) -> bool {
        self.position.is_lat_lon()
    }

    pub fn linear_projection(&self, dt: f64) -> TrafficState {
        TrafficState::new(
            self.id.clone(),
            self.position.linear(&self.velocity, dt),
            self.velocity,
        )
    }
}

/// Ownship state plus the Euclidean frame every other aircraft is placed in.
///
/// Built once per ownship state; a new ownship position means a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnshipState {
    state: TrafficState,
    frame: EnuProjection,
    s: Vect3,
    v: Velocity,
}

impl OwnshipState {
    pub fn new(state: TrafficState) -> Self {
        let (frame, s) = match state.position {
            Position::LatLon {
                lat_deg,
                lon_deg,
                alt_m,
            } => {
                let frame = EnuProjection::new(lat_deg, lon_deg);
                (frame, frame.project(lat_deg, lon_deg, alt_m))
            }
            Position::Euclidean { x, y, z } => (EnuProjection::new(0.0, 0.0), Vect3::new(x, y, z)),
        };
        let v = frame.project_velocity(&state.velocity);
        Self { state, frame, s, v }
    }

    pub fn id(&self) -> &str {
        &self.state.id
    }

    pub fn state(&self) -> &TrafficState {
        &self.state
    }

    pub fn position(&self) -> &Position {
        &self.state.position
    }

    pub fn velocity(&self) -> &Velocity {
        &self.state.velocity
    }

    pub fn is_lat_lon(&self) -> bool {
        self.state.is_lat_lon()
    }

    /// Ownship position in its own frame.
    pub fn s(&self) -> Vect3 {
        self.s
    }

    /// Ownship velocity in its own frame.
    pub fn v(&self) -> Velocity {
        self.v
    }

    /// Place an absolute position into the ownship frame.
    pub fn pos_to_s(&self, p: &Position) -> Vect3 {
        match *p {
            Position::LatLon {
                lat_deg,
                lon_deg,
                alt_m,
            } => {
                if !self.is_lat_lon() {
                    tracing::warn!(
                        ownship = %self.state.id,
                        "projecting a lat/lon position into a Euclidean ownship frame"
                    );
                }
                self.frame.project(lat_deg, lon_deg, alt_m)
            }
            Position::Euclidean { x, y, z } => Vect3::new(x, y, z),
        }
    }

    pub fn vel_to_v(&self, _p: &Position, v: &Velocity) -> Velocity {
        self.frame.project_velocity(v)
    }

    pub fn traffic_s(&self, ac: &TrafficState) -> Vect3 {
        self.pos_to_s(&ac.position)
    }

    pub fn traffic_v(&self, ac: &TrafficState) -> Velocity {
        self.vel_to_v(&ac.position, &ac.velocity)
    }

    /// Map a point of the ownship frame back to an absolute position.
    pub fn s_to_pos(&self, s: &Vect3) -> Position {
        if self.is_lat_lon() {
            let (lat, lon, alt) = self.frame.inverse(s);
            Position::lat_lon(lat, lon, alt)
        } else {
            Position::xyz(s.x, s.y, s.z)
        }
    }

    pub fn linear_projection(&self, dt: f64) -> OwnshipState {
        OwnshipState::new(self.state.linear_projection(dt))
    }
}
