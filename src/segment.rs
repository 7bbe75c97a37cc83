//! Derived edge values between two consecutive track points.
//!
//! A segment is never authoritative state: it is recomputed from its endpoints
//! whenever the linked structure creates it or refreshes derived values.

use serde::{Deserialize, Serialize};

use crate::geo_utils::{haversine_distance, initial_bearing, point_seconds_between};
use crate::TrackPoint;

/// Eight-way compass direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    /// Direction for a bearing in degrees (any value, wrapped to [0, 360)).
    pub fn from_bearing(bearing: f64) -> Self {
        const DIRECTIONS: [CompassDirection; 8] = [
            CompassDirection::N,
            CompassDirection::NE,
            CompassDirection::E,
            CompassDirection::SE,
            CompassDirection::S,
            CompassDirection::SW,
            CompassDirection::W,
            CompassDirection::NW,
        ];
        let sector = ((bearing.rem_euclid(360.0) + 22.5) / 45.0).floor() as usize % 8;
        DIRECTIONS[sector]
    }
}

/// Kinematic values of the edge between two consecutive points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Great-circle length in meters
    pub length: f64,
    /// Elapsed seconds, if both endpoints carry a parseable timestamp
    pub duration: Option<f64>,
    /// Average speed in m/s (requires a positive duration)
    pub speed: Option<f64>,
    /// Initial bearing in degrees, [0, 360)
    pub bearing: f64,
    pub direction: CompassDirection,
    /// Altitude change in meters; 0 when either endpoint lacks altitude
    pub height: f64,
    /// Altitude change per second; 0 when height or duration is unavailable
    pub height_rate: f64,
}

impl Segment {
    /// Compute a segment from its two endpoints.
    pub fn between(from: &TrackPoint, to: &TrackPoint) -> Self {
        let length = haversine_distance(from, to);
        let duration = point_seconds_between(from, to);
        let speed = duration.filter(|&d| d > 0.0).map(|d| length / d);
        let bearing = initial_bearing(from, to);
        let (height, height_rate) = Self::elevation_values(from, to, duration);

        Self {
            length,
            duration,
            speed,
            bearing,
            direction: CompassDirection::from_bearing(bearing),
            height,
            height_rate,
        }
    }

    /// Refresh only the elevation-derived values (after altitudes change).
    pub fn update_elevation(&mut self, from: &TrackPoint, to: &TrackPoint) {
        let (height, height_rate) = Self::elevation_values(from, to, self.duration);
        self.height = height;
        self.height_rate = height_rate;
    }

    fn elevation_values(from: &TrackPoint, to: &TrackPoint, duration: Option<f64>) -> (f64, f64) {
        match (from.alt, to.alt) {
            (Some(a), Some(b)) => {
                let height = b - a;
                let rate = match duration {
                    Some(d) if d > 0.0 => height / d,
                    _ => 0.0,
                };
                (height, rate)
            }
            _ => (0.0, 0.0),
        }
    }
}
