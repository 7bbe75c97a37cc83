//! # Geographic Utilities
//!
//! Core geographic computation utilities shared by segments, statistics and
//! bounding boxes.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two track points |
//! | [`initial_bearing`] | Bearing from one point to another, in [0, 360) |
//! | [`bearing_delta`] | Signed turn between two bearings, in (-180, 180] |
//! | [`parse_timestamp`] | Parse a track timestamp into UTC |
//! | [`seconds_between`] | Elapsed seconds between two timestamps |
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).

use chrono::{DateTime, NaiveDateTime, Utc};
use geo::{Bearing, Distance, Haversine, Point};

use crate::TrackPoint;

/// Calculate the great-circle distance between two track points in meters.
///
/// Altitude is ignored.
///
/// # Example
///
/// ```rust
/// use track_editor::{TrackPoint, geo_utils};
///
/// let london = TrackPoint::new(51.5074, -0.1278);
/// let paris = TrackPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 5000.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    Haversine::distance(p1.to_geo(), p2.to_geo())
}

/// Initial bearing from `from` to `to` in degrees, normalized to [0, 360).
///
/// 0 is north, 90 is east. Identical points yield 0.
#[inline]
pub fn initial_bearing(from: &TrackPoint, to: &TrackPoint) -> f64 {
    if from.lat == to.lat && from.lng == to.lng {
        return 0.0;
    }
    let origin: Point<f64> = from.to_geo();
    let destination: Point<f64> = to.to_geo();
    Haversine::bearing(origin, destination).rem_euclid(360.0)
}

/// Signed turn from bearing `from` to bearing `to`, in degrees within (-180, 180].
///
/// Positive values turn clockwise (right), negative values turn left.
#[inline]
pub fn bearing_delta(from: f64, to: f64) -> f64 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Parse a track timestamp into UTC.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, with offset or fractional seconds)
/// and naive ISO date-times, which are read as UTC. Anything else is `None`.
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    if timestamp.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        .map(|naive| naive.and_utc())
}

/// Elapsed seconds from `start` to `end`. Negative when `end` is earlier.
pub fn seconds_between(start: &str, end: &str) -> Option<f64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    Some((end - start).num_milliseconds() as f64 / 1000.0)
}

/// Elapsed seconds between two points, if both carry a parseable timestamp.
pub fn point_seconds_between(from: &TrackPoint, to: &TrackPoint) -> Option<f64> {
    seconds_between(from.time.as_deref()?, to.time.as_deref()?)
}

// =============================================================================
// Unit Tests
// =============================================================================
