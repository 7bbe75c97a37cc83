//! Summary statistics over a polyline.
//!
//! Stateless: computed in a single walk over the vertices and their outgoing
//! segments, never cached across edits.

use serde::Serialize;

use crate::polyline::{Polyline, VertexIndex};
use crate::TrackConfig;

/// Aggregate values for one track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrackStats {
    pub point_count: usize,
    pub segment_count: usize,
    /// Total great-circle length in meters
    pub length: f64,
    /// Sum of known segment durations in seconds
    pub duration: f64,
    /// Time spent on segments faster than the moving threshold, in seconds
    pub moving_time: f64,
    /// Summed positive segment heights in meters
    pub height_gain: f64,
    /// Summed negative segment heights in meters (positive value)
    pub height_loss: f64,
    /// Length over duration, m/s
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub min_altitude: Option<f64>,
    pub max_altitude: Option<f64>,
}

impl TrackStats {
    /// Compute statistics for `polyline`.
    ///
    /// # Example
    /// ```
    /// use track_editor::{Track, TrackConfig, TrackPoint, TrackStats};
    ///
    /// let track = Track::from_points(vec![
    ///     TrackPoint::new(51.5074, -0.1278).with_time("2024-05-01T10:00:00Z"),
    ///     TrackPoint::new(51.5084, -0.1278).with_time("2024-05-01T10:00:30Z"),
    /// ]);
    /// let stats = TrackStats::compute(&track, &TrackConfig::default());
    /// assert_eq!(stats.segment_count, 1);
    /// assert_eq!(stats.duration, 30.0);
    /// ```
    pub fn compute<I: VertexIndex>(polyline: &Polyline<I>, config: &TrackConfig) -> Self {
        let mut stats = Self::default();

        for (id, point) in polyline.iter() {
            stats.point_count += 1;
            if let Some(alt) = point.alt {
                stats.min_altitude = Some(stats.min_altitude.map_or(alt, |min| min.min(alt)));
                stats.max_altitude = Some(stats.max_altitude.map_or(alt, |max| max.max(alt)));
            }

            let Some(segment) = polyline.segment_after(id) else {
                continue;
            };
            stats.segment_count += 1;
            stats.length += segment.length;

            if let Some(duration) = segment.duration {
                stats.duration += duration;
            }
            if let Some(speed) = segment.speed {
                stats.max_speed = Some(stats.max_speed.map_or(speed, |max| max.max(speed)));
                if speed > config.moving_speed_threshold {
                    stats.moving_time += segment.duration.unwrap_or(0.0);
                }
            }

            if segment.height > 0.0 {
                stats.height_gain += segment.height;
            } else {
                stats.height_loss -= segment.height;
            }
        }

        stats.average_speed = (stats.duration > 0.0).then(|| stats.length / stats.duration);
        stats
    }
}
