//! # Track Editor
//!
//! Editable GPS tracks backed by two synchronized representations:
//!
//! - a mutable, arena-backed linked structure ([`Track`]) with a timestamp index,
//!   used for fast editing and incremental recomputation of derived kinematics
//! - a serializable GeoJSON document ([`DocumentTrack`]) rebuilt from the track on
//!   demand
//!
//! The [`TrackFacade`] binds both and is the intended entry point.
//!
//! ## Quick Start
//!
//! ```rust
//! use track_editor::{SyncMode, Target, TrackFacade, TrackMetadata, TrackPoint};
//!
//! let points = vec![
//!     TrackPoint::new(51.5074, -0.1278).with_time("2024-05-01T10:00:00Z"),
//!     TrackPoint::new(51.5080, -0.1290).with_time("2024-05-01T10:00:10Z"),
//!     TrackPoint::new(51.5090, -0.1300).with_time("2024-05-01T10:00:20Z"),
//! ];
//!
//! let mut facade = TrackFacade::from_points(points, TrackMetadata::named("Morning ride"));
//! let removed = facade.remove_at(Target::time("2024-05-01T10:00:10Z"), SyncMode::Immediate);
//!
//! assert_eq!(removed, 1);
//! assert_eq!(facade.document().map(|d| d.len()), Some(2));
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TrackError};

// Geographic utilities (distance, bearing, timestamps)
pub mod geo_utils;

// Derived edge values between consecutive points
pub mod segment;
pub use segment::{CompassDirection, Segment};

// Envelope computation
pub mod bounding_box;
pub use bounding_box::{BoundingBox, DEFAULT_BUFFER_DEGREES};

// Arena-backed linked structure with pluggable vertex index
pub mod polyline;
pub use polyline::{
    Insertion, NoIndex, NodeId, Polyline, Replacement, Route, SegmentId, TimestampIndex, Track,
    VertexIndex,
};

// Elevation collaborator seam
pub mod elevation;
pub use elevation::{Coord, CoordKey, ElevationMap, ElevationSource};

// GeoJSON document types
pub mod geojson;
pub use geojson::{CoordTimes, Feature, FeatureCollection, Geometry, Position, TrackProperties};

// Serializable document representation
pub mod document;
pub use document::{DocumentTrack, TrackSlice};

// Public entry point binding track and document
pub mod facade;
pub use facade::{SyncMode, TrackFacade, TrackItems};

// Summary statistics
pub mod stats;
pub use stats::TrackStats;

// ============================================================================
// Core Types
// ============================================================================

/// Per-vertex kinematic values that depend on both adjacent segments.
///
/// Every field is `None` where it cannot be derived (open track ends, missing
/// timestamps or elevations).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathProperties {
    /// Signed turn at this vertex in degrees, (-180, 180]
    pub rotation: Option<f64>,
    /// Turn rate in degrees per second
    pub rotation_rate: Option<f64>,
    /// Time-weighted speed in m/s
    pub speed: Option<f64>,
    /// Climb rate in m/s (0 when descending)
    pub ascent_rate: Option<f64>,
    /// Descent rate in m/s, positive (0 when climbing)
    pub descent_rate: Option<f64>,
}

/// A geographic track point.
///
/// Equality compares every field, including derived path properties.
///
/// # Example
/// ```
/// use track_editor::TrackPoint;
/// let point = TrackPoint::new(51.5074, -0.1278)
///     .with_alt(35.0)
///     .with_time("2024-05-01T10:00:00Z");
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lng: f64,
    pub alt: Option<f64>,
    /// Opaque, lexically sortable timestamp (usually RFC 3339)
    pub time: Option<String>,
    pub path: Option<PathProperties>,
}

impl TrackPoint {
    /// Create a point without altitude or timestamp.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            alt: None,
            time: None,
            path: None,
        }
    }

    pub fn with_alt(mut self, alt: f64) -> Self {
        self.alt = Some(alt);
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Convert to a `geo` point (x = longitude, y = latitude).
    #[inline]
    pub fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }

    /// GeoJSON position: `[lng, lat]` or `[lng, lat, alt]`.
    pub fn position(&self) -> Position {
        match self.alt {
            Some(alt) => vec![self.lng, self.lat, alt],
            None => vec![self.lng, self.lat],
        }
    }

    /// Build a point from a GeoJSON position and an optional timestamp.
    ///
    /// Returns `None` for positions with fewer than two values.
    pub fn from_position(position: &[f64], time: Option<String>) -> Option<Self> {
        let (lng, lat) = (*position.first()?, *position.get(1)?);
        Some(Self {
            lat,
            lng,
            alt: position.get(2).copied(),
            time,
            path: None,
        })
    }
}

/// How an editing operation addresses a vertex.
///
/// Every mutator on [`Polyline`] and [`TrackFacade`] takes a target, so callers can
/// point at a vertex by handle, by value or by timestamp interchangeably.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Direct node handle
    Node(NodeId),
    /// First vertex (or, for removals, every vertex) equal to this point
    Value(TrackPoint),
    /// Vertex carrying this timestamp
    Time(String),
}

impl Target {
    pub fn time(time: impl Into<String>) -> Self {
        Target::Time(time.into())
    }
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Target::Node(id)
    }
}

impl From<TrackPoint> for Target {
    fn from(point: TrackPoint) -> Self {
        Target::Value(point)
    }
}

impl From<&TrackPoint> for Target {
    fn from(point: &TrackPoint) -> Self {
        Target::Value(point.clone())
    }
}

impl From<&str> for Target {
    fn from(time: &str) -> Self {
        Target::Time(time.to_string())
    }
}

impl From<String> for Target {
    fn from(time: String) -> Self {
        Target::Time(time)
    }
}

/// Descriptive metadata carried by the document representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub name: Option<String>,
    /// Track-type tag written to the document (`"track"` unless overridden)
    pub track_type: Option<String>,
    /// Start time; refreshed from the first point on every rebuild
    pub start_time: Option<String>,
}

impl TrackMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Configuration for facades and statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackConfig {
    /// Symmetric buffer for single-point bounding boxes, in degrees.
    /// Default: [`DEFAULT_BUFFER_DEGREES`] (~110 meters of latitude)
    pub bounding_box_buffer: f64,

    /// Track-type tag used when the metadata does not carry one.
    /// Default: "track"
    pub track_type: String,

    /// Segments slower than this (m/s) don't count towards moving time.
    /// Default: 0.5 m/s
    pub moving_speed_threshold: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            bounding_box_buffer: DEFAULT_BUFFER_DEGREES,
            track_type: "track".to_string(),
            moving_speed_threshold: 0.5,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
