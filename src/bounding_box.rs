//! Bounding box computation for points, point sets and polylines.
//!
//! Boxes are plain values, recomputed on every call and never maintained
//! incrementally.

use geo::{coord, Rect};
use serde::{Deserialize, Serialize};

use crate::polyline::{Polyline, VertexIndex};
use crate::TrackPoint;

/// Default symmetric buffer around a single point, in degrees.
pub const DEFAULT_BUFFER_DEGREES: f64 = 0.001;

/// Geographic envelope with an optional altitude axis.
///
/// `west`/`east` bound the latitude axis and `south`/`north` the longitude axis,
/// so a point at lat 1, lng 2 buffered by 1 spans west 0, east 2, south 1,
/// north 3. [`BoundingBox::to_lat_lng_bounds`] and [`BoundingBox::to_rect`]
/// translate back to latitude/longitude corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    /// Present only when every input point carries altitude
    pub min_alt: Option<f64>,
    pub max_alt: Option<f64>,
}

impl BoundingBox {
    /// Box around a single point, expanded by `buffer` degrees on each side.
    ///
    /// `None` uses [`DEFAULT_BUFFER_DEGREES`]. Altitude is not buffered.
    ///
    /// # Example
    /// ```
    /// use track_editor::{BoundingBox, TrackPoint};
    ///
    /// let bbox = BoundingBox::from_point(&TrackPoint::new(1.0, 2.0), Some(1.0));
    /// assert_eq!((bbox.west, bbox.south, bbox.east, bbox.north), (0.0, 1.0, 2.0, 3.0));
    /// ```
    pub fn from_point(point: &TrackPoint, buffer: Option<f64>) -> Self {
        let buffer = buffer.unwrap_or(DEFAULT_BUFFER_DEGREES);
        let mut bbox = Self::exact(point);
        bbox.west -= buffer;
        bbox.south -= buffer;
        bbox.east += buffer;
        bbox.north += buffer;
        bbox
    }

    /// Unbuffered box covering exactly one point.
    fn exact(point: &TrackPoint) -> Self {
        Self {
            west: point.lat,
            south: point.lng,
            east: point.lat,
            north: point.lng,
            min_alt: point.alt,
            max_alt: point.alt,
        }
    }

    /// Box around a point set. Returns `None` for an empty set.
    ///
    /// A one-point set is identical to [`BoundingBox::from_point`], buffer included.
    /// Larger sets are the per-axis min/max of their points and ignore `buffer`.
    pub fn from_points(points: &[TrackPoint], buffer: Option<f64>) -> Option<Self> {
        Self::reduce(points.iter(), buffer)
    }

    /// Box around every vertex of a polyline, with the same rules as
    /// [`BoundingBox::from_points`].
    pub fn from_polyline<I: VertexIndex>(polyline: &Polyline<I>, buffer: Option<f64>) -> Option<Self> {
        Self::reduce(polyline.iter().map(|(_, point)| point), buffer)
    }

    fn reduce<'a>(
        mut points: impl Iterator<Item = &'a TrackPoint>,
        buffer: Option<f64>,
    ) -> Option<Self> {
        let first = points.next()?;
        let Some(second) = points.next() else {
            return Some(Self::from_point(first, buffer));
        };
        let mut bbox = Self::exact(first);
        bbox.extend(&Self::exact(second));
        for point in points {
            bbox.extend(&Self::exact(point));
        }
        Some(bbox)
    }

    /// Copy of an existing box.
    pub fn from_bounding_box(other: &BoundingBox) -> Self {
        *other
    }

    /// Grow this box to cover `other`.
    ///
    /// The altitude axis survives only if both boxes carry it.
    pub fn extend(&mut self, other: &BoundingBox) {
        self.west = self.west.min(other.west);
        self.south = self.south.min(other.south);
        self.east = self.east.max(other.east);
        self.north = self.north.max(other.north);
        self.min_alt = match (self.min_alt, other.min_alt) {
            (Some(a), Some(b)) => Some(a.min(b)),
            _ => None,
        };
        self.max_alt = match (self.max_alt, other.max_alt) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
    }

    /// Check whether a point lies inside the horizontal extent (edges inclusive).
    pub fn contains(&self, point: &TrackPoint) -> bool {
        point.lat >= self.west
            && point.lat <= self.east
            && point.lng >= self.south
            && point.lng <= self.north
    }

    /// Center of the horizontal extent as `(lat, lng)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }

    /// Two-corner `[[lat, lng], [lat, lng]]` south-west/north-east pair for map
    /// widgets. Altitude is dropped.
    pub fn to_lat_lng_bounds(&self) -> [[f64; 2]; 2] {
        [[self.west, self.south], [self.east, self.north]]
    }

    /// Horizontal extent as a `geo` rectangle (x = longitude, y = latitude).
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.south, y: self.west },
            coord! { x: self.north, y: self.east },
        )
    }
}
