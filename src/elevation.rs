//! Elevation collaborator seam.
//!
//! Elevation lookup (DEM tiles, web services) is injected through
//! [`ElevationSource`]. The track only consumes the resulting [`ElevationMap`],
//! keyed by coordinate so each vertex can be matched independently.

use std::collections::HashMap;

use crate::{Result, TrackError, TrackPoint};

/// Coordinate passed to elevation sources (x = longitude, y = latitude).
pub type Coord = geo::Coord<f64>;

/// Scale used to quantize degrees into integer keys (1e-7 degrees ≈ 1 cm).
const KEY_SCALE: f64 = 1e7;

/// Hashable latitude/longitude key, quantized to 1e-7 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey {
    lat: i64,
    lng: i64,
}

impl CoordKey {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: (lat * KEY_SCALE).round() as i64,
            lng: (lng * KEY_SCALE).round() as i64,
        }
    }

    pub fn from_point(point: &TrackPoint) -> Self {
        Self::new(point.lat, point.lng)
    }

    pub fn from_coord(coord: &Coord) -> Self {
        Self::new(coord.y, coord.x)
    }
}

/// Batch elevation lookup.
///
/// Implementations return one entry per input coordinate, in order; `None` marks a
/// coordinate without data. Closures of the same shape implement this trait.
pub trait ElevationSource {
    fn lookup(&self, coords: &[Coord]) -> Result<Vec<Option<f64>>>;
}

impl<F> ElevationSource for F
where
    F: Fn(&[Coord]) -> Result<Vec<Option<f64>>>,
{
    fn lookup(&self, coords: &[Coord]) -> Result<Vec<Option<f64>>> {
        self(coords)
    }
}

/// Coordinate → elevation (meters) map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElevationMap {
    entries: HashMap<CoordKey, f64>,
}

impl ElevationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: CoordKey, elevation: f64) {
        self.entries.insert(key, elevation);
    }

    pub fn get(&self, key: &CoordKey) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Query `source` for `coords` and collect the known elevations.
    ///
    /// Fails if the source errors or returns a result that is not parallel to the
    /// input.
    pub fn from_lookup(coords: &[Coord], source: &impl ElevationSource) -> Result<Self> {
        let elevations = source.lookup(coords)?;
        if elevations.len() != coords.len() {
            return Err(TrackError::ElevationLookup {
                message: format!(
                    "expected {} elevations, got {}",
                    coords.len(),
                    elevations.len()
                ),
            });
        }

        let mut map = Self::new();
        for (coord, elevation) in coords.iter().zip(elevations) {
            if let Some(elevation) = elevation {
                map.insert(CoordKey::from_coord(coord), elevation);
            }
        }
        Ok(map)
    }
}

impl FromIterator<(CoordKey, f64)> for ElevationMap {
    fn from_iter<T: IntoIterator<Item = (CoordKey, f64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
