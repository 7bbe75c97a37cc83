//! Minimal GeoJSON document types for track features.
//!
//! Only the subset a track document needs: a `Feature` with a `LineString` (or,
//! before merging, `MultiLineString`) geometry and track properties carrying a
//! parallel `coordTimes` array.

use serde::{Deserialize, Deserializer, Serialize};

/// GeoJSON position: `[lng, lat]` or `[lng, lat, alt]`.
pub type Position = Vec<f64>;

fn feature_type() -> String {
    "Feature".to_string()
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

/// GeoJSON allows `null` geometry and properties; read them as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Track geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    /// Any other GeoJSON geometry type; rejected when building a document
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// Coordinates of a single-part line (empty for any other geometry).
    pub fn line_coordinates(&self) -> &[Position] {
        match self {
            Geometry::LineString { coordinates } => coordinates,
            _ => &[],
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::LineString {
            coordinates: Vec::new(),
        }
    }
}

/// Timestamps parallel to the coordinates; nested one level for multi-part lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordTimes {
    Flat(Vec<Option<String>>),
    Nested(Vec<Vec<Option<String>>>),
}

impl Default for CoordTimes {
    fn default() -> Self {
        CoordTimes::Flat(Vec::new())
    }
}

impl CoordTimes {
    /// Timestamps of a flat array (empty for the nested form).
    pub fn as_flat(&self) -> &[Option<String>] {
        match self {
            CoordTimes::Flat(times) => times,
            CoordTimes::Nested(_) => &[],
        }
    }

    /// Flatten into a single array in order.
    pub fn into_flat(self) -> Vec<Option<String>> {
        match self {
            CoordTimes::Flat(times) => times,
            CoordTimes::Nested(parts) => parts.into_iter().flatten().collect(),
        }
    }
}

/// Properties of a track feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackProperties {
    /// Track-type tag
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub track_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Start time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    #[serde(rename = "coordTimes", default)]
    pub coord_times: CoordTimes,
}

/// A GeoJSON feature holding one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub geometry: Geometry,

    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: TrackProperties,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: TrackProperties) -> Self {
        Self {
            kind: feature_type(),
            geometry,
            properties,
        }
    }
}

/// A GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,

    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: feature_collection_type(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Swap the feature at `index` wholesale and return the previous one.
    ///
    /// `None` (and no change) when `index` is out of range.
    pub fn replace_feature(&mut self, index: usize, feature: Feature) -> Option<Feature> {
        let slot = self.features.get_mut(index)?;
        Some(std::mem::replace(slot, feature))
    }
}
