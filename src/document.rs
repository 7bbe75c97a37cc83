//! # Document Track
//!
//! The serializable representation of a track: one GeoJSON feature whose
//! `LineString` coordinates and `coordTimes` array are kept parallel.
//!
//! The feature is only ever replaced wholesale ([`DocumentTrack::rebuild_from`]).
//! Range queries scan the timestamp array and return borrowed [`TrackSlice`]s;
//! `split` and `trim` build new documents and never touch `self`.

use crate::error::{OptionExt, Result, TrackError};
use crate::geojson::{CoordTimes, Feature, FeatureCollection, Geometry, Position, TrackProperties};
use crate::{TrackMetadata, TrackPoint};

/// Borrowed, parallel view into a document's coordinates and timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSlice<'a> {
    pub coordinates: &'a [Position],
    pub timestamps: &'a [Option<String>],
}

impl<'a> TrackSlice<'a> {
    pub fn empty() -> Self {
        Self {
            coordinates: &[],
            timestamps: &[],
        }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Timestamp of the first position, if any.
    pub fn start_time(&self) -> Option<&'a str> {
        self.timestamps.first()?.as_deref()
    }

    pub fn to_points(&self) -> Vec<TrackPoint> {
        self.coordinates
            .iter()
            .zip(self.timestamps)
            .filter_map(|(position, time)| TrackPoint::from_position(position, time.clone()))
            .collect()
    }
}

/// A single validated track feature plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTrack {
    feature: Feature,
    metadata: TrackMetadata,
}

impl DocumentTrack {
    /// Empty document.
    pub fn new(metadata: TrackMetadata) -> Self {
        Self::assemble(metadata, Vec::new(), Vec::new())
    }

    /// Validate a feature and normalize it to a single `LineString`.
    ///
    /// Multi-part lines and nested `coordTimes` are flattened in order. A feature
    /// without `coordTimes` is accepted as untimed.
    ///
    /// # Errors
    /// - [`TrackError::UnsupportedGeometry`] for non-line geometries
    /// - [`TrackError::LengthMismatch`] when timestamps are not parallel
    /// - [`TrackError::InvalidDocument`] for malformed positions
    pub fn from_feature(feature: Feature) -> Result<Self> {
        let (metadata, coordinates, timestamps) = validate(feature)?;
        Ok(Self::assemble(metadata, coordinates, timestamps))
    }

    /// Merge every feature of a collection, in order, into one document.
    ///
    /// Metadata comes from the first feature.
    pub fn from_feature_collection(collection: FeatureCollection) -> Result<Self> {
        let mut features = collection.features.into_iter();
        let first = features
            .next()
            .ok_or_invalid_document("feature collection has no features")?;

        let (metadata, mut coordinates, mut timestamps) = validate(first)?;
        let mut merged = 1;
        for feature in features {
            let (_, more_coordinates, more_timestamps) = validate(feature)?;
            coordinates.extend(more_coordinates);
            timestamps.extend(more_timestamps);
            merged += 1;
        }
        log::debug!(
            "[DocumentTrack] Merged {} features into {} points",
            merged,
            coordinates.len()
        );
        Ok(Self::assemble(metadata, coordinates, timestamps))
    }

    /// Parse a GeoJSON `Feature` or `FeatureCollection`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let kind = value
            .get("type")
            .and_then(|kind| kind.as_str())
            .ok_or_invalid_document("missing \"type\" member")?
            .to_string();

        match kind.as_str() {
            "Feature" => Self::from_feature(serde_json::from_value(value)?),
            "FeatureCollection" => Self::from_feature_collection(serde_json::from_value(value)?),
            other => Err(TrackError::InvalidDocument {
                message: format!("unsupported document type \"{}\"", other),
            }),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.feature)?)
    }

    /// Single-feature collection holding a copy of this document's feature.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection::new(vec![self.feature.clone()])
    }

    /// Replace the feature wholesale with one built from `points`, refreshing the
    /// start time from the first point. Returns the previous feature.
    pub fn rebuild_from<'a>(&mut self, points: impl IntoIterator<Item = &'a TrackPoint>) -> Feature {
        let (coordinates, timestamps): (Vec<Position>, Vec<Option<String>>) = points
            .into_iter()
            .map(|p| (p.position(), p.time.clone()))
            .unzip();
        self.metadata.start_time = timestamps.first().cloned().flatten();

        let count = coordinates.len();
        let feature = build_feature(&self.metadata, coordinates, timestamps);
        log::info!("[DocumentTrack] Rebuilt document with {} points", count);
        std::mem::replace(&mut self.feature, feature)
    }

    /// Tag an untagged document with `track_type`. An existing tag is kept.
    pub(crate) fn tag_if_untyped(&mut self, track_type: &str) {
        if self.metadata.track_type.is_none() {
            self.metadata.track_type = Some(track_type.to_string());
            self.feature.properties.track_type = self.metadata.track_type.clone();
        }
    }

    fn assemble(metadata: TrackMetadata, coordinates: Vec<Position>, timestamps: Vec<Option<String>>) -> Self {
        let feature = build_feature(&metadata, coordinates, timestamps);
        Self { feature, metadata }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    pub fn coordinates(&self) -> &[Position] {
        self.feature.geometry.line_coordinates()
    }

    pub fn timestamps(&self) -> &[Option<String>] {
        self.feature.properties.coord_times.as_flat()
    }

    pub fn metadata(&self) -> &TrackMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.coordinates().len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates().is_empty()
    }

    pub fn to_points(&self) -> Vec<TrackPoint> {
        self.whole().to_points()
    }

    // ========================================================================
    // Range queries
    // ========================================================================

    /// Position of the first coordinate carrying `time`.
    pub fn index_of(&self, time: &str) -> Option<usize> {
        self.timestamps()
            .iter()
            .position(|t| t.as_deref() == Some(time))
    }

    /// Everything up to and including `time`.
    pub fn segment_before(&self, time: &str) -> TrackSlice<'_> {
        match self.index_of(time) {
            Some(end) => self.slice(0, end),
            None => TrackSlice::empty(),
        }
    }

    /// Everything from `time` onwards.
    pub fn segment_after(&self, time: &str) -> TrackSlice<'_> {
        match (self.index_of(time), self.len().checked_sub(1)) {
            (Some(start), Some(last)) => self.slice(start, last),
            _ => TrackSlice::empty(),
        }
    }

    /// `start..=end` inclusive. Empty when either is absent or they are reversed.
    pub fn segment_between(&self, start: &str, end: &str) -> TrackSlice<'_> {
        match (self.index_of(start), self.index_of(end)) {
            (Some(start), Some(end)) => self.slice(start, end),
            _ => TrackSlice::empty(),
        }
    }

    /// Cut the track at every interior split timestamp.
    ///
    /// Consecutive parts share their boundary position. Unknown timestamps and the
    /// two ends are ignored; without any cut the whole track is the single part.
    pub fn partition<S: AsRef<str>>(&self, split_times: &[S]) -> Vec<TrackSlice<'_>> {
        let Some(last) = self.len().checked_sub(1) else {
            return vec![self.whole()];
        };
        let mut cuts: Vec<usize> = split_times
            .iter()
            .filter_map(|t| self.index_of(t.as_ref()))
            .filter(|&i| i > 0 && i < last)
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut parts = Vec::with_capacity(cuts.len() + 1);
        let mut start = 0;
        for cut in cuts {
            parts.push(self.slice(start, cut));
            start = cut;
        }
        parts.push(self.slice(start, last));
        parts
    }

    /// New documents, one per [`partition`](Self::partition) part.
    pub fn split<S: AsRef<str>>(&self, split_times: &[S]) -> Vec<DocumentTrack> {
        self.partition(split_times)
            .into_iter()
            .map(|slice| self.derive(slice))
            .collect()
    }

    /// New document holding `start..=end`. A missing bound defaults to the track
    /// boundary; an unknown timestamp yields an empty document.
    pub fn trim(&self, start: Option<&str>, end: Option<&str>) -> DocumentTrack {
        let from = match start {
            Some(time) => self.index_of(time),
            None => Some(0),
        };
        let to = match end {
            Some(time) => self.index_of(time),
            None => self.len().checked_sub(1),
        };
        let slice = match (from, to) {
            (Some(from), Some(to)) => self.slice(from, to),
            _ => TrackSlice::empty(),
        };
        self.derive(slice)
    }

    fn whole(&self) -> TrackSlice<'_> {
        TrackSlice {
            coordinates: self.coordinates(),
            timestamps: self.timestamps(),
        }
    }

    /// Inclusive slice; empty when out of range or reversed.
    fn slice(&self, start: usize, end: usize) -> TrackSlice<'_> {
        match (self.coordinates().get(start..=end), self.timestamps().get(start..=end)) {
            (Some(coordinates), Some(timestamps)) => TrackSlice {
                coordinates,
                timestamps,
            },
            _ => TrackSlice::empty(),
        }
    }

    fn derive(&self, slice: TrackSlice<'_>) -> DocumentTrack {
        let metadata = TrackMetadata {
            start_time: slice.start_time().map(str::to_string),
            ..self.metadata.clone()
        };
        Self::assemble(metadata, slice.coordinates.to_vec(), slice.timestamps.to_vec())
    }
}

fn build_feature(metadata: &TrackMetadata, coordinates: Vec<Position>, timestamps: Vec<Option<String>>) -> Feature {
    Feature::new(
        Geometry::LineString { coordinates },
        TrackProperties {
            track_type: metadata.track_type.clone(),
            name: metadata.name.clone(),
            time: metadata.start_time.clone(),
            coord_times: CoordTimes::Flat(timestamps),
        },
    )
}

/// Check a feature's shape and flatten it into metadata plus parallel arrays.
fn validate(feature: Feature) -> Result<(TrackMetadata, Vec<Position>, Vec<Option<String>>)> {
    if feature.kind != "Feature" {
        return Err(TrackError::InvalidDocument {
            message: format!("expected a Feature, found \"{}\"", feature.kind),
        });
    }

    let coordinates: Vec<Position> = match feature.geometry {
        Geometry::LineString { coordinates } => coordinates,
        Geometry::MultiLineString { coordinates } => coordinates.into_iter().flatten().collect(),
        Geometry::Unsupported => {
            return Err(TrackError::UnsupportedGeometry(
                "expected LineString or MultiLineString".to_string(),
            ))
        }
    };
    if let Some(index) = coordinates.iter().position(|p| p.len() < 2) {
        return Err(TrackError::InvalidDocument {
            message: format!("position {} has fewer than two values", index),
        });
    }

    let TrackProperties {
        track_type,
        name,
        time,
        coord_times,
    } = feature.properties;
    let mut timestamps = coord_times.into_flat();
    if timestamps.is_empty() {
        timestamps = vec![None; coordinates.len()];
    } else if timestamps.len() != coordinates.len() {
        return Err(TrackError::LengthMismatch {
            coordinates: coordinates.len(),
            timestamps: timestamps.len(),
        });
    }

    let start_time = time.or_else(|| timestamps.first().cloned().flatten());
    let metadata = TrackMetadata {
        name,
        track_type,
        start_time,
    };
    Ok((metadata, coordinates, timestamps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn time(i: usize) -> String {
        format!("2024-05-01T10:00:{:02}Z", i)
    }

    fn sample_json(n: usize) -> String {
        let coordinates: Vec<Vec<f64>> = (0..n).map(|i| vec![-0.12 + i as f64 * 0.001, 51.5]).collect();
        let times: Vec<String> = (0..n).map(time).collect();
        json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": coordinates},
            "properties": {"type": "track", "name": "Sample", "coordTimes": times}
        })
        .to_string()
    }

    fn sample(n: usize) -> DocumentTrack {
        DocumentTrack::from_json(&sample_json(n)).unwrap()
    }

    fn times_of(slice: &TrackSlice<'_>) -> Vec<String> {
        slice.timestamps.iter().flatten().cloned().collect()
    }

    #[test]
    fn test_from_json_feature() {
        let doc = sample(3);
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.timestamps().len(), 3);
        assert_eq!(doc.metadata().name.as_deref(), Some("Sample"));
        assert_eq!(doc.metadata().track_type.as_deref(), Some("track"));
        assert_eq!(doc.metadata().start_time, Some(time(0)));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let json = json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]},
            "properties": {"coordTimes": ["t0"]}
        })
        .to_string();
        let result = DocumentTrack::from_json(&json);
        assert!(matches!(
            result,
            Err(TrackError::LengthMismatch {
                coordinates: 2,
                timestamps: 1
            })
        ));
    }

    #[test]
    fn test_rejects_unsupported_geometry() {
        let json = json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": []},
            "properties": {}
        })
        .to_string();
        assert!(matches!(
            DocumentTrack::from_json(&json),
            Err(TrackError::UnsupportedGeometry(_))
        ));
        assert!(matches!(
            DocumentTrack::from_json(r#"{"type": "Topology"}"#),
            Err(TrackError::InvalidDocument { .. })
        ));
        assert!(matches!(
            DocumentTrack::from_json("not json"),
            Err(TrackError::Json(_))
        ));
    }

    #[test]
    fn test_untimed_feature_gets_empty_timestamps() {
        let json = json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0, 5.0]]}
        })
        .to_string();
        let doc = DocumentTrack::from_json(&json).unwrap();
        assert_eq!(doc.timestamps().len(), 2);
        assert!(doc.timestamps().iter().all(Option::is_none));
        assert_eq!(doc.to_points()[1].alt, Some(5.0));
    }

    #[test]
    fn test_multi_line_string_flattens() {
        let json = json!({
            "type": "Feature",
            "geometry": {"type": "MultiLineString", "coordinates": [[[0.0, 0.0], [1.0, 0.0]], [[2.0, 0.0]]]},
            "properties": {"coordTimes": [["a", "b"], ["c"]]}
        })
        .to_string();
        let doc = DocumentTrack::from_json(&json).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(times_of(&doc.whole()), vec!["a", "b", "c"]);
        assert!(matches!(doc.feature().geometry, Geometry::LineString { .. }));
    }

    #[test]
    fn test_feature_collection_merges_in_order() {
        let first: Feature = serde_json::from_str(&sample_json(2)).unwrap();
        let mut second = first.clone();
        second.properties.name = Some("Other".to_string());
        second.properties.coord_times = CoordTimes::Flat(vec![Some(time(5)), Some(time(6))]);

        let doc = DocumentTrack::from_feature_collection(FeatureCollection::new(vec![first, second])).unwrap();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.metadata().name.as_deref(), Some("Sample"));
        assert_eq!(doc.index_of(&time(6)), Some(3));

        assert!(DocumentTrack::from_feature_collection(FeatureCollection::default()).is_err());
    }

    #[test]
    fn test_segment_queries() {
        let doc = sample(5);
        assert_eq!(times_of(&doc.segment_before(&time(1))), vec![time(0), time(1)]);
        assert_eq!(times_of(&doc.segment_after(&time(3))), vec![time(3), time(4)]);
        assert_eq!(
            times_of(&doc.segment_between(&time(1), &time(3))),
            vec![time(1), time(2), time(3)]
        );

        assert!(doc.segment_before("missing").is_empty());
        assert!(doc.segment_after("missing").is_empty());
        assert!(doc.segment_between(&time(3), &time(1)).is_empty());
        assert!(doc.segment_between(&time(1), "missing").is_empty());
    }

    #[test]
    fn test_partition_shares_boundaries() {
        let doc = sample(5);
        let parts = doc.partition(&[time(3), time(1), time(3)]);
        let parts: Vec<Vec<String>> = parts.iter().map(times_of).collect();
        assert_eq!(
            parts,
            vec![
                vec![time(0), time(1)],
                vec![time(1), time(2), time(3)],
                vec![time(3), time(4)],
            ]
        );
    }

    #[test]
    fn test_partition_without_matches_is_whole() {
        let doc = sample(3);
        let parts = doc.partition(&["missing", time(0).as_str()]);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 3);

        let empty = DocumentTrack::new(TrackMetadata::default());
        let parts = empty.partition::<&str>(&[]);
        assert_eq!(parts.len(), 1);
        assert!(parts[0].is_empty());
    }

    #[test]
    fn test_split_and_trim_leave_self_untouched() {
        let doc = sample(5);
        let before = doc.clone();

        let parts = doc.split(&[time(2)]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].metadata().start_time, Some(time(2)));
        assert_eq!(parts[1].metadata().name.as_deref(), Some("Sample"));

        let trimmed = doc.trim(Some(&time(1)), None);
        assert_eq!(trimmed.len(), 4);
        assert_eq!(trimmed.metadata().start_time, Some(time(1)));
        assert!(doc.trim(Some("missing"), None).is_empty());

        assert_eq!(doc, before);
    }

    #[test]
    fn test_rebuild_from_replaces_feature() {
        let mut doc = sample(3);
        let points = vec![
            TrackPoint::new(1.0, 2.0).with_alt(3.0).with_time("b"),
            TrackPoint::new(4.0, 5.0),
        ];

        let previous = doc.rebuild_from(&points);
        assert_eq!(previous.geometry.line_coordinates().len(), 3);
        assert_eq!(doc.coordinates(), &[vec![2.0, 1.0, 3.0], vec![5.0, 4.0]]);
        assert_eq!(doc.timestamps(), &[Some("b".to_string()), None]);
        assert_eq!(doc.metadata().start_time.as_deref(), Some("b"));
        assert_eq!(doc.feature().properties.time.as_deref(), Some("b"));
    }

    #[test]
    fn test_json_round_trip() {
        let doc = sample(3);
        let again = DocumentTrack::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(again.coordinates(), doc.coordinates());
        assert_eq!(again.timestamps(), doc.timestamps());
        assert_eq!(doc.to_feature_collection().len(), 1);
    }
}
