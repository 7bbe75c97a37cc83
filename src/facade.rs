//! # Track Facade
//!
//! Public entry point binding one [`Track`] to one [`DocumentTrack`].
//!
//! ## Synchronization
//!
//! Every mutator takes a [`SyncMode`]. With [`SyncMode::Immediate`] the document
//! is rebuilt from the track right after an effective mutation. With
//! [`SyncMode::Deferred`] only the track changes and the facade stays dirty until
//! [`TrackFacade::resync`] is called, which allows batches of edits to pay for a
//! single rebuild:
//!
//! ```
//! use track_editor::{SyncMode, Target, TrackFacade, TrackMetadata, TrackPoint};
//!
//! let points: Vec<TrackPoint> = (0..5)
//!     .map(|i| TrackPoint::new(46.0 + i as f64 * 0.001, 7.0).with_time(format!("t{}", i)))
//!     .collect();
//! let mut facade = TrackFacade::from_points(points, TrackMetadata::named("Ridge"));
//!
//! facade.remove_at(Target::time("t1"), SyncMode::Deferred);
//! facade.remove_at(Target::time("t3"), SyncMode::Deferred);
//! assert!(facade.is_dirty());
//! assert_eq!(facade.document().map(|d| d.len()), Some(5));
//!
//! facade.resync().unwrap();
//! assert!(!facade.is_dirty());
//! assert_eq!(facade.document().map(|d| d.len()), Some(3));
//! ```
//!
//! Missing targets are never errors: mutators report them through `None`, empty or
//! zero results and leave both representations untouched.

use geo::coord;

use crate::document::DocumentTrack;
use crate::elevation::{Coord, ElevationMap, ElevationSource};
use crate::error::{Result, TrackError};
use crate::polyline::{NodeId, Replacement, TimestampIndex, Track};
use crate::stats::TrackStats;
use crate::{BoundingBox, Target, TrackConfig, TrackMetadata, TrackPoint};

/// When the document is rebuilt after a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Rebuild the document right away
    #[default]
    Immediate,
    /// Leave the document stale until [`TrackFacade::resync`]
    Deferred,
}

/// Items accepted by the facade's insert and replace operations.
///
/// Whole tracks and facades are drained; a drained facade is also cleared.
/// Nothing is drained when the operation's target does not resolve.
#[derive(Debug)]
pub enum TrackItems<'a> {
    Point(TrackPoint),
    Points(Vec<TrackPoint>),
    Track(&'a mut Track),
    Facade(&'a mut TrackFacade),
}

impl TrackItems<'_> {
    fn into_points(self) -> Vec<TrackPoint> {
        match self {
            TrackItems::Point(point) => vec![point],
            TrackItems::Points(points) => points,
            TrackItems::Track(donor) => donor.take_points(),
            TrackItems::Facade(donor) => {
                let points = donor.track.take_points();
                donor.clear();
                points
            }
        }
    }
}

impl From<TrackPoint> for TrackItems<'_> {
    fn from(point: TrackPoint) -> Self {
        TrackItems::Point(point)
    }
}

impl From<Vec<TrackPoint>> for TrackItems<'_> {
    fn from(points: Vec<TrackPoint>) -> Self {
        TrackItems::Points(points)
    }
}

impl<'a> From<&'a mut Track> for TrackItems<'a> {
    fn from(track: &'a mut Track) -> Self {
        TrackItems::Track(track)
    }
}

impl<'a> From<&'a mut TrackFacade> for TrackItems<'a> {
    fn from(facade: &'a mut TrackFacade) -> Self {
        TrackItems::Facade(facade)
    }
}

/// A track plus its synchronized document.
#[derive(Debug, Clone)]
pub struct TrackFacade {
    track: Track,
    /// Absent after `clear`
    document: Option<DocumentTrack>,
    config: TrackConfig,
    dirty: bool,
    cleared: bool,
    /// The last immediate resync failed
    sync_failed: bool,
}

impl TrackFacade {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Wrap an existing document. Its coordinates and timestamps are kept as is
    /// (no rebuild); a missing track-type tag is filled in from the config.
    pub fn from_document(document: DocumentTrack) -> Self {
        Self::from_document_with_config(document, TrackConfig::default())
    }

    pub fn from_document_with_config(mut document: DocumentTrack, config: TrackConfig) -> Self {
        document.tag_if_untyped(&config.track_type);
        let track = Track::from_points(document.to_points());
        log::info!(
            "[TrackFacade] Created from document with {} points",
            track.len()
        );
        Self {
            track,
            document: Some(document),
            config,
            dirty: false,
            cleared: false,
            sync_failed: false,
        }
    }

    /// Build a facade and its document from points.
    pub fn from_points(points: impl IntoIterator<Item = TrackPoint>, metadata: TrackMetadata) -> Self {
        Self::from_points_with_config(points, metadata, TrackConfig::default())
    }

    pub fn from_points_with_config(
        points: impl IntoIterator<Item = TrackPoint>,
        metadata: TrackMetadata,
        config: TrackConfig,
    ) -> Self {
        let facade = Self::from_track(Track::from_points(points), metadata, config);
        log::info!(
            "[TrackFacade] Created from {} points",
            facade.track.len()
        );
        facade
    }

    /// Parse a GeoJSON `Feature` or `FeatureCollection`.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_config(json, TrackConfig::default())
    }

    pub fn from_json_with_config(json: &str, config: TrackConfig) -> Result<Self> {
        let document = DocumentTrack::from_json(json)?;
        Ok(Self::from_document_with_config(document, config))
    }

    fn from_track(track: Track, mut metadata: TrackMetadata, config: TrackConfig) -> Self {
        if metadata.track_type.is_none() {
            metadata.track_type = Some(config.track_type.clone());
        }
        let mut document = DocumentTrack::new(metadata);
        document.rebuild_from(track.iter().map(|(_, p)| p));
        Self {
            track,
            document: Some(document),
            config,
            dirty: false,
            cleared: false,
            sync_failed: false,
        }
    }

    // ========================================================================
    // Synchronization
    // ========================================================================

    /// Whether the track has changed since the document was last rebuilt.
    ///
    /// Stays set when an immediate resync fails; see [`sync_failed`](Self::sync_failed).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Whether the most recent immediate-mode mutation could not rebuild the
    /// document (the facade was cleared). Reset by the next successful
    /// [`resync`](Self::resync).
    pub fn sync_failed(&self) -> bool {
        self.sync_failed
    }

    /// Rebuild the document from the track and clear the dirty flag.
    ///
    /// # Errors
    /// [`TrackError::Cleared`] after [`clear`](Self::clear); the document stays
    /// absent.
    pub fn resync(&mut self) -> Result<()> {
        if self.cleared {
            log::warn!("[TrackFacade] resync() on a cleared track, document stays absent");
            return Err(TrackError::Cleared);
        }
        let Some(document) = self.document.as_mut() else {
            return Err(TrackError::Cleared);
        };
        document.rebuild_from(self.track.iter().map(|(_, p)| p));
        self.dirty = false;
        self.sync_failed = false;
        Ok(())
    }

    fn after_mutation(&mut self, changed: bool, sync: SyncMode) {
        if !changed {
            return;
        }
        self.dirty = true;
        if sync == SyncMode::Immediate {
            self.sync_failed = self.resync().is_err();
        }
    }

    /// Empty the track and discard the document.
    pub fn clear(&mut self) {
        let removed = self.track.len();
        self.track.clear();
        self.document = None;
        self.dirty = false;
        self.cleared = true;
        log::debug!("[TrackFacade] Cleared {} points", removed);
    }

    // ========================================================================
    // Trim / Remove
    // ========================================================================

    pub fn trim_before(&mut self, target: impl Into<Target>, sync: SyncMode) -> Option<Track> {
        let severed = self.track.trim_before(target);
        self.after_mutation(severed.is_some(), sync);
        severed
    }

    pub fn trim_after(&mut self, target: impl Into<Target>, sync: SyncMode) -> Option<Track> {
        let severed = self.track.trim_after(target);
        self.after_mutation(severed.is_some(), sync);
        severed
    }

    /// Keep only `start..=end`; see [`Track::trim_to`](crate::Polyline::trim_to).
    pub fn trim_to(
        &mut self,
        start: Option<Target>,
        end: Option<Target>,
        sync: SyncMode,
    ) -> (Option<Track>, Option<Track>) {
        let (head, tail) = self.track.trim_to(start, end);
        self.after_mutation(head.is_some() || tail.is_some(), sync);
        (head, tail)
    }

    pub fn remove_at(&mut self, target: impl Into<Target>, sync: SyncMode) -> usize {
        let removed = self.track.remove_at(target);
        self.after_mutation(removed > 0, sync);
        removed
    }

    pub fn remove_at_any<T: Into<Target>>(
        &mut self,
        targets: impl IntoIterator<Item = T>,
        sync: SyncMode,
    ) -> usize {
        let removed = self.track.remove_at_any(targets);
        self.after_mutation(removed > 0, sync);
        removed
    }

    pub fn remove_between(
        &mut self,
        start: Option<Target>,
        end: Option<Target>,
        sync: SyncMode,
    ) -> Option<Track> {
        let removed = self.track.remove_between(start, end);
        self.after_mutation(removed.is_some(), sync);
        removed
    }

    pub fn remove_from_to(
        &mut self,
        start: Option<Target>,
        end: Option<Target>,
        sync: SyncMode,
    ) -> Option<Track> {
        let removed = self.track.remove_from_to(start, end);
        self.after_mutation(removed.is_some(), sync);
        removed
    }

    // ========================================================================
    // Insert
    // ========================================================================

    pub fn insert_before<'a>(
        &mut self,
        target: impl Into<Target>,
        items: impl Into<TrackItems<'a>>,
        sync: SyncMode,
    ) -> usize {
        let Some(id) = self.track.resolve(&target.into()) else {
            return 0;
        };
        let inserted = self.track.insert_before(id, items.into().into_points());
        self.after_mutation(inserted > 0, sync);
        inserted
    }

    pub fn insert_after<'a>(
        &mut self,
        target: impl Into<Target>,
        items: impl Into<TrackItems<'a>>,
        sync: SyncMode,
    ) -> usize {
        let Some(id) = self.track.resolve(&target.into()) else {
            return 0;
        };
        let inserted = self.track.insert_after(id, items.into().into_points());
        self.after_mutation(inserted > 0, sync);
        inserted
    }

    pub fn append<'a>(&mut self, items: impl Into<TrackItems<'a>>, sync: SyncMode) -> usize {
        let inserted = self.track.append(items.into().into_points());
        self.after_mutation(inserted > 0, sync);
        inserted
    }

    pub fn prepend<'a>(&mut self, items: impl Into<TrackItems<'a>>, sync: SyncMode) -> usize {
        let inserted = self.track.prepend(items.into().into_points());
        self.after_mutation(inserted > 0, sync);
        inserted
    }

    // ========================================================================
    // Replace
    // ========================================================================

    pub fn replace_at<'a>(
        &mut self,
        target: impl Into<Target>,
        items: impl Into<TrackItems<'a>>,
        sync: SyncMode,
    ) -> Option<Replacement<TimestampIndex>> {
        let id = self.track.resolve(&target.into())?;
        let replacement = self.track.replace_at(id, items.into().into_points());
        self.after_mutation(replacement.is_some(), sync);
        replacement
    }

    /// Replace the vertices strictly between `start` and `end`; adjacent endpoints
    /// only insert.
    pub fn replace_between<'a>(
        &mut self,
        start: Option<Target>,
        end: Option<Target>,
        items: impl Into<TrackItems<'a>>,
        sync: SyncMode,
    ) -> Option<Replacement<TimestampIndex>> {
        let (start, end) = self.track.resolve_range(start, end)?;
        if start == end {
            return None;
        }
        let replacement = self.track.replace_between(
            Some(start.into()),
            Some(end.into()),
            items.into().into_points(),
        );
        self.after_mutation(replacement.is_some(), sync);
        replacement
    }

    pub fn replace_from_to<'a>(
        &mut self,
        start: Option<Target>,
        end: Option<Target>,
        items: impl Into<TrackItems<'a>>,
        sync: SyncMode,
    ) -> Option<Replacement<TimestampIndex>> {
        let (start, end) = self.track.resolve_range(start, end)?;
        let replacement = self.track.replace_from_to(
            Some(start.into()),
            Some(end.into()),
            items.into().into_points(),
        );
        self.after_mutation(replacement.is_some(), sync);
        replacement
    }

    // ========================================================================
    // Split
    // ========================================================================

    /// Split at `target` into synchronized facades.
    pub fn split_by(self, target: impl Into<Target>) -> Vec<TrackFacade> {
        self.split_by_many([target.into()])
    }

    /// Split at every interior target into synchronized facades sharing the
    /// metadata and configuration. Consecutive parts share their split point.
    pub fn split_by_many<T: Into<Target>>(self, targets: impl IntoIterator<Item = T>) -> Vec<TrackFacade> {
        let metadata = self
            .document
            .as_ref()
            .map(|d| d.metadata().clone())
            .unwrap_or_default();
        let config = self.config;
        let parts = self.track.split_by_many(targets);
        log::debug!("[TrackFacade] Split into {} facades", parts.len());
        parts
            .into_iter()
            .map(|track| Self::from_track(track, metadata.clone(), config.clone()))
            .collect()
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// Compute path properties for every vertex and keep them current.
    pub fn add_properties(&mut self, sync: SyncMode) {
        self.track.add_properties();
        self.after_mutation(true, sync);
    }

    /// Assign known elevations. Returns the number of points updated.
    pub fn add_elevations(&mut self, elevations: &ElevationMap, sync: SyncMode) -> usize {
        let assigned = self.track.add_elevations(elevations);
        self.after_mutation(assigned > 0, sync);
        assigned
    }

    /// Query `source` for every point's coordinate, then assign the results.
    pub fn add_elevations_from(&mut self, source: &impl ElevationSource, sync: SyncMode) -> Result<usize> {
        let coords: Vec<Coord> = self
            .track
            .iter()
            .map(|(_, p)| coord! { x: p.lng, y: p.lat })
            .collect();
        let elevations = ElevationMap::from_lookup(&coords, source)?;
        Ok(self.add_elevations(&elevations, sync))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Current document; stale while [`is_dirty`](Self::is_dirty), absent after
    /// [`clear`](Self::clear).
    pub fn document(&self) -> Option<&DocumentTrack> {
        self.document.as_ref()
    }

    pub fn metadata(&self) -> Option<&TrackMetadata> {
        self.document.as_ref().map(DocumentTrack::metadata)
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn points(&self) -> Vec<TrackPoint> {
        self.track.points()
    }

    pub fn len(&self) -> usize {
        self.track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }

    pub fn node_by_time(&mut self, time: &str) -> Option<NodeId> {
        self.track.node_by_time(time)
    }

    pub fn nodes_by_value(&self, point: &TrackPoint) -> Vec<NodeId> {
        self.track.nodes_by_value(point)
    }

    /// Envelope of the current track using the configured single-point buffer.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_polyline(&self.track, Some(self.config.bounding_box_buffer))
    }

    pub fn stats(&self) -> TrackStats {
        TrackStats::compute(&self.track, &self.config)
    }

    /// Serialize the current document (as last synchronized).
    pub fn to_json(&self) -> Result<String> {
        self.document
            .as_ref()
            .ok_or(TrackError::Cleared)?
            .to_json()
    }
}
