//! Pluggable vertex index strategies.
//!
//! A [`Polyline`](super::Polyline) notifies its index of every membership change.
//! An index that has been built must apply those notifications surgically so it
//! always reflects the vertices currently present; it is never rebuilt in response
//! to a mutation.

use std::collections::HashMap;
use std::fmt::Debug;

use super::NodeId;
use crate::TrackPoint;

/// Auxiliary lookup structure maintained alongside a polyline.
pub trait VertexIndex: Default + Clone + Debug {
    /// Whether the index is materialized and answering lookups.
    fn is_built(&self) -> bool;

    /// Materialize the index from the current vertices (track order).
    fn build<'a, It>(&mut self, vertices: It)
    where
        It: Iterator<Item = (NodeId, &'a TrackPoint)>;

    /// A vertex joined the polyline.
    fn inserted(&mut self, id: NodeId, point: &TrackPoint);

    /// A vertex left the polyline.
    fn removed(&mut self, id: NodeId, point: &TrackPoint);

    /// Every vertex carrying `time`, in no particular order. Empty when unbuilt
    /// or absent.
    fn get(&self, time: &str) -> &[NodeId];

    /// Drop all entries and return to the unbuilt state.
    fn reset(&mut self);
}

/// No index: plain routes resolve timestamps by linear scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoIndex;

impl VertexIndex for NoIndex {
    fn is_built(&self) -> bool {
        false
    }

    fn build<'a, It>(&mut self, _vertices: It)
    where
        It: Iterator<Item = (NodeId, &'a TrackPoint)>,
    {
    }

    fn inserted(&mut self, _id: NodeId, _point: &TrackPoint) {}

    fn removed(&mut self, _id: NodeId, _point: &TrackPoint) {}

    fn get(&self, _time: &str) -> &[NodeId] {
        &[]
    }

    fn reset(&mut self) {}
}

/// Lazily built timestamp → vertex index.
///
/// Timestamps need not be unique; every vertex carrying a timestamp is kept. The
/// owning polyline picks the earliest in track order among duplicates.
#[derive(Debug, Clone, Default)]
pub struct TimestampIndex {
    entries: Option<HashMap<String, Vec<NodeId>>>,
}

impl TimestampIndex {
    /// Number of distinct timestamps indexed (0 when unbuilt).
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VertexIndex for TimestampIndex {
    fn is_built(&self) -> bool {
        self.entries.is_some()
    }

    fn build<'a, It>(&mut self, vertices: It)
    where
        It: Iterator<Item = (NodeId, &'a TrackPoint)>,
    {
        let mut entries: HashMap<String, Vec<NodeId>> = HashMap::new();
        for (id, point) in vertices {
            if let Some(time) = point.time.as_deref().filter(|t| !t.is_empty()) {
                entries.entry(time.to_string()).or_default().push(id);
            }
        }
        self.entries = Some(entries);
    }

    fn inserted(&mut self, id: NodeId, point: &TrackPoint) {
        let Some(entries) = self.entries.as_mut() else {
            return;
        };
        if let Some(time) = point.time.as_deref().filter(|t| !t.is_empty()) {
            entries.entry(time.to_string()).or_default().push(id);
        }
    }

    fn removed(&mut self, id: NodeId, point: &TrackPoint) {
        let Some(entries) = self.entries.as_mut() else {
            return;
        };
        let Some(time) = point.time.as_deref() else {
            return;
        };
        if let Some(ids) = entries.get_mut(time) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                entries.remove(time);
            }
        }
    }

    fn get(&self, time: &str) -> &[NodeId] {
        self.entries
            .as_ref()
            .and_then(|entries| entries.get(time))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn reset(&mut self) {
        self.entries = None;
    }
}
