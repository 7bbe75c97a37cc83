//! # Linked Track Structure
//!
//! An ordered sequence of vertices interleaved with derived segments, stored in two
//! generational arenas and linked by handles rather than pointers:
//!
//! ```text
//!   head                                           tail
//!  [V0] --seg0--> [V1] --seg1--> [V2] --seg2--> [V3]
//! ```
//!
//! Each vertex records `prev`/`next` vertex handles and `prev_seg`/`next_seg`
//! segment handles; each segment records its two endpoints. The index strategy `I`
//! is notified of every membership change:
//!
//! - [`Route`] = `Polyline<NoIndex>`: plain ordered geometry
//! - [`Track`] = `Polyline<TimestampIndex>`: lazily built timestamp index
//!
//! Editing algorithms live in `edit`, derived-value recomputation in `properties`.

mod arena;
mod edit;
mod index;
mod properties;

pub use edit::{Insertion, Replacement};
pub use index::{NoIndex, TimestampIndex, VertexIndex};

use arena::{Arena, Handle};

use crate::{Segment, Target, TrackPoint};

/// Handle to a vertex node. Stale handles (removed vertices) never resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Handle);

/// Handle to a segment node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(Handle);

/// Plain route: no timestamp index.
pub type Route = Polyline<NoIndex>;

/// Timestamped track with a lazily built timestamp index.
pub type Track = Polyline<TimestampIndex>;

#[derive(Debug, Clone)]
struct Vertex {
    point: TrackPoint,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    prev_seg: Option<SegmentId>,
    next_seg: Option<SegmentId>,
}

#[derive(Debug, Clone)]
struct SegmentNode {
    value: Segment,
    from: NodeId,
    to: NodeId,
}

/// Which derived vertex values are kept current across mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DerivedState {
    /// rotation, rotation rate, speed (enabled by `add_properties`)
    pub(crate) kinematics: bool,
    /// ascent and descent rates (enabled by `add_properties` / `add_elevations`)
    pub(crate) elevation: bool,
}

impl DerivedState {
    fn any(&self) -> bool {
        self.kinematics || self.elevation
    }
}

/// Arena-backed doubly-linked sequence of track points.
#[derive(Debug, Clone)]
pub struct Polyline<I: VertexIndex = NoIndex> {
    vertices: Arena<Vertex>,
    segments: Arena<SegmentNode>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    index: I,
    derived: DerivedState,
}

impl<I: VertexIndex> Default for Polyline<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over vertices in track order.
pub struct Iter<'a> {
    vertices: &'a Arena<Vertex>,
    current: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeId, &'a TrackPoint);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let vertex = self.vertices.get(id.0)?;
        self.current = vertex.next;
        Some((id, &vertex.point))
    }
}

/// Iterator over segments in track order.
pub struct Segments<'a> {
    vertices: &'a Arena<Vertex>,
    segments: &'a Arena<SegmentNode>,
    current: Option<NodeId>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a Segment;

    fn next(&mut self) -> Option<Self::Item> {
        let vertex = self.vertices.get(self.current?.0)?;
        let segment = self.segments.get(vertex.next_seg?.0)?;
        self.current = vertex.next;
        Some(&segment.value)
    }
}

impl<I: VertexIndex> Polyline<I> {
    /// Create an empty polyline.
    pub fn new() -> Self {
        Self {
            vertices: Arena::new(),
            segments: Arena::new(),
            head: None,
            tail: None,
            index: I::default(),
            derived: DerivedState::default(),
        }
    }

    /// Build a polyline from points in order.
    ///
    /// # Example
    /// ```
    /// use track_editor::{Track, TrackPoint};
    ///
    /// let track = Track::from_points(vec![
    ///     TrackPoint::new(51.5074, -0.1278),
    ///     TrackPoint::new(51.5080, -0.1290),
    /// ]);
    /// assert_eq!(track.len(), 2);
    /// assert_eq!(track.segments().count(), 1);
    /// ```
    pub fn from_points(points: impl IntoIterator<Item = TrackPoint>) -> Self {
        let mut polyline = Self::new();
        polyline.link_points(None, None, points.into_iter().collect());
        polyline
    }

    /// Build a polyline carrying over which derived values are maintained.
    pub(crate) fn spawn(points: Vec<TrackPoint>, derived: DerivedState) -> Self {
        let mut polyline = Self::new();
        polyline.derived = derived;
        polyline.link_points(None, None, points);
        polyline
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    /// Check if a handle refers to a live vertex of this polyline.
    pub fn contains(&self, id: NodeId) -> bool {
        self.vertices.get(id.0).is_some()
    }

    pub fn point(&self, id: NodeId) -> Option<&TrackPoint> {
        self.vertices.get(id.0).map(|v| &v.point)
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.vertices.get(id.0)?.next
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.vertices.get(id.0)?.prev
    }

    /// Segment leading into `id`.
    pub fn segment_before(&self, id: NodeId) -> Option<&Segment> {
        let seg = self.vertices.get(id.0)?.prev_seg?;
        self.segment(seg)
    }

    /// Segment leaving `id`.
    pub fn segment_after(&self, id: NodeId) -> Option<&Segment> {
        let seg = self.vertices.get(id.0)?.next_seg?;
        self.segment(seg)
    }

    /// Handles of the segments around `id`: `(prev_seg, next_seg)`.
    pub fn segment_ids(&self, id: NodeId) -> (Option<SegmentId>, Option<SegmentId>) {
        self.vertices
            .get(id.0)
            .map_or((None, None), |v| (v.prev_seg, v.next_seg))
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0).map(|s| &s.value)
    }

    /// Endpoints of a segment: `(from, to)`.
    pub fn segment_endpoints(&self, id: SegmentId) -> Option<(NodeId, NodeId)> {
        self.segments.get(id.0).map(|s| (s.from, s.to))
    }

    /// Vertices in track order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            vertices: &self.vertices,
            current: self.head,
        }
    }

    /// Segments in track order.
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            vertices: &self.vertices,
            segments: &self.segments,
            current: self.head,
        }
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Clone of every point in track order.
    pub fn points(&self) -> Vec<TrackPoint> {
        self.iter().map(|(_, p)| p.clone()).collect()
    }

    /// Timestamps in track order (parallel to [`Polyline::points`]).
    pub fn timestamps(&self) -> Vec<Option<String>> {
        self.iter().map(|(_, p)| p.time.clone()).collect()
    }

    /// Whether `add_properties` has been applied and is being maintained.
    pub fn has_properties(&self) -> bool {
        self.derived.kinematics
    }

    pub fn is_index_built(&self) -> bool {
        self.index.is_built()
    }

    pub(crate) fn derived(&self) -> DerivedState {
        self.derived
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Find the vertex carrying `time`.
    ///
    /// Builds the index on first use. Returns `None` for an empty or unknown
    /// timestamp. Unindexed polylines fall back to a linear scan.
    pub fn node_by_time(&mut self, time: &str) -> Option<NodeId> {
        if time.is_empty() {
            return None;
        }
        if !self.index.is_built() {
            let vertices = Iter {
                vertices: &self.vertices,
                current: self.head,
            };
            self.index.build(vertices);
        }
        if self.index.is_built() {
            return match self.index.get(time) {
                [] => None,
                [id] => Some(*id),
                // duplicates answer in track order, as the linear scan does
                candidates => self
                    .iter()
                    .map(|(id, _)| id)
                    .find(|id| candidates.contains(id)),
            };
        }
        self.iter()
            .find(|(_, p)| p.time.as_deref() == Some(time))
            .map(|(id, _)| id)
    }

    /// Every vertex equal to `point`, in track order.
    pub fn nodes_by_value(&self, point: &TrackPoint) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, p)| *p == point)
            .map(|(id, _)| id)
            .collect()
    }

    /// Resolve a target to a single vertex (first match for value targets).
    pub fn resolve(&mut self, target: &Target) -> Option<NodeId> {
        match target {
            Target::Node(id) => self.contains(*id).then_some(*id),
            Target::Value(point) => self
                .iter()
                .find(|(_, p)| *p == point)
                .map(|(id, _)| id),
            Target::Time(time) => self.node_by_time(time),
        }
    }

    /// Resolve a target to every vertex it addresses.
    pub fn resolve_all(&mut self, target: &Target) -> Vec<NodeId> {
        match target {
            Target::Value(point) => self.nodes_by_value(point),
            other => self.resolve(other).into_iter().collect(),
        }
    }

    /// Check whether `end` is reachable from `start` walking forwards.
    pub(crate) fn precedes_or_equal(&self, start: NodeId, end: NodeId) -> bool {
        let mut current = Some(start);
        while let Some(id) = current {
            if id == end {
                return true;
            }
            current = self.next(id);
        }
        false
    }

    // ========================================================================
    // Linking primitives
    // ========================================================================

    fn alloc_vertex(&mut self, point: TrackPoint) -> NodeId {
        let id = NodeId(self.vertices.insert(Vertex {
            point,
            prev: None,
            next: None,
            prev_seg: None,
            next_seg: None,
        }));
        if let Some(vertex) = self.vertices.get(id.0) {
            self.index.inserted(id, &vertex.point);
        }
        id
    }

    /// Release an unlinked vertex and return its point.
    fn free_vertex(&mut self, id: NodeId) -> Option<TrackPoint> {
        let vertex = self.vertices.remove(id.0)?;
        self.index.removed(id, &vertex.point);
        Some(vertex.point)
    }

    /// Link `from -> to` and create the segment between them.
    fn connect(&mut self, from: NodeId, to: NodeId) {
        let (Some(a), Some(b)) = (self.vertices.get(from.0), self.vertices.get(to.0)) else {
            return;
        };
        let value = Segment::between(&a.point, &b.point);
        let seg = SegmentId(self.segments.insert(SegmentNode { value, from, to }));

        if let Some(a) = self.vertices.get_mut(from.0) {
            a.next = Some(to);
            a.next_seg = Some(seg);
        }
        if let Some(b) = self.vertices.get_mut(to.0) {
            b.prev = Some(from);
            b.prev_seg = Some(seg);
        }
    }

    /// Break the link leaving `id`, dropping its segment. Returns the former next.
    fn disconnect(&mut self, id: NodeId) -> Option<NodeId> {
        let vertex = self.vertices.get_mut(id.0)?;
        let next = vertex.next.take();
        if let Some(seg) = vertex.next_seg.take() {
            self.segments.remove(seg.0);
        }
        if let Some(next_vertex) = next.and_then(|n| self.vertices.get_mut(n.0)) {
            next_vertex.prev = None;
            next_vertex.prev_seg = None;
        }
        next
    }

    /// Detach the contiguous run `first..=last` and return its points in order.
    ///
    /// Neighbours on both sides are re-linked; boundary removal moves head/tail.
    pub(crate) fn detach_run(&mut self, first: NodeId, last: NodeId) -> Vec<TrackPoint> {
        let before = self.prev(first);
        let after = self.next(last);

        let mut ids = Vec::new();
        let mut current = Some(first);
        while let Some(id) = current {
            ids.push(id);
            if id == last {
                break;
            }
            current = self.next(id);
        }

        if let Some(before) = before {
            self.disconnect(before);
        }
        let mut points = Vec::with_capacity(ids.len());
        for id in ids {
            self.disconnect(id);
            if let Some(point) = self.free_vertex(id) {
                points.push(point);
            }
        }

        match (before, after) {
            (Some(b), Some(a)) => self.connect(b, a),
            (None, Some(a)) => self.head = Some(a),
            (Some(b), None) => self.tail = Some(b),
            (None, None) => {
                self.head = None;
                self.tail = None;
            }
        }
        if let Some(b) = before {
            self.refresh_vertex(b);
        }
        if let Some(a) = after {
            self.refresh_vertex(a);
        }

        points
    }

    /// Insert `points` between the adjacent vertices `after` and `before`
    /// (either may be `None` at a boundary). Returns the inserted count.
    pub(crate) fn link_points(
        &mut self,
        after: Option<NodeId>,
        before: Option<NodeId>,
        points: Vec<TrackPoint>,
    ) -> usize {
        if points.is_empty() {
            return 0;
        }
        if let (Some(a), Some(_)) = (after, before) {
            self.disconnect(a);
        }

        let ids: Vec<NodeId> = points.into_iter().map(|p| self.alloc_vertex(p)).collect();
        for pair in ids.windows(2) {
            self.connect(pair[0], pair[1]);
        }

        let (first, last) = (ids[0], ids[ids.len() - 1]);
        match after {
            Some(a) => self.connect(a, first),
            None => self.head = Some(first),
        }
        match before {
            Some(b) => self.connect(last, b),
            None => self.tail = Some(last),
        }

        for id in &ids {
            self.drop_unmaintained(*id);
        }
        if self.derived.any() {
            for id in after.iter().chain(ids.iter()).chain(before.iter()) {
                self.refresh_vertex(*id);
            }
        }
        ids.len()
    }

    /// Remove every vertex and return the points in order.
    ///
    /// The polyline keeps its derived-value settings; the index returns to the
    /// unbuilt state.
    pub fn take_points(&mut self) -> Vec<TrackPoint> {
        let order = self.node_ids();
        let points: Vec<TrackPoint> = order
            .into_iter()
            .filter_map(|id| self.vertices.remove(id.0))
            .map(|vertex| vertex.point)
            .collect();
        self.vertices.clear();
        self.segments.clear();
        self.head = None;
        self.tail = None;
        self.index.reset();
        points
    }

    /// Remove every vertex.
    pub fn clear(&mut self) {
        self.take_points();
        self.derived = DerivedState::default();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(i: usize) -> TrackPoint {
        TrackPoint::new(51.5 + i as f64 * 0.001, -0.12).with_time(format!("2024-05-01T10:00:{:02}Z", i))
    }

    fn sample_track(n: usize) -> Track {
        Track::from_points((0..n).map(timed))
    }

    #[test]
    fn test_from_points_links_everything() {
        let track = sample_track(4);
        assert_eq!(track.len(), 4);
        assert_eq!(track.segments().count(), 3);

        let ids = track.node_ids();
        assert_eq!(track.head(), Some(ids[0]));
        assert_eq!(track.tail(), Some(ids[3]));
        assert_eq!(track.prev(ids[0]), None);
        assert_eq!(track.next(ids[3]), None);
        for pair in ids.windows(2) {
            assert_eq!(track.next(pair[0]), Some(pair[1]));
            assert_eq!(track.prev(pair[1]), Some(pair[0]));
            let (_, next_seg) = track.segment_ids(pair[0]);
            let (prev_seg, _) = track.segment_ids(pair[1]);
            assert_eq!(next_seg, prev_seg);
            assert_eq!(track.segment_endpoints(next_seg.unwrap()), Some((pair[0], pair[1])));
        }
    }

    #[test]
    fn test_empty_polyline() {
        let mut track = Track::new();
        assert!(track.is_empty());
        assert_eq!(track.len(), 0);
        assert_eq!(track.head(), None);
        assert_eq!(track.segments().count(), 0);
        assert_eq!(track.node_by_time("2024-05-01T10:00:00Z"), None);
    }

    #[test]
    fn test_node_by_time_builds_index_lazily() {
        let mut track = sample_track(3);
        assert!(!track.is_index_built());

        let id = track.node_by_time("2024-05-01T10:00:01Z");
        assert!(track.is_index_built());
        assert_eq!(id, Some(track.node_ids()[1]));
        assert_eq!(track.node_by_time(""), None);
        assert_eq!(track.node_by_time("2024-05-01T11:00:00Z"), None);
    }

    #[test]
    fn test_duplicate_times_resolve_in_track_order() {
        let t = "2024-05-01T10:00:00Z";
        let a = TrackPoint::new(0.0, 0.0).with_time(t);
        let b = TrackPoint::new(1.0, 0.0).with_time(t);

        // index built before the insert
        let mut eager = Track::from_points(vec![a.clone()]);
        assert!(eager.node_by_time(t).is_some());
        eager.insert_before(Target::time(t), b.clone());

        // index built after the insert
        let mut lazy = Track::from_points(vec![a.clone()]);
        let head = lazy.head().unwrap();
        lazy.insert_before(head, b.clone());
        assert!(!lazy.is_index_built());

        let mut route = Route::from_points(vec![a]);
        route.insert_before(Target::time(t), b.clone());

        assert_eq!(eager.node_by_time(t), eager.head());
        assert_eq!(lazy.node_by_time(t), lazy.head());
        assert_eq!(route.node_by_time(t), route.head());
        assert_eq!(eager.point(eager.head().unwrap()), Some(&b));

        // removing the earlier duplicate leaves the later one
        let first = eager.head().unwrap();
        assert_eq!(eager.remove_at(first), 1);
        assert_eq!(eager.node_by_time(t), eager.head());
    }

    #[test]
    fn test_route_resolves_time_by_scan() {
        let mut route = Route::from_points((0..3).map(timed));
        let id = route.node_by_time("2024-05-01T10:00:02Z");
        assert!(!route.is_index_built());
        assert_eq!(id, route.tail());
    }

    #[test]
    fn test_nodes_by_value_returns_all_matches() {
        let p = TrackPoint::new(1.0, 1.0);
        let mut track = Track::from_points(vec![p.clone(), TrackPoint::new(2.0, 2.0), p.clone()]);
        let matches = track.nodes_by_value(&p);
        assert_eq!(matches.len(), 2);
        assert_eq!(track.resolve(&Target::Value(p)), Some(matches[0]));
    }

    #[test]
    fn test_resolve_node_handle() {
        let mut track = sample_track(2);
        let head = track.head().unwrap();
        assert_eq!(track.resolve(&Target::Node(head)), Some(head));

        track.detach_run(head, head);
        assert_eq!(track.resolve(&Target::Node(head)), None);
        assert!(!track.contains(head));
    }

    #[test]
    fn test_precedes_or_equal() {
        let track = sample_track(4);
        let ids = track.node_ids();
        assert!(track.precedes_or_equal(ids[1], ids[3]));
        assert!(track.precedes_or_equal(ids[2], ids[2]));
        assert!(!track.precedes_or_equal(ids[3], ids[0]));
    }

    #[test]
    fn test_take_points_empties() {
        let mut track = sample_track(3);
        track.node_by_time("2024-05-01T10:00:00Z");
        let points = track.take_points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], timed(2));
        assert!(track.is_empty());
        assert!(!track.is_index_built());
    }
}
