//! Editing algorithms: trim, remove, insert, replace and split.
//!
//! Every operation addresses vertices through a [`Target`]. A target that does not
//! resolve, or a range that is empty or reversed, leaves the structure untouched and
//! yields `None`, an empty result or zero. Nothing here panics on missing input.

use std::collections::{HashMap, HashSet};

use super::{NodeId, Polyline, VertexIndex};
use crate::{Target, TrackPoint};

/// Items to insert: a single point, several points, or the whole content of
/// another polyline.
///
/// Inserting a polyline drains it: the donor is left with zero points. If the
/// insertion target does not resolve, the donor is left untouched.
#[derive(Debug)]
pub enum Insertion<'a, I: VertexIndex> {
    Point(TrackPoint),
    Points(Vec<TrackPoint>),
    Polyline(&'a mut Polyline<I>),
}

impl<I: VertexIndex> Insertion<'_, I> {
    fn into_points(self) -> Vec<TrackPoint> {
        match self {
            Insertion::Point(point) => vec![point],
            Insertion::Points(points) => points,
            Insertion::Polyline(donor) => donor.take_points(),
        }
    }
}

impl<I: VertexIndex> From<TrackPoint> for Insertion<'_, I> {
    fn from(point: TrackPoint) -> Self {
        Insertion::Point(point)
    }
}

impl<I: VertexIndex> From<Vec<TrackPoint>> for Insertion<'_, I> {
    fn from(points: Vec<TrackPoint>) -> Self {
        Insertion::Points(points)
    }
}

impl<'a, I: VertexIndex> From<&'a mut Polyline<I>> for Insertion<'a, I> {
    fn from(donor: &'a mut Polyline<I>) -> Self {
        Insertion::Polyline(donor)
    }
}

/// Outcome of a replace operation.
#[derive(Debug)]
pub struct Replacement<I: VertexIndex> {
    /// Removed run, `None` when the range held no vertices
    pub removed: Option<Polyline<I>>,
    /// Number of vertices inserted in its place
    pub inserted: usize,
}

impl<I: VertexIndex> Polyline<I> {
    // ========================================================================
    // Trim
    // ========================================================================

    /// Detach every vertex before `target` and return them as a new polyline.
    ///
    /// `None` when the target is absent or already the head.
    pub fn trim_before(&mut self, target: impl Into<Target>) -> Option<Self> {
        let id = self.resolve(&target.into())?;
        let first = self.head?;
        let last = self.prev(id)?;
        let severed = self.detach_run(first, last);
        log::debug!("[Track] Trimmed {} vertices before target", severed.len());
        Some(Self::spawn(severed, self.derived))
    }

    /// Detach every vertex after `target` and return them as a new polyline.
    ///
    /// `None` when the target is absent or already the tail.
    pub fn trim_after(&mut self, target: impl Into<Target>) -> Option<Self> {
        let id = self.resolve(&target.into())?;
        let first = self.next(id)?;
        let last = self.tail?;
        let severed = self.detach_run(first, last);
        log::debug!("[Track] Trimmed {} vertices after target", severed.len());
        Some(Self::spawn(severed, self.derived))
    }

    /// Keep only `start..=end`. Either side may be omitted.
    ///
    /// Returns the severed `(head, tail)` parts, `None` where nothing was trimmed.
    /// Both targets are resolved before anything is detached.
    pub fn trim_to(
        &mut self,
        start: Option<Target>,
        end: Option<Target>,
    ) -> (Option<Self>, Option<Self>) {
        let start = start.and_then(|t| self.resolve(&t));
        let end = end.and_then(|t| self.resolve(&t));
        if let (Some(s), Some(e)) = (start, end) {
            if !self.precedes_or_equal(s, e) {
                return (None, None);
            }
        }
        let head = start.and_then(|s| self.trim_before(s));
        let tail = end.and_then(|e| self.trim_after(e));
        (head, tail)
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Remove the vertex (or, for value targets, every vertex) addressed by
    /// `target`. Returns the number removed.
    pub fn remove_at(&mut self, target: impl Into<Target>) -> usize {
        let ids = self.resolve_all(&target.into());
        self.remove_nodes(ids)
    }

    /// Remove every vertex addressed by any of `targets`. All targets are resolved
    /// first; unmatched ones are skipped. Returns the number removed.
    pub fn remove_at_any<T: Into<Target>>(&mut self, targets: impl IntoIterator<Item = T>) -> usize {
        let mut ids = Vec::new();
        for target in targets {
            ids.extend(self.resolve_all(&target.into()));
        }
        self.remove_nodes(ids)
    }

    fn remove_nodes(&mut self, ids: Vec<NodeId>) -> usize {
        let mut seen = HashSet::new();
        let mut removed = 0;
        for id in ids {
            if seen.insert(id) && self.contains(id) {
                removed += self.detach_run(id, id).len();
            }
        }
        if removed > 0 {
            log::debug!("[Track] Removed {} vertices", removed);
        }
        removed
    }

    /// Remove the vertices strictly between `start` and `end`.
    ///
    /// A missing endpoint defaults to the head/tail. `None` when an endpoint does
    /// not resolve, the range is reversed, or the endpoints are equal or adjacent.
    pub fn remove_between(&mut self, start: Option<Target>, end: Option<Target>) -> Option<Self> {
        let (s, e) = self.resolve_range(start, end)?;
        if s == e {
            return None;
        }
        let first = self.next(s)?;
        if first == e {
            return None;
        }
        let last = self.prev(e)?;
        let removed = self.detach_run(first, last);
        log::debug!("[Track] Removed {} vertices between targets", removed.len());
        Some(Self::spawn(removed, self.derived))
    }

    /// Remove `start..=end` inclusive. A missing endpoint defaults to the head/tail.
    pub fn remove_from_to(&mut self, start: Option<Target>, end: Option<Target>) -> Option<Self> {
        let (s, e) = self.resolve_range(start, end)?;
        let removed = self.detach_run(s, e);
        log::debug!("[Track] Removed {} vertices from/to targets", removed.len());
        Some(Self::spawn(removed, self.derived))
    }

    /// Resolve range endpoints, defaulting to the boundaries; checks ordering.
    pub(crate) fn resolve_range(&mut self, start: Option<Target>, end: Option<Target>) -> Option<(NodeId, NodeId)> {
        let s = match start {
            Some(target) => self.resolve(&target)?,
            None => self.head?,
        };
        let e = match end {
            Some(target) => self.resolve(&target)?,
            None => self.tail?,
        };
        self.precedes_or_equal(s, e).then_some((s, e))
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert `items` immediately before `target`. Returns the inserted count
    /// (0 when the target is absent).
    pub fn insert_before<'a>(
        &mut self,
        target: impl Into<Target>,
        items: impl Into<Insertion<'a, I>>,
    ) -> usize
    where
        I: 'a,
    {
        let Some(id) = self.resolve(&target.into()) else {
            return 0;
        };
        let prev = self.prev(id);
        self.link_points(prev, Some(id), items.into().into_points())
    }

    /// Insert `items` immediately after `target`. Returns the inserted count
    /// (0 when the target is absent).
    pub fn insert_after<'a>(
        &mut self,
        target: impl Into<Target>,
        items: impl Into<Insertion<'a, I>>,
    ) -> usize
    where
        I: 'a,
    {
        let Some(id) = self.resolve(&target.into()) else {
            return 0;
        };
        let next = self.next(id);
        self.link_points(Some(id), next, items.into().into_points())
    }

    /// Insert `items` after the tail (works on an empty polyline).
    pub fn append<'a>(&mut self, items: impl Into<Insertion<'a, I>>) -> usize
    where
        I: 'a,
    {
        let tail = self.tail;
        self.link_points(tail, None, items.into().into_points())
    }

    /// Insert `items` before the head (works on an empty polyline).
    pub fn prepend<'a>(&mut self, items: impl Into<Insertion<'a, I>>) -> usize
    where
        I: 'a,
    {
        let head = self.head;
        self.link_points(None, head, items.into().into_points())
    }

    // ========================================================================
    // Replace
    // ========================================================================

    /// Replace the vertex at `target` with `items`.
    pub fn replace_at<'a>(
        &mut self,
        target: impl Into<Target>,
        items: impl Into<Insertion<'a, I>>,
    ) -> Option<Replacement<I>>
    where
        I: 'a,
    {
        let id = self.resolve(&target.into())?;
        Some(self.replace_run(id, id, items.into()))
    }

    /// Replace the vertices strictly between `start` and `end` with `items`.
    ///
    /// Adjacent endpoints remove nothing; the items are still inserted between them.
    /// `None` when an endpoint does not resolve, the range is reversed or
    /// `start == end`.
    pub fn replace_between<'a>(
        &mut self,
        start: Option<Target>,
        end: Option<Target>,
        items: impl Into<Insertion<'a, I>>,
    ) -> Option<Replacement<I>>
    where
        I: 'a,
    {
        let (s, e) = self.resolve_range(start, end)?;
        if s == e {
            return None;
        }
        let removed = match (self.next(s), self.prev(e)) {
            (Some(first), Some(last)) if first != e => {
                Some(Self::spawn(self.detach_run(first, last), self.derived))
            }
            _ => None,
        };
        let inserted = self.link_points(Some(s), Some(e), items.into().into_points());
        Some(Replacement { removed, inserted })
    }

    /// Replace `start..=end` inclusive with `items`.
    pub fn replace_from_to<'a>(
        &mut self,
        start: Option<Target>,
        end: Option<Target>,
        items: impl Into<Insertion<'a, I>>,
    ) -> Option<Replacement<I>>
    where
        I: 'a,
    {
        let (s, e) = self.resolve_range(start, end)?;
        Some(self.replace_run(s, e, items.into()))
    }

    fn replace_run(&mut self, first: NodeId, last: NodeId, items: Insertion<'_, I>) -> Replacement<I> {
        let before = self.prev(first);
        let after = self.next(last);
        let removed = self.detach_run(first, last);
        let inserted = self.link_points(before, after, items.into_points());
        log::debug!(
            "[Track] Replaced {} vertices with {}",
            removed.len(),
            inserted
        );
        Replacement {
            removed: Some(Self::spawn(removed, self.derived)),
            inserted,
        }
    }

    // ========================================================================
    // Split
    // ========================================================================

    /// Split at `target`. See [`Polyline::split_by_many`].
    pub fn split_by(self, target: impl Into<Target>) -> Vec<Self> {
        self.split_by_many([target.into()])
    }

    /// Partition into contiguous parts at every resolvable interior target.
    ///
    /// Each split vertex closes one part and opens the next, so consecutive parts
    /// share it. Absent targets, the head and the tail are ignored and duplicates
    /// count once; with no effective split point the result is `vec![self]`.
    pub fn split_by_many<T: Into<Target>>(mut self, targets: impl IntoIterator<Item = T>) -> Vec<Self> {
        let order = self.node_ids();
        if order.len() < 3 {
            return vec![self];
        }
        let position: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut cuts: Vec<usize> = Vec::new();
        for target in targets {
            if let Some(pos) = self.resolve(&target.into()).and_then(|id| position.get(&id)) {
                if *pos > 0 && *pos < order.len() - 1 {
                    cuts.push(*pos);
                }
            }
        }
        cuts.sort_unstable();
        cuts.dedup();
        if cuts.is_empty() {
            return vec![self];
        }

        let derived = self.derived;
        let points = self.take_points();
        let mut parts = Vec::with_capacity(cuts.len() + 1);
        let mut start = 0;
        for cut in cuts {
            parts.push(Self::spawn(points[start..=cut].to_vec(), derived));
            start = cut;
        }
        parts.push(Self::spawn(points[start..].to_vec(), derived));
        log::debug!("[Track] Split into {} parts", parts.len());
        parts
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Track;

    fn time(i: usize) -> String {
        format!("2024-05-01T10:00:{:02}Z", i)
    }

    fn timed(i: usize) -> TrackPoint {
        TrackPoint::new(51.5 + i as f64 * 0.001, -0.12 + i as f64 * 0.0005).with_time(time(i))
    }

    fn sample_track(n: usize) -> Track {
        Track::from_points((0..n).map(timed))
    }

    fn times(track: &Track) -> Vec<String> {
        track.timestamps().into_iter().flatten().collect()
    }

    /// Linked structure, segment links and index all agree.
    fn assert_consistent(track: &mut Track) {
        let ids = track.node_ids();
        assert_eq!(ids.len(), track.len());
        assert_eq!(track.head(), ids.first().copied());
        assert_eq!(track.tail(), ids.last().copied());
        assert_eq!(track.segments().count(), ids.len().saturating_sub(1));
        for pair in ids.windows(2) {
            assert_eq!(track.prev(pair[1]), Some(pair[0]));
            let (_, seg) = track.segment_ids(pair[0]);
            assert_eq!(track.segment_endpoints(seg.unwrap()), Some((pair[0], pair[1])));
        }
        for id in &ids {
            let t = track.point(*id).unwrap().time.clone().unwrap();
            assert_eq!(track.node_by_time(&t), Some(*id));
        }
    }

    // ---- trim ----

    #[test]
    fn test_trim_before() {
        let mut track = sample_track(5);
        let severed = track.trim_before(Target::time(time(2))).unwrap();
        assert_eq!(times(&severed), vec![time(0), time(1)]);
        assert_eq!(times(&track), vec![time(2), time(3), time(4)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_trim_after() {
        let mut track = sample_track(5);
        let severed = track.trim_after(Target::time(time(2))).unwrap();
        assert_eq!(times(&severed), vec![time(3), time(4)]);
        assert_eq!(times(&track), vec![time(0), time(1), time(2)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_trim_noops() {
        let mut track = sample_track(3);
        assert!(track.trim_before(Target::time(time(0))).is_none());
        assert!(track.trim_after(Target::time(time(2))).is_none());
        assert!(track.trim_before(Target::time("missing")).is_none());
        assert_eq!(track.len(), 3);

        let mut empty = Track::new();
        assert!(empty.trim_before(Target::time(time(0))).is_none());
    }

    #[test]
    fn test_trim_to() {
        let mut track = sample_track(6);
        let (head, tail) = track.trim_to(Some(Target::time(time(1))), Some(Target::time(time(3))));
        assert_eq!(times(&head.unwrap()), vec![time(0)]);
        assert_eq!(times(&tail.unwrap()), vec![time(4), time(5)]);
        assert_eq!(times(&track), vec![time(1), time(2), time(3)]);

        let (head, tail) = track.trim_to(None, Some(Target::time(time(2))));
        assert!(head.is_none());
        assert_eq!(times(&tail.unwrap()), vec![time(3)]);
        assert_consistent(&mut track);
    }

    // ---- remove ----

    #[test]
    fn test_remove_at_boundaries_and_interior() {
        let mut track = sample_track(5);
        assert_eq!(track.remove_at(Target::time(time(0))), 1);
        assert_eq!(track.remove_at(Target::time(time(4))), 1);
        assert_eq!(track.remove_at(Target::time(time(2))), 1);
        assert_eq!(times(&track), vec![time(1), time(3)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_remove_second_node_is_reachable() {
        let mut track = sample_track(4);
        let second = track.node_ids()[1];
        assert_eq!(track.remove_at(second), 1);
        assert_eq!(times(&track), vec![time(0), time(2), time(3)]);
        assert_eq!(track.remove_from_to(Some(Target::time(time(2))), None).unwrap().len(), 2);
        assert_eq!(times(&track), vec![time(0)]);
    }

    #[test]
    fn test_remove_sole_point() {
        let mut track = sample_track(1);
        assert_eq!(track.remove_at(Target::time(time(0))), 1);
        assert!(track.is_empty());
        assert_eq!(track.head(), None);
        assert_eq!(track.tail(), None);
        assert_eq!(track.remove_at(Target::time(time(0))), 0);
    }

    #[test]
    fn test_remove_at_by_value_removes_all_matches() {
        let dup = TrackPoint::new(1.0, 1.0);
        let mut track = Track::from_points(vec![
            dup.clone(),
            TrackPoint::new(2.0, 2.0),
            dup.clone(),
        ]);
        assert_eq!(track.remove_at(dup), 2);
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn test_remove_at_any_skips_unmatched_and_duplicates() {
        let mut track = sample_track(5);
        let id = track.node_ids()[3];
        let removed = track.remove_at_any(vec![
            Target::time(time(1)),
            Target::time("missing"),
            Target::Node(id),
            Target::time(time(1)),
        ]);
        assert_eq!(removed, 2);
        assert_eq!(times(&track), vec![time(0), time(2), time(4)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_remove_between_exclusive() {
        let mut track = sample_track(6);
        let removed = track
            .remove_between(Some(Target::time(time(1))), Some(Target::time(time(4))))
            .unwrap();
        assert_eq!(times(&removed), vec![time(2), time(3)]);
        assert_eq!(times(&track), vec![time(0), time(1), time(4), time(5)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_remove_between_noops() {
        let mut track = sample_track(4);
        let same = Some(Target::time(time(1)));
        assert!(track.remove_between(same.clone(), same).is_none());
        assert!(track
            .remove_between(Some(Target::time(time(1))), Some(Target::time(time(2))))
            .is_none());
        // reversed
        assert!(track
            .remove_between(Some(Target::time(time(3))), Some(Target::time(time(0))))
            .is_none());
        // unresolvable endpoint
        assert!(track
            .remove_between(Some(Target::time("missing")), None)
            .is_none());
        assert_eq!(track.len(), 4);
    }

    #[test]
    fn test_remove_between_defaults_to_boundaries() {
        let mut track = sample_track(5);
        let removed = track.remove_between(None, Some(Target::time(time(3)))).unwrap();
        assert_eq!(times(&removed), vec![time(1), time(2)]);
        assert_eq!(times(&track), vec![time(0), time(3), time(4)]);

        let removed = track.remove_between(None, None).unwrap();
        assert_eq!(times(&removed), vec![time(3)]);
        assert_eq!(times(&track), vec![time(0), time(4)]);
    }

    #[test]
    fn test_remove_from_to_inclusive() {
        let mut track = sample_track(5);
        let removed = track
            .remove_from_to(Some(Target::time(time(1))), Some(Target::time(time(3))))
            .unwrap();
        assert_eq!(times(&removed), vec![time(1), time(2), time(3)]);
        assert_eq!(times(&track), vec![time(0), time(4)]);

        let removed = track.remove_from_to(None, None).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(track.is_empty());
    }

    // ---- insert ----

    #[test]
    fn test_insert_before_and_after() {
        let mut track = Track::from_points(vec![timed(0), timed(3)]);
        assert_eq!(track.insert_after(Target::time(time(0)), timed(1)), 1);
        assert_eq!(track.insert_before(Target::time(time(3)), vec![timed(2)]), 1);
        assert_eq!(times(&track), vec![time(0), time(1), time(2), time(3)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_insert_at_boundaries() {
        let mut track = Track::from_points(vec![timed(1), timed(2)]);
        assert_eq!(track.insert_before(Target::time(time(1)), timed(0)), 1);
        assert_eq!(track.insert_after(Target::time(time(2)), vec![timed(3), timed(4)]), 2);
        assert_eq!(times(&track), vec![time(0), time(1), time(2), time(3), time(4)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_insert_missing_target_leaves_donor() {
        let mut track = sample_track(2);
        let mut donor = Track::from_points(vec![timed(5)]);
        assert_eq!(track.insert_after(Target::time("missing"), &mut donor), 0);
        assert_eq!(donor.len(), 1);
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn test_insert_polyline_drains_donor() {
        let mut track = Track::from_points(vec![timed(0), timed(3)]);
        let mut donor = Track::from_points(vec![timed(1), timed(2)]);
        assert_eq!(track.insert_after(Target::time(time(0)), &mut donor), 2);
        assert_eq!(donor.len(), 0);
        assert!(donor.is_empty());
        assert_eq!(times(&track), vec![time(0), time(1), time(2), time(3)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_append_and_prepend_on_empty() {
        let mut track = Track::new();
        assert_eq!(track.append(timed(1)), 1);
        assert_eq!(track.prepend(timed(0)), 1);
        assert_eq!(track.append(vec![timed(2), timed(3)]), 2);
        assert_eq!(times(&track), vec![time(0), time(1), time(2), time(3)]);
        assert_consistent(&mut track);
    }

    // ---- replace ----

    #[test]
    fn test_replace_at() {
        let mut track = sample_track(3);
        let replacement = track
            .replace_at(Target::time(time(1)), vec![timed(10), timed(11)])
            .unwrap();
        assert_eq!(times(&replacement.removed.unwrap()), vec![time(1)]);
        assert_eq!(replacement.inserted, 2);
        assert_eq!(times(&track), vec![time(0), time(10), time(11), time(2)]);
        assert_consistent(&mut track);

        assert!(track.replace_at(Target::time("missing"), timed(9)).is_none());
    }

    #[test]
    fn test_replace_sole_point() {
        let mut track = sample_track(1);
        let replacement = track.replace_at(Target::time(time(0)), timed(7)).unwrap();
        assert_eq!(replacement.inserted, 1);
        assert_eq!(times(&track), vec![time(7)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_replace_between_adjacent_inserts() {
        let mut track = sample_track(3);
        let replacement = track
            .replace_between(Some(Target::time(time(0))), Some(Target::time(time(1))), timed(20))
            .unwrap();
        assert!(replacement.removed.is_none());
        assert_eq!(replacement.inserted, 1);
        assert_eq!(times(&track), vec![time(0), time(20), time(1), time(2)]);
        assert_consistent(&mut track);
    }

    #[test]
    fn test_replace_between_and_from_to() {
        let mut track = sample_track(5);
        let r = track
            .replace_between(Some(Target::time(time(0))), Some(Target::time(time(3))), timed(30))
            .unwrap();
        assert_eq!(r.removed.unwrap().len(), 2);
        assert_eq!(times(&track), vec![time(0), time(30), time(3), time(4)]);

        let mut donor = Track::from_points(vec![timed(40), timed(41)]);
        let r = track
            .replace_from_to(Some(Target::time(time(3))), None, &mut donor)
            .unwrap();
        assert_eq!(times(&r.removed.unwrap()), vec![time(3), time(4)]);
        assert_eq!(r.inserted, 2);
        assert!(donor.is_empty());
        assert_eq!(times(&track), vec![time(0), time(30), time(40), time(41)]);
        assert_consistent(&mut track);
    }

    // ---- split ----

    #[test]
    fn test_split_by_interior_shares_vertex() {
        let track = sample_track(5);
        let parts = track.split_by(Target::time(time(2)));
        assert_eq!(parts.len(), 2);
        assert_eq!(times(&parts[0]), vec![time(0), time(1), time(2)]);
        assert_eq!(times(&parts[1]), vec![time(2), time(3), time(4)]);
    }

    #[test]
    fn test_split_at_ends_is_noop() {
        let original = sample_track(4).points();
        for t in [time(0), time(3), "missing".to_string()] {
            let parts = sample_track(4).split_by(Target::time(t));
            assert_eq!(parts.len(), 1);
            assert_eq!(parts[0].points(), original);
        }
    }

    #[test]
    fn test_split_by_many_dedup_and_adjacent() {
        let with_dups = sample_track(6).split_by_many(vec![
            Target::time(time(3)),
            Target::time(time(1)),
            Target::time(time(3)),
            Target::time(time(2)),
        ]);
        let without = sample_track(6).split_by_many(vec![
            Target::time(time(1)),
            Target::time(time(2)),
            Target::time(time(3)),
        ]);
        let a: Vec<_> = with_dups.iter().map(times).collect();
        let b: Vec<_> = without.iter().map(times).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        assert!(a.iter().all(|part| !part.is_empty()));
        assert_eq!(a[1], vec![time(1), time(2)]);
    }

    // ---- derived values across edits ----

    #[test]
    fn test_edits_refresh_boundary_properties() {
        let mut track = sample_track(5);
        track.add_properties();

        track.remove_at(Target::time(time(0)));
        let head = track.points()[0].path.unwrap();
        assert_eq!(head.rotation, None);
        assert_eq!(head.rotation_rate, None);

        track.trim_after(Target::time(time(3)));
        let tail = track.points().last().unwrap().path.unwrap();
        assert_eq!(tail.rotation, None);

        track.insert_after(Target::time(time(3)), timed(4));
        let joined = track.points()[2].path.unwrap();
        assert!(joined.rotation.is_some());
        assert!(track.points()[3].path.unwrap().rotation.is_none());
    }

    #[test]
    fn test_split_parts_refresh_open_ends() {
        let mut track = sample_track(5);
        track.add_properties();
        let parts = track.split_by(Target::time(time(2)));
        let first_tail = parts[0].points().last().unwrap().path.unwrap();
        let second_head = parts[1].points()[0].path.unwrap();
        assert_eq!(first_tail.rotation, None);
        assert_eq!(second_head.rotation, None);
        assert!(parts[0].has_properties());
    }

    #[test]
    fn test_index_survives_edits_without_rebuild() {
        let mut track = sample_track(4);
        assert!(track.node_by_time(&time(0)).is_some());

        track.remove_at(Target::time(time(1)));
        assert_eq!(track.node_by_time(&time(1)), None);

        track.append(timed(9));
        assert_eq!(track.node_by_time(&time(9)), track.tail());

        track.trim_before(Target::time(time(2)));
        assert_eq!(track.node_by_time(&time(0)), None);
        assert!(track.is_index_built());
        assert_consistent(&mut track);
    }
}
