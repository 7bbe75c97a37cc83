//! Derived value recomputation: segment kinematics and per-vertex path properties.
//!
//! Full passes run on demand (`add_properties`, `add_elevations`). Afterwards the
//! structure keeps the enabled values current by refreshing only the vertices whose
//! adjacency changed (see `refresh_vertex`, called from the linking primitives).

use super::{Polyline, VertexIndex};
use crate::elevation::{CoordKey, ElevationMap};
use crate::geo_utils::bearing_delta;
use crate::{PathProperties, Segment};

impl<I: VertexIndex> Polyline<I> {
    /// Recompute every segment from its endpoints, then every vertex's path
    /// properties.
    ///
    /// Rotation is the signed turn between the incoming and outgoing bearings and is
    /// `None` at both open ends. Rotation rate divides it by the time between the two
    /// segment midpoints. Speed is the time-weighted mean of the adjacent segment
    /// speeds. Once applied, later edits keep these values current.
    pub fn add_properties(&mut self) {
        self.recompute_segments();
        self.derived.kinematics = true;
        self.derived.elevation = true;
        for id in self.node_ids() {
            self.refresh_vertex(id);
        }
        log::debug!("[Track] Computed path properties for {} vertices", self.len());
    }

    /// Assign elevations to vertices whose coordinate is present in `elevations`,
    /// then recompute segment heights and vertex ascent/descent rates.
    ///
    /// Vertices without an entry keep their altitude. Returns the number of vertices
    /// updated.
    pub fn add_elevations(&mut self, elevations: &ElevationMap) -> usize {
        let mut assigned = 0;
        for id in self.node_ids() {
            if let Some(vertex) = self.vertices.get_mut(id.0) {
                if let Some(alt) = elevations.get(&CoordKey::from_point(&vertex.point)) {
                    vertex.point.alt = Some(alt);
                    assigned += 1;
                }
            }
        }

        self.recompute_elevation_segments();
        self.derived.elevation = true;
        for id in self.node_ids() {
            self.refresh_vertex(id);
        }
        log::debug!(
            "[Track] Assigned {} of {} elevations",
            assigned,
            self.len()
        );
        assigned
    }

    fn recompute_segments(&mut self) {
        for id in self.node_ids() {
            let Some(vertex) = self.vertices.get(id.0) else {
                continue;
            };
            let (Some(seg), Some(next)) = (vertex.next_seg, vertex.next) else {
                continue;
            };
            let Some(to) = self.vertices.get(next.0) else {
                continue;
            };
            let value = Segment::between(&vertex.point, &to.point);
            if let Some(node) = self.segments.get_mut(seg.0) {
                node.value = value;
            }
        }
    }

    fn recompute_elevation_segments(&mut self) {
        for id in self.node_ids() {
            let Some(vertex) = self.vertices.get(id.0) else {
                continue;
            };
            let (Some(seg), Some(next)) = (vertex.next_seg, vertex.next) else {
                continue;
            };
            let Some(to) = self.vertices.get(next.0) else {
                continue;
            };
            if let Some(node) = self.segments.get_mut(seg.0) {
                node.value.update_elevation(&vertex.point, &to.point);
            }
        }
    }

    /// Recompute the enabled path properties of one vertex from its adjacent
    /// segments. No-op until derived values have been enabled.
    pub(crate) fn refresh_vertex(&mut self, id: super::NodeId) {
        if !self.derived.any() {
            return;
        }
        let Some(vertex) = self.vertices.get(id.0) else {
            return;
        };
        let prev = vertex
            .prev_seg
            .and_then(|s| self.segments.get(s.0))
            .map(|s| s.value);
        let next = vertex
            .next_seg
            .and_then(|s| self.segments.get(s.0))
            .map(|s| s.value);

        let derived = self.derived;
        let Some(vertex) = self.vertices.get_mut(id.0) else {
            return;
        };
        let path = vertex.point.path.get_or_insert_with(PathProperties::default);
        if derived.kinematics {
            let (rotation, rotation_rate, speed) = kinematics(prev.as_ref(), next.as_ref());
            path.rotation = rotation;
            path.rotation_rate = rotation_rate;
            path.speed = speed;
        }
        if derived.elevation {
            let (ascent, descent) = elevation_rates(prev.as_ref(), next.as_ref());
            path.ascent_rate = ascent;
            path.descent_rate = descent;
        }
    }

    /// Clear the derived values this polyline does not maintain from a newly
    /// linked vertex. Points arrive with values computed against their old
    /// neighbours.
    pub(crate) fn drop_unmaintained(&mut self, id: super::NodeId) {
        let derived = self.derived;
        let Some(vertex) = self.vertices.get_mut(id.0) else {
            return;
        };
        if !derived.any() {
            vertex.point.path = None;
            return;
        }
        let Some(path) = vertex.point.path.as_mut() else {
            return;
        };
        if !derived.kinematics {
            path.rotation = None;
            path.rotation_rate = None;
            path.speed = None;
        }
        if !derived.elevation {
            path.ascent_rate = None;
            path.descent_rate = None;
        }
    }
}

/// `(rotation, rotation_rate, speed)` for a vertex between `prev` and `next`.
fn kinematics(prev: Option<&Segment>, next: Option<&Segment>) -> (Option<f64>, Option<f64>, Option<f64>) {
    let rotation = match (prev, next) {
        (Some(p), Some(n)) => Some(bearing_delta(p.bearing, n.bearing)),
        _ => None,
    };

    let rotation_rate = match (rotation, prev.and_then(|p| p.duration), next.and_then(|n| n.duration)) {
        (Some(rotation), Some(dp), Some(dn)) => {
            let midpoint_gap = dp / 2.0 + dn / 2.0;
            (midpoint_gap > 0.0).then(|| rotation / midpoint_gap)
        }
        _ => None,
    };

    let speeds: Vec<(f64, Option<f64>)> = [prev, next]
        .into_iter()
        .flatten()
        .filter_map(|s| s.speed.map(|v| (v, s.duration)))
        .collect();
    let speed = time_weighted_mean(&speeds);

    (rotation, rotation_rate, speed)
}

/// `(ascent_rate, descent_rate)` from the time-weighted adjacent height rates.
fn elevation_rates(prev: Option<&Segment>, next: Option<&Segment>) -> (Option<f64>, Option<f64>) {
    let rates: Vec<(f64, Option<f64>)> = [prev, next]
        .into_iter()
        .flatten()
        .map(|s| (s.height_rate, s.duration))
        .collect();
    match time_weighted_mean(&rates) {
        Some(rate) => (
            Some(if rate > 0.0 { rate } else { 0.0 }),
            Some(if rate < 0.0 { -rate } else { 0.0 }),
        ),
        None => (None, None),
    }
}

/// Mean of `(value, duration)` pairs weighted by duration.
///
/// Falls back to the plain mean when any duration is missing or not positive.
fn time_weighted_mean(values: &[(f64, Option<f64>)]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let all_timed = values.iter().all(|(_, d)| matches!(d, Some(d) if *d > 0.0));
    if all_timed {
        let total: f64 = values.iter().filter_map(|(_, d)| *d).sum();
        let weighted: f64 = values.iter().map(|(v, d)| v * d.unwrap_or(0.0)).sum();
        Some(weighted / total)
    } else {
        Some(values.iter().map(|(v, _)| v).sum::<f64>() / values.len() as f64)
    }
}
