use super::geometry::{build_lanes, Lane};
use super::triangulation::{triangulate, Triangle};
use super::types::{PathId, PathKind, PathParams, Waypoint, WaypointId};
use serde::{Deserialize, Serialize};

/// Geometry derived from a path's waypoints. Never edited directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PathGeometry {
    Lanes(Vec<Lane>),
    Area(Vec<Triangle>),
    #[default]
    Unusable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub id: PathId,
    pub name: String,
    pub kind: PathKind,
    pub params: PathParams,
    waypoints: Vec<Waypoint>,
    geometry: PathGeometry,
}

impl Path {
    pub(crate) fn new(id: PathId, name: String, kind: PathKind, params: PathParams, waypoints: Vec<Waypoint>) -> Self {
        let mut path = Self {
            id,
            name,
            kind,
            params: params.normalized(),
            waypoints,
            geometry: PathGeometry::Unusable,
        };
        path.recompute();
        path
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn geometry(&self) -> &PathGeometry {
        &self.geometry
    }

    pub(crate) fn replace_waypoints(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
        self.recompute();
    }

    pub(crate) fn set_lane_count(&mut self, lane_count: usize) {
        self.params.lane_count = lane_count;
        self.params = self.params.clone().normalized();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.geometry = match &self.kind {
            PathKind::Walking(_) => {
                let lanes = build_lanes(
                    &self.waypoints,
                    self.params.lane_count,
                    self.params.lane_spacing,
                    self.params.loop_path,
                );
                if lanes.is_empty() {
                    PathGeometry::Unusable
                } else {
                    PathGeometry::Lanes(lanes)
                }
            }
            PathKind::Standing(_) => {
                let vertices: Vec<_> = self.waypoints.iter().map(|w| w.position).collect();
                match triangulate(&vertices) {
                    Some(tris) if !tris.is_empty() => PathGeometry::Area(tris),
                    _ => PathGeometry::Unusable,
                }
            }
        };
    }

    pub fn is_usable(&self) -> bool {
        !matches!(self.geometry, PathGeometry::Unusable)
    }

    pub fn is_walking(&self) -> bool {
        matches!(self.kind, PathKind::Walking(_))
    }

    pub fn lanes(&self) -> &[Lane] {
        match &self.geometry {
            PathGeometry::Lanes(lanes) => lanes,
            _ => &[],
        }
    }

    pub fn lane(&self, lane: usize) -> Option<&Lane> {
        self.lanes().get(lane)
    }

    pub fn lane_count(&self) -> usize {
        self.params.lane_count
    }

    pub fn triangles(&self) -> &[Triangle] {
        match &self.geometry {
            PathGeometry::Area(tris) => tris,
            _ => &[],
        }
    }

    pub fn owns(&self, waypoint: WaypointId) -> bool {
        self.waypoints.iter().any(|w| w.id == waypoint)
    }

    /// Index of `waypoint` within this path's lanes (list position + 1).
    pub fn lane_index_of(&self, waypoint: WaypointId) -> Option<usize> {
        self.waypoints.iter().position(|w| w.id == waypoint).map(|j| j + 1)
    }
}
