use super::path::Path;
use super::types::{PathDefinition, PathId, Waypoint, WaypointId, WaypointSpec};
use crate::common::{DomainError, DomainResult};
use crate::domains::logger::DynLogger;
use glam::Vec3;
use tracing::debug;

/// Flattened view of one registered waypoint, used by the divergence scan.
#[derive(Debug, Clone, Copy)]
pub struct WaypointRef {
    pub id: WaypointId,
    pub path: PathId,
    pub position: Vec3,
}

/// Owns every known path and answers waypoint-ownership queries.
///
/// Constructed and owned by the simulation driver; geometry is read-only
/// while agents tick.
pub struct PathRegistry {
    paths: Vec<Path>,
    all_waypoints: Vec<WaypointRef>,
    next_waypoint_id: u32,
    logger: DynLogger,
}

impl PathRegistry {
    pub fn new(logger: DynLogger) -> Self {
        Self {
            paths: Vec::new(),
            all_waypoints: Vec::new(),
            next_waypoint_id: 0,
            logger,
        }
    }

    pub fn register_path(&mut self, definition: PathDefinition) -> PathId {
        let id = PathId(self.paths.len());
        let waypoints = self.assign_ids(&definition.waypoints);
        let path = Path::new(id, definition.name, definition.kind, definition.params, waypoints);

        if !path.is_usable() {
            self.logger.warn(&format!(
                "Path '{}' ({}) has degenerate geometry and will not be populated",
                path.name, id
            ));
        }
        debug!(path = %id, waypoints = path.waypoints().len(), "registered path");

        self.paths.push(path);
        self.rebuild_waypoint_index();
        id
    }

    fn assign_ids(&mut self, specs: &[WaypointSpec]) -> Vec<Waypoint> {
        specs
            .iter()
            .map(|spec| {
                let id = WaypointId(self.next_waypoint_id);
                self.next_waypoint_id += 1;
                Waypoint {
                    id,
                    position: spec.position,
                    scale: spec.scale,
                }
            })
            .collect()
    }

    fn rebuild_waypoint_index(&mut self) {
        self.all_waypoints = self
            .paths
            .iter()
            .flat_map(|p| {
                p.waypoints().iter().map(move |w| WaypointRef {
                    id: w.id,
                    path: p.id,
                    position: w.position,
                })
            })
            .collect();
    }

    /// Replace a path's waypoints; lane geometry is recomputed.
    pub fn set_waypoints(&mut self, path: PathId, waypoints: Vec<WaypointSpec>) -> DomainResult<()> {
        if path.0 >= self.paths.len() {
            return Err(DomainError::UnknownPath { path: path.0 });
        }
        let waypoints = self.assign_ids(&waypoints);
        self.paths[path.0].replace_waypoints(waypoints);
        self.rebuild_waypoint_index();
        Ok(())
    }

    pub fn set_lane_count(&mut self, path: PathId, lane_count: usize) -> DomainResult<()> {
        let p = self
            .paths
            .get_mut(path.0)
            .ok_or(DomainError::UnknownPath { path: path.0 })?;
        p.set_lane_count(lane_count);
        Ok(())
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(id.0)
    }

    pub fn get(&self, id: PathId) -> DomainResult<&Path> {
        self.path(id).ok_or(DomainError::UnknownPath { path: id.0 })
    }

    pub fn waypoints(&self) -> &[WaypointRef] {
        &self.all_waypoints
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Find the path owning `waypoint` and the waypoint's lane-point index on it.
    ///
    /// An unknown waypoint is a configuration error: it is logged and the
    /// first registered path is returned at its first index. `None` only when
    /// nothing is registered.
    pub fn find_owning_path(&self, waypoint: WaypointId) -> Option<(PathId, usize)> {
        for path in &self.paths {
            if let Some(idx) = path.lane_index_of(waypoint) {
                return Some((path.id, idx));
            }
        }
        self.logger.warn(&DomainError::WaypointNotFound { waypoint: waypoint.0 }.to_string());
        self.paths.first().map(|p| (p.id, super::geometry::FIRST_INDEX))
    }
}
