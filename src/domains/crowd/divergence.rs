use super::agent::RouteState;
use crate::domains::path_network::{hangle, hdist, last_index, PathId, PathRegistry, WaypointId, FIRST_INDEX};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceSettings {
    /// Maximum ground-plane distance to a candidate waypoint.
    pub threshold: f32,
    /// Cooldown after a successful divergence, in seconds.
    pub min_time_between: f32,
    /// Cooldown after an evaluation that accepted nothing, in seconds.
    pub rescan_interval: f32,
    /// A candidate is declined with probability `stickiness.powf(exponent)`.
    pub stickiness_exponent: f32,
}

impl Default for DivergenceSettings {
    fn default() -> Self {
        Self {
            threshold: 5.0,
            min_time_between: 15.0,
            rescan_interval: 0.5,
            stickiness_exponent: 1.0,
        }
    }
}

/// Outcome of an accepted divergence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divergence {
    pub from_path: PathId,
    pub to_path: PathId,
    pub waypoint: WaypointId,
    pub lane: usize,
    pub target_idx: usize,
    pub back: bool,
}

/// Decides whether an agent abandons its path for a nearby waypoint of another one.
#[derive(Debug, Clone, Default)]
pub struct DivergenceEvaluator {
    settings: DivergenceSettings,
}

impl DivergenceEvaluator {
    pub fn new(settings: DivergenceSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DivergenceSettings {
        &self.settings
    }

    /// Scan every registered waypoint and possibly reroute `route`.
    ///
    /// Outside a forced check, nothing is evaluated while the cooldown is
    /// running; it is decremented by `dt` instead. A forced check skips the
    /// rejection cache and the stickiness roll.
    pub fn try_diverge<R: Rng + ?Sized>(
        &self,
        registry: &PathRegistry,
        position: Vec3,
        route: &mut RouteState,
        force: bool,
        dt: f32,
        rng: &mut R,
    ) -> Option<Divergence> {
        if route.cooldown > 0.0 && !force {
            route.cooldown -= dt;
            return None;
        }
        route.cooldown = self.settings.rescan_interval;

        let stickiness = registry
            .path(route.path)
            .map(|p| p.params.stickiness.clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let decline_probability = stickiness.powf(self.settings.stickiness_exponent);

        for candidate in registry.waypoints() {
            let rejected = route.rejected.contains(&candidate.id);

            if hdist(position, candidate.position) > self.settings.threshold {
                if rejected {
                    route.rejected.remove(&candidate.id);
                }
                continue;
            }
            if !force && rejected {
                continue;
            }
            if candidate.path == route.path {
                continue;
            }
            match registry.path(candidate.path) {
                Some(p) if p.is_walking() && p.is_usable() => {}
                _ => continue,
            }

            if !force && rng.gen::<f32>() < decline_probability {
                route.rejected.insert(candidate.id);
                continue;
            }

            let Some((to_path, target_idx)) = registry.find_owning_path(candidate.id) else {
                continue;
            };
            let Some(path) = registry.path(to_path) else {
                continue;
            };
            let lane_count = path.lanes().len();
            if lane_count == 0 {
                continue;
            }
            let lane = rng.gen_range(0..lane_count);
            let back = choose_direction(&path.lanes()[lane], target_idx, position);

            let divergence = Divergence {
                from_path: route.path,
                to_path,
                waypoint: candidate.id,
                lane,
                target_idx,
                back,
            };
            route.path = to_path;
            route.lane = lane;
            route.target_idx = target_idx;
            route.back = back;
            route.cooldown = self.settings.min_time_between;

            debug!(
                from = %divergence.from_path,
                to = %divergence.to_path,
                waypoint = %divergence.waypoint,
                lane,
                back,
                force,
                "agent diverged"
            );
            return Some(divergence);
        }
        None
    }
}

/// Pick the traversal direction that needs the least turn from the agent's
/// current heading toward `target_idx`.
pub fn choose_direction(lane: &[Vec3], target_idx: usize, position: Vec3) -> bool {
    if target_idx >= last_index(lane.len()) {
        return true;
    }
    if target_idx <= FIRST_INDEX {
        return false;
    }
    let here = lane[target_idx];
    let forward = lane[target_idx + 1] - here;
    let backward = lane[target_idx - 1] - here;
    let heading = here - position;
    hangle(forward, heading) > hangle(backward, heading)
}
