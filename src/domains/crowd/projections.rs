use super::events::CrowdEvent;
use crate::domains::path_network::PathId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-path counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTraffic {
    pub spawned: usize,
    pub despawned: usize,
    pub diverged_in: usize,
    pub diverged_out: usize,
    pub completed: usize,
}

/// Running totals folded from the crowd event stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrowdStatistics {
    pub spawned: usize,
    pub despawned: usize,
    pub divergences: usize,
    pub forced_divergences: usize,
    pub waypoints_advanced: usize,
    pub routes_completed: usize,
    pub settled: usize,
    pub per_path: BTreeMap<PathId, PathTraffic>,
    pub last_event_at: Option<DateTime<Utc>>,
}

impl CrowdStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, event: &CrowdEvent) {
        match event {
            CrowdEvent::AgentSpawned { path_id, timestamp, .. } => {
                self.spawned += 1;
                self.traffic(*path_id).spawned += 1;
                self.last_event_at = Some(*timestamp);
            }
            CrowdEvent::WaypointAdvanced { timestamp, .. } => {
                self.waypoints_advanced += 1;
                self.last_event_at = Some(*timestamp);
            }
            CrowdEvent::Diverged {
                from_path,
                to_path,
                forced,
                timestamp,
                ..
            } => {
                self.divergences += 1;
                if *forced {
                    self.forced_divergences += 1;
                }
                self.traffic(*from_path).diverged_out += 1;
                self.traffic(*to_path).diverged_in += 1;
                self.last_event_at = Some(*timestamp);
            }
            CrowdEvent::RouteCompleted { path_id, timestamp, .. } => {
                self.routes_completed += 1;
                self.traffic(*path_id).completed += 1;
                self.last_event_at = Some(*timestamp);
            }
            CrowdEvent::AgentDespawned { path_id, timestamp, .. } => {
                self.despawned += 1;
                self.traffic(*path_id).despawned += 1;
                self.last_event_at = Some(*timestamp);
            }
            CrowdEvent::StandingSettled { timestamp, .. } => {
                self.settled += 1;
                self.last_event_at = Some(*timestamp);
            }
        }
    }

    /// Agents currently alive according to the event stream.
    pub fn live(&self) -> usize {
        self.spawned.saturating_sub(self.despawned)
    }

    fn traffic(&mut self, path: PathId) -> &mut PathTraffic {
        self.per_path.entry(path).or_default()
    }
}
