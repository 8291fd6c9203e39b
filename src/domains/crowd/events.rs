use crate::common::DomainEvent;
use crate::domains::path_network::{PathId, WaypointId};
use chrono::{DateTime, Utc};
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrowdEvent {
    AgentSpawned {
        agent_id: String,
        path_id: PathId,
        lane: Option<usize>,
        position: Vec3,
        at_route_start: bool,
        timestamp: DateTime<Utc>,
    },
    WaypointAdvanced {
        agent_id: String,
        path_id: PathId,
        lane: usize,
        target_idx: usize,
        timestamp: DateTime<Utc>,
    },
    Diverged {
        agent_id: String,
        from_path: PathId,
        to_path: PathId,
        waypoint: WaypointId,
        lane: usize,
        back: bool,
        forced: bool,
        timestamp: DateTime<Utc>,
    },
    RouteCompleted {
        agent_id: String,
        path_id: PathId,
        lane: usize,
        back: bool,
        rerouted: bool,
        timestamp: DateTime<Utc>,
    },
    AgentDespawned {
        agent_id: String,
        path_id: PathId,
        lane: Option<usize>,
        timestamp: DateTime<Utc>,
    },
    StandingSettled {
        agent_id: String,
        path_id: PathId,
        position: Vec3,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for CrowdEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CrowdEvent::AgentSpawned { .. } => "AgentSpawned",
            CrowdEvent::WaypointAdvanced { .. } => "WaypointAdvanced",
            CrowdEvent::Diverged { .. } => "Diverged",
            CrowdEvent::RouteCompleted { .. } => "RouteCompleted",
            CrowdEvent::AgentDespawned { .. } => "AgentDespawned",
            CrowdEvent::StandingSettled { .. } => "StandingSettled",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            CrowdEvent::AgentSpawned { agent_id, .. }
            | CrowdEvent::WaypointAdvanced { agent_id, .. }
            | CrowdEvent::Diverged { agent_id, .. }
            | CrowdEvent::RouteCompleted { agent_id, .. }
            | CrowdEvent::AgentDespawned { agent_id, .. }
            | CrowdEvent::StandingSettled { agent_id, .. } => agent_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CrowdEvent::AgentSpawned { timestamp, .. }
            | CrowdEvent::WaypointAdvanced { timestamp, .. }
            | CrowdEvent::Diverged { timestamp, .. }
            | CrowdEvent::RouteCompleted { timestamp, .. }
            | CrowdEvent::AgentDespawned { timestamp, .. }
            | CrowdEvent::StandingSettled { timestamp, .. } => *timestamp,
        }
    }
}
