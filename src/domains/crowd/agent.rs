use crate::domains::path_network::{last_index, PathId, WaypointId, FIRST_INDEX};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gait {
    Walk,
    Run,
    Stand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub gait: Gait,
    pub speed: f32,
    /// Personal x/z offset added to every target so agents don't march single file.
    pub finish_jitter: Vec2,
}

/// Where a walking agent is on the path network. Exclusively owned by its agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteState {
    pub path: PathId,
    pub lane: usize,
    /// Index into the current lane.
    pub target_idx: usize,
    /// Traversing toward index 0 rather than toward the last index.
    pub back: bool,
    /// Waypoints recently declined by the divergence roll.
    pub rejected: HashSet<WaypointId>,
    /// Seconds until the next divergence evaluation.
    pub cooldown: f32,
}

impl RouteState {
    pub fn new(path: PathId, lane: usize, target_idx: usize, back: bool) -> Self {
        Self {
            path,
            lane,
            target_idx,
            back,
            rejected: HashSet::new(),
            cooldown: 0.0,
        }
    }

    /// False exactly at the terminal index for the current direction.
    pub fn has_next_waypoint(&self, lane_len: usize) -> bool {
        if self.back {
            self.target_idx > FIRST_INDEX
        } else {
            self.target_idx < last_index(lane_len)
        }
    }

    pub(crate) fn step(&mut self) {
        if self.back {
            self.target_idx -= 1;
        } else {
            self.target_idx += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingState {
    pub path: PathId,
    pub anchor: Vec3,
    /// Seconds left steering onto the anchor before the agent holds still.
    pub settle_remaining: f32,
    pub settled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    Walking(RouteState),
    Standing(StandingState),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec3,
    pub profile: AgentProfile,
    pub behavior: Behavior,
}

impl Agent {
    pub fn walking(position: Vec3, profile: AgentProfile, route: RouteState) -> Self {
        Self {
            id: AgentId::new(),
            position,
            profile,
            behavior: Behavior::Walking(route),
        }
    }

    pub fn standing(position: Vec3, profile: AgentProfile, state: StandingState) -> Self {
        Self {
            id: AgentId::new(),
            position,
            profile,
            behavior: Behavior::Standing(state),
        }
    }

    pub fn path(&self) -> PathId {
        match &self.behavior {
            Behavior::Walking(route) => route.path,
            Behavior::Standing(state) => state.path,
        }
    }

    pub fn lane(&self) -> Option<usize> {
        self.route().map(|r| r.lane)
    }

    pub fn route(&self) -> Option<&RouteState> {
        match &self.behavior {
            Behavior::Walking(route) => Some(route),
            Behavior::Standing(_) => None,
        }
    }

    pub fn route_mut(&mut self) -> Option<&mut RouteState> {
        match &mut self.behavior {
            Behavior::Walking(route) => Some(route),
            Behavior::Standing(_) => None,
        }
    }

    pub fn is_standing(&self) -> bool {
        matches!(self.behavior, Behavior::Standing(_))
    }
}
