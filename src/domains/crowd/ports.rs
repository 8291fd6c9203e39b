use super::agent::{Agent, AgentId};
use glam::Vec3;

/// Moves an agent toward a destination (pathfinding and local avoidance live
/// behind this port).
pub trait Steering: Send {
    fn set_destination(&mut self, agent: &mut Agent, destination: Vec3, dt: f32);
}

/// Reports terrain height under a point, or `None` when nothing was hit.
pub trait GroundProbe: Send + Sync {
    fn probe_ground_height(&self, position: Vec3) -> Option<f32>;
}

/// Materializes and removes the visual side of agents.
pub trait Instantiator: Send {
    fn instantiate(&mut self, agent: &Agent);
    fn destroy(&mut self, agent: AgentId);
}
