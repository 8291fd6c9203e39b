use crate::domains::crowd::{Agent, Steering};
use glam::Vec3;

/// Straight-line steering: moves the agent toward the destination at its own
/// speed, stopping on the destination rather than overshooting it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectSteering;

impl Steering for DirectSteering {
    fn set_destination(&mut self, agent: &mut Agent, destination: Vec3, dt: f32) {
        let offset = destination - agent.position;
        let step = agent.profile.speed * dt;
        let distance = offset.length();
        if distance <= step || distance == 0.0 {
            agent.position = destination;
        } else {
            agent.position += offset / distance * step;
        }
    }
}

/// Remembers the last destination per call and leaves agents where they are.
#[derive(Debug, Default, Clone)]
pub struct RecordingSteering {
    pub destinations: Vec<Vec3>,
}

impl Steering for RecordingSteering {
    fn set_destination(&mut self, _agent: &mut Agent, destination: Vec3, _dt: f32) {
        self.destinations.push(destination);
    }
}
