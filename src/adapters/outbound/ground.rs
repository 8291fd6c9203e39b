use crate::domains::crowd::GroundProbe;
use glam::{Vec2, Vec3};

/// No terrain: every probe misses, so heights are left untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGround;

impl GroundProbe for NoGround {
    fn probe_ground_height(&self, _position: Vec3) -> Option<f32> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FlatGround(pub f32);

impl GroundProbe for FlatGround {
    fn probe_ground_height(&self, _position: Vec3) -> Option<f32> {
        Some(self.0)
    }
}

/// Inclined plane `height + gradient · (x, z)`.
#[derive(Debug, Clone, Copy)]
pub struct SlopedGround {
    pub height: f32,
    pub gradient: Vec2,
}

impl GroundProbe for SlopedGround {
    fn probe_ground_height(&self, position: Vec3) -> Option<f32> {
        Some(self.height + self.gradient.dot(Vec2::new(position.x, position.z)))
    }
}
