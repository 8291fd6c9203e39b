use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a waypoint, assigned by the registry on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaypointId(pub u32);

/// Index of a path inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId(pub usize);

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wp-{}", self.0)
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path-{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub position: Vec3,
    /// Multiplies the lane spacing at this waypoint.
    pub scale: f32,
}

/// A waypoint before the registry has given it an identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaypointSpec {
    pub position: Vec3,
    pub scale: f32,
}

impl WaypointSpec {
    pub fn new(position: Vec3) -> Self {
        Self { position, scale: 1.0 }
    }

    pub fn scaled(position: Vec3, scale: f32) -> Self {
        Self { position, scale }
    }
}

/// Mean/spread pair for the bounded normal speed sampler. `variance` is the
/// factor the unit deviate is scaled by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedDistribution {
    pub mean: f32,
    pub variance: f32,
}

/// Per-path tunables shared by walking and standing paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathParams {
    pub lane_count: usize,
    pub lane_spacing: f32,
    pub loop_path: bool,
    /// Probability weight resisting divergence away from this path.
    pub stickiness: f32,
    pub kill_at_start: bool,
    pub kill_at_end: bool,
    pub density: f32,
    /// Half-extent of the x/z jitter applied to finish positions and clump members.
    pub position_jitter: Vec2,
}

pub const MIN_LANE_SPACING: f32 = 0.6;

impl PathParams {
    /// Clamp lane count and spacing to their usable minimums.
    pub fn normalized(mut self) -> Self {
        if self.lane_count < 1 {
            self.lane_count = 1;
        }
        if self.lane_spacing < MIN_LANE_SPACING {
            self.lane_spacing = MIN_LANE_SPACING;
        }
        self
    }
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            lane_count: 1,
            lane_spacing: MIN_LANE_SPACING,
            loop_path: false,
            stickiness: 0.5,
            kill_at_start: true,
            kill_at_end: true,
            density: 0.2,
            position_jitter: Vec2::new(0.1, 0.1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkingProfile {
    pub running_proportion: f32,
    pub back_proportion: f32,
    pub walk_speed: SpeedDistribution,
    pub run_speed: SpeedDistribution,
    pub max_sigma: f32,
}

impl Default for WalkingProfile {
    fn default() -> Self {
        Self {
            running_proportion: 0.01,
            back_proportion: 0.08,
            walk_speed: SpeedDistribution { mean: 1.0, variance: 0.2 },
            run_speed: SpeedDistribution { mean: 4.0, variance: 0.6 },
            max_sigma: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingProfile {
    /// Mean of the Poisson-distributed clump size.
    pub clump_mean: f32,
}

impl Default for StandingProfile {
    fn default() -> Self {
        Self { clump_mean: 3.0 }
    }
}

/// How a path populates itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PathKind {
    Walking(WalkingProfile),
    Standing(StandingProfile),
}

/// Everything needed to register a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathDefinition {
    pub name: String,
    pub kind: PathKind,
    pub waypoints: Vec<WaypointSpec>,
    pub params: PathParams,
}

impl PathDefinition {
    pub fn walking(name: impl Into<String>, waypoints: Vec<Vec3>, params: PathParams) -> Self {
        Self {
            name: name.into(),
            kind: PathKind::Walking(WalkingProfile::default()),
            waypoints: waypoints.into_iter().map(WaypointSpec::new).collect(),
            params,
        }
    }

    pub fn standing(name: impl Into<String>, vertices: Vec<Vec3>, params: PathParams) -> Self {
        Self {
            name: name.into(),
            kind: PathKind::Standing(StandingProfile::default()),
            waypoints: vertices.into_iter().map(WaypointSpec::new).collect(),
            params,
        }
    }

    pub fn with_kind(mut self, kind: PathKind) -> Self {
        self.kind = kind;
        self
    }
}
