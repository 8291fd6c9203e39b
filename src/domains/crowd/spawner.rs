use super::agent::{Agent, AgentProfile, Gait, RouteState, StandingState};
use super::ports::GroundProbe;
use crate::common::{DomainError, DomainResult};
use crate::domains::logger::DynLogger;
use crate::domains::path_network::{
    last_index, lane_length, segment_lengths, Path, PathId, PathKind, PathRegistry, StandingProfile, WalkingProfile,
    FIRST_INDEX,
};
use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::debug;

/// Upper bound on rejection rounds in the bounded normal sampler.
pub const MAX_NORMAL_ATTEMPTS: usize = 64;
/// Upper bound on the Poisson clump size.
pub const MAX_CLUMP_SIZE: usize = 32;
/// Speed handed to steering while a standing agent settles onto its anchor.
pub const STANDING_SPEED: f32 = 5.0;

/// Approximate normal draw: the sum of 12 uniforms shifted by 6, rejected
/// outside `±max_sigma`, then scaled by `variance` and offset by `mean`.
/// Falls back to `mean` if every attempt is rejected.
pub fn sample_bounded_normal<R: Rng + ?Sized>(rng: &mut R, mean: f32, variance: f32, max_sigma: f32) -> f32 {
    for _ in 0..MAX_NORMAL_ATTEMPTS {
        let sum: f32 = (0..12).map(|_| rng.gen::<f32>()).sum::<f32>() - 6.0;
        if sum > -max_sigma && sum < max_sigma {
            return variance * sum + mean;
        }
    }
    mean
}

/// Inverse-CDF Poisson draw.
pub fn sample_poisson<R: Rng + ?Sized>(rng: &mut R, mean: f32) -> usize {
    if mean <= 0.0 {
        return 0;
    }
    let r: f32 = rng.gen();
    let mut k = 0;
    let mut p = (-mean).exp();
    let mut cumulative = p;
    while r > cumulative && k < MAX_CLUMP_SIZE {
        k += 1;
        p *= mean / k as f32;
        cumulative += p;
    }
    k
}

/// Pick a lane-point index `i` with probability proportional to the length of
/// the segment ending at `i`, so spawns are spread evenly in space.
pub fn distance_weighted_index<R: Rng + ?Sized>(lane: &[Vec3], rng: &mut R) -> usize {
    let lengths = segment_lengths(lane);
    let total: f32 = lengths.iter().sum();
    if total <= 0.0 {
        return FIRST_INDEX;
    }
    let r = rng.gen::<f32>() * total;
    let mut cumulative = 0.0;
    for (k, length) in lengths.iter().enumerate() {
        cumulative += length;
        if r <= cumulative {
            return k + 1;
        }
    }
    FIRST_INDEX
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> f32 {
    if extent <= 0.0 {
        0.0
    } else {
        rng.gen_range(-extent..=extent)
    }
}

fn walking_profile(path: &Path) -> DomainResult<&WalkingProfile> {
    match &path.kind {
        PathKind::Walking(profile) => Ok(profile),
        PathKind::Standing(_) => Err(DomainError::InvalidConfiguration {
            reason: format!("path '{}' is not a walking path", path.name),
        }),
    }
}

fn standing_profile(path: &Path) -> DomainResult<&StandingProfile> {
    match &path.kind {
        PathKind::Standing(profile) => Ok(profile),
        PathKind::Walking(_) => Err(DomainError::InvalidConfiguration {
            reason: format!("path '{}' is not a standing path", path.name),
        }),
    }
}

/// Creates agents with randomized profiles on registered paths.
pub struct Spawner {
    settle_time: f32,
    logger: DynLogger,
}

impl Spawner {
    pub fn new(settle_time: f32, logger: DynLogger) -> Self {
        Self { settle_time, logger }
    }

    /// Spawn on `path`. Walking paths yield one agent on `lane`; standing
    /// paths yield a clump (and nothing for runtime replacements).
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        registry: &PathRegistry,
        path: PathId,
        lane: usize,
        at_route_start: bool,
        ground: &dyn GroundProbe,
        rng: &mut R,
    ) -> DomainResult<Vec<Agent>> {
        match registry.get(path)?.kind {
            PathKind::Walking(_) => Ok(vec![self.spawn_walker(registry, path, lane, at_route_start, rng)?]),
            PathKind::Standing(_) if at_route_start => Ok(Vec::new()),
            PathKind::Standing(_) => self.spawn_clump(registry, path, ground, rng),
        }
    }

    pub fn spawn_walker<R: Rng + ?Sized>(
        &self,
        registry: &PathRegistry,
        path_id: PathId,
        lane_idx: usize,
        at_route_start: bool,
        rng: &mut R,
    ) -> DomainResult<Agent> {
        let path = registry.get(path_id)?;
        let profile = walking_profile(path)?;
        if !path.is_usable() {
            return Err(DomainError::DegeneratePath {
                path: path_id.0,
                reason: "fewer than two waypoints".to_string(),
            });
        }
        let lane = path.lane(lane_idx).ok_or(DomainError::InvalidLane {
            path: path_id.0,
            lane: lane_idx,
            lane_count: path.lanes().len(),
        })?;

        let run = rng.gen::<f32>() < profile.running_proportion;
        let back = if at_route_start {
            self.route_start_direction(path, profile, rng)
        } else {
            rng.gen::<f32>() < profile.back_proportion
        };

        let distribution = if run { profile.run_speed } else { profile.walk_speed };
        let speed = sample_bounded_normal(rng, distribution.mean, distribution.variance, profile.max_sigma);

        let jitter = path.params.position_jitter;
        let finish_jitter = Vec2::new(symmetric(rng, jitter.x), symmetric(rng, jitter.y));

        // Route-start spawns sit on the duplicated end points, so the
        // interpolation below lands exactly on the first/last waypoint.
        let (prev, next) = if back {
            let prev = if at_route_start {
                lane.len() - 1
            } else {
                distance_weighted_index(lane, rng)
            };
            (prev, prev - 1)
        } else {
            let next = if at_route_start {
                FIRST_INDEX
            } else {
                distance_weighted_index(lane, rng)
            };
            (next - 1, next)
        };

        let t: f32 = rng.gen();
        let position = lane[prev] * t + lane[next] * (1.0 - t);
        let target_idx = next.clamp(FIRST_INDEX, last_index(lane.len()));

        debug!(path = %path_id, lane = lane_idx, target_idx, back, run, speed, "spawned walker");

        Ok(Agent::walking(
            position,
            AgentProfile {
                gait: if run { Gait::Run } else { Gait::Walk },
                speed,
                finish_jitter,
            },
            RouteState::new(path_id, lane_idx, target_idx, back),
        ))
    }

    /// Direction for a replacement that enters from a route edge: walk away
    /// from the edge that does not kill.
    fn route_start_direction<R: Rng + ?Sized>(&self, path: &Path, profile: &WalkingProfile, rng: &mut R) -> bool {
        match (path.params.kill_at_start, path.params.kill_at_end) {
            (true, false) => false,
            (false, true) => true,
            (false, false) => {
                self.logger
                    .warn(&format!("Making spawn call on a pacifist path '{}'", path.name));
                rng.gen::<f32>() < profile.back_proportion
            }
            (true, true) => rng.gen::<f32>() < profile.back_proportion,
        }
    }

    /// Spawn one Poisson-sized clump at an area-weighted point of a standing path.
    pub fn spawn_clump<R: Rng + ?Sized>(
        &self,
        registry: &PathRegistry,
        path_id: PathId,
        ground: &dyn GroundProbe,
        rng: &mut R,
    ) -> DomainResult<Vec<Agent>> {
        let path = registry.get(path_id)?;
        let profile = standing_profile(path)?;
        let triangles = path.triangles();
        if triangles.is_empty() {
            return Err(DomainError::DegeneratePath {
                path: path_id.0,
                reason: "fewer than three non-collinear vertices".to_string(),
            });
        }

        let areas: Vec<f32> = triangles.iter().map(|t| t.area()).collect();
        let total: f32 = areas.iter().sum();

        let clump = sample_poisson(rng, profile.clump_mean);
        if clump == 0 {
            return Ok(Vec::new());
        }

        let mut r = rng.gen::<f32>() * total;
        let mut chosen = triangles.len() - 1;
        for (i, area) in areas.iter().enumerate() {
            if r < *area {
                chosen = i;
                break;
            }
            r -= area;
        }
        let base = triangles[chosen].sample(rng.gen(), rng.gen());

        let jitter = path.params.position_jitter;
        let agents = (0..clump)
            .map(|_| {
                let mut spot = base + Vec3::new(symmetric(rng, jitter.x), 0.0, symmetric(rng, jitter.y));
                if let Some(height) = ground.probe_ground_height(spot) {
                    spot.y = height;
                }
                Agent::standing(
                    spot,
                    AgentProfile {
                        gait: Gait::Stand,
                        speed: STANDING_SPEED,
                        finish_jitter: Vec2::ZERO,
                    },
                    StandingState {
                        path: path_id,
                        anchor: spot,
                        settle_remaining: self.settle_time,
                        settled: false,
                    },
                )
            })
            .collect::<Vec<_>>();

        debug!(path = %path_id, clump, "spawned standing clump");
        Ok(agents)
    }

    /// Initial population for one path, scaled by its density.
    pub fn populate<R: Rng + ?Sized>(
        &self,
        registry: &PathRegistry,
        path_id: PathId,
        ground: &dyn GroundProbe,
        rng: &mut R,
    ) -> DomainResult<Vec<Agent>> {
        let path = registry.get(path_id)?;
        if !path.is_usable() {
            return Err(DomainError::DegeneratePath {
                path: path_id.0,
                reason: "geometry could not be built".to_string(),
            });
        }

        let mut agents = Vec::new();
        match &path.kind {
            PathKind::Walking(_) => {
                let lane_count = path.lanes().len();
                let length = lane_length(&path.lanes()[0]);
                let count = (path.params.density * length * lane_count as f32 / 3.0).floor() as usize;
                for _ in 0..count {
                    let lane = rng.gen_range(0..lane_count);
                    agents.push(self.spawn_walker(registry, path_id, lane, false, rng)?);
                }
            }
            PathKind::Standing(_) => {
                let area: f32 = path.triangles().iter().map(|t| t.area()).sum();
                let clumps = (path.params.density * area / 5.0).floor() as usize;
                for _ in 0..clumps {
                    agents.extend(self.spawn_clump(registry, path_id, ground, rng)?);
                }
            }
        }
        Ok(agents)
    }
}
