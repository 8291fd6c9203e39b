use super::agent::{Agent, AgentProfile, Behavior, RouteState, StandingState};
use super::divergence::{Divergence, DivergenceEvaluator};
use super::events::CrowdEvent;
use super::ports::GroundProbe;
use crate::domains::path_network::{hdist, PathId, PathRegistry};
use chrono::Utc;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Arrival radii, each multiplied by the agent's speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrivalSettings {
    pub close_enough_distance: f32,
    pub close_enough_final_distance: f32,
}

impl Default for ArrivalSettings {
    fn default() -> Self {
        Self {
            close_enough_distance: 1.0,
            close_enough_final_distance: 0.2,
        }
    }
}

/// Shared, read-mostly state an agent needs for one tick.
pub struct TickContext<'a, R: Rng + ?Sized> {
    pub registry: &'a PathRegistry,
    pub divergence: &'a DivergenceEvaluator,
    pub arrival: &'a ArrivalSettings,
    pub ground: &'a dyn GroundProbe,
    pub rng: &'a mut R,
    pub events: &'a mut Vec<CrowdEvent>,
}

/// What the driver should do with an agent after its tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentStep {
    /// Hand this point to steering.
    MoveTo(Vec3),
    /// The route ended and the agent picked up another path; nothing to steer this tick.
    Rerouted,
    /// The route ended; remove the agent and spawn a replacement on `path`/`lane`.
    Despawn { path: PathId, lane: usize },
    /// Nothing to do.
    Hold,
}

impl Agent {
    pub fn advance<R: Rng + ?Sized>(&mut self, ctx: &mut TickContext<'_, R>, dt: f32) -> AgentStep {
        let Agent {
            id,
            position,
            profile,
            behavior,
        } = self;
        let agent_id = id.to_string();
        match behavior {
            Behavior::Walking(route) => advance_walking(&agent_id, position, profile, route, ctx, dt),
            Behavior::Standing(state) => advance_standing(&agent_id, *position, state, ctx.events, dt),
        }
    }
}

fn diverged_event(agent_id: &str, divergence: &Divergence, forced: bool) -> CrowdEvent {
    CrowdEvent::Diverged {
        agent_id: agent_id.to_string(),
        from_path: divergence.from_path,
        to_path: divergence.to_path,
        waypoint: divergence.waypoint,
        lane: divergence.lane,
        back: divergence.back,
        forced,
        timestamp: Utc::now(),
    }
}

fn jittered(base: Vec3, ground: Option<f32>, profile: &AgentProfile) -> Vec3 {
    Vec3::new(
        base.x + profile.finish_jitter.x,
        ground.unwrap_or(base.y),
        base.z + profile.finish_jitter.y,
    )
}

fn advance_walking<R: Rng + ?Sized>(
    agent_id: &str,
    position: &mut Vec3,
    profile: &AgentProfile,
    route: &mut RouteState,
    ctx: &mut TickContext<'_, R>,
    dt: f32,
) -> AgentStep {
    let registry = ctx.registry;
    if let Some(divergence) = ctx
        .divergence
        .try_diverge(registry, *position, route, false, dt, &mut *ctx.rng)
    {
        ctx.events.push(diverged_event(agent_id, &divergence, false));
    }

    // The path may have been reshaped under the agent since its last tick.
    let lanes = registry.path(route.path).map(|p| p.lanes()).unwrap_or(&[]);
    if lanes.is_empty() {
        warn!(agent = agent_id, path = %route.path, lane = route.lane, "agent is on a path without lanes");
        return AgentStep::Despawn {
            path: route.path,
            lane: route.lane,
        };
    }
    if route.lane >= lanes.len() {
        debug!(agent = agent_id, lane = route.lane, lanes = lanes.len(), "lane no longer exists, clamping");
        route.lane = lanes.len() - 1;
    }
    let lane = &lanes[route.lane];
    if route.target_idx >= lane.len() {
        route.target_idx = lane.len() - 1;
    }

    // Snap to the terrain under the agent.
    let ground = ctx.ground.probe_ground_height(*position);
    if let Some(height) = ground {
        position.y = height;
    }

    let target = jittered(lane[route.target_idx], ground, profile);
    let distance = hdist(*position, target);
    let has_next = route.has_next_waypoint(lane.len());

    if distance < profile.speed * ctx.arrival.close_enough_distance && has_next {
        route.step();
        ctx.events.push(CrowdEvent::WaypointAdvanced {
            agent_id: agent_id.to_string(),
            path_id: route.path,
            lane: route.lane,
            target_idx: route.target_idx,
            timestamp: Utc::now(),
        });
        debug!(agent = agent_id, target = route.target_idx, "advanced to next waypoint");
        return AgentStep::MoveTo(jittered(lane[route.target_idx], ground, profile));
    }

    if distance < profile.speed * ctx.arrival.close_enough_final_distance && !has_next {
        return complete_route(agent_id, *position, route, ctx, dt);
    }

    AgentStep::MoveTo(target)
}

/// The agent reached the terminal waypoint in its direction of travel.
fn complete_route<R: Rng + ?Sized>(
    agent_id: &str,
    position: Vec3,
    route: &mut RouteState,
    ctx: &mut TickContext<'_, R>,
    dt: f32,
) -> AgentStep {
    let registry = ctx.registry;
    let should_kill = registry
        .path(route.path)
        .map(|p| if route.back { p.params.kill_at_start } else { p.params.kill_at_end })
        .unwrap_or(true);

    let (path, lane, back) = (route.path, route.lane, route.back);

    if !should_kill {
        if let Some(divergence) = ctx
            .divergence
            .try_diverge(registry, position, route, true, dt, &mut *ctx.rng)
        {
            ctx.events.push(diverged_event(agent_id, &divergence, true));
            ctx.events.push(CrowdEvent::RouteCompleted {
                agent_id: agent_id.to_string(),
                path_id: path,
                lane,
                back,
                rerouted: true,
                timestamp: Utc::now(),
            });
            return AgentStep::Rerouted;
        }
    }

    ctx.events.push(CrowdEvent::RouteCompleted {
        agent_id: agent_id.to_string(),
        path_id: path,
        lane,
        back,
        rerouted: false,
        timestamp: Utc::now(),
    });
    AgentStep::Despawn { path, lane }
}

fn advance_standing(
    agent_id: &str,
    position: Vec3,
    state: &mut StandingState,
    events: &mut Vec<CrowdEvent>,
    dt: f32,
) -> AgentStep {
    if state.settle_remaining > 0.0 {
        state.settle_remaining -= dt;
        return AgentStep::MoveTo(state.anchor);
    }
    if !state.settled {
        state.settled = true;
        events.push(CrowdEvent::StandingSettled {
            agent_id: agent_id.to_string(),
            path_id: state.path,
            position,
            timestamp: Utc::now(),
        });
    }
    AgentStep::Hold
}
