use crate::adapters::outbound::{DirectSteering, NoGround, NoopInstantiator};
use crate::common::{ApplicationResult, DomainResult, EventEnvelope, EventMetadata};
use crate::domains::crowd::{
    Agent, AgentId, AgentStep, ArrivalSettings, CrowdEvent, DivergenceEvaluator, DivergenceSettings, GroundProbe,
    Instantiator, Spawner, Steering, TickContext,
};
use crate::domains::logger::DynLogger;
use crate::domains::path_network::{PathDefinition, PathId, PathRegistry};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// Tunables shared by every path in a simulation.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Fixed seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Seconds a standing agent steers onto its spot before holding still.
    pub settle_time: f32,
    pub divergence: DivergenceSettings,
    pub arrival: ArrivalSettings,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            settle_time: 5.0,
            divergence: DivergenceSettings::default(),
            arrival: ArrivalSettings::default(),
        }
    }
}

/// The external capabilities a simulation drives.
pub struct SimulationPorts {
    pub steering: Box<dyn Steering>,
    pub ground: Box<dyn GroundProbe>,
    pub instantiator: Box<dyn Instantiator>,
}

impl SimulationPorts {
    /// Straight-line steering, no terrain, nothing to materialize.
    pub fn headless() -> Self {
        Self {
            steering: Box::new(DirectSteering),
            ground: Box::new(NoGround),
            instantiator: Box::new(NoopInstantiator),
        }
    }
}

impl Default for SimulationPorts {
    fn default() -> Self {
        Self::headless()
    }
}

/// Owns the path network, the population and the RNG, and advances them one
/// tick at a time.
pub struct CrowdSimulation {
    registry: PathRegistry,
    evaluator: DivergenceEvaluator,
    arrival: ArrivalSettings,
    spawner: Spawner,
    agents: Vec<Agent>,
    rng: StdRng,
    steering: Box<dyn Steering>,
    ground: Box<dyn GroundProbe>,
    instantiator: Box<dyn Instantiator>,
    logger: DynLogger,
    elapsed: f64,
    uncommitted_events: Vec<CrowdEvent>,
}

impl CrowdSimulation {
    pub fn new(settings: SimulationSettings, ports: SimulationPorts, logger: DynLogger) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            registry: PathRegistry::new(logger.clone()),
            evaluator: DivergenceEvaluator::new(settings.divergence),
            arrival: settings.arrival,
            spawner: Spawner::new(settings.settle_time, logger.clone()),
            agents: Vec::new(),
            rng,
            steering: ports.steering,
            ground: ports.ground,
            instantiator: ports.instantiator,
            logger,
            elapsed: 0.0,
            uncommitted_events: Vec::new(),
        }
    }

    pub fn register_path(&mut self, definition: PathDefinition) -> PathId {
        let name = definition.name.clone();
        let id = self.registry.register_path(definition);
        info!(path = %id, name = %name, "registered path");
        id
    }

    /// Initial population of every registered path. Paths that cannot be
    /// populated are reported through the logger and skipped.
    pub fn populate_all(&mut self) -> usize {
        let ids: Vec<PathId> = self.registry.paths().iter().map(|p| p.id).collect();
        let mut total = 0;
        for id in ids {
            match self.spawner.populate(&self.registry, id, self.ground.as_ref(), &mut self.rng) {
                Ok(agents) => {
                    info!(path = %id, count = agents.len(), "populated path");
                    total += agents.len();
                    for agent in agents {
                        self.insert_agent(agent, false);
                    }
                }
                Err(e) => self.logger.warn(&format!("Skipping population of {}: {}", id, e)),
            }
        }
        total
    }

    /// Spawn on `path`/`lane`. Returns the ids of the agents created.
    pub fn spawn(&mut self, path: PathId, lane: usize, at_route_start: bool) -> DomainResult<Vec<AgentId>> {
        let agents = self
            .spawner
            .spawn(&self.registry, path, lane, at_route_start, self.ground.as_ref(), &mut self.rng)?;
        Ok(agents
            .into_iter()
            .map(|agent| self.insert_agent(agent, at_route_start))
            .collect())
    }

    /// Add an externally built agent to the population.
    pub fn insert_agent(&mut self, agent: Agent, at_route_start: bool) -> AgentId {
        let id = agent.id;
        self.instantiator.instantiate(&agent);
        self.uncommitted_events.push(CrowdEvent::AgentSpawned {
            agent_id: id.to_string(),
            path_id: agent.path(),
            lane: agent.lane(),
            position: agent.position,
            at_route_start,
            timestamp: Utc::now(),
        });
        self.agents.push(agent);
        id
    }

    /// Advance every agent by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += f64::from(dt);

        let mut despawns = Vec::new();
        {
            let mut ctx = TickContext {
                registry: &self.registry,
                divergence: &self.evaluator,
                arrival: &self.arrival,
                ground: self.ground.as_ref(),
                rng: &mut self.rng,
                events: &mut self.uncommitted_events,
            };
            for agent in self.agents.iter_mut() {
                match agent.advance(&mut ctx, dt) {
                    AgentStep::MoveTo(destination) => self.steering.set_destination(agent, destination, dt),
                    AgentStep::Despawn { path, lane } => despawns.push((agent.id, path, lane)),
                    AgentStep::Rerouted | AgentStep::Hold => {}
                }
            }
        }

        for (id, path, lane) in despawns {
            self.despawn(id, path, lane);
            self.replace(path, lane);
        }
    }

    fn despawn(&mut self, id: AgentId, path: PathId, lane: usize) {
        self.agents.retain(|a| a.id != id);
        self.instantiator.destroy(id);
        self.uncommitted_events.push(CrowdEvent::AgentDespawned {
            agent_id: id.to_string(),
            path_id: path,
            lane: Some(lane),
            timestamp: Utc::now(),
        });
        debug!(agent = %id, path = %path, lane, "despawned agent");
    }

    /// Keep the population constant by spawning at the route start of the
    /// same path and lane.
    fn replace(&mut self, path: PathId, lane: usize) {
        if let Err(e) = self.spawn(path, lane, true) {
            warn!(path = %path, lane, error = %e, "replacement spawn failed");
            self.logger.warn(&format!("Replacement spawn on {} lane {} failed: {}", path, lane, e));
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn population_on(&self, path: PathId) -> usize {
        self.agents.iter().filter(|a| a.path() == path).count()
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PathRegistry {
        &mut self.registry
    }

    /// Simulated seconds since construction.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn uncommitted_events(&self) -> &[CrowdEvent] {
        &self.uncommitted_events
    }

    pub fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    pub fn take_events(&mut self) -> Vec<CrowdEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Wrap `events` for serialization, stamped with the current simulation time.
    pub fn envelopes(&self, events: &[CrowdEvent]) -> ApplicationResult<Vec<EventEnvelope>> {
        let envelopes = events
            .iter()
            .map(|event| {
                EventEnvelope::new(
                    event,
                    "CrowdAgent",
                    EventMetadata {
                        correlation_id: None,
                        simulation_time: self.elapsed,
                        source: "crowd-sim".to_string(),
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(crate::common::DomainError::from)?;
        Ok(envelopes)
    }
}
