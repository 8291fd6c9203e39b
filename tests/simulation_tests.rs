use crowd_sim::adapters::outbound::{
    init_noop_logger, DirectSteering, LogLevel, MemoryLogger, NoGround, RecordingInstantiator,
};
use crowd_sim::application::{CrowdSimulation, SimulationPorts, SimulationSettings};
use crowd_sim::domains::crowd::{CrowdEvent, CrowdStatistics};
use crowd_sim::domains::path_network::{PathDefinition, PathParams};
use crowd_sim::Config;
use glam::Vec3;
use std::sync::Arc;

fn settings(seed: u64) -> SimulationSettings {
    SimulationSettings {
        seed: Some(seed),
        ..SimulationSettings::default()
    }
}

fn loop_street() -> PathDefinition {
    PathDefinition::walking(
        "street",
        vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(15.0, 0.0, 0.0), Vec3::new(30.0, 0.0, 5.0)],
        PathParams {
            lane_count: 3,
            density: 0.5,
            ..PathParams::default()
        },
    )
}

#[test]
fn population_is_constant_while_agents_complete_routes() {
    let mut sim = CrowdSimulation::new(settings(1), SimulationPorts::headless(), init_noop_logger());
    let path = sim.register_path(loop_street());
    let populated = sim.populate_all();
    assert!(populated > 0);

    let mut stats = CrowdStatistics::new();
    for _ in 0..3_000 {
        sim.tick(1.0 / 30.0);
        assert_eq!(sim.agents().len(), populated);
        assert_eq!(sim.population_on(path), populated);
        for event in sim.take_events() {
            stats.apply_event(&event);
        }
    }
    assert!(stats.despawned > 0, "100 simulated seconds should finish some routes");
    assert_eq!(stats.live(), populated);
}

#[test]
fn target_index_stays_within_the_lane_every_tick() {
    let mut sim = CrowdSimulation::new(settings(2), SimulationPorts::headless(), init_noop_logger());
    for definition in Config::default().path_definitions() {
        sim.register_path(definition);
    }
    sim.populate_all();

    for _ in 0..2_000 {
        sim.tick(1.0 / 30.0);
        for agent in sim.agents() {
            if let Some(route) = agent.route() {
                let lane = sim.registry().get(route.path).unwrap().lanes()[route.lane].len();
                assert!(route.target_idx < lane);
            }
        }
        sim.mark_events_as_committed();
    }
}

#[test]
fn same_seed_gives_the_same_run() {
    let run = |seed| {
        let mut sim = CrowdSimulation::new(settings(seed), SimulationPorts::headless(), init_noop_logger());
        sim.register_path(loop_street());
        sim.populate_all();
        for _ in 0..300 {
            sim.tick(0.05);
        }
        sim.agents().iter().map(|a| a.position).collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn unusable_paths_are_skipped_and_reported() {
    let logger = MemoryLogger::new();
    let mut sim = CrowdSimulation::new(settings(3), SimulationPorts::headless(), Arc::new(logger.clone()));
    let good = sim.register_path(loop_street());
    sim.register_path(PathDefinition::walking("dot", vec![Vec3::ZERO], PathParams::default()));

    let populated = sim.populate_all();
    assert_eq!(sim.population_on(good), populated);
    assert!(logger
        .messages_at(LogLevel::Warn)
        .iter()
        .any(|m| m.contains("Skipping population")));
}

#[test]
fn spawned_agents_are_instantiated_and_announced() {
    let instantiator = RecordingInstantiator::new();
    let ports = SimulationPorts {
        steering: Box::new(DirectSteering),
        ground: Box::new(NoGround),
        instantiator: Box::new(instantiator.clone()),
    };
    let mut sim = CrowdSimulation::new(settings(4), ports, init_noop_logger());
    let path = sim.register_path(loop_street());

    let ids = sim.spawn(path, 2, false).unwrap();
    assert_eq!(ids.len(), 1);
    assert!(instantiator.snapshot().live.contains(&ids[0]));
    assert_eq!(sim.uncommitted_events().len(), 1);
    assert!(matches!(
        sim.uncommitted_events()[0],
        CrowdEvent::AgentSpawned { lane: Some(2), .. }
    ));

    let envelopes = sim.envelopes(sim.uncommitted_events()).unwrap();
    assert_eq!(envelopes[0].event_type, "AgentSpawned");
    assert_eq!(envelopes[0].aggregate_id, ids[0].to_string());

    sim.mark_events_as_committed();
    assert!(sim.uncommitted_events().is_empty());
}

#[test]
fn walkers_move_along_their_lane() {
    let mut sim = CrowdSimulation::new(settings(5), SimulationPorts::headless(), init_noop_logger());
    let path = sim.register_path(loop_street());
    let id = sim.spawn(path, 0, true).unwrap()[0];
    let start = sim.agent(id).unwrap().position;

    for _ in 0..30 {
        sim.tick(0.1);
    }
    let agent = sim.agent(id).expect("route is longer than three seconds of walking");
    assert!(agent.position.distance(start) > 0.5);
}

#[test]
fn standing_area_is_populated_and_settles() {
    let mut sim = CrowdSimulation::new(
        SimulationSettings {
            settle_time: 0.5,
            ..settings(6)
        },
        SimulationPorts::headless(),
        init_noop_logger(),
    );
    let plaza = sim.register_path(PathDefinition::standing(
        "plaza",
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 20.0),
            Vec3::new(0.0, 0.0, 20.0),
        ],
        PathParams {
            density: 0.5,
            ..PathParams::default()
        },
    ));
    sim.populate_all();
    let standing = sim.population_on(plaza);
    sim.take_events();

    for _ in 0..20 {
        sim.tick(0.1);
    }
    let settled = sim
        .take_events()
        .iter()
        .filter(|e| matches!(e, CrowdEvent::StandingSettled { .. }))
        .count();
    assert_eq!(settled, standing);
    assert_eq!(sim.population_on(plaza), standing);
}
