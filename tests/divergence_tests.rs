use crowd_sim::adapters::outbound::init_noop_logger;
use crowd_sim::domains::crowd::{DivergenceEvaluator, DivergenceSettings, RouteState};
use crowd_sim::domains::path_network::{hdist, PathDefinition, PathId, PathParams, PathRegistry};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn params(stickiness: f32, lane_count: usize) -> PathParams {
    PathParams {
        stickiness,
        lane_count,
        ..PathParams::default()
    }
}

/// Path A runs along x; path B starts `offset` metres beside A's end and heads away along z.
fn network(stickiness: f32, offset: f32) -> (PathRegistry, PathId, PathId) {
    let mut registry = PathRegistry::new(init_noop_logger());
    let a = registry.register_path(PathDefinition::walking(
        "a",
        vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
        params(stickiness, 1),
    ));
    let b = registry.register_path(PathDefinition::walking(
        "b",
        vec![
            Vec3::new(20.0, 0.0, offset),
            Vec3::new(20.0, 0.0, 30.0),
            Vec3::new(20.0, 0.0, 60.0),
        ],
        params(0.5, 3),
    ));
    (registry, a, b)
}

fn evaluator() -> DivergenceEvaluator {
    DivergenceEvaluator::new(DivergenceSettings::default())
}

#[test]
fn never_diverges_onto_the_current_path() {
    let mut registry = PathRegistry::new(init_noop_logger());
    let a = registry.register_path(PathDefinition::walking(
        "solo",
        vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0)],
        params(0.0, 2),
    ));
    let mut rng = StdRng::seed_from_u64(1);
    let mut route = RouteState::new(a, 0, 2, false);
    for force in [false, true] {
        route.cooldown = 0.0;
        assert!(evaluator()
            .try_diverge(&registry, Vec3::new(2.0, 0.0, 0.0), &mut route, force, 0.1, &mut rng)
            .is_none());
        assert_eq!(route.path, a);
    }
}

#[test]
fn never_selects_a_waypoint_beyond_the_threshold() {
    let (registry, a, _) = network(0.0, 6.0);
    let mut rng = StdRng::seed_from_u64(2);
    let mut route = RouteState::new(a, 0, 3, false);
    let diverged = evaluator().try_diverge(&registry, Vec3::new(20.0, 0.0, 0.0), &mut route, true, 0.1, &mut rng);
    assert!(diverged.is_none());
    assert_eq!(route.path, a);
}

#[test]
fn accepted_divergence_reroutes_the_agent() {
    let (registry, a, b) = network(0.0, 4.0);
    let mut rng = StdRng::seed_from_u64(3);
    let mut route = RouteState::new(a, 0, 3, false);
    let position = Vec3::new(20.0, 0.0, 0.0);

    let divergence = evaluator()
        .try_diverge(&registry, position, &mut route, false, 0.1, &mut rng)
        .expect("waypoint within threshold on another path");

    assert_eq!(divergence.from_path, a);
    assert_eq!(divergence.to_path, b);
    assert_eq!(route.path, b);
    assert_eq!(route.target_idx, 1);
    assert!(!route.back, "first index always walks forward");
    assert!(route.lane < 3);
    assert_eq!(route.cooldown, DivergenceSettings::default().min_time_between);

    let chosen = registry
        .waypoints()
        .iter()
        .find(|w| w.id == divergence.waypoint)
        .unwrap();
    assert_ne!(chosen.path, a);
    assert!(hdist(chosen.position, position) <= DivergenceSettings::default().threshold);
}

#[test]
fn cooldown_suppresses_evaluation_and_counts_down() {
    let (registry, a, _) = network(0.0, 4.0);
    let mut rng = StdRng::seed_from_u64(4);
    let mut route = RouteState::new(a, 0, 3, false);
    route.cooldown = 1.0;

    let result = evaluator().try_diverge(&registry, Vec3::new(20.0, 0.0, 0.0), &mut route, false, 0.25, &mut rng);
    assert!(result.is_none());
    assert_eq!(route.path, a);
    assert!((route.cooldown - 0.75).abs() < 1e-6);
}

#[test]
fn declined_candidates_are_cached_until_out_of_range() {
    let (registry, a, b) = network(1.0, 3.0);
    let mut rng = StdRng::seed_from_u64(5);
    let mut route = RouteState::new(a, 0, 3, false);
    let near = Vec3::new(20.0, 0.0, 0.0);
    let b_first = registry.get(b).unwrap().waypoints()[0].id;

    assert!(evaluator().try_diverge(&registry, near, &mut route, false, 0.1, &mut rng).is_none());
    assert!(route.rejected.contains(&b_first));
    assert_eq!(route.cooldown, DivergenceSettings::default().rescan_interval);

    route.cooldown = 0.0;
    assert!(evaluator().try_diverge(&registry, near, &mut route, false, 0.1, &mut rng).is_none());
    assert!(route.rejected.contains(&b_first), "still in range, still rejected");

    route.cooldown = 0.0;
    assert!(evaluator()
        .try_diverge(&registry, Vec3::new(0.0, 0.0, 0.0), &mut route, false, 0.1, &mut rng)
        .is_none());
    assert!(!route.rejected.contains(&b_first));
}

#[test]
fn forced_check_ignores_stickiness_and_cache() {
    let (registry, a, b) = network(1.0, 3.0);
    let mut rng = StdRng::seed_from_u64(6);
    let mut route = RouteState::new(a, 0, 3, false);
    let near = Vec3::new(20.0, 0.0, 0.0);

    assert!(evaluator().try_diverge(&registry, near, &mut route, false, 0.1, &mut rng).is_none());
    assert!(!route.rejected.is_empty());

    let forced = evaluator().try_diverge(&registry, near, &mut route, true, 0.1, &mut rng);
    assert_eq!(forced.map(|d| d.to_path), Some(b));
}

#[test]
fn standing_areas_are_never_diverged_onto() {
    let mut registry = PathRegistry::new(init_noop_logger());
    let a = registry.register_path(PathDefinition::walking(
        "a",
        vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)],
        params(0.0, 1),
    ));
    registry.register_path(PathDefinition::standing(
        "square",
        vec![
            Vec3::new(9.0, 0.0, -1.0),
            Vec3::new(12.0, 0.0, -1.0),
            Vec3::new(12.0, 0.0, 2.0),
            Vec3::new(9.0, 0.0, 2.0),
        ],
        PathParams::default(),
    ));
    let mut rng = StdRng::seed_from_u64(7);
    let mut route = RouteState::new(a, 0, 2, false);
    assert!(evaluator()
        .try_diverge(&registry, Vec3::new(10.0, 0.0, 0.0), &mut route, true, 0.1, &mut rng)
        .is_none());
}

#[test]
fn mid_path_direction_follows_the_approach() {
    // B runs along x through (10, 0, 2); an agent approaching from the west keeps heading east.
    let mut registry = PathRegistry::new(init_noop_logger());
    let a = registry.register_path(PathDefinition::walking(
        "a",
        vec![Vec3::new(0.0, 0.0, -20.0), Vec3::new(0.0, 0.0, 0.0)],
        params(0.0, 1),
    ));
    let b = registry.register_path(PathDefinition::walking(
        "b",
        vec![
            Vec3::new(-30.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(30.0, 0.0, 2.0),
        ],
        params(0.0, 1),
    ));
    let mut rng = StdRng::seed_from_u64(8);
    let mut route = RouteState::new(a, 0, 2, false);
    let divergence = evaluator()
        .try_diverge(&registry, Vec3::new(0.0, 0.0, 0.0), &mut route, true, 0.1, &mut rng)
        .unwrap();
    assert_eq!(divergence.to_path, b);
    assert_eq!(divergence.target_idx, 2);
    assert!(!divergence.back);
}
