use crowd_sim::config::PathKindConfig;
use crowd_sim::domains::path_network::PathKind;
use crowd_sim::Config;
use std::io::Write;

const MINIMAL: &str = r#"
[simulation]
seed = 99
ticks = 10

[[paths]]
name = "lane"
lane_count = 0
lane_spacing = 0.2
waypoints = [
    { position = [0.0, 0.0, 0.0] },
    { position = [10.0, 0.0, 0.0], scale = 2.0 },
]

[[paths]]
name = "square"
kind = "standing"
clump_mean = 4.5
waypoints = [
    { position = [0.0, 0.0, 0.0] },
    { position = [5.0, 0.0, 0.0] },
    { position = [5.0, 0.0, 5.0] },
]
"#;

#[test]
fn parses_with_defaults_and_clamps_lane_settings() {
    let config = MINIMAL.parse::<Config>().unwrap();
    assert_eq!(config.simulation.seed, Some(99));
    assert_eq!(config.simulation.ticks, 10);
    assert_eq!(config.simulation.tick_rate, 30.0);
    assert_eq!(config.crowd.diverge_threshold, 5.0);
    assert_eq!(config.crowd.min_time_between_diverge, 15.0);

    let lane = &config.paths[0];
    assert_eq!(lane.kind, PathKindConfig::Walking);
    assert_eq!(lane.lane_count, 1);
    assert_eq!(lane.lane_spacing, 0.6);
    assert_eq!(lane.waypoints[0].scale, 1.0);
    assert_eq!(lane.waypoints[1].scale, 2.0);
    assert!(lane.kill_at_start && lane.kill_at_end);
}

#[test]
fn path_configs_become_definitions() {
    let config = MINIMAL.parse::<Config>().unwrap();
    let definitions = config.path_definitions();
    assert_eq!(definitions.len(), 2);
    assert!(matches!(definitions[0].kind, PathKind::Walking(_)));
    assert_eq!(definitions[0].waypoints[1].scale, 2.0);
    match &definitions[1].kind {
        PathKind::Standing(profile) => assert_eq!(profile.clump_mean, 4.5),
        PathKind::Walking(_) => panic!("expected a standing path"),
    }

    let settings = config.simulation_settings();
    assert_eq!(settings.seed, Some(99));
    assert_eq!(settings.divergence.rescan_interval, 0.5);
    assert_eq!(settings.arrival.close_enough_final_distance, 0.2);
}

#[test]
fn rejects_out_of_range_values() {
    let bad_stickiness = r#"
[[paths]]
name = "p"
stickiness = 1.5
waypoints = []
"#;
    assert!(bad_stickiness.parse::<Config>().is_err());

    let bad_threshold = r#"
[crowd]
diverge_threshold = 0.0
"#;
    assert!(bad_threshold.parse::<Config>().is_err());

    let bad_kind = r#"
[[paths]]
name = "p"
kind = "flying"
"#;
    assert!(bad_kind.parse::<Config>().is_err());
}

#[test]
fn default_scene_is_valid() {
    let mut config = Config::default();
    config.validate().unwrap();
    assert_eq!(config.paths.len(), 3);
}

#[test]
fn shipped_config_parses() {
    let config = include_str!("../config.toml").parse::<Config>().unwrap();
    assert!(config.paths.iter().any(|p| p.kind == PathKindConfig::Standing));
    assert!(config.paths.iter().any(|p| p.loop_path));
}

#[tokio::test]
async fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MINIMAL.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).await.unwrap();
    assert_eq!(config.paths.len(), 2);
    assert_eq!(config.paths[1].name, "square");
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::from_file(dir.path().join("absent.toml")).await.is_err());
}
