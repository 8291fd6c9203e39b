use crowd_sim::adapters::outbound::init_noop_logger;
use crowd_sim::domains::path_network::{
    build_lanes, hdist, lane_length, last_index, triangulate, PathDefinition, PathParams, PathRegistry, Waypoint,
    WaypointId, FIRST_INDEX,
};
use glam::Vec3;

fn waypoints(points: &[[f32; 3]]) -> Vec<Waypoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| Waypoint {
            id: WaypointId(i as u32),
            position: Vec3::from_array(*p),
            scale: 1.0,
        })
        .collect()
}

#[test]
fn collinear_single_lane_passes_through_waypoints() {
    let wps = waypoints(&[[0.0, 0.0, 0.0], [5.0, 0.0, 0.0], [10.0, 0.0, 0.0]]);
    let lanes = build_lanes(&wps, 1, 1.0, false);

    assert_eq!(lanes.len(), 1);
    let lane = &lanes[0];
    assert_eq!(lane.len(), 5);
    for (i, wp) in wps.iter().enumerate() {
        assert_eq!(lane[i + 1], wp.position);
    }
    assert_eq!(lane[0], lane[1]);
    assert_eq!(lane[4], lane[3]);
}

#[test]
fn every_lane_has_sentinels_and_n_plus_two_points() {
    let wps = waypoints(&[[0.0, 0.0, 0.0], [10.0, 0.0, 3.0], [20.0, 0.0, -2.0], [25.0, 0.0, 8.0]]);
    for lane_count in 1..6 {
        let lanes = build_lanes(&wps, lane_count, 0.8, false);
        assert_eq!(lanes.len(), lane_count);
        for lane in &lanes {
            assert_eq!(lane.len(), wps.len() + 2);
            assert_eq!(lane[0], lane[1]);
            assert_eq!(lane[lane.len() - 1], lane[lane.len() - 2]);
        }
    }
}

#[test]
fn build_is_deterministic() {
    let wps = waypoints(&[[1.5, 0.0, 2.0], [7.25, 0.5, 3.0], [9.0, 0.0, 11.0]]);
    let a = build_lanes(&wps, 4, 1.1, true);
    let b = build_lanes(&wps, 4, 1.1, true);
    assert_eq!(a, b);
}

#[test]
fn fewer_than_two_waypoints_yield_no_lanes() {
    assert!(build_lanes(&waypoints(&[]), 3, 1.0, false).is_empty());
    assert!(build_lanes(&waypoints(&[[1.0, 0.0, 1.0]]), 3, 1.0, false).is_empty());
}

#[test]
fn odd_lanes_are_spaced_symmetrically_about_the_centre() {
    let wps = waypoints(&[[0.0, 0.0, 0.0], [20.0, 0.0, 0.0]]);
    let lanes = build_lanes(&wps, 3, 2.0, false);
    let centre = lanes[0][1];
    assert!((hdist(lanes[1][1], centre) - 2.0).abs() < 1e-5);
    assert!((hdist(lanes[2][1], centre) - 2.0).abs() < 1e-5);
    assert!((hdist(lanes[1][1], lanes[2][1]) - 4.0).abs() < 1e-5);
}

#[test]
fn waypoint_scale_widens_the_spacing_locally() {
    let mut wps = waypoints(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [20.0, 0.0, 0.0]]);
    wps[1].scale = 3.0;
    let lanes = build_lanes(&wps, 2, 1.0, false);
    let narrow = hdist(lanes[0][1], lanes[1][1]);
    let wide = hdist(lanes[0][2], lanes[1][2]);
    assert!((narrow - 1.0).abs() < 1e-5);
    assert!((wide - 3.0).abs() < 1e-5);
}

#[test]
fn registry_clamps_lane_parameters() {
    let mut registry = PathRegistry::new(init_noop_logger());
    let id = registry.register_path(PathDefinition::walking(
        "narrow",
        vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)],
        PathParams {
            lane_count: 0,
            lane_spacing: 0.1,
            ..PathParams::default()
        },
    ));
    let path = registry.get(id).unwrap();
    assert_eq!(path.lanes().len(), 1);
    assert_eq!(path.params.lane_spacing, 0.6);
}

#[test]
fn lane_length_matches_the_polyline() {
    let wps = waypoints(&[[0.0, 0.0, 0.0], [3.0, 0.0, 4.0], [3.0, 0.0, 10.0]]);
    let lanes = build_lanes(&wps, 1, 1.0, false);
    assert!((lane_length(&lanes[0]) - 11.0).abs() < 1e-5);
    assert_eq!(last_index(lanes[0].len()), 3);
    assert_eq!(FIRST_INDEX, 1);
}

#[test]
fn triangulated_area_matches_the_polygon() {
    let square = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(6.0, 0.0, 0.0),
        Vec3::new(6.0, 0.0, 6.0),
        Vec3::new(0.0, 0.0, 6.0),
    ];
    let triangles = triangulate(&square).unwrap();
    let area: f32 = triangles.iter().map(|t| t.area()).sum();
    assert!((area - 36.0).abs() < 1e-3);
}
