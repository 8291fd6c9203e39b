use super::types::Waypoint;
use glam::Vec3;

/// One lane: the offset waypoint positions with a duplicated
/// sentinel at each end.
pub type Lane = Vec<Vec3>;

/// Lane index of the first real waypoint (index 0 is its sentinel copy).
pub const FIRST_INDEX: usize = 1;

/// Lane index of the last real waypoint for a lane of `lane_len` points.
pub fn last_index(lane_len: usize) -> usize {
    lane_len.saturating_sub(2).max(FIRST_INDEX)
}

/// Distance between `a` and `b` projected onto the ground plane.
pub fn hdist(a: Vec3, b: Vec3) -> f32 {
    let d = a - b;
    (d.x * d.x + d.z * d.z).sqrt()
}

/// Unsigned angle in degrees between the ground-plane projections of `a` and `b`.
/// Zero-length inputs yield 0.
pub fn hangle(a: Vec3, b: Vec3) -> f32 {
    let a = Vec3::new(a.x, 0.0, a.z);
    let b = Vec3::new(b.x, 0.0, b.z);
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < 1e-15 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Rotate a vector 90 degrees about the vertical axis.
fn quarter_turn(v: Vec3) -> Vec3 {
    Vec3::new(v.z, v.y, -v.x)
}

/// Signed lane multiplier: 0, -1, +1, -2, +2, ... for lanes 0, 1, 2, 3, 4, ...
fn lane_offset(k: usize) -> f32 {
    let magnitude = ((k + 1) / 2) as f32;
    if k % 2 == 0 {
        magnitude
    } else {
        -magnitude
    }
}

/// Compute the parallel lanes for an ordered waypoint sequence.
///
/// Each returned lane has `n + 2` points where `n` is the waypoint count
/// (counting the closing waypoint of a looped path). Fewer than two waypoints
/// yield no lanes; callers treat that as an unusable path.
pub fn build_lanes(waypoints: &[Waypoint], lane_count: usize, spacing: f32, loop_path: bool) -> Vec<Lane> {
    let mut ring: Vec<(Vec3, f32)> = waypoints.iter().map(|w| (w.position, w.scale)).collect();
    if loop_path {
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
    }

    let n = ring.len();
    if n < 2 || lane_count == 0 {
        return Vec::new();
    }

    let mut lanes = vec![vec![Vec3::ZERO; n + 2]; lane_count];

    for i in 0..n {
        let (position, scale) = ring[i];
        let (vector_start, vector_end) = if i == 0 {
            (Vec3::ZERO, ring[0].0 - ring[1].0)
        } else if i == n - 1 {
            (ring[n - 2].0 - ring[n - 1].0, Vec3::ZERO)
        } else {
            (ring[i - 1].0 - position, position - ring[i + 1].0)
        };

        let shear = quarter_turn(vector_start + vector_end).normalize_or_zero();
        let step = spacing * scale;

        let center = if lane_count % 2 == 1 {
            position
        } else {
            position + shear * (step / 2.0)
        };
        lanes[0][i + 1] = center;
        for (k, lane) in lanes.iter_mut().enumerate().skip(1) {
            lane[i + 1] = center + shear * step * lane_offset(k);
        }
    }

    for lane in lanes.iter_mut() {
        lane[0] = lane[1];
        lane[n + 1] = lane[n];
    }

    lanes
}

/// Ground-plane lengths of consecutive lane-point segments; entry `i - 1`
/// is the segment ending at point `i`.
pub fn segment_lengths(lane: &[Vec3]) -> Vec<f32> {
    lane.windows(2).map(|w| hdist(w[1], w[0])).collect()
}

pub fn lane_length(lane: &[Vec3]) -> f32 {
    segment_lengths(lane).iter().sum()
}
