use super::geometry::hdist;
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Ground-plane area (Heron's formula on horizontal edge lengths).
    pub fn area(&self) -> f32 {
        heron_area(self.a, self.b, self.c)
    }

    /// Map two uniform draws in [0, 1) to a uniformly distributed point inside the triangle.
    pub fn sample(&self, r1: f32, r2: f32) -> Vec3 {
        let s = r1.sqrt();
        self.a * (1.0 - s) + self.b * (s * (1.0 - r2)) + self.c * (s * r2)
    }
}

fn heron_area(x: Vec3, y: Vec3, z: Vec3) -> f32 {
    let a = hdist(y, z);
    let b = hdist(y, x);
    let c = hdist(z, x);
    let s = (a + b + c) / 2.0;
    (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt()
}

fn cross_xz(origin: Vec3, p: Vec3, q: Vec3) -> f32 {
    let u = p - origin;
    let v = q - origin;
    u.x * v.z - u.z * v.x
}

fn signed_area_xz(vertices: &[Vec3]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let p = vertices[i];
            let q = vertices[(i + 1) % n];
            p.x * q.z - q.x * p.z
        })
        .sum::<f32>()
        / 2.0
}

fn point_in_triangle(pt: Vec3, v1: Vec3, v2: Vec3, v3: Vec3) -> bool {
    let sign = |p1: Vec3, p2: Vec3, p3: Vec3| (p1.x - p3.x) * (p2.z - p3.z) - (p2.x - p3.x) * (p1.z - p3.z);
    let d1 = sign(pt, v1, v2);
    let d2 = sign(pt, v2, v3);
    let d3 = sign(pt, v3, v1);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Collect the cyclic run of vertices from `from` to `to`, both inclusive.
fn cyclic_run(vertices: &[Vec3], from: usize, to: usize) -> Vec<Vec3> {
    let n = vertices.len();
    let mut run = Vec::with_capacity(n);
    let mut i = from;
    loop {
        run.push(vertices[i]);
        if i == to {
            break;
        }
        i = (i + 1) % n;
    }
    run
}

/// Triangulate a simple polygon given in either winding order.
///
/// Returns `None` when the polygon has fewer than three vertices or has no
/// convex vertex in the ground plane (all vertices collinear).
pub fn triangulate(vertices: &[Vec3]) -> Option<Vec<Triangle>> {
    if vertices.len() < 3 {
        return None;
    }
    let orientation = signed_area_xz(vertices);
    if orientation.abs() < f32::EPSILON {
        return None;
    }
    let mut out = Vec::with_capacity(vertices.len() - 2);
    split(vertices, orientation.signum(), &mut out)?;
    Some(out)
}

fn split(vertices: &[Vec3], winding: f32, out: &mut Vec<Triangle>) -> Option<()> {
    let n = vertices.len();
    if n == 3 {
        out.push(Triangle::new(vertices[0], vertices[1], vertices[2]));
        return Some(());
    }

    // A convex vertex has its turn opposite in sign to the polygon's area.
    let x_idx = (0..n).find(|&i| {
        let prev = vertices[(i + n - 1) % n];
        let next = vertices[(i + 1) % n];
        cross_xz(vertices[i], prev, next) * winding < 0.0
    })?;
    let y_idx = (x_idx + n - 1) % n;
    let z_idx = (x_idx + 1) % n;
    let (x, y, z) = (vertices[x_idx], vertices[y_idx], vertices[z_idx]);

    // Farthest vertex from yz lying inside xyz, if any.
    let base = hdist(y, z);
    let intruder = (0..n)
        .filter(|&i| i != x_idx && i != y_idx && i != z_idx)
        .filter(|&i| point_in_triangle(vertices[i], x, y, z))
        .map(|i| {
            let distance = if base > 0.0 { 2.0 * heron_area(vertices[i], y, z) / base } else { 0.0 };
            (i, distance)
        })
        .fold(None, |best: Option<(usize, f32)>, cand| match best {
            Some(b) if b.1 >= cand.1 => Some(b),
            _ => Some(cand),
        });

    match intruder {
        None => {
            out.push(Triangle::new(y, x, z));
            let rest: Vec<Vec3> = (0..n).filter(|&i| i != x_idx).map(|i| vertices[i]).collect();
            split(&rest, winding, out)
        }
        Some((v_idx, _)) => {
            let first = cyclic_run(vertices, x_idx, v_idx);
            let second = cyclic_run(vertices, v_idx, x_idx);
            debug_assert!(first.len() >= 3 && second.len() >= 3);
            split(&first, winding, out)?;
            split(&second, winding, out)
        }
    }
}
