//! Ear-clipping triangulation for planar polygons.
//!
//! The polygon is flattened onto the coordinate plane that best matches the
//! supplied normal, oriented counter-clockwise and then clipped one ear at a
//! time. Input that has no ear left (self-intersecting or collinear runs)
//! still terminates: the current vertex is clipped regardless, so a fill is
//! produced for every polygon with at least three vertices.

use glam::{Vec2, Vec3};

const AREA_EPSILON: f32 = 1.0e-9;

/// Triangle indices into `points`, counter-clockwise in the flattened plane.
pub fn triangulate(points: &[Vec3], normal: Vec3) -> Vec<[u32; 3]> {
    let flat: Vec<Vec2> = points.iter().map(|p| flatten(*p, normal)).collect();
    ear_clip(&flat)
}

/// Drops the axis the normal is most aligned with.
fn flatten(point: Vec3, normal: Vec3) -> Vec2 {
    let n = normal.abs();
    if n.z >= n.x && n.z >= n.y {
        Vec2::new(point.x, point.y)
    } else if n.y >= n.x {
        Vec2::new(point.z, point.x)
    } else {
        Vec2::new(point.y, point.z)
    }
}

pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

pub fn ear_clip(points: &[Vec2]) -> Vec<[u32; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    if signed_area(points) < 0.0 {
        remaining.reverse();
    }

    let mut triangles = Vec::with_capacity(n - 2);
    let mut cursor = 0;
    let mut misses = 0;

    while remaining.len() > 3 {
        let len = remaining.len();
        cursor %= len;
        let prev = remaining[(cursor + len - 1) % len];
        let current = remaining[cursor];
        let next = remaining[(cursor + 1) % len];

        if is_ear(points, &remaining, prev, current, next) || misses >= len {
            if misses >= len {
                log::debug!("[triangulate] no ear among {len} vertices; clipping {current}");
            }
            triangles.push([prev as u32, current as u32, next as u32]);
            remaining.remove(cursor);
            misses = 0;
        } else {
            cursor += 1;
            misses += 1;
        }
    }

    triangles.push([
        remaining[0] as u32,
        remaining[1] as u32,
        remaining[2] as u32,
    ]);
    triangles
}

fn is_ear(points: &[Vec2], remaining: &[usize], prev: usize, current: usize, next: usize) -> bool {
    let (a, b, c) = (points[prev], points[current], points[next]);
    if (b - a).perp_dot(c - b) <= AREA_EPSILON {
        return false;
    }

    remaining
        .iter()
        .filter(|&&index| index != prev && index != current && index != next)
        .map(|&index| points[index])
        .filter(|p| *p != a && *p != b && *p != c)
        .all(|p| !point_in_triangle(p, a, b, c))
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

/// Total area covered by `triangles`, for coverage checks.
pub fn triangles_area(points: &[Vec2], triangles: &[[u32; 3]]) -> f32 {
    triangles
        .iter()
        .map(|[a, b, c]| {
            let (a, b, c) = (points[*a as usize], points[*b as usize], points[*c as usize]);
            (b - a).perp_dot(c - a).abs() * 0.5
        })
        .sum()
}
