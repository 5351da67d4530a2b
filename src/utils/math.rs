// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar polygon math shared by slicing, 2D booleans and Voronoi generation.
//!
//! Polygons are open rings: the closing edge from the last point back to the
//! first is implicit.

use nalgebra::{Point2, Vector2};

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Shoelace area; positive for counter-clockwise rings.
pub fn signed_area(ring: &[Point2<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = &ring[(i + 1) % ring.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Ray-casting (even-odd) containment test.
///
/// Points exactly on an edge may land on either side; use
/// [`point_on_boundary`] when that matters.
pub fn point_in_polygon(point: &Point2<f64>, ring: &[Point2<f64>]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&ring[i], &ring[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = pi.x + (point.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True when `point` lies within `tolerance` of any edge of `ring`.
pub fn point_on_boundary(point: &Point2<f64>, ring: &[Point2<f64>], tolerance: f64) -> bool {
    let n = ring.len();
    (0..n).any(|i| distance_to_segment(point, &ring[i], &ring[(i + 1) % n]) <= tolerance)
}

/// Strict containment: inside by ray cast and not on the boundary.
pub fn point_strictly_inside(point: &Point2<f64>, ring: &[Point2<f64>], tolerance: f64) -> bool {
    point_in_polygon(point, ring) && !point_on_boundary(point, ring, tolerance)
}

pub fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Area centroid of a simple ring, `None` for degenerate input.
pub fn centroid(ring: &[Point2<f64>]) -> Option<Point2<f64>> {
    let (area, moment) = area_moment(ring);
    if area.abs() < f64::EPSILON {
        return None;
    }
    Some(Point2::from(moment / (6.0 * area)))
}

/// Signed area and first moment (`Σ (p_i + p_j) * cross`) of a ring.
pub(crate) fn area_moment(ring: &[Point2<f64>]) -> (f64, Vector2<f64>) {
    if ring.len() < 3 {
        return (0.0, Vector2::zeros());
    }
    let mut area = 0.0;
    let mut moment = Vector2::zeros();
    for (i, a) in ring.iter().enumerate() {
        let b = &ring[(i + 1) % ring.len()];
        let cross = a.x * b.y - b.x * a.y;
        area += cross;
        moment += (a.coords + b.coords) * cross;
    }
    (area * 0.5, moment)
}

/// Reverse the ring if its winding does not match `ccw`.
pub fn orient(ring: &mut [Point2<f64>], ccw: bool) {
    if (signed_area(ring) > 0.0) != ccw {
        ring.reverse();
    }
}

/// Drop repeated and collinear vertices.
///
/// A vertex is collinear when its distance from the chord joining its
/// neighbours is below `tolerance` times the chord length.
pub fn remove_collinear(ring: &[Point2<f64>], tolerance: f64) -> Vec<Point2<f64>> {
    let mut points: Vec<Point2<f64>> = Vec::with_capacity(ring.len());
    for p in ring {
        if points.last().map_or(true, |last| (p - last).norm() > tolerance) {
            points.push(*p);
        }
    }
    while points.len() > 1 && (points[0] - points[points.len() - 1]).norm() <= tolerance {
        points.pop();
    }

    let mut changed = true;
    while changed && points.len() >= 3 {
        changed = false;
        let mut i = 0;
        while i < points.len() && points.len() >= 3 {
            let n = points.len();
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            let chord = next - prev;
            let len = chord.norm();
            let offset = points[i] - prev;
            let deviation = if len > 0.0 {
                (chord.x * offset.y - chord.y * offset.x).abs() / len
            } else {
                0.0
            };
            if deviation <= tolerance * len.max(1.0) {
                points.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }
    points
}

/// Total length of the closed ring.
pub fn perimeter(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    (0..n).map(|i| (ring[(i + 1) % n] - ring[i]).norm()).sum()
}

/// Resample a closed ring to `count` points spaced evenly by arc length,
/// starting at the ring's first vertex.
pub fn resample_closed(ring: &[Point2<f64>], count: usize) -> Vec<Point2<f64>> {
    let n = ring.len();
    let total = perimeter(ring);
    if n < 2 || count == 0 || total <= 0.0 {
        return ring.to_vec();
    }

    let step = total / count as f64;
    let mut out = Vec::with_capacity(count);
    let mut edge = 0;
    let mut edge_start = 0.0;
    let mut edge_len = (ring[1 % n] - ring[0]).norm();

    for k in 0..count {
        let target = k as f64 * step;
        while edge_start + edge_len < target && edge < n - 1 {
            edge_start += edge_len;
            edge += 1;
            edge_len = (ring[(edge + 1) % n] - ring[edge]).norm();
        }
        let a = ring[edge];
        let b = ring[(edge + 1) % n];
        let t = if edge_len > 0.0 {
            ((target - edge_start) / edge_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(Point2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t)));
    }
    out
}
