// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! [`ClipKernel`] backed by `geo` boolean operations.
//!
//! Offsetting is a Minkowski construction: every edge contributes a band of
//! width `|delta|` on both sides and every vertex a join (disc, miter wedge
//! or squared wedge). Growing unions the band with the region, shrinking
//! subtracts it.

use super::clip::{arc_steps, ClipKernel, ClipOp, EndType, FillRule, InflateOptions, IntPath, IntPoint, JoinType};
use crate::error::KernelError;
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use nalgebra::Vector2;
use std::f64::consts::PI;

/// Fewest segments used for a full round join.
const MIN_DISC_SEGMENTS: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoClipper;

impl GeoClipper {
    pub fn new() -> Self {
        Self
    }
}

fn to_vec(p: &IntPoint) -> Vector2<f64> {
    Vector2::new(p.x as f64, p.y as f64)
}

fn ring(points: impl IntoIterator<Item = Vector2<f64>>) -> LineString<f64> {
    LineString::from(points.into_iter().map(|p| Coord { x: p.x, y: p.y }).collect::<Vec<_>>())
}

fn polygon(points: impl IntoIterator<Item = Vector2<f64>>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Polygon::new(ring(points), Vec::new())])
}

fn path_area(path: &[IntPoint]) -> f64 {
    let n = path.len();
    (0..n)
        .map(|i| {
            let (a, b) = (&path[i], &path[(i + 1) % n]);
            a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64
        })
        .sum::<f64>()
        * 0.5
}

/// Pairwise union in a balanced order.
fn union_all(mut parts: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    while parts.len() > 1 {
        let mut next = Vec::with_capacity(parts.len().div_ceil(2));
        let mut iter = parts.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        parts = next;
    }
    parts.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Filled region described by closed paths under `fill`.
fn assemble(paths: &[IntPath], fill: FillRule) -> MultiPolygon<f64> {
    let mut rings: Vec<(f64, MultiPolygon<f64>)> = paths
        .iter()
        .filter(|p| p.len() >= 3)
        .map(|p| (path_area(p), polygon(p.iter().map(to_vec))))
        .filter(|(area, _)| *area != 0.0)
        .collect();

    match fill {
        FillRule::EvenOdd => rings
            .into_iter()
            .fold(MultiPolygon::new(Vec::new()), |acc, (_, p)| acc.xor(&p)),
        FillRule::NonZero => {
            // Larger contours first so islands inside holes are added back.
            rings.sort_by(|a, b| b.0.abs().total_cmp(&a.0.abs()));
            rings
                .into_iter()
                .fold(MultiPolygon::new(Vec::new()), |acc, (area, p)| {
                    if area > 0.0 {
                        acc.union(&p)
                    } else {
                        acc.difference(&p)
                    }
                })
        }
    }
}

fn round_ring(ring: &LineString<f64>, ccw: bool) -> Option<IntPath> {
    let mut path: IntPath = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        let p = IntPoint::new(c.x.round() as i64, c.y.round() as i64);
        if path.last() != Some(&p) {
            path.push(p);
        }
    }
    while path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
    if path.len() < 3 {
        return None;
    }
    let area = path_area(&path);
    if area == 0.0 {
        return None;
    }
    if (area > 0.0) != ccw {
        path.reverse();
    }
    Some(path)
}

/// Counter-clockwise exteriors followed by their clockwise interiors.
fn disassemble(region: &MultiPolygon<f64>) -> Vec<IntPath> {
    let mut out = Vec::new();
    for poly in &region.0 {
        if let Some(outer) = round_ring(poly.exterior(), true) {
            out.push(outer);
            out.extend(poly.interiors().iter().filter_map(|h| round_ring(h, false)));
        }
    }
    out
}

fn perp(v: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// Band of half-width `d` around segment `a -> b`.
fn edge_band(a: Vector2<f64>, b: Vector2<f64>, d: f64) -> Option<MultiPolygon<f64>> {
    let dir = b - a;
    let len = dir.norm();
    if len <= f64::EPSILON {
        return None;
    }
    let n = perp(dir / len) * d;
    Some(polygon([a + n, b + n, b - n, a - n]))
}

fn disc(center: Vector2<f64>, d: f64, tolerance: f64) -> MultiPolygon<f64> {
    let steps = arc_steps(d, 2.0 * PI, tolerance).max(MIN_DISC_SEGMENTS);
    polygon((0..steps).map(|i| {
        let t = 2.0 * PI * i as f64 / steps as f64;
        center + Vector2::new(t.cos(), t.sin()) * d
    }))
}

/// Wedge filling the gap between two edge bands on the outside of the turn
/// at `v`.
fn corner_wedge(
    prev: Vector2<f64>,
    v: Vector2<f64>,
    next: Vector2<f64>,
    d: f64,
    join: JoinType,
    miter_limit: f64,
) -> Option<MultiPolygon<f64>> {
    let e1 = (v - prev).try_normalize(f64::EPSILON)?;
    let e2 = (next - v).try_normalize(f64::EPSILON)?;
    let turn = e1.x * e2.y - e1.y * e2.x;
    if turn.abs() <= 1e-12 {
        return None;
    }
    // Gap lies on the right of a left turn and on the left of a right turn.
    let side = if turn > 0.0 { -1.0 } else { 1.0 };
    let n1 = perp(e1) * side;
    let n2 = perp(e2) * side;
    let b = (n1 + n2).try_normalize(f64::EPSILON)?;
    let cos_half = b.dot(&n1);
    if cos_half <= f64::EPSILON {
        return None;
    }

    if join == JoinType::Miter && 1.0 / cos_half <= miter_limit {
        let m = v + b * (d / cos_half);
        return Some(polygon([v, v + n1 * d, m, v + n2 * d]));
    }

    let p = perp(b);
    let cut = |n: Vector2<f64>| {
        let denom = p.dot(&n);
        (denom.abs() > f64::EPSILON).then(|| v + b * d + p * (d * (1.0 - cos_half) / denom))
    };
    let q1 = cut(n1)?;
    let q2 = cut(n2)?;
    Some(polygon([v, v + n1 * d, q1, q2, v + n2 * d]))
}

fn offset_band(paths: &[IntPath], d: f64, options: &InflateOptions) -> MultiPolygon<f64> {
    let closed = options.end == EndType::Polygon;
    let mut parts = Vec::new();

    for path in paths {
        let points: Vec<Vector2<f64>> = path.iter().map(to_vec).collect();
        let n = points.len();
        if n < 2 {
            continue;
        }
        let edge_count = if closed { n } else { n - 1 };
        parts.extend((0..edge_count).filter_map(|i| edge_band(points[i], points[(i + 1) % n], d)));

        for i in 0..n {
            let interior = closed || (i > 0 && i < n - 1);
            if !interior {
                continue;
            }
            let (prev, v, next) = (points[(i + n - 1) % n], points[i], points[(i + 1) % n]);
            match options.join {
                JoinType::Round => parts.push(disc(v, d, options.arc_tolerance)),
                join => parts.extend(corner_wedge(prev, v, next, d, join, options.miter_limit)),
            }
        }
    }

    union_all(parts)
}

impl ClipKernel for GeoClipper {
    fn boolean(
        &self,
        op: ClipOp,
        subject: &[IntPath],
        clip: &[IntPath],
        fill: FillRule,
    ) -> Result<Vec<IntPath>, KernelError> {
        let a = assemble(subject, fill);
        let b = assemble(clip, fill);
        let result = match op {
            ClipOp::Union => a.union(&b),
            ClipOp::Difference => a.difference(&b),
            ClipOp::Intersection => a.intersection(&b),
            ClipOp::Xor => a.xor(&b),
        };
        Ok(disassemble(&result))
    }

    fn inflate(&self, paths: &[IntPath], delta: f64, options: &InflateOptions) -> Result<Vec<IntPath>, KernelError> {
        if !delta.is_finite() {
            return Err(KernelError::Unsupported("non-finite offset delta"));
        }
        let d = delta.abs();

        match options.end {
            EndType::Polygon => {
                let region = assemble(paths, FillRule::NonZero);
                if d == 0.0 {
                    return Ok(disassemble(&region));
                }
                let band = offset_band(paths, d, options);
                let result = if delta > 0.0 {
                    region.union(&band)
                } else {
                    region.difference(&band)
                };
                Ok(disassemble(&result))
            }
            EndType::Butt => {
                if delta <= 0.0 {
                    return Ok(Vec::new());
                }
                Ok(disassemble(&offset_band(paths, d, options)))
            }
        }
    }
}
