// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Horizontal cross-sections of a polygon solid

use super::tree::Polygon;
use ahash::AHashMap;
use nalgebra::{Point2, Point3};
use std::collections::VecDeque;
use tracing::debug;

/// Fallback match distance for endpoints that straddle a key cell.
const JOIN_TOLERANCE: f64 = 1e-9;
const KEY_QUANTUM: f64 = 1e-7;

type Segment = (Point2<f64>, Point2<f64>);

/// Closed contours where the solid crosses the plane `z`.
///
/// Segments are oriented with the material on their left, so outer
/// boundaries come out counter-clockwise and holes clockwise.
pub(super) fn slice_polygons(polygons: &[Polygon], z: f64) -> Vec<Vec<Point2<f64>>> {
    let segments: Vec<Segment> = polygons.iter().filter_map(|p| polygon_section(p, z)).collect();
    chain_segments(&segments)
}

fn polygon_section(polygon: &Polygon, z: f64) -> Option<Segment> {
    let vertices = &polygon.vertices;
    let n = vertices.len();
    let mut hits = Vec::with_capacity(2);
    for i in 0..n {
        let a = &vertices[i];
        let b = &vertices[(i + 1) % n];
        if (a.z >= z) != (b.z >= z) {
            hits.push(crossing(a, b, z));
        }
    }
    let [p, q] = hits[..] else {
        return None;
    };

    if p == q {
        return None;
    }
    let d = q - p;
    let normal = polygon.plane.normal;
    if d.y * normal.x - d.x * normal.y > 0.0 {
        Some((p, q))
    } else {
        Some((q, p))
    }
}

/// Edge/plane crossing computed from a canonical endpoint order so that
/// both faces sharing an edge produce the identical point.
fn crossing(a: &Point3<f64>, b: &Point3<f64>, z: f64) -> Point2<f64> {
    let (a, b) = if (a.x, a.y, a.z) <= (b.x, b.y, b.z) { (a, b) } else { (b, a) };
    let t = (z - a.z) / (b.z - a.z);
    Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

fn key(p: &Point2<f64>) -> (i64, i64) {
    ((p.x / KEY_QUANTUM).round() as i64, (p.y / KEY_QUANTUM).round() as i64)
}

fn same_vertex(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    key(a) == key(b) || (a - b).norm() <= JOIN_TOLERANCE
}

/// Join oriented segments into contours, growing each chain at both ends
/// until it meets its own first vertex or nothing more attaches.
fn chain_segments(segments: &[Segment]) -> Vec<Vec<Point2<f64>>> {
    let mut starts: AHashMap<(i64, i64), Vec<usize>> = AHashMap::with_capacity(segments.len());
    let mut ends: AHashMap<(i64, i64), Vec<usize>> = AHashMap::with_capacity(segments.len());
    for (i, (start, end)) in segments.iter().enumerate() {
        starts.entry(key(start)).or_default().push(i);
        ends.entry(key(end)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let find = |index: &AHashMap<(i64, i64), Vec<usize>>, at: &Point2<f64>, used: &[bool], tail: bool| {
        index
            .get(&key(at))
            .and_then(|bucket| bucket.iter().copied().find(|&i| !used[i]))
            .or_else(|| {
                (0..segments.len()).find(|&i| {
                    let p = if tail { &segments[i].0 } else { &segments[i].1 };
                    !used[i] && (p - at).norm() <= JOIN_TOLERANCE
                })
            })
    };

    let mut contours = Vec::new();
    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let (start, end) = segments[first];
        let mut chain = VecDeque::from([start, end]);
        let mut closed = false;

        loop {
            let (head, tail) = (chain[0], chain[chain.len() - 1]);
            if chain.len() > 2 && same_vertex(&head, &tail) {
                chain.pop_back();
                closed = true;
                break;
            }
            if let Some(i) = find(&starts, &tail, &used, true) {
                used[i] = true;
                chain.push_back(segments[i].1);
            } else if let Some(i) = find(&ends, &head, &used, false) {
                used[i] = true;
                chain.push_front(segments[i].0);
            } else {
                break;
            }
        }

        if !closed {
            debug!(points = chain.len(), "open section chain");
        }
        contours.push(Vec::from(chain));
    }
    contours
}
