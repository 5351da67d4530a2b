// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Voronoi cells from a `spade` Delaunay triangulation

use super::VoronoiKernel;
use crate::error::KernelError;
use crate::geometry::Rect;
use ahash::AHashMap;
use nalgebra::Point2;
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

/// Voronoi cells as the bounding rectangle clipped by the perpendicular
/// bisector of every Delaunay neighbour.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpadeVoronoi;

impl SpadeVoronoi {
    pub fn new() -> Self {
        Self
    }
}

/// Keep the part of `polygon` on the side of `seed` of the bisector between
/// `seed` and `other` (Sutherland-Hodgman against one half-plane).
fn clip_to_bisector(polygon: &[Point2<f64>], seed: &Point2<f64>, other: &Point2<f64>) -> Vec<Point2<f64>> {
    let normal = other - seed;
    let mid = nalgebra::center(seed, other);
    let side = |p: &Point2<f64>| (p - mid).dot(&normal);

    let n = polygon.len();
    let mut out = Vec::with_capacity(n + 1);
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        let (da, db) = (side(a), side(b));
        if da <= 0.0 {
            out.push(*a);
        }
        if (da < 0.0 && db > 0.0) || (da > 0.0 && db < 0.0) {
            let t = da / (da - db);
            out.push(a + (b - a) * t);
        }
    }
    out
}

impl VoronoiKernel for SpadeVoronoi {
    fn cells(&self, seeds: &[Point2<f64>], bounds: &Rect) -> Result<Vec<Vec<Point2<f64>>>, KernelError> {
        let mut triangulation: DelaunayTriangulation<SpadePoint2<f64>> = DelaunayTriangulation::new();
        let mut owner: AHashMap<FixedVertexHandle, usize> = AHashMap::with_capacity(seeds.len());
        let mut handles = Vec::with_capacity(seeds.len());

        for (i, seed) in seeds.iter().enumerate() {
            let handle = triangulation
                .insert(SpadePoint2::new(seed.x, seed.y))
                .map_err(|e: InsertionError| KernelError::Triangulation(format!("seed {i}: {e}")))?;
            owner.entry(handle).or_insert(i);
            handles.push(handle);
        }

        let frame = bounds.corners();
        let cells = seeds
            .iter()
            .zip(&handles)
            .enumerate()
            .map(|(i, (seed, &handle))| {
                if owner.get(&handle) != Some(&i) || !bounds.contains(seed) {
                    return Vec::new();
                }
                let mut cell = frame.clone();
                for edge in triangulation.vertex(handle).out_edges() {
                    let p = edge.to().position();
                    cell = clip_to_bisector(&cell, seed, &Point2::new(p.x, p.y));
                    if cell.is_empty() {
                        break;
                    }
                }
                cell
            })
            .collect();

        Ok(cells)
    }
}
