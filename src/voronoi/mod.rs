// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Procedural Voronoi perforation.
//!
//! Seeds are rejection-sampled inside a shape with a [`Mulberry32`] stream,
//! relaxed with Lloyd iterations, and the clipped cells are inset by half
//! the wall thickness to become holes. The same inputs always produce the
//! same holes.

mod rng;
mod sampling;

pub use rng::Mulberry32;

use crate::error::{ConfigError, KernelError};
use crate::geometry::{Rect, Shape};
use crate::native::{ClipOp, JoinType, VoronoiKernel};
use crate::planar::{OffsetOptions, ShapeOps};
use crate::utils::math::{orient, resample_closed, signed_area};
use rayon::prelude::*;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Parameters of [`voronoi_shell`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiConfig {
    /// Requested number of cells
    pub cells: usize,
    /// Material left between neighbouring holes and around the rim
    pub wall: f64,
    pub seed: u32,
    pub relax_iterations: usize,
    /// Points per generated hole
    pub hole_resolution: usize,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        Self {
            cells: 10,
            wall: 1.5,
            seed: 42,
            relax_iterations: 2,
            hole_resolution: 32,
        }
    }
}

impl VoronoiConfig {
    pub fn new(
        cells: usize,
        wall: f64,
        seed: u32,
        relax_iterations: usize,
        hole_resolution: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            cells,
            wall,
            seed,
            relax_iterations,
            hole_resolution,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_cells(mut self, cells: usize) -> Self {
        self.cells = cells;
        self
    }

    pub fn with_wall(mut self, wall: f64) -> Self {
        self.wall = wall;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_relax_iterations(mut self, relax_iterations: usize) -> Self {
        self.relax_iterations = relax_iterations;
        self
    }

    pub fn with_hole_resolution(mut self, hole_resolution: usize) -> Self {
        self.hole_resolution = hole_resolution;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cells == 0 {
            return Err(ConfigError::invalid("cells", self.cells, "must be at least 1"));
        }
        if !self.wall.is_finite() || self.wall <= 0.0 {
            return Err(ConfigError::invalid("wall", self.wall, "must be finite and positive"));
        }
        if self.hole_resolution < 3 {
            return Err(ConfigError::invalid("hole_resolution", self.hole_resolution, "must be at least 3"));
        }
        Ok(())
    }

    /// Holes smaller than this are dropped as unprintable.
    pub fn min_hole_area(&self) -> f64 {
        self.wall * self.wall / 2.0
    }
}

/// Perforate `shape` with Voronoi-cell holes.
///
/// The outer contour and existing holes are kept as they are; new holes are
/// appended, clockwise, with `hole_resolution` points each. On an invalid
/// config or a kernel failure the input is returned unchanged.
pub fn voronoi_shell(ops: &ShapeOps, kernel: &dyn VoronoiKernel, shape: &Shape, config: &VoronoiConfig) -> Shape {
    match perforate(ops, kernel, shape, config) {
        Ok(result) => result,
        Err(err) => {
            error!(error = %err, "voronoi shell failed");
            shape.clone()
        }
    }
}

/// Clipped cell areas after `iterations` relaxation steps, one per seed.
///
/// Uniform cells mean relaxation is doing its job.
pub fn relaxed_cell_areas(
    ops: &ShapeOps,
    kernel: &dyn VoronoiKernel,
    shape: &Shape,
    config: &VoronoiConfig,
    iterations: usize,
) -> crate::Result<Vec<f64>> {
    config.validate()?;
    let cells = relaxed_cells(ops, kernel, shape, config, iterations)?;
    Ok(cells
        .iter()
        .map(|regions| regions.iter().map(Shape::area).sum())
        .collect())
}

fn perforate(ops: &ShapeOps, kernel: &dyn VoronoiKernel, shape: &Shape, config: &VoronoiConfig) -> crate::Result<Shape> {
    config.validate()?;
    let cells = relaxed_cells(ops, kernel, shape, config, config.relax_iterations)?;

    let inset = OffsetOptions::new(JoinType::Round);
    let min_area = config.min_hole_area();
    let mut holes = shape.holes.clone();
    let mut dropped = 0;
    let insets: Vec<Vec<Shape>> = cells
        .par_iter()
        .map(|regions| ops.offset_all(regions, -config.wall / 2.0, &inset))
        .collect();
    for regions in insets {
        for region in regions {
            if signed_area(&region.outer).abs() < min_area {
                dropped += 1;
                continue;
            }
            // A cell wrapped around an existing hole would swallow it.
            if !region.holes.is_empty() {
                debug!(holes = region.holes.len(), "skipping cell that encloses a hole");
                dropped += 1;
                continue;
            }
            let mut hole = resample_closed(&region.outer, config.hole_resolution);
            orient(&mut hole, false);
            holes.push(hole);
        }
    }
    debug!(
        cells = cells.len(),
        holes = holes.len() - shape.holes.len(),
        dropped,
        "voronoi perforation"
    );

    Ok(Shape {
        outer: shape.outer.clone(),
        holes,
        frame: shape.frame,
    })
}

/// Seed, relax and clip: entry `i` holds the pieces of cell `i` inside the
/// shape.
fn relaxed_cells(
    ops: &ShapeOps,
    kernel: &dyn VoronoiKernel,
    shape: &Shape,
    config: &VoronoiConfig,
    iterations: usize,
) -> Result<Vec<Vec<Shape>>, KernelError> {
    let mut rng = Mulberry32::new(config.seed);
    let mut seeds = sampling::sample_seeds(shape, config.cells, &mut rng);
    let bounds = padded_bounds(shape, config.wall);

    let mut cells = clipped_cells(ops, kernel, shape, &seeds, &bounds)?;
    for iteration in 0..iterations {
        let mut moved = 0;
        for (seed, regions) in seeds.iter_mut().zip(&cells) {
            if let Some(center) = regions_centroid(regions) {
                *seed = center;
                moved += 1;
            }
        }
        debug!(iteration, moved, seeds = seeds.len(), "lloyd step");
        cells = clipped_cells(ops, kernel, shape, &seeds, &bounds)?;
    }
    Ok(cells)
}

/// Bounding box grown by 10% of its larger side, and at least `wall`.
fn padded_bounds(shape: &Shape, wall: f64) -> Rect {
    let bounds = shape.bounds();
    let margin = (bounds.width().max(bounds.height()) * 0.1).max(wall);
    bounds.padded(margin)
}

fn clipped_cells(
    ops: &ShapeOps,
    kernel: &dyn VoronoiKernel,
    shape: &Shape,
    seeds: &[Point2<f64>],
    bounds: &Rect,
) -> Result<Vec<Vec<Shape>>, KernelError> {
    let cells = kernel.cells(seeds, bounds)?;
    // Cells clip independently; collect keeps seed order.
    Ok(cells
        .into_par_iter()
        .map(|cell| {
            if cell.len() < 3 {
                return Vec::new();
            }
            ops.regions(ClipOp::Intersection, &Shape::new(cell, Vec::new()), shape)
        })
        .collect())
}

/// Area-weighted centroid over every piece of a clipped cell.
fn regions_centroid(regions: &[Shape]) -> Option<Point2<f64>> {
    let mut total = 0.0;
    let mut weighted = Vector2::zeros();
    for region in regions {
        let area = region.area();
        if let Some(center) = region.centroid() {
            total += area;
            weighted += center.coords * area;
        }
    }
    (total > f64::EPSILON).then(|| Point2::from(weighted / total))
}
