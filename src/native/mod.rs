// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Contracts for the geometry kernels Tessera drives, and the in-process
//! backends that implement them.
//!
//! The orchestration layer only talks to [`SolidKernel`], [`ClipKernel`] and
//! [`VoronoiKernel`]. Backends written against a native library plug in by
//! implementing the same traits.

mod bsp;
mod clip;
mod delaunay;
mod geo_clipper;
mod solid;

pub use bsp::{BspKernel, DEFAULT_WELD_TOLERANCE};
pub use clip::{ClipKernel, ClipOp, EndType, FillRule, InflateOptions, IntPath, IntPoint, JoinType};
pub use delaunay::SpadeVoronoi;
pub use geo_clipper::GeoClipper;
pub use solid::{status_code, BooleanOp, NativeSolid, RawHandle, SolidKernel};

use crate::error::KernelError;
use crate::geometry::Rect;
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Flat buffers in the solid kernel's native layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    /// Interleaved `x, y, z` vertex coordinates
    pub positions: Vec<f64>,
    /// Triangle vertex indices, three per triangle
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn new(positions: Vec<f64>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `index`, if the buffer holds it.
    pub fn position(&self, index: usize) -> Option<Point3<f64>> {
        let chunk = self.positions.get(index * 3..index * 3 + 3)?;
        Some(Point3::new(chunk[0], chunk[1], chunk[2]))
    }
}

/// Delaunay/Voronoi primitive.
pub trait VoronoiKernel: Send + Sync {
    /// One cell polygon per seed, in seed order, clipped to `bounds`.
    ///
    /// Cells are counter-clockwise. A seed whose cell vanishes (for example a
    /// seed outside `bounds`) gets an empty polygon.
    fn cells(&self, seeds: &[Point2<f64>], bounds: &Rect) -> Result<Vec<Vec<Point2<f64>>>, KernelError>;
}
