// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 2D shape booleans and offsets over a [`ClipKernel`].
//!
//! Shapes are scaled by [`ClipConfig::scale`] and rounded to integer paths
//! before they reach the kernel, so points closer than `1 / scale` may
//! merge. Results always come back with the outer contour counter-clockwise
//! and holes clockwise, whatever the kernel returned.

use crate::csg::classify::{attach_holes, classify_contours};
use crate::error::ConfigError;
use crate::geometry::{PlaneFrame, Shape};
use crate::native::{ClipKernel, ClipOp, EndType, FillRule, InflateOptions, IntPath, IntPoint, JoinType};
use crate::utils::math::signed_area;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Fixed-point conversion for the clipping kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Clipper units per model unit
    pub scale: f64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self { scale: 1000.0 }
    }
}

impl ClipConfig {
    pub fn new(scale: f64) -> Result<Self, ConfigError> {
        let config = Self { scale };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::invalid("scale", self.scale, "must be finite and positive"));
        }
        Ok(())
    }
}

/// Options for [`ShapeOps::offset`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetOptions {
    pub join: JoinType,
    /// Maximum miter length as a multiple of the offset distance
    pub miter_limit: f64,
    /// Round-join chord error in clipper units
    pub arc_tolerance: f64,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            join: JoinType::Round,
            miter_limit: 2.0,
            arc_tolerance: 0.25,
        }
    }
}

impl OffsetOptions {
    pub fn new(join: JoinType) -> Self {
        Self {
            join,
            ..Self::default()
        }
    }

    pub fn with_miter_limit(mut self, miter_limit: f64) -> Self {
        self.miter_limit = miter_limit;
        self
    }

    pub fn with_arc_tolerance(mut self, arc_tolerance: f64) -> Self {
        self.arc_tolerance = arc_tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.miter_limit.is_finite() || self.miter_limit < 1.0 {
            return Err(ConfigError::invalid("miter_limit", self.miter_limit, "must be at least 1"));
        }
        if !self.arc_tolerance.is_finite() || self.arc_tolerance <= 0.0 {
            return Err(ConfigError::invalid("arc_tolerance", self.arc_tolerance, "must be positive"));
        }
        Ok(())
    }

    fn inflate_options(&self) -> InflateOptions {
        InflateOptions {
            join: self.join,
            end: EndType::Polygon,
            miter_limit: self.miter_limit,
            arc_tolerance: self.arc_tolerance,
        }
    }
}

/// Shape booleans and offsets bound to one clipping kernel.
#[derive(Clone)]
pub struct ShapeOps {
    kernel: Arc<dyn ClipKernel>,
    config: ClipConfig,
}

impl ShapeOps {
    pub fn new(kernel: Arc<dyn ClipKernel>) -> Self {
        Self {
            kernel,
            config: ClipConfig::default(),
        }
    }

    pub fn with_config(kernel: Arc<dyn ClipKernel>, config: ClipConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(kernel, config))
    }

    pub(crate) fn from_validated(kernel: Arc<dyn ClipKernel>, config: ClipConfig) -> Self {
        Self { kernel, config }
    }

    pub fn config(&self) -> &ClipConfig {
        &self.config
    }

    /// Union as a single region.
    pub fn union(&self, a: &Shape, b: &Shape) -> Option<Shape> {
        self.single_region(ClipOp::Union, a, b)
    }

    /// `a` minus `b` as a single region.
    pub fn difference(&self, a: &Shape, b: &Shape) -> Option<Shape> {
        self.single_region(ClipOp::Difference, a, b)
    }

    /// Intersection as a single region.
    pub fn intersection(&self, a: &Shape, b: &Shape) -> Option<Shape> {
        self.single_region(ClipOp::Intersection, a, b)
    }

    /// Symmetric difference; may be several disjoint shapes.
    pub fn xor(&self, a: &Shape, b: &Shape) -> Vec<Shape> {
        self.regions(ClipOp::Xor, a, b)
    }

    /// Every region produced by `op`, each with the holes it contains.
    pub fn regions(&self, op: ClipOp, a: &Shape, b: &Shape) -> Vec<Shape> {
        match self.run(op, a, b) {
            Some(contours) => tag(classify_contours(contours), a.frame),
            None => Vec::new(),
        }
    }

    /// Grow (`delta > 0`) or shrink (`delta < 0`) a shape, in model units.
    ///
    /// Shrinking can split a shape in several pieces, hence the `Vec`.
    pub fn offset(&self, shape: &Shape, delta: f64, options: &OffsetOptions) -> Vec<Shape> {
        if let Err(err) = options.validate() {
            error!(error = %err, "invalid offset options");
            return Vec::new();
        }
        let paths = self.to_paths(shape);
        match self
            .kernel
            .inflate(&paths, delta * self.config.scale, &options.inflate_options())
        {
            Ok(result) => tag(classify_contours(self.from_paths(&result)), shape.frame),
            Err(err) => {
                error!(error = %err, delta, "shape offset failed");
                Vec::new()
            }
        }
    }

    /// Offset each shape independently.
    pub fn offset_all(&self, shapes: &[Shape], delta: f64, options: &OffsetOptions) -> Vec<Shape> {
        shapes
            .iter()
            .flat_map(|shape| self.offset(shape, delta, options))
            .collect()
    }

    /// Largest contour as the outer, with the other contours inside it as holes.
    fn single_region(&self, op: ClipOp, a: &Shape, b: &Shape) -> Option<Shape> {
        let mut contours: Vec<_> = self
            .run(op, a, b)?
            .into_iter()
            .filter(|c| c.len() >= 3 && signed_area(c) != 0.0)
            .collect();

        // Orientation is not trusted: the largest region by magnitude is the
        // outer, every other contour a hole candidate.
        let Some(largest) = contours
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| signed_area(x).abs().total_cmp(&signed_area(y).abs()))
            .map(|(i, _)| i)
        else {
            debug!(?op, "shape boolean produced no region");
            return None;
        };
        let outer = contours.swap_remove(largest);
        let holes = attach_holes(std::slice::from_ref(&outer), contours)
            .pop()
            .unwrap_or_default();
        let mut shape = Shape::new(outer, holes);
        shape.frame = a.frame;
        Some(shape)
    }

    fn run(&self, op: ClipOp, a: &Shape, b: &Shape) -> Option<Vec<Vec<Point2<f64>>>> {
        let subject = self.to_paths(a);
        let clip = self.to_paths(b);
        match self.kernel.boolean(op, &subject, &clip, FillRule::NonZero) {
            Ok(paths) => Some(self.from_paths(&paths)),
            Err(err) => {
                error!(?op, error = %err, "shape boolean failed");
                None
            }
        }
    }

    fn to_paths(&self, shape: &Shape) -> Vec<IntPath> {
        let scale = self.config.scale;
        std::iter::once(&shape.outer)
            .chain(&shape.holes)
            .map(|ring| {
                ring.iter()
                    .map(|p| IntPoint::new((p.x * scale).round() as i64, (p.y * scale).round() as i64))
                    .collect()
            })
            .collect()
    }

    fn from_paths(&self, paths: &[IntPath]) -> Vec<Vec<Point2<f64>>> {
        let scale = self.config.scale;
        paths
            .iter()
            .map(|path| {
                path.iter()
                    .map(|p| Point2::new(p.x as f64 / scale, p.y as f64 / scale))
                    .collect()
            })
            .collect()
    }
}

fn tag(shapes: Vec<Shape>, frame: Option<PlaneFrame>) -> Vec<Shape> {
    shapes
        .into_iter()
        .map(|mut shape| {
            shape.frame = frame;
            shape
        })
        .collect()
}

impl std::fmt::Debug for ShapeOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeOps").field("config", &self.config).finish_non_exhaustive()
    }
}
