// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel facade bundling the solid, clipping and Voronoi backends

use crate::config::Settings;
use crate::csg::{Csg, MeshStatus, SlicePlane};
use crate::error::Result;
use crate::geometry::{Mesh, Shape};
use crate::native::{BspKernel, ClipKernel, GeoClipper, SolidKernel, SpadeVoronoi, VoronoiKernel};
use crate::planar::{OffsetOptions, ShapeOps};
use crate::voronoi::{self, VoronoiConfig};
use std::sync::Arc;

/// Entry point for every operation family: solid booleans, diagnostics,
/// slicing, shape booleans and offsets, and Voronoi perforation.
#[derive(Clone)]
pub struct Kernel {
    csg: Csg,
    shapes: ShapeOps,
    voronoi: Arc<dyn VoronoiKernel>,
    settings: Settings,
}

impl Kernel {
    /// Kernel on the in-process backends with default settings
    pub fn new() -> Self {
        Self::build(
            Arc::new(BspKernel::new()),
            Arc::new(GeoClipper::new()),
            Arc::new(SpadeVoronoi::new()),
            Settings::default(),
        )
    }

    /// Kernel on the in-process backends, tuned by `settings`
    pub fn with_settings(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(
            Arc::new(BspKernel::with_weld_tolerance(settings.solid.weld_tolerance)),
            Arc::new(GeoClipper::new()),
            Arc::new(SpadeVoronoi::new()),
            settings,
        ))
    }

    /// Kernel on caller-supplied backends
    pub fn with_backends(
        solid: Arc<dyn SolidKernel>,
        clip: Arc<dyn ClipKernel>,
        voronoi: Arc<dyn VoronoiKernel>,
        settings: Settings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(solid, clip, voronoi, settings))
    }

    fn build(
        solid: Arc<dyn SolidKernel>,
        clip: Arc<dyn ClipKernel>,
        voronoi: Arc<dyn VoronoiKernel>,
        settings: Settings,
    ) -> Self {
        Self {
            csg: Csg::new(solid),
            shapes: ShapeOps::from_validated(clip, settings.clip),
            voronoi,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn csg(&self) -> &Csg {
        &self.csg
    }

    pub fn shapes(&self) -> &ShapeOps {
        &self.shapes
    }

    pub fn union(&self, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        self.csg.union(meshes)
    }

    pub fn difference(&self, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        self.csg.difference(meshes)
    }

    pub fn intersection(&self, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        self.csg.intersection(meshes)
    }

    pub fn hull(&self, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        self.csg.hull(meshes)
    }

    pub fn status(&self, mesh: &Mesh) -> MeshStatus {
        self.csg.status(mesh)
    }

    pub fn is_manifold(&self, mesh: &Mesh) -> bool {
        self.csg.is_manifold(mesh)
    }

    pub fn slice(&self, mesh: &Mesh, plane: &SlicePlane) -> Vec<Shape> {
        self.csg.slice(mesh, plane)
    }

    pub fn shape_union(&self, a: &Shape, b: &Shape) -> Option<Shape> {
        self.shapes.union(a, b)
    }

    pub fn shape_difference(&self, a: &Shape, b: &Shape) -> Option<Shape> {
        self.shapes.difference(a, b)
    }

    pub fn shape_intersection(&self, a: &Shape, b: &Shape) -> Option<Shape> {
        self.shapes.intersection(a, b)
    }

    pub fn shape_xor(&self, a: &Shape, b: &Shape) -> Vec<Shape> {
        self.shapes.xor(a, b)
    }

    /// Offset with the configured join options
    pub fn offset(&self, shape: &Shape, delta: f64) -> Vec<Shape> {
        self.shapes.offset(shape, delta, &self.settings.offset)
    }

    pub fn offset_with(&self, shape: &Shape, delta: f64, options: &OffsetOptions) -> Vec<Shape> {
        self.shapes.offset(shape, delta, options)
    }

    pub fn offset_all(&self, shapes: &[Shape], delta: f64) -> Vec<Shape> {
        self.shapes.offset_all(shapes, delta, &self.settings.offset)
    }

    /// Voronoi perforation with the configured parameters
    pub fn voronoi_shell(&self, shape: &Shape) -> Shape {
        self.voronoi_shell_with(shape, &self.settings.voronoi)
    }

    pub fn voronoi_shell_with(&self, shape: &Shape, config: &VoronoiConfig) -> Shape {
        voronoi::voronoi_shell(&self.shapes, self.voronoi.as_ref(), shape, config)
    }

    pub fn relaxed_cell_areas(&self, shape: &Shape, config: &VoronoiConfig, iterations: usize) -> Result<Vec<f64>> {
        voronoi::relaxed_cell_areas(&self.shapes, self.voronoi.as_ref(), shape, config, iterations)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel").field("settings", &self.settings).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_kernel_slices_boolean_result() {
        let kernel = Kernel::new();
        let a = Primitive::cube(Vector3::new(20.0, 20.0, 20.0), true).to_mesh();
        let mut b = Primitive::cylinder(40.0, 4.0, 24).to_mesh();
        b.translate(Vector3::new(0.0, 0.0, -20.0));

        let drilled = kernel.difference([a, b]).unwrap();
        assert!(kernel.is_manifold(&drilled));

        let shapes = kernel.slice(&drilled, &SlicePlane::horizontal(0.0));
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
    }

    #[test]
    fn test_with_settings_rejects_invalid() {
        let mut settings = Settings::default();
        settings.clip.scale = 0.0;
        assert!(Kernel::with_settings(settings).is_err());
    }

    #[test]
    fn test_offset_uses_settings() {
        let mut settings = Settings::default();
        settings.offset.join = crate::native::JoinType::Miter;
        let kernel = Kernel::with_settings(settings).unwrap();
        let grown = kernel.offset(&Shape::square(10.0, true), 1.0);
        assert!((grown[0].area() - 144.0).abs() < 1e-6);
    }
}
