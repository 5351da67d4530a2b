// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tessera
//!
//! Geometry-boolean and tessellation layer for procedural modeling: solid
//! booleans over chains of meshes, plane slicing into classified 2D shapes,
//! shape booleans and offsets, and Voronoi perforation. The geometry itself
//! is computed by pluggable kernels behind the traits in [`native`].

pub mod config;
pub mod csg;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod native;
pub mod planar;
pub mod utils;
pub mod voronoi;

pub use config::Settings;
pub use csg::{Csg, MeshStatus, SlicePlane, StatusKind};
pub use error::{ConfigError, Error, KernelError, Result};
pub use geometry::{Material, Mesh, PlaneFrame, Pose, Primitive, Shape};
pub use kernel::Kernel;
pub use native::JoinType;
pub use planar::{ClipConfig, OffsetOptions, ShapeOps};
pub use voronoi::{voronoi_shell, Mulberry32, VoronoiConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_basic_cube_slice() {
        let kernel = Kernel::new();
        let cube = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();
        let shapes = kernel.slice(&cube, &SlicePlane::horizontal(0.0));
        assert_eq!(shapes.len(), 1);
    }
}
