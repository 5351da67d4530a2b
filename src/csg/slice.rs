// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cross-sections of a mesh at an arbitrary plane

use super::{classify_contours, to_native, Csg};
use crate::error::ConfigError;
use crate::geometry::{Mesh, PlaneFrame, Shape};
use crate::native::NativeSolid;
use crate::utils::math::remove_collinear;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Relative tolerance for merging collinear contour vertices.
const COLLINEAR_TOLERANCE: f64 = 1e-9;
/// Seed axes closer than this to the normal are replaced by world Z.
const PARALLEL_LIMIT: f64 = 0.9;
const MIN_LENGTH: f64 = 1e-12;

/// Cutting plane with an optional in-plane basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlicePlane {
    pub normal: Vector3<f64>,
    pub point: Point3<f64>,
    #[serde(default)]
    pub right: Option<Vector3<f64>>,
    #[serde(default)]
    pub up: Option<Vector3<f64>>,
}

impl SlicePlane {
    pub fn new(normal: Vector3<f64>, point: Point3<f64>) -> Self {
        Self {
            normal,
            point,
            right: None,
            up: None,
        }
    }

    /// Horizontal plane at height `z`.
    pub fn horizontal(z: f64) -> Self {
        Self::new(Vector3::z(), Point3::new(0.0, 0.0, z))
    }

    pub fn with_right(mut self, right: Vector3<f64>) -> Self {
        self.right = Some(right);
        self
    }

    pub fn with_up(mut self, up: Vector3<f64>) -> Self {
        self.up = Some(up);
        self
    }

    /// Orthonormal frame of the plane.
    ///
    /// Missing axes are derived from the normal: with neither given, the
    /// seed axis is world X (world Z when the normal is within
    /// `acos(0.9)` of X), `right = seed × n` and `up = n × right`. With one
    /// given, it is projected into the plane and the other completes a
    /// right-handed basis.
    pub fn frame(&self) -> Result<PlaneFrame, ConfigError> {
        if !self.point.coords.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::invalid("point", format!("{:?}", self.point.coords.as_slice()), "must be finite"));
        }
        let normal = unit(self.normal, "normal")?;

        let (right, up) = match (self.right, self.up) {
            (Some(right), Some(up)) => (unit(right, "right")?, unit(up, "up")?),
            (Some(right), None) => {
                let right = unit(project(right, &normal), "right")?;
                (right, normal.cross(&right))
            }
            (None, Some(up)) => {
                let up = unit(project(up, &normal), "up")?;
                (up.cross(&normal), up)
            }
            (None, None) => {
                let seed = if normal.dot(&Vector3::x()).abs() > PARALLEL_LIMIT {
                    Vector3::z()
                } else {
                    Vector3::x()
                };
                let right = seed.cross(&normal).normalize();
                (right, normal.cross(&right).normalize())
            }
        };

        Ok(PlaneFrame {
            origin: self.point,
            right,
            up,
            normal,
        })
    }
}

impl Default for SlicePlane {
    fn default() -> Self {
        Self::horizontal(0.0)
    }
}

fn project(v: Vector3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    v - normal * v.dot(normal)
}

fn unit(v: Vector3<f64>, name: &'static str) -> Result<Vector3<f64>, ConfigError> {
    let length = v.norm();
    if !length.is_finite() || length < MIN_LENGTH {
        return Err(ConfigError::invalid(name, format!("{:?}", v.as_slice()), "must be finite and non-zero"));
    }
    Ok(v / length)
}

impl Csg {
    /// Cross-section of `mesh` in the plane's local 2D coordinates.
    ///
    /// Each returned shape carries the plane frame. A plane that misses the
    /// mesh, an invalid plane or a mesh the kernel rejects gives no shapes.
    pub fn slice(&self, mesh: &Mesh, plane: &SlicePlane) -> Vec<Shape> {
        let frame = match plane.frame() {
            Ok(frame) => frame,
            Err(err) => {
                error!(error = %err, "invalid slice plane");
                return Vec::new();
            }
        };
        if mesh.is_empty() {
            return Vec::new();
        }

        let local = Mesh::new(
            mesh.vertices().iter().map(|v| frame.to_local(v)).collect(),
            mesh.faces().to_vec(),
        );
        let native = match NativeSolid::construct(self.kernel(), &to_native(&local)) {
            Ok(native) => native,
            Err(err) => {
                error!(error = %err, "solid kernel could not construct mesh");
                return Vec::new();
            }
        };
        let Some(native) = self.admit(native) else {
            return Vec::new();
        };

        let contours = match native.slice(0.0) {
            Ok(contours) => contours,
            Err(err) => {
                error!(error = %err, "solid slice failed");
                return Vec::new();
            }
        };

        let contours = contours
            .into_iter()
            .filter(|c| c.len() >= 3)
            .map(|c| remove_collinear(&c, COLLINEAR_TOLERANCE))
            .collect();
        classify_contours(contours)
            .into_iter()
            .map(|shape| shape.with_frame(frame))
            .collect()
    }
}
