// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh validity and measurement

use super::{to_native, Csg};
use crate::geometry::Mesh;
use crate::native::{status_code, NativeSolid};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Closed taxonomy over the solid kernel's numeric status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Ok,
    NonFiniteVertex,
    NotManifold,
    VertexIndexOutOfBounds,
    MalformedProperties,
    MergeError,
    TransformError,
    Unknown(i32),
}

impl StatusKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            status_code::NO_ERROR => Self::Ok,
            status_code::NON_FINITE_VERTEX => Self::NonFiniteVertex,
            status_code::NOT_MANIFOLD => Self::NotManifold,
            status_code::VERTEX_OUT_OF_BOUNDS => Self::VertexIndexOutOfBounds,
            status_code::PROPERTIES_WRONG_LENGTH | status_code::MISSING_POSITION_PROPERTIES => {
                Self::MalformedProperties
            }
            status_code::MERGE_VECTORS_DIFFERENT_LENGTHS | status_code::MERGE_INDEX_OUT_OF_BOUNDS => Self::MergeError,
            status_code::TRANSFORM_WRONG_LENGTH => Self::TransformError,
            other => Self::Unknown(other),
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::NonFiniteVertex => f.write_str("non-finite vertex"),
            Self::NotManifold => f.write_str("not manifold"),
            Self::VertexIndexOutOfBounds => f.write_str("vertex index out of bounds"),
            Self::MalformedProperties => f.write_str("malformed properties"),
            Self::MergeError => f.write_str("merge error"),
            Self::TransformError => f.write_str("transform error"),
            Self::Unknown(code) => write!(f, "unknown status {code}"),
        }
    }
}

/// Kernel verdict and measurements for one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshStatus {
    pub ok: bool,
    pub kind: StatusKind,
    pub volume: f64,
    pub surface_area: f64,
}

impl MeshStatus {
    fn failed(kind: StatusKind) -> Self {
        Self {
            ok: false,
            kind,
            volume: 0.0,
            surface_area: 0.0,
        }
    }

    fn measure(native: &NativeSolid) -> Self {
        let kind = match native.status() {
            Ok(code) => StatusKind::from_code(code),
            Err(err) => {
                error!(error = %err, "solid status query failed");
                return Self::failed(StatusKind::Unknown(-1));
            }
        };
        let volume = native.volume().unwrap_or_else(|err| {
            error!(error = %err, "volume query failed");
            0.0
        });
        let surface_area = native.surface_area().unwrap_or_else(|err| {
            error!(error = %err, "surface area query failed");
            0.0
        });
        Self {
            ok: kind.is_ok(),
            kind,
            volume,
            surface_area,
        }
    }
}

impl Csg {
    /// Status and measurements of `mesh`.
    ///
    /// A cached handle is queried in place; otherwise a temporary handle is
    /// built and released before returning.
    pub fn status(&self, mesh: &Mesh) -> MeshStatus {
        if let Some(native) = mesh.native().filter(|n| n.belongs_to(self.kernel())) {
            return MeshStatus::measure(native);
        }
        match NativeSolid::construct(self.kernel(), &to_native(mesh)) {
            Ok(native) => MeshStatus::measure(&native),
            Err(err) => {
                error!(error = %err, "solid kernel could not construct mesh");
                MeshStatus::failed(StatusKind::Unknown(-1))
            }
        }
    }

    /// Status is ok and the enclosed volume is strictly positive.
    pub fn is_manifold(&self, mesh: &Mesh) -> bool {
        let status = self.status(mesh);
        status.ok && status.volume > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::native::BspKernel;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use std::sync::Arc;

    #[test]
    fn test_code_mapping() {
        let expected = [
            (0, StatusKind::Ok),
            (1, StatusKind::NonFiniteVertex),
            (2, StatusKind::NotManifold),
            (3, StatusKind::VertexIndexOutOfBounds),
            (4, StatusKind::MalformedProperties),
            (5, StatusKind::MalformedProperties),
            (6, StatusKind::MergeError),
            (7, StatusKind::MergeError),
            (8, StatusKind::TransformError),
            (42, StatusKind::Unknown(42)),
        ];
        for (code, kind) in expected {
            assert_eq!(StatusKind::from_code(code), kind);
        }
        assert_eq!(StatusKind::Unknown(9).to_string(), "unknown status 9");
    }

    #[test]
    fn test_cube_status() {
        let kernel = Arc::new(BspKernel::new());
        let csg = Csg::new(kernel.clone());
        let cube = Primitive::cube(Vector3::new(2.0, 3.0, 4.0), true).to_mesh();

        let status = csg.status(&cube);
        assert!(status.ok);
        assert_eq!(status.kind, StatusKind::Ok);
        assert_relative_eq!(status.volume, 24.0, epsilon = 1e-9);
        assert_relative_eq!(status.surface_area, 52.0, epsilon = 1e-9);
        assert!(csg.is_manifold(&cube));
        assert_eq!(kernel.live_handles(), 0);
    }

    #[test]
    fn test_empty_mesh_is_not_manifold() {
        let csg = Csg::new(Arc::new(BspKernel::new()));
        let status = csg.status(&Mesh::empty());
        assert!(status.ok);
        assert_eq!(status.volume, 0.0);
        assert!(!csg.is_manifold(&Mesh::empty()));
    }

    #[test]
    fn test_bad_index_is_reported() {
        let kernel = Arc::new(BspKernel::new());
        let csg = Csg::new(kernel.clone());
        let mesh = Mesh::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 5]],
        );
        let status = csg.status(&mesh);
        assert!(!status.ok);
        assert_eq!(status.kind, StatusKind::VertexIndexOutOfBounds);
        assert!(!csg.is_manifold(&mesh));
        assert_eq!(kernel.live_handles(), 0);
    }

    #[test]
    fn test_open_mesh_is_flagged() {
        let csg = Csg::new(Arc::new(BspKernel::new()));
        let mut mesh = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh();
        mesh.faces_mut().pop();
        let status = csg.status(&mesh);
        assert_eq!(status.kind, StatusKind::NotManifold);
        assert!(!status.ok);
    }
}
