// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid booleans, diagnostics and plane slicing over a [`SolidKernel`].
//!
//! Every kernel handle created here is held by a [`NativeSolid`] guard, so
//! it is released on every exit path. A boolean result keeps its handle
//! attached to the returned [`Mesh`] so the next boolean in a chain can pick
//! it up without rebuilding the solid.

mod boolean;
pub mod classify;
pub mod convert;
mod diagnostics;
mod slice;

pub use classify::classify_contours;
pub use convert::{from_native, to_native};
pub use diagnostics::{MeshStatus, StatusKind};
pub use slice::SlicePlane;

use crate::geometry::Mesh;
use crate::native::{NativeSolid, SolidKernel};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Boolean composition, diagnostics and slicing bound to one solid kernel.
#[derive(Clone)]
pub struct Csg {
    kernel: Arc<dyn SolidKernel>,
}

impl Csg {
    pub fn new(kernel: Arc<dyn SolidKernel>) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &Arc<dyn SolidKernel> {
        &self.kernel
    }

    /// Handle for an operand: the mesh's cached one when this kernel issued
    /// it, a freshly constructed one otherwise.
    fn acquire(&self, mesh: &mut Mesh) -> Option<NativeSolid> {
        if let Some(native) = mesh.take_native() {
            if native.belongs_to(&self.kernel) {
                return self.admit(native);
            }
        }
        if mesh.is_empty() {
            debug!(vertices = mesh.vertex_count(), "operand has no faces");
            return None;
        }
        self.build(mesh)
    }

    /// Construct a fresh handle for `mesh` and check its status.
    fn build(&self, mesh: &Mesh) -> Option<NativeSolid> {
        match NativeSolid::construct(&self.kernel, &to_native(mesh)) {
            Ok(native) => self.admit(native),
            Err(err) => {
                error!(error = %err, "solid kernel could not construct mesh");
                None
            }
        }
    }

    /// Accept a handle whose status is usable. Non-manifold solids pass with
    /// a warning since the kernel merges near-duplicate vertices itself.
    fn admit(&self, native: NativeSolid) -> Option<NativeSolid> {
        let code = match native.status() {
            Ok(code) => code,
            Err(err) => {
                error!(error = %err, "solid status query failed");
                return None;
            }
        };
        match StatusKind::from_code(code) {
            StatusKind::Ok => Some(native),
            StatusKind::NotManifold => {
                warn!(code, "operand is not manifold; relying on kernel repair");
                Some(native)
            }
            kind => {
                error!(code, %kind, "solid kernel rejected mesh");
                None
            }
        }
    }
}

impl std::fmt::Debug for Csg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Csg").finish_non_exhaustive()
    }
}
