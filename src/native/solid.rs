// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid-boolean kernel contract and the owning handle guard

use super::MeshBuffers;
use crate::error::KernelError;
use nalgebra::Point2;
use std::fmt;
use std::sync::Arc;

/// Opaque identifier of a kernel-side solid.
pub type RawHandle = u64;

/// Numeric status codes reported by [`SolidKernel::status`].
pub mod status_code {
    pub const NO_ERROR: i32 = 0;
    pub const NON_FINITE_VERTEX: i32 = 1;
    pub const NOT_MANIFOLD: i32 = 2;
    pub const VERTEX_OUT_OF_BOUNDS: i32 = 3;
    pub const PROPERTIES_WRONG_LENGTH: i32 = 4;
    pub const MISSING_POSITION_PROPERTIES: i32 = 5;
    pub const MERGE_VECTORS_DIFFERENT_LENGTHS: i32 = 6;
    pub const MERGE_INDEX_OUT_OF_BOUNDS: i32 = 7;
    pub const TRANSFORM_WRONG_LENGTH: i32 = 8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

/// Solid-boolean kernel operating on watertight triangle meshes.
///
/// Every handle returned by `construct`, `boolean` or `hull` must be passed
/// to `release` exactly once. Use [`NativeSolid`] instead of calling
/// `release` by hand.
pub trait SolidKernel: Send + Sync {
    /// Build a solid from flat buffers.
    ///
    /// Invalid input still yields a handle whose [`status`](Self::status) is
    /// non-zero; `Err` is reserved for a kernel that cannot allocate at all.
    fn construct(&self, buffers: &MeshBuffers) -> Result<RawHandle, KernelError>;

    fn boolean(&self, op: BooleanOp, a: RawHandle, b: RawHandle) -> Result<RawHandle, KernelError>;

    /// Convex hull of the union of all given solids.
    fn hull(&self, handles: &[RawHandle]) -> Result<RawHandle, KernelError>;

    /// One of the [`status_code`] values; unknown codes are allowed.
    fn status(&self, handle: RawHandle) -> Result<i32, KernelError>;

    fn volume(&self, handle: RawHandle) -> Result<f64, KernelError>;

    fn surface_area(&self, handle: RawHandle) -> Result<f64, KernelError>;

    /// Closed cross-section contours at height `z`, projected to XY.
    ///
    /// Outer boundaries are counter-clockwise and holes clockwise.
    fn slice(&self, handle: RawHandle, z: f64) -> Result<Vec<Vec<Point2<f64>>>, KernelError>;

    /// Normalized triangle buffers of the solid.
    fn buffers(&self, handle: RawHandle) -> Result<MeshBuffers, KernelError>;

    fn release(&self, handle: RawHandle);
}

/// Owning guard around a kernel handle.
///
/// The handle is released when the guard drops, on every exit path.
pub struct NativeSolid {
    kernel: Arc<dyn SolidKernel>,
    raw: RawHandle,
}

impl NativeSolid {
    /// Take ownership of a handle freshly returned by `kernel`.
    pub(crate) fn adopt(kernel: &Arc<dyn SolidKernel>, raw: RawHandle) -> Self {
        Self {
            kernel: Arc::clone(kernel),
            raw,
        }
    }

    pub(crate) fn construct(kernel: &Arc<dyn SolidKernel>, buffers: &MeshBuffers) -> Result<Self, KernelError> {
        let raw = kernel.construct(buffers)?;
        Ok(Self::adopt(kernel, raw))
    }

    pub(crate) fn raw(&self) -> RawHandle {
        self.raw
    }

    /// True if this handle was issued by `kernel`.
    pub(crate) fn belongs_to(&self, kernel: &Arc<dyn SolidKernel>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.kernel), Arc::as_ptr(kernel))
    }

    pub fn status(&self) -> Result<i32, KernelError> {
        self.kernel.status(self.raw)
    }

    pub fn volume(&self) -> Result<f64, KernelError> {
        self.kernel.volume(self.raw)
    }

    pub fn surface_area(&self) -> Result<f64, KernelError> {
        self.kernel.surface_area(self.raw)
    }

    pub fn slice(&self, z: f64) -> Result<Vec<Vec<Point2<f64>>>, KernelError> {
        self.kernel.slice(self.raw, z)
    }

    pub fn buffers(&self) -> Result<MeshBuffers, KernelError> {
        self.kernel.buffers(self.raw)
    }
}

impl Drop for NativeSolid {
    fn drop(&mut self) {
        self.kernel.release(self.raw);
    }
}

impl fmt::Debug for NativeSolid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSolid").field("raw", &self.raw).finish()
    }
}
