// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Union, difference, intersection and hull over mesh sequences

use super::Csg;
use crate::geometry::{Material, Mesh, Pose};
use crate::native::{BooleanOp, NativeSolid};
use tracing::{debug, error};

impl Csg {
    /// Union of all meshes, combined as a balanced binary tree.
    ///
    /// Returns `None` for no input or when any step fails; a single mesh is
    /// returned untouched.
    pub fn union(&self, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        let meshes: Vec<Mesh> = meshes.into_iter().collect();
        if meshes.is_empty() {
            return None;
        }
        self.union_tree(meshes)
    }

    fn union_tree(&self, mut meshes: Vec<Mesh>) -> Option<Mesh> {
        if meshes.len() == 1 {
            return meshes.pop();
        }
        let right = meshes.split_off(meshes.len() / 2);
        let left = self.union_tree(meshes)?;
        let right = self.union_tree(right)?;
        self.combine(BooleanOp::Union, left, right)
    }

    /// The first mesh minus every following mesh, left to right.
    pub fn difference(&self, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        self.fold(BooleanOp::Difference, meshes)
    }

    /// Volume common to every mesh.
    pub fn intersection(&self, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        self.fold(BooleanOp::Intersection, meshes)
    }

    /// Convex hull of all meshes in one kernel call.
    pub fn hull(&self, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        let mut meshes: Vec<Mesh> = meshes.into_iter().collect();
        if meshes.len() <= 1 {
            return meshes.pop();
        }

        let pose = meshes[0].pose().copied();
        let material = meshes[0].material().copied();
        let operands = meshes
            .iter_mut()
            .map(|mesh| self.acquire(mesh))
            .collect::<Option<Vec<NativeSolid>>>()?;
        let raws: Vec<_> = operands.iter().map(NativeSolid::raw).collect();

        let result = match self.kernel().hull(&raws) {
            Ok(raw) => NativeSolid::adopt(self.kernel(), raw),
            Err(err) => {
                error!(error = %err, operands = raws.len(), "solid hull failed");
                return None;
            }
        };
        drop(operands);
        self.finish(result, pose, material)
    }

    fn fold(&self, op: BooleanOp, meshes: impl IntoIterator<Item = Mesh>) -> Option<Mesh> {
        let mut meshes = meshes.into_iter();
        let first = meshes.next()?;
        meshes.try_fold(first, |acc, mesh| self.combine(op, acc, mesh))
    }

    /// One pairwise boolean; metadata comes from `a`.
    fn combine(&self, op: BooleanOp, mut a: Mesh, mut b: Mesh) -> Option<Mesh> {
        let pose = a.pose().copied();
        let material = a.material().copied();
        let left = self.acquire(&mut a)?;
        let right = self.acquire(&mut b)?;

        let result = match self.kernel().boolean(op, left.raw(), right.raw()) {
            Ok(raw) => NativeSolid::adopt(self.kernel(), raw),
            Err(err) => {
                error!(?op, error = %err, "solid boolean failed");
                return None;
            }
        };
        drop((left, right));
        self.finish(result, pose, material)
    }

    /// Read back a result handle and attach it to the new mesh as its cache.
    fn finish(&self, result: NativeSolid, pose: Option<Pose>, material: Option<Material>) -> Option<Mesh> {
        let result = self.admit(result)?;
        let buffers = match result.buffers() {
            Ok(buffers) => buffers,
            Err(err) => {
                error!(error = %err, "reading solid buffers failed");
                return None;
            }
        };
        if buffers.is_empty() {
            debug!("boolean result is empty");
            return None;
        }

        let mut mesh = Mesh::from_buffers_with(buffers, pose, material);
        mesh.attach_native(result);
        Some(mesh)
    }
}
