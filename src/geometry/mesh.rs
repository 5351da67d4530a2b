// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::BoundingBox;
use crate::native::NativeSolid;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rigid frame a mesh was stamped with when it was created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3<f64>,
    pub heading: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl Pose {
    pub fn new(position: Point3<f64>, heading: Vector3<f64>, up: Vector3<f64>) -> Self {
        Self { position, heading, up }
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        self.heading = matrix.transform_vector(&self.heading).normalize();
        self.up = matrix.transform_vector(&self.up).normalize();
    }
}

impl Default for Pose {
    /// Origin, heading along +X, up along +Z.
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            heading: Vector3::x(),
            up: Vector3::z(),
        }
    }
}

/// Display material carried through booleans untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Linear RGBA
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [0.8, 0.8, 0.8, 1.0],
            metalness: 0.0,
            roughness: 0.5,
        }
    }
}

/// Indexed triangle mesh.
///
/// A mesh produced by a boolean may carry the kernel handle it was built
/// from, so feeding it straight into the next boolean skips reconversion.
/// Mutating the geometry drops that handle; cloning never copies it.
#[derive(Default, Serialize, Deserialize)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
    #[serde(default)]
    pose: Option<Pose>,
    #[serde(default)]
    material: Option<Material>,
    #[serde(skip)]
    native: Option<NativeSolid>,
}

impl Mesh {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self::new(Vec::with_capacity(vertex_count), Vec::with_capacity(face_count))
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = Some(pose);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.native = None;
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Add a triangle
    pub fn add_face(&mut self, face: [u32; 3]) {
        self.native = None;
        self.faces.push(face);
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn vertices_mut(&mut self) -> &mut Vec<Point3<f64>> {
        self.native = None;
        &mut self.vertices
    }

    pub fn faces_mut(&mut self) -> &mut Vec<[u32; 3]> {
        self.native = None;
        &mut self.faces
    }

    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    pub fn set_pose(&mut self, pose: Option<Pose>) {
        self.pose = pose;
    }

    pub fn set_material(&mut self, material: Option<Material>) {
        self.material = material;
    }

    /// Transform all vertices (and the creation pose) by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.native = None;
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point(vertex);
        }
        if let Some(pose) = &mut self.pose {
            pose.transform(matrix);
        }
    }

    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.transform(&Matrix4::new_translation(&offset));
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// A mesh without faces is empty for boolean purposes.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn indices_in_range(&self) -> bool {
        let n = self.vertices.len();
        self.faces.iter().flatten().all(|&i| (i as usize) < n)
    }

    /// True while a kernel handle from the last boolean is attached.
    pub fn has_native_cache(&self) -> bool {
        self.native.is_some()
    }

    pub(crate) fn native(&self) -> Option<&NativeSolid> {
        self.native.as_ref()
    }

    pub(crate) fn take_native(&mut self) -> Option<NativeSolid> {
        self.native.take()
    }

    pub(crate) fn attach_native(&mut self, native: NativeSolid) {
        self.native = Some(native);
    }

    /// Release any cached kernel handle now instead of on drop.
    pub fn release_native(&mut self) {
        self.native = None;
    }
}

impl Clone for Mesh {
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            faces: self.faces.clone(),
            pose: self.pose,
            material: self.material,
            native: None,
        }
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("vertices", &self.vertices.len())
            .field("faces", &self.faces.len())
            .field("pose", &self.pose)
            .field("material", &self.material)
            .field("native", &self.native)
            .finish()
    }
}
