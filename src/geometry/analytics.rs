// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel-free mesh measurements.
//!
//! Used to cross-check kernel output and by the in-process solid backend for
//! its own closure checks.

use super::{BoundingBox, Mesh};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Measurements of an indexed mesh taken straight from its buffers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeshSummary {
    /// Signed enclosed volume; negative for inside-out meshes
    pub volume: f64,
    pub surface_area: f64,
    pub bounds: BoundingBox,
    pub vertices: usize,
    pub triangles: usize,
    /// Directed edges without exactly one opposite twin
    pub open_edges: usize,
}

impl MeshSummary {
    pub fn is_closed(&self) -> bool {
        self.triangles > 0 && self.open_edges == 0
    }
}

/// Summarize `mesh`, or `None` when it is empty or indexes past its vertices.
pub fn summarize(mesh: &Mesh) -> Option<MeshSummary> {
    let vertices = mesh.vertices();
    let faces = mesh.faces();
    if vertices.is_empty() || faces.is_empty() || !mesh.indices_in_range() {
        return None;
    }

    Some(MeshSummary {
        volume: signed_volume(vertices, faces),
        surface_area: surface_area(vertices, faces),
        bounds: mesh.bounding_box(),
        vertices: vertices.len(),
        triangles: faces.len(),
        open_edges: unpaired_edges(faces).len(),
    })
}

/// Signed volume via the divergence theorem (sum of origin tetrahedra).
///
/// Faces must index into `vertices`.
pub fn signed_volume(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> f64 {
    faces
        .iter()
        .map(|f| {
            let v0 = &vertices[f[0] as usize].coords;
            let v1 = &vertices[f[1] as usize].coords;
            let v2 = &vertices[f[2] as usize].coords;
            v0.dot(&v1.cross(v2)) / 6.0
        })
        .sum()
}

/// Total triangle area.
///
/// Faces must index into `vertices`.
pub fn surface_area(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> f64 {
    faces
        .iter()
        .map(|f| {
            let v0 = vertices[f[0] as usize];
            let v1 = vertices[f[1] as usize];
            let v2 = vertices[f[2] as usize];
            (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
        })
        .sum()
}

/// Directed edges whose opposite twin is missing or duplicated.
pub fn unpaired_edges(faces: &[[u32; 3]]) -> Vec<(u32, u32)> {
    let mut directed: AHashMap<(u32, u32), usize> = AHashMap::with_capacity(faces.len() * 3);
    for f in faces {
        for i in 0..3 {
            *directed.entry((f[i], f[(i + 1) % 3])).or_insert(0) += 1;
        }
    }

    let mut open: Vec<(u32, u32)> = directed
        .iter()
        .filter_map(|(&(a, b), &count)| {
            (count != 1 || directed.get(&(b, a)).copied() != Some(1)).then_some((a, b))
        })
        .collect();
    open.sort_unstable();
    open
}

/// A mesh is watertight if every directed edge is matched by exactly one
/// opposite edge.
pub fn is_watertight(faces: &[[u32; 3]]) -> bool {
    !faces.is_empty() && unpaired_edges(faces).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn block(x: f64, y: f64, z: f64) -> Mesh {
        Primitive::cube(Vector3::new(x, y, z), true).to_mesh()
    }

    #[test]
    fn test_block_summary() {
        let summary = summarize(&block(2.0, 3.0, 4.0)).unwrap();
        assert_relative_eq!(summary.volume, 24.0, epsilon = 1e-12);
        assert_relative_eq!(summary.surface_area, 52.0, epsilon = 1e-12);
        assert_relative_eq!(summary.bounds.max.z, 2.0);
        assert_eq!((summary.vertices, summary.triangles), (8, 12));
        assert!(summary.is_closed());
    }

    #[test]
    fn test_unusable_meshes_have_no_summary() {
        assert!(summarize(&Mesh::empty()).is_none());
        let mut mesh = block(1.0, 1.0, 1.0);
        mesh.faces_mut()[0] = [0, 1, 99];
        assert!(summarize(&mesh).is_none());
    }

    #[test]
    fn test_flipped_winding_negates_volume() {
        let mut mesh = block(2.0, 2.0, 2.0);
        mesh.faces_mut().iter_mut().for_each(|f| f.swap(0, 1));
        let summary = summarize(&mesh).unwrap();
        assert_relative_eq!(summary.volume, -8.0, epsilon = 1e-12);
        assert!(summary.is_closed());
    }

    #[test]
    fn test_missing_face_leaves_three_open_edges() {
        let mut mesh = block(2.0, 2.0, 2.0);
        mesh.faces_mut().truncate(11);
        assert_eq!(unpaired_edges(mesh.faces()).len(), 3);
        assert!(!is_watertight(mesh.faces()));
        assert_eq!(summarize(&mesh).unwrap().open_edges, 3);
    }
}
