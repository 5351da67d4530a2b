// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! Every primitive is an indexed, watertight mesh with outward-facing
//! counter-clockwise triangles.

use super::Mesh;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Sphere { r: f64, segments: u32 },
    Cylinder { h: f64, r: f64, segments: u32 },
    Cone { h: f64, r1: f64, r2: f64, segments: u32 },
}

const DEFAULT_SEGMENTS: u32 = 32;

fn segments_or_default(segments: u32) -> u32 {
    if segments >= 3 {
        segments
    } else {
        DEFAULT_SEGMENTS
    }
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn sphere(r: f64, segments: u32) -> Self {
        Self::Sphere {
            r,
            segments: segments_or_default(segments),
        }
    }

    /// Cylinder along +Z with its base on the XY plane
    pub fn cylinder(h: f64, r: f64, segments: u32) -> Self {
        Self::Cylinder {
            h,
            r,
            segments: segments_or_default(segments),
        }
    }

    pub fn cone(h: f64, r1: f64, r2: f64, segments: u32) -> Self {
        Self::Cone {
            h,
            r1,
            r2,
            segments: segments_or_default(segments),
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match *self {
            Self::Cube { size, center } => generate_cube_mesh(size, center),
            Self::Sphere { r, segments } => generate_sphere_mesh(r, segments),
            Self::Cylinder { h, r, segments } => generate_frustum_mesh(h, r, r, segments),
            Self::Cone { h, r1, r2, segments } => generate_frustum_mesh(h, r1, r2, segments),
        }
    }
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    let vertices = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let faces = vec![
        // z+
        [4, 5, 6],
        [4, 6, 7],
        // z-
        [1, 0, 3],
        [1, 3, 2],
        // x+
        [5, 1, 2],
        [5, 2, 6],
        // x-
        [0, 4, 7],
        [0, 7, 3],
        // y+
        [7, 6, 2],
        [7, 2, 3],
        // y-
        [0, 1, 5],
        [0, 5, 4],
    ];

    Mesh::new(vertices, faces)
}

fn generate_sphere_mesh(radius: f64, segments: u32) -> Mesh {
    let stacks = (segments / 2).max(2);
    let slices = segments;
    let mut mesh = Mesh::with_capacity((slices * (stacks - 1) + 2) as usize, (2 * slices * stacks) as usize);

    let north = mesh.add_vertex(Point3::new(0.0, 0.0, radius));
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        let (z, r) = (radius * phi.cos(), radius * phi.sin());
        for j in 0..slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            mesh.add_vertex(Point3::new(r * theta.cos(), r * theta.sin(), z));
        }
    }
    let south = mesh.add_vertex(Point3::new(0.0, 0.0, -radius));

    let ring = |i: u32, j: u32| 1 + (i - 1) * slices + j % slices;

    for j in 0..slices {
        mesh.add_face([north, ring(1, j), ring(1, j + 1)]);
    }
    for i in 1..stacks - 1 {
        for j in 0..slices {
            let a = ring(i, j);
            let b = ring(i, j + 1);
            let c = ring(i + 1, j + 1);
            let d = ring(i + 1, j);
            mesh.add_face([a, d, c]);
            mesh.add_face([a, c, b]);
        }
    }
    let last = stacks - 1;
    for j in 0..slices {
        mesh.add_face([south, ring(last, j + 1), ring(last, j)]);
    }

    mesh
}

/// Cylinder, cone or frustum. A zero radius collapses that cap to an apex.
fn generate_frustum_mesh(height: f64, r_bottom: f64, r_top: f64, segments: u32) -> Mesh {
    if r_bottom <= 0.0 && r_top <= 0.0 {
        return Mesh::empty();
    }

    let mut mesh = Mesh::with_capacity((2 * segments + 2) as usize, (4 * segments) as usize);
    let bottom_center = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let top_center = mesh.add_vertex(Point3::new(0.0, 0.0, height));

    let ring_start = 2;
    for &(r, z) in &[(r_bottom, 0.0), (r_top, height)] {
        for j in 0..segments {
            let theta = 2.0 * PI * j as f64 / segments as f64;
            mesh.add_vertex(Point3::new(r * theta.cos(), r * theta.sin(), z));
        }
    }
    let bottom = |j: u32| ring_start + j % segments;
    let top = |j: u32| ring_start + segments + j % segments;

    for j in 0..segments {
        let (bi, bn, ti, tn) = (bottom(j), bottom(j + 1), top(j), top(j + 1));

        if r_bottom > 0.0 {
            mesh.add_face([bottom_center, bn, bi]);
        }
        if r_top > 0.0 {
            mesh.add_face([top_center, ti, tn]);
        }

        match (r_bottom > 0.0, r_top > 0.0) {
            (true, true) => {
                mesh.add_face([bi, bn, ti]);
                mesh.add_face([ti, bn, tn]);
            }
            (true, false) => mesh.add_face([bi, bn, top_center]),
            _ => mesh.add_face([bottom_center, tn, ti]),
        }
    }

    compact(mesh)
}

/// Drop vertices no face references and renumber the rest.
fn compact(mesh: Mesh) -> Mesh {
    let mut used = vec![false; mesh.vertex_count()];
    for &i in mesh.faces().iter().flatten() {
        used[i as usize] = true;
    }
    let mut remap = vec![u32::MAX; used.len()];
    let mut vertices = Vec::with_capacity(used.len());
    for (i, v) in mesh.vertices().iter().enumerate() {
        if used[i] {
            remap[i] = vertices.len() as u32;
            vertices.push(*v);
        }
    }
    let faces = mesh
        .faces()
        .iter()
        .map(|f| [remap[f[0] as usize], remap[f[1] as usize], remap[f[2] as usize]])
        .collect();
    Mesh::new(vertices, faces)
}
