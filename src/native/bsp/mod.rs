// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-process solid kernel built on BSP-tree CSG.
//!
//! Solids live in a concurrent handle table keyed by a monotonically
//! increasing id. Construction welds near-duplicate vertices and splits
//! T-junctions before checking edge pairing; a mesh that still has open
//! edges keeps its polygons but reports `NOT_MANIFOLD`.

mod repair;
mod section;
mod tree;

use super::solid::{status_code, BooleanOp, RawHandle, SolidKernel};
use super::MeshBuffers;
use crate::error::KernelError;
use crate::geometry::analytics;
use ahash::AHashSet;
use dashmap::DashMap;
use nalgebra::{Point2, Point3};
use repair::TriangleSoup;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use tree::Polygon;

/// Default vertex welding distance.
pub const DEFAULT_WELD_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
struct Solid {
    polygons: Vec<Polygon>,
    status: i32,
}

impl Solid {
    fn failed(status: i32) -> Self {
        Self {
            polygons: Vec::new(),
            status,
        }
    }
}

/// BSP-based [`SolidKernel`].
pub struct BspKernel {
    solids: DashMap<RawHandle, Solid>,
    next_id: AtomicU64,
    weld_tolerance: f64,
}

impl BspKernel {
    pub fn new() -> Self {
        Self::with_weld_tolerance(DEFAULT_WELD_TOLERANCE)
    }

    pub fn with_weld_tolerance(weld_tolerance: f64) -> Self {
        Self {
            solids: DashMap::new(),
            next_id: AtomicU64::new(1),
            weld_tolerance,
        }
    }

    pub fn weld_tolerance(&self) -> f64 {
        self.weld_tolerance
    }

    /// Number of handles issued and not yet released.
    pub fn live_handles(&self) -> usize {
        self.solids.len()
    }

    fn insert(&self, solid: Solid) -> RawHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.solids.insert(id, solid);
        id
    }

    fn with_solid<T>(&self, handle: RawHandle, f: impl FnOnce(&Solid) -> T) -> Result<T, KernelError> {
        self.solids
            .get(&handle)
            .map(|solid| f(&solid))
            .ok_or(KernelError::InvalidHandle(handle))
    }

    /// Welded, repaired triangle soup of a polygon set.
    fn triangulate(&self, polygons: &[Polygon]) -> TriangleSoup {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for tri in polygons.iter().flat_map(Polygon::fan) {
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&tri);
            faces.push([base, base + 1, base + 2]);
        }
        let mut soup = repair::weld(&vertices, &faces, self.weld_tolerance);
        repair::drop_slivers(&mut soup);
        repair::repair_t_junctions(&mut soup, self.weld_tolerance);
        soup
    }
}

impl Default for BspKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Status of raw buffers before any geometry is built.
fn validate(buffers: &MeshBuffers) -> i32 {
    if buffers.positions.len() % 3 != 0 || buffers.indices.len() % 3 != 0 {
        return status_code::PROPERTIES_WRONG_LENGTH;
    }
    if buffers.positions.iter().any(|c| !c.is_finite()) {
        return status_code::NON_FINITE_VERTEX;
    }
    let count = buffers.vertex_count();
    if buffers.indices.iter().any(|&i| i as usize >= count) {
        return status_code::VERTEX_OUT_OF_BOUNDS;
    }
    status_code::NO_ERROR
}

impl SolidKernel for BspKernel {
    fn construct(&self, buffers: &MeshBuffers) -> Result<RawHandle, KernelError> {
        let status = validate(buffers);
        if status != status_code::NO_ERROR {
            debug!(status, "rejected solid buffers");
            return Ok(self.insert(Solid::failed(status)));
        }

        let vertices: Vec<Point3<f64>> = buffers
            .positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces: Vec<[u32; 3]> = buffers.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        let mut soup = repair::weld(&vertices, &faces, self.weld_tolerance);
        repair::repair_t_junctions(&mut soup, self.weld_tolerance);

        let open_edges = analytics::unpaired_edges(&soup.faces).len();
        let status = if open_edges == 0 {
            status_code::NO_ERROR
        } else {
            debug!(open_edges, "solid is not closed after repair");
            status_code::NOT_MANIFOLD
        };

        let polygons = soup
            .faces
            .iter()
            .filter_map(|f| Polygon::new(f.iter().map(|&i| soup.vertices[i as usize]).collect()))
            .collect();

        Ok(self.insert(Solid { polygons, status }))
    }

    fn boolean(&self, op: BooleanOp, a: RawHandle, b: RawHandle) -> Result<RawHandle, KernelError> {
        let (pa, sa) = self.with_solid(a, |s| (s.polygons.clone(), s.status))?;
        let (pb, sb) = self.with_solid(b, |s| (s.polygons.clone(), s.status))?;

        if let Some(bad) = [sa, sb]
            .into_iter()
            .find(|&s| s != status_code::NO_ERROR && s != status_code::NOT_MANIFOLD)
        {
            return Ok(self.insert(Solid::failed(bad)));
        }

        let (na, nb) = (pa.len(), pb.len());
        let polygons = match op {
            BooleanOp::Union => tree::union(pa, pb),
            BooleanOp::Difference => tree::difference(pa, pb),
            BooleanOp::Intersection => tree::intersection(pa, pb),
        };
        debug!(?op, left = na, right = nb, result = polygons.len(), "bsp boolean");

        Ok(self.insert(Solid {
            polygons,
            status: status_code::NO_ERROR,
        }))
    }

    fn hull(&self, handles: &[RawHandle]) -> Result<RawHandle, KernelError> {
        let mut points: Vec<parry3d::math::Point<f32>> = Vec::new();
        for &handle in handles {
            self.with_solid(handle, |s| {
                points.extend(
                    s.polygons
                        .iter()
                        .flat_map(|p| p.vertices.iter())
                        .map(|v| parry3d::math::Point::new(v.x as f32, v.y as f32, v.z as f32)),
                );
            })?;
        }

        let mut seen = AHashSet::with_capacity(points.len());
        points.retain(|p| seen.insert([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]));

        if points.len() < 4 {
            return Ok(self.insert(Solid::failed(status_code::NO_ERROR)));
        }

        let (hull_points, triangles) = match parry3d::transformation::try_convex_hull(&points) {
            Ok(hull) => hull,
            Err(err) => {
                debug!(error = ?err, "degenerate hull input");
                return Ok(self.insert(Solid::failed(status_code::NO_ERROR)));
            }
        };

        let vertices: Vec<Point3<f64>> = hull_points
            .iter()
            .map(|p| Point3::new(p.x as f64, p.y as f64, p.z as f64))
            .collect();
        let mut faces = triangles;
        if analytics::signed_volume(&vertices, &faces) < 0.0 {
            for face in &mut faces {
                face.swap(1, 2);
            }
        }

        let polygons = faces
            .iter()
            .filter_map(|f| Polygon::new(f.iter().map(|&i| vertices[i as usize]).collect()))
            .collect();
        Ok(self.insert(Solid {
            polygons,
            status: status_code::NO_ERROR,
        }))
    }

    fn status(&self, handle: RawHandle) -> Result<i32, KernelError> {
        self.with_solid(handle, |s| s.status)
    }

    fn volume(&self, handle: RawHandle) -> Result<f64, KernelError> {
        self.with_solid(handle, |s| tree::volume(&s.polygons))
    }

    fn surface_area(&self, handle: RawHandle) -> Result<f64, KernelError> {
        self.with_solid(handle, |s| tree::surface_area(&s.polygons))
    }

    fn slice(&self, handle: RawHandle, z: f64) -> Result<Vec<Vec<Point2<f64>>>, KernelError> {
        self.with_solid(handle, |s| section::slice_polygons(&s.polygons, z))
    }

    fn buffers(&self, handle: RawHandle) -> Result<MeshBuffers, KernelError> {
        let polygons = self.with_solid(handle, |s| s.polygons.clone())?;
        let soup = self.triangulate(&polygons);
        Ok(MeshBuffers::new(
            soup.vertices.iter().flat_map(|v| [v.x, v.y, v.z]).collect(),
            soup.faces.iter().flatten().copied().collect(),
        ))
    }

    fn release(&self, handle: RawHandle) {
        if self.solids.remove(&handle).is_none() {
            warn!(handle, "release of unknown solid handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::convert::to_native;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn cube_buffers(size: f64, offset: Vector3<f64>) -> MeshBuffers {
        let mut mesh = Primitive::cube(Vector3::new(size, size, size), true).to_mesh();
        mesh.translate(offset);
        to_native(&mesh)
    }

    #[test]
    fn test_construct_and_measure() {
        let kernel = BspKernel::new();
        let h = kernel.construct(&cube_buffers(2.0, Vector3::zeros())).unwrap();
        assert_eq!(kernel.status(h).unwrap(), status_code::NO_ERROR);
        assert_relative_eq!(kernel.volume(h).unwrap(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(kernel.surface_area(h).unwrap(), 24.0, epsilon = 1e-9);
        kernel.release(h);
        assert_eq!(kernel.live_handles(), 0);
    }

    #[test]
    fn test_invalid_buffers_report_status() {
        let kernel = BspKernel::new();
        let cases = [
            (MeshBuffers::new(vec![0.0, 0.0], vec![]), status_code::PROPERTIES_WRONG_LENGTH),
            (
                MeshBuffers::new(vec![f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]),
                status_code::NON_FINITE_VERTEX,
            ),
            (
                MeshBuffers::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 7]),
                status_code::VERTEX_OUT_OF_BOUNDS,
            ),
        ];
        for (buffers, expected) in cases {
            let h = kernel.construct(&buffers).unwrap();
            assert_eq!(kernel.status(h).unwrap(), expected);
            kernel.release(h);
        }
    }

    #[test]
    fn test_open_mesh_is_not_manifold() {
        let kernel = BspKernel::new();
        let mut buffers = cube_buffers(2.0, Vector3::zeros());
        buffers.indices.truncate(buffers.indices.len() - 3);
        let h = kernel.construct(&buffers).unwrap();
        assert_eq!(kernel.status(h).unwrap(), status_code::NOT_MANIFOLD);
        kernel.release(h);
    }

    #[test]
    fn test_difference_buffers_are_closed() {
        let kernel = BspKernel::new();
        let a = kernel.construct(&cube_buffers(20.0, Vector3::zeros())).unwrap();
        let b = kernel.construct(&cube_buffers(20.0, Vector3::new(10.0, 0.0, 0.0))).unwrap();
        let r = kernel.boolean(BooleanOp::Difference, a, b).unwrap();

        assert_relative_eq!(kernel.volume(r).unwrap(), 4000.0, epsilon = 1e-6);
        let buffers = kernel.buffers(r).unwrap();
        let faces: Vec<[u32; 3]> = buffers.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        assert!(analytics::is_watertight(&faces));

        for h in [a, b, r] {
            kernel.release(h);
        }
        assert_eq!(kernel.live_handles(), 0);
    }

    #[test]
    fn test_hull_of_two_cubes() {
        let kernel = BspKernel::new();
        let a = kernel.construct(&cube_buffers(2.0, Vector3::zeros())).unwrap();
        let b = kernel.construct(&cube_buffers(2.0, Vector3::new(4.0, 0.0, 0.0))).unwrap();
        let h = kernel.hull(&[a, b]).unwrap();
        assert_relative_eq!(kernel.volume(h).unwrap(), 24.0, epsilon = 1e-3);
        for h in [a, b, h] {
            kernel.release(h);
        }
    }

    #[test]
    fn test_unknown_handle() {
        let kernel = BspKernel::new();
        assert!(matches!(kernel.status(42), Err(KernelError::InvalidHandle(42))));
    }

    #[test]
    fn test_slice_cube() {
        let kernel = BspKernel::new();
        let h = kernel.construct(&cube_buffers(20.0, Vector3::zeros())).unwrap();
        let contours = kernel.slice(h, 0.0).unwrap();
        assert_eq!(contours.len(), 1);
        assert_relative_eq!(crate::utils::math::signed_area(&contours[0]), 400.0, epsilon = 1e-9);
        kernel.release(h);
    }
}
