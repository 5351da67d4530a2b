// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid boolean, diagnostics and slicing scenarios

use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};
use std::sync::Arc;
use tessera::geometry::analytics;
use tessera::native::BspKernel;
use tessera::utils::math::{point_strictly_inside, signed_area};
use tessera::{Csg, Kernel, Mesh, Primitive, SlicePlane, StatusKind};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cube(size: f64, offset: Vector3<f64>) -> Mesh {
    let mut mesh = Primitive::cube(Vector3::new(size, size, size), true).to_mesh();
    mesh.translate(offset);
    mesh
}

#[test]
fn test_slice_cube_at_origin() -> Result<()> {
    init_tracing();
    let kernel = Kernel::new();
    let plane = SlicePlane::new(Vector3::z(), Point3::origin());
    let shapes = kernel.slice(&cube(20.0, Vector3::zeros()), &plane);

    assert_eq!(shapes.len(), 1);
    let shape = &shapes[0];
    assert_eq!(shape.outer.len(), 4);
    assert!(shape.holes.is_empty());

    let bounds = shape.bounds();
    assert!((bounds.width() - 20.0).abs() < 0.01);
    assert!((bounds.height() - 20.0).abs() < 0.01);
    for i in 0..4 {
        let side = (shape.outer[(i + 1) % 4] - shape.outer[i]).norm();
        assert!((side - 20.0).abs() < 0.01, "side {side}");
    }
    Ok(())
}

#[test]
fn test_slice_next_to_cube_faces() -> Result<()> {
    init_tracing();
    let kernel = Kernel::new();
    let block = cube(20.0, Vector3::zeros());
    for z in [10.0 - 1e-6, -10.0 + 1e-6, 10.0 - 1e-5] {
        let shapes = kernel.slice(&block, &SlicePlane::horizontal(z));
        assert_eq!(shapes.len(), 1, "z = {z}");
        assert_eq!(shapes[0].outer.len(), 4, "z = {z}");
        assert!((shapes[0].area() - 400.0).abs() < 1e-6, "z = {z}: {}", shapes[0].area());
    }
    Ok(())
}

#[test]
fn test_half_overlap_difference() -> Result<()> {
    init_tracing();
    let kernel = Kernel::new();
    let result = kernel
        .difference([cube(20.0, Vector3::zeros()), cube(20.0, Vector3::new(10.0, 0.0, 0.0))])
        .context("difference produced no mesh")?;

    let status = kernel.status(&result);
    assert!(status.ok);
    assert_eq!(status.kind, StatusKind::Ok);
    assert!((status.volume - 4000.0).abs() < 1e-6, "volume {}", status.volume);
    assert!(kernel.is_manifold(&result));
    Ok(())
}

#[test]
fn test_single_union_is_identity() -> Result<()> {
    let kernel = Kernel::new();
    let sphere = Primitive::sphere(3.0, 16).to_mesh();
    let same = kernel.union([sphere.clone()]).context("single union")?;
    assert_eq!(same.vertices(), sphere.vertices());
    assert_eq!(same.faces(), sphere.faces());
    Ok(())
}

#[test]
fn test_valid_pairs_stay_valid() -> Result<()> {
    init_tracing();
    let kernel = Kernel::new();
    let a = cube(10.0, Vector3::zeros());
    let b = cube(10.0, Vector3::new(4.0, 3.0, 2.0));

    let union = kernel.union([a.clone(), b.clone()]).context("union")?;
    let difference = kernel.difference([a.clone(), b.clone()]).context("difference")?;
    let intersection = kernel.intersection([a, b]).context("intersection")?;

    for mesh in [&union, &difference, &intersection] {
        assert!(kernel.status(mesh).ok);
    }
    let v = |m: &Mesh| analytics::signed_volume(m.vertices(), m.faces());
    let overlap = 6.0 * 7.0 * 8.0;
    assert!((v(&intersection) - overlap).abs() < 1e-6);
    assert!((v(&difference) - (1000.0 - overlap)).abs() < 1e-6);
    assert!((v(&union) - (2000.0 - overlap)).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_long_chain_releases_every_handle() -> Result<()> {
    init_tracing();
    let solid = Arc::new(BspKernel::new());
    let csg = Csg::new(solid.clone());

    let mut acc = cube(4.0, Vector3::zeros());
    for i in 1..20 {
        let step = cube(4.0, Vector3::new(i as f64 * 2.0, 0.0, 0.0));
        acc = csg.union([acc, step]).context("chained union")?;
        assert_eq!(solid.live_handles(), 1);
    }
    let drill = cube(2.0, Vector3::new(10.0, 0.0, 0.0));
    let drilled = csg.difference([acc, drill]).context("drill")?;
    assert_eq!(solid.live_handles(), 1);

    drop(drilled);
    assert_eq!(solid.live_handles(), 0);
    Ok(())
}

#[test]
fn test_slice_two_bodies_with_holes() -> Result<()> {
    init_tracing();
    let kernel = Kernel::new();
    let tube = |x: f64| -> Result<Mesh> {
        let outer = cube(10.0, Vector3::new(x, 0.0, 0.0));
        let mut core = Primitive::cube(Vector3::new(4.0, 4.0, 20.0), true).to_mesh();
        core.translate(Vector3::new(x, 0.0, 0.0));
        kernel.difference([outer, core]).context("tube")
    };
    let left = tube(0.0)?;
    let right = tube(30.0)?;
    let pair = kernel.union([left, right]).context("pair")?;

    let shapes = kernel.slice(&pair, &SlicePlane::horizontal(1.0));
    assert_eq!(shapes.len(), 2);
    for shape in &shapes {
        assert!(signed_area(&shape.outer) > 0.0);
        assert_eq!(shape.holes.len(), 1);
        for hole in &shape.holes {
            assert!(signed_area(hole) < 0.0);
            assert!(point_strictly_inside(&hole[0], &shape.outer, 1e-9));
        }
        assert!((shape.area() - 84.0).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_invalid_mesh_diagnostics() -> Result<()> {
    let kernel = Kernel::new();
    let mut mesh = cube(2.0, Vector3::zeros());
    mesh.vertices_mut()[3] = Point3::new(f64::INFINITY, 0.0, 0.0);

    let status = kernel.status(&mesh);
    assert!(!status.ok);
    assert_eq!(status.kind, StatusKind::NonFiniteVertex);
    assert!(kernel.union([mesh, cube(2.0, Vector3::x())]).is_none());
    Ok(())
}
