// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel measurements cross-checked against buffer-level summaries

use anyhow::{Context, Result};
use nalgebra::Vector3;
use std::f64::consts::PI;
use tessera::geometry::analytics::summarize;
use tessera::{Kernel, Primitive};

#[test]
fn test_sphere_summary_matches_kernel() -> Result<()> {
    let radius = 5.0;
    let mesh = Primitive::sphere(radius, 64).to_mesh();
    let summary = summarize(&mesh).context("sphere summary")?;

    let expected = 4.0 / 3.0 * PI * radius.powi(3);
    assert!(((summary.volume - expected) / expected).abs() < 0.02);
    assert!(summary.is_closed());

    let status = Kernel::new().status(&mesh);
    assert!(status.ok);
    assert!((status.volume - summary.volume).abs() < 1e-6);
    assert!((status.surface_area - summary.surface_area).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_cylinder_volume_converges() -> Result<()> {
    let (height, radius) = (20.0, 5.0);
    let expected = PI * radius * radius * height;
    let error = |segments| -> Result<f64> {
        let summary = summarize(&Primitive::cylinder(height, radius, segments).to_mesh())
            .context("cylinder summary")?;
        Ok(((summary.volume - expected) / expected).abs())
    };

    let coarse = error(16)?;
    let fine = error(64)?;
    assert!(fine < coarse);
    assert!(fine < 0.01);
    Ok(())
}

#[test]
fn test_boolean_output_summary() -> Result<()> {
    let kernel = Kernel::new();
    let block = Primitive::cube(Vector3::new(10.0, 20.0, 30.0), true).to_mesh();
    let mut cutter = Primitive::cube(Vector3::new(10.0, 20.0, 30.0), true).to_mesh();
    cutter.translate(Vector3::new(0.0, 0.0, 15.0));

    let lower = kernel.difference([block, cutter]).context("difference")?;
    let summary = summarize(&lower).context("difference summary")?;
    assert!(summary.is_closed());
    assert!((summary.volume - 3000.0).abs() < 1e-6);
    assert!((summary.bounds.min.z + 15.0).abs() < 1e-9);
    assert!((summary.bounds.max.z).abs() < 1e-9);
    Ok(())
}
