// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;
use tessera::{Kernel, Mesh, Primitive, Shape, SlicePlane, VoronoiConfig};

fn cube_row(count: usize) -> Vec<Mesh> {
    (0..count)
        .map(|i| {
            let mut mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();
            mesh.translate(Vector3::new(i as f64 * 8.0, 0.0, 0.0));
            mesh
        })
        .collect()
}

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");

    group.bench_function("sphere_32", |b| {
        b.iter(|| Primitive::sphere(black_box(10.0), black_box(32)).to_mesh());
    });

    group.bench_function("cylinder", |b| {
        b.iter(|| Primitive::cylinder(black_box(20.0), black_box(5.0), black_box(32)).to_mesh());
    });

    group.finish();
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");
    let kernel = Kernel::new();

    for count in [2usize, 4, 8] {
        let meshes = cube_row(count);
        group.bench_with_input(BenchmarkId::new("union_chain", count), &meshes, |b, meshes| {
            b.iter(|| kernel.union(black_box(meshes.clone())).unwrap());
        });
    }

    let block = Primitive::cube(Vector3::new(20.0, 20.0, 20.0), true).to_mesh();
    let mut drill = Primitive::cylinder(40.0, 5.0, 32).to_mesh();
    drill.translate(Vector3::new(0.0, 0.0, -20.0));
    group.bench_function("difference", |b| {
        b.iter(|| kernel.difference(black_box([block.clone(), drill.clone()])).unwrap());
    });

    group.finish();
}

fn bench_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("slice");
    let kernel = Kernel::new();
    let sphere = Primitive::sphere(10.0, 48).to_mesh();

    group.bench_function("sphere_horizontal", |b| {
        b.iter(|| kernel.slice(black_box(&sphere), &SlicePlane::horizontal(2.5)));
    });

    let oblique = SlicePlane::new(Vector3::new(1.0, 1.0, 1.0), nalgebra::Point3::origin());
    group.bench_function("sphere_oblique", |b| {
        b.iter(|| kernel.slice(black_box(&sphere), &oblique));
    });

    group.finish();
}

fn bench_voronoi(c: &mut Criterion) {
    let mut group = c.benchmark_group("voronoi");
    group.sample_size(10);
    let kernel = Kernel::new();
    let disc = Shape::circle(20.0, 64);

    for cells in [10usize, 30] {
        let config = VoronoiConfig::default().with_cells(cells);
        group.bench_with_input(BenchmarkId::new("shell", cells), &config, |b, config| {
            b.iter(|| kernel.voronoi_shell_with(black_box(&disc), config));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_primitives, bench_boolean_ops, bench_slice, bench_voronoi);
criterion_main!(benches);
