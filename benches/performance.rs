// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Point3;
use polyframe_bvh::geometry::shapes;
use polyframe_bvh::{weld_vertices, PointTree, TriangleTree, WeldOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_points(count: usize, seed: u64) -> Vec<Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Point3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for segments in [32, 64, 128] {
        let mesh = shapes::uv_sphere(1.0, segments);
        group.bench_with_input(
            BenchmarkId::new("sphere", mesh.triangle_count()),
            &mesh,
            |b, mesh| b.iter(|| TriangleTree::from_mesh(black_box(mesh)).unwrap()),
        );
    }

    let points = random_points(50_000, 7);
    group.bench_function("point_cloud_50k", |b| {
        b.iter(|| PointTree::from_point_cloud(black_box(points.clone())).unwrap())
    });

    group.finish();
}

fn bench_closest_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("closest_point");

    let tree = TriangleTree::from_mesh(&shapes::uv_sphere(1.0, 128)).unwrap();
    let queries = random_points(1_000, 11);

    group.bench_function("sequential_1k", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(tree.get_closest_point(query));
            }
        })
    });

    group.bench_function("batch_1k", |b| {
        b.iter(|| tree.batch_closest_point(black_box(&queries)))
    });

    group.finish();
}

fn bench_radius(c: &mut Criterion) {
    let mut group = c.benchmark_group("radius");

    let tree = PointTree::from_point_cloud(random_points(50_000, 3)).unwrap();
    let queries = random_points(100, 5);

    for radius in [0.05, 0.2] {
        group.bench_with_input(BenchmarkId::new("point_cloud_50k", radius), &radius, |b, &radius| {
            b.iter(|| {
                let mut count = 0;
                for query in &queries {
                    tree.foreach_element_in_radius(query, radius * radius, |_, _, _| count += 1);
                }
                black_box(count)
            })
        });
    }

    group.finish();
}

fn bench_weld(c: &mut Criterion) {
    let mut group = c.benchmark_group("weld");
    group.sample_size(20);

    for segments in [32, 128] {
        let mesh = shapes::uv_sphere(1.0, segments);
        group.bench_with_input(BenchmarkId::new("sphere", mesh.vertex_count()), &mesh, |b, mesh| {
            b.iter(|| {
                let mut mesh = mesh.clone();
                weld_vertices(&mut mesh, WeldOptions::default()).unwrap()
            })
        });
    }

    let cube = shapes::cube(1.0);
    group.bench_function("cube_soup", |b| {
        b.iter(|| {
            let mut mesh = cube.clone();
            weld_vertices(&mut mesh, WeldOptions::default()).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_closest_point,
    bench_radius,
    bench_weld
);
criterion_main!(benches);
