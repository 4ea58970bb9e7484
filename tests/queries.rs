// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tree queries checked against brute force on seeded random inputs

use approx::assert_relative_eq;
use nalgebra::{Point2, Point3};
use polyframe_bvh::geometry::distance::{closest_point_on_segment, closest_point_on_triangle};
use polyframe_bvh::geometry::robust_predicates::point_in_triangle;
use polyframe_bvh::geometry::{shapes, BoundingBox};
use polyframe_bvh::{EdgeTree, PointTree, TriangleTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_point(rng: &mut StdRng, extent: f64) -> Point3<f64> {
    Point3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

/// Random triangle soup with small triangles scattered in a cube
fn random_soup(seed: u64, count: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut vertices = Vec::with_capacity(3 * count);
    let mut triangles = Vec::with_capacity(count);
    for t in 0..count {
        let center = random_point(&mut rng, 1.0);
        for _ in 0..3 {
            vertices.push(center + random_point(&mut rng, 0.2).coords);
        }
        triangles.push([3 * t, 3 * t + 1, 3 * t + 2]);
    }
    (vertices, triangles)
}

/// Squared distances to every triangle, in element order
fn brute_distances(
    vertices: &[Point3<f64>],
    triangles: &[[usize; 3]],
    query: &Point3<f64>,
) -> Vec<f64> {
    triangles
        .iter()
        .map(|&[a, b, c]| closest_point_on_triangle(query, &vertices[a], &vertices[b], &vertices[c]).1)
        .collect()
}

fn argmin(distances: &[f64]) -> usize {
    let mut best = 0;
    for (i, &d) in distances.iter().enumerate() {
        if d < distances[best] {
            best = i;
        }
    }
    best
}

#[test]
fn test_closest_point_matches_brute_force() {
    let (vertices, triangles) = random_soup(42, 300);
    let tree = TriangleTree::new(vertices.clone(), triangles.clone()).unwrap();
    assert!(tree.check_invariants().is_ok());

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let query = random_point(&mut rng, 1.5);
        let distances = brute_distances(&vertices, &triangles, &query);
        let expected = argmin(&distances);

        let hit = tree.get_closest_point(&query).unwrap();
        assert_eq!(hit.element, expected);
        assert_eq!(hit.squared_distance, distances[expected]);
        assert_relative_eq!((hit.point - query).norm_squared(), hit.squared_distance, epsilon = 1e-12);
        assert!(triangles[hit.element].contains(&hit.closest_vertex));
    }
}

#[test]
fn test_batch_matches_sequential() {
    let (vertices, triangles) = random_soup(3, 200);
    let tree = TriangleTree::new(vertices, triangles).unwrap();

    let mut rng = StdRng::seed_from_u64(11);
    let queries: Vec<_> = (0..256).map(|_| random_point(&mut rng, 2.0)).collect();
    let batch = tree.batch_closest_point(&queries);

    assert_eq!(batch.len(), queries.len());
    for (query, result) in queries.iter().zip(&batch) {
        assert_eq!(*result, tree.get_closest_point(query));
    }
}

#[test]
fn test_batch_on_empty_tree() {
    let tree = TriangleTree::<3>::new(Vec::new(), Vec::new()).unwrap();
    let results = tree.batch_closest_point(&[Point3::origin(), Point3::new(1.0, 2.0, 3.0)]);
    assert_eq!(results, vec![None, None]);
    assert!(tree.get_closest_point(&Point3::origin()).is_none());
}

#[test]
fn test_radius_query_matches_brute_force() {
    let (vertices, triangles) = random_soup(5, 250);
    let tree = TriangleTree::new(vertices.clone(), triangles.clone()).unwrap();

    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..100 {
        let query = random_point(&mut rng, 1.2);
        let squared_radius = rng.gen_range(0.0..0.25);
        let distances = brute_distances(&vertices, &triangles, &query);

        let mut expected: Vec<usize> = (0..triangles.len())
            .filter(|&t| distances[t] <= squared_radius)
            .collect();
        expected.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]).then(a.cmp(&b)));

        let hits = tree.elements_in_radius(&query, squared_radius);
        let found: Vec<usize> = hits.iter().map(|h| h.element).collect();
        assert_eq!(found, expected);
        for hit in &hits {
            assert_eq!(hit.squared_distance, distances[hit.element]);
        }
    }
}

#[test]
fn test_k_nearest_matches_brute_force() {
    let (vertices, triangles) = random_soup(17, 150);
    let tree = TriangleTree::new(vertices.clone(), triangles.clone()).unwrap();

    let mut rng = StdRng::seed_from_u64(19);
    for k in [1, 5, 20, 150, 400] {
        let query = random_point(&mut rng, 1.0);
        let distances = brute_distances(&vertices, &triangles, &query);
        let mut expected: Vec<usize> = (0..triangles.len()).collect();
        expected.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]).then(a.cmp(&b)));
        expected.truncate(k);

        let found: Vec<usize> = tree.k_nearest(&query, k).iter().map(|h| h.element).collect();
        assert_eq!(found, expected);
    }
}

#[test]
fn test_point_cloud_nearest_neighbor() {
    let mut rng = StdRng::seed_from_u64(23);
    let points: Vec<_> = (0..2000).map(|_| random_point(&mut rng, 1.0)).collect();
    let tree = PointTree::from_point_cloud(points.clone()).unwrap();

    for _ in 0..200 {
        let query = random_point(&mut rng, 1.2);
        let distances: Vec<f64> = points.iter().map(|p| (p - query).norm_squared()).collect();
        let hit = tree.get_closest_point(&query).unwrap();
        assert_eq!(hit.element, argmin(&distances));
        assert_eq!(hit.point, points[hit.element]);
        assert_eq!(hit.closest_vertex, hit.element);
    }
}

#[test]
fn test_edge_tree_on_grid() {
    let mesh = shapes::grid(4, 4, 0.5);
    let tree = EdgeTree::from_mesh_edges(&mesh).unwrap();

    let mut rng = StdRng::seed_from_u64(29);
    for _ in 0..200 {
        let query = Point3::new(rng.gen_range(-0.5..2.5), rng.gen_range(-0.5..2.5), rng.gen_range(-1.0..1.0));
        let brute = (0..tree.len())
            .map(|e| {
                let v = tree.element_indices(e).unwrap();
                closest_point_on_segment(&query, &mesh.vertices[v[0]], &mesh.vertices[v[1]]).1
            })
            .fold(f64::INFINITY, f64::min);
        let hit = tree.get_closest_point(&query).unwrap();
        assert_eq!(hit.squared_distance, brute);
    }
}

#[test]
fn test_containment_on_2d_grid_is_exact() {
    // Unit grid in 2D; vertices are shared by up to six triangles
    let n = 4;
    let mut vertices = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point2::new(i as f64 * 0.1, j as f64 * 0.1));
        }
    }
    let mut triangles = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            triangles.push([v00, v00 + 1, v00 + n + 2]);
            triangles.push([v00, v00 + n + 2, v00 + n + 1]);
        }
    }
    let tree = TriangleTree::new(vertices.clone(), triangles.clone()).unwrap();

    let mut queries = vertices.clone();
    queries.push(Point2::new(0.05, 0.05));
    queries.push(Point2::new(0.15, 0.0));
    queries.push(Point2::new(0.3, 0.1 + 1e-17));
    queries.push(Point2::new(-1e-300, 0.2));

    for query in &queries {
        let expected: Vec<usize> = (0..triangles.len())
            .filter(|&t| {
                let [a, b, c] = triangles[t];
                point_in_triangle(query, &vertices[a], &vertices[b], &vertices[c])
            })
            .collect();
        assert_eq!(tree.elements_containing(query), expected);
    }

    // Interior vertex (0.1, 0.1) touches six triangles
    assert_eq!(tree.elements_containing(&vertices[n + 2]).len(), 6);
    // A point just outside the left border belongs to nothing
    assert!(tree.elements_containing(&Point2::new(-1e-300, 0.2)).is_empty());
}

#[test]
fn test_intersect_box_finds_overlapping_elements() {
    let (vertices, triangles) = random_soup(31, 200);
    let tree = TriangleTree::new(vertices, triangles).unwrap();
    let query = BoundingBox::new(Point3::new(-0.3, -0.3, -0.3), Point3::new(0.3, 0.3, 0.3));

    let mut found = Vec::new();
    assert!(tree.intersect_box(&query, |element| {
        found.push(element);
        true
    }));
    found.sort_unstable();

    let expected: Vec<usize> = (0..tree.len())
        .filter(|&e| tree.element_bbox(e).unwrap().intersects(&query))
        .collect();
    assert_eq!(found, expected);

    match tree.intersect_first(&query) {
        Some(first) => assert!(expected.contains(&first)),
        None => assert!(expected.is_empty()),
    }
}

#[test]
fn test_single_triangle_scenario() {
    let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let tree = TriangleTree::<3>::from_flat(&vertices, &[0, 1, 2], 3).unwrap();
    let hit = tree.get_closest_point(&Point3::new(0.1, 0.1, 0.0)).unwrap();
    assert_eq!(hit.element, 0);
    assert_relative_eq!(hit.squared_distance, 0.0, epsilon = 1e-15);
    assert_relative_eq!(hit.point, Point3::new(0.1, 0.1, 0.0), epsilon = 1e-15);
    assert_eq!(hit.closest_vertex, 0);
    assert_eq!(tree.elements_containing(&Point3::new(0.1, 0.1, 0.0)), vec![0]);
    assert!(tree.elements_containing(&Point3::new(0.1, 0.1, 1e-12)).is_empty());
}
