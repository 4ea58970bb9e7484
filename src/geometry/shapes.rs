// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh generators used by tests, benches and the CLI demo commands

use super::Mesh;
use nalgebra::Point3;
use std::f64::consts::PI;

/// Axis-aligned cube centered at the origin, as a triangle soup
///
/// Every triangle owns its three corners, giving 36 vertices that weld down
/// to the 8 corners of the cube.
pub fn cube(size: f64) -> Mesh {
    let h = size / 2.0;
    let corners = [
        Point3::new(-h, -h, -h),
        Point3::new(h, -h, -h),
        Point3::new(h, h, -h),
        Point3::new(-h, h, -h),
        Point3::new(-h, -h, h),
        Point3::new(h, -h, h),
        Point3::new(h, h, h),
        Point3::new(-h, h, h),
    ];

    let faces: [[usize; 3]; 12] = [
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

    let mut mesh = Mesh::with_capacity(36, 12);
    for face in faces {
        let v = face.map(|corner| mesh.add_vertex(corners[corner]));
        mesh.add_triangle(v);
    }
    mesh
}

/// Latitude/longitude sphere with duplicated seam and pole vertices
///
/// The seam column and both pole rows are repeated, so welding with a small
/// radius leaves `2 + (segments - 1) * segments` vertices.
pub fn uv_sphere(radius: f64, segments: usize) -> Mesh {
    let segments = segments.max(3);
    let stacks = segments;
    let slices = segments;
    let mut mesh = Mesh::with_capacity((stacks + 1) * (slices + 1), 2 * stacks * slices);

    for i in 0..=stacks {
        let phi = PI * i as f64 / stacks as f64;
        let y = radius * phi.cos();
        let r = radius * phi.sin();

        for j in 0..=slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            mesh.add_vertex(Point3::new(r * theta.cos(), y, r * theta.sin()));
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let first = i * (slices + 1) + j;
            let second = first + slices + 1;
            mesh.add_triangle([first, second, first + 1]);
            mesh.add_triangle([second, second + 1, first + 1]);
        }
    }

    mesh
}

/// Regular grid of `nx * ny` quads in the z = 0 plane, vertices shared
pub fn grid(nx: usize, ny: usize, spacing: f64) -> Mesh {
    let mut mesh = Mesh::with_capacity((nx + 1) * (ny + 1), 2 * nx * ny);
    for j in 0..=ny {
        for i in 0..=nx {
            mesh.add_vertex(Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
        }
    }

    let row = nx + 1;
    for j in 0..ny {
        for i in 0..nx {
            let v00 = j * row + i;
            let v10 = v00 + 1;
            let v01 = v00 + row;
            let v11 = v01 + 1;
            mesh.add_triangle([v00, v10, v11]);
            mesh.add_triangle([v00, v11, v01]);
        }
    }
    mesh
}
