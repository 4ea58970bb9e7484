// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe BVH
//!
//! Axis-aligned bounding box trees over points, edges and triangles in two
//! or three dimensions, with closest-point, radius and exact containment
//! queries, plus proximity-based vertex welding for triangle meshes.
//!
//! ```
//! use nalgebra::Point3;
//! use polyframe_bvh::{geometry::shapes, weld_vertices, TriangleTree, WeldOptions};
//!
//! let mut mesh = shapes::cube(2.0);
//! let report = weld_vertices(&mut mesh, WeldOptions::default()).unwrap();
//! assert_eq!(report.output_vertices, 8);
//!
//! let tree = TriangleTree::from_mesh(&mesh).unwrap();
//! let hit = tree.get_closest_point(&Point3::new(0.0, 0.0, 3.0)).unwrap();
//! assert_eq!(hit.squared_distance, 4.0);
//! ```

pub mod bvh;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod logging;
pub mod weld;

pub use bvh::{
    AabbTree, ClosestPoint, EdgeTree, Element, ElementHit, ElementKind, PointTree, TriangleTree,
};
pub use config::EngineConfig;
pub use error::{BvhError, Result};
pub use geometry::{BoundingBox, Mesh, SurfaceMesh, Triangle};
pub use weld::{
    compute_vertex_mapping, remap_vertices, weld_vertices, MappingPolicy, RemapVerticesOptions,
    VertexMapping, WeldOptions, WeldReport,
};
