// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, exact predicates and distances

pub mod attributes;
mod bbox;
pub mod distance;
pub mod edges;
mod mesh;
pub mod mesh_utils;
pub mod robust_predicates;
pub mod shapes;

pub use attributes::{AttributeValues, VertexAttribute};
pub use bbox::BoundingBox;
pub use edges::EdgeTopology;
pub use mesh::{Mesh, SurfaceMesh, Triangle};
