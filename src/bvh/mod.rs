// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Axis-aligned bounding box trees over points, edges and triangles

mod element;
mod node;
mod query;
mod tree;

pub use element::{EdgeElement, Element, ElementKind, PointElement, TriangleElement};
pub use node::{Node, NodeKind};
pub use query::{ClosestPoint, ElementHit};
pub use tree::{AabbTree, EdgeTree, PointTree, TriangleTree};
