// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Element kinds indexed by an AABB tree
//!
//! The set of kinds is closed: points, edges and triangles. Each kind is a
//! zero-sized marker implementing [`Element`], so the tree picks its
//! distance and containment routines at compile time.

use crate::geometry::distance::{closest_point_on_segment, closest_point_on_triangle};
use crate::geometry::robust_predicates::{point_in_triangle, point_on_segment};
use crate::geometry::BoundingBox;
use nalgebra::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime tag of an element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Point,
    Edge,
    Triangle,
}

impl ElementKind {
    /// Number of vertices per element
    pub fn arity(self) -> usize {
        match self {
            ElementKind::Point => 1,
            ElementKind::Edge => 2,
            ElementKind::Triangle => 3,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Point => "point",
            ElementKind::Edge => "edge",
            ElementKind::Triangle => "triangle",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::PointElement {}
    impl Sealed for super::EdgeElement {}
    impl Sealed for super::TriangleElement {}
}

/// Geometry of one element kind
pub trait Element: sealed::Sealed + Send + Sync + 'static {
    const KIND: ElementKind;

    /// Vertex indices of one element
    type Indices: AsRef<[usize]> + Copy + fmt::Debug + PartialEq + Send + Sync;

    /// Pack one row of `KIND.arity()` indices
    fn pack(row: &[usize]) -> Self::Indices;

    /// Closest point on the element and its squared distance to `query`
    fn closest_point<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
        query: &Point<f64, D>,
    ) -> (Point<f64, D>, f64);

    /// Exact test whether `query` lies on the element
    fn contains<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
        query: &Point<f64, D>,
    ) -> bool;

    fn bounding_box<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
    ) -> BoundingBox<D> {
        BoundingBox::from_points(indices.as_ref().iter().map(|&v| &vertices[v]))
    }

    /// Average of the element's vertices
    fn centroid<const D: usize>(vertices: &[Point<f64, D>], indices: &Self::Indices) -> Point<f64, D> {
        let corners = indices.as_ref();
        let sum = corners
            .iter()
            .fold(nalgebra::SVector::<f64, D>::zeros(), |acc, &v| acc + vertices[v].coords);
        Point::from(sum / corners.len() as f64)
    }
}

/// Single vertex
#[derive(Debug, Clone, Copy, Default)]
pub struct PointElement;

/// Line segment between two vertices
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeElement;

/// Triangle over three vertices
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleElement;

impl Element for PointElement {
    const KIND: ElementKind = ElementKind::Point;
    type Indices = [usize; 1];

    fn pack(row: &[usize]) -> Self::Indices {
        [row[0]]
    }

    fn closest_point<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
        query: &Point<f64, D>,
    ) -> (Point<f64, D>, f64) {
        let p = vertices[indices[0]];
        (p, (query - p).norm_squared())
    }

    fn contains<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
        query: &Point<f64, D>,
    ) -> bool {
        vertices[indices[0]] == *query
    }
}

impl Element for EdgeElement {
    const KIND: ElementKind = ElementKind::Edge;
    type Indices = [usize; 2];

    fn pack(row: &[usize]) -> Self::Indices {
        [row[0], row[1]]
    }

    fn closest_point<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
        query: &Point<f64, D>,
    ) -> (Point<f64, D>, f64) {
        let [a, b] = *indices;
        closest_point_on_segment(query, &vertices[a], &vertices[b])
    }

    fn contains<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
        query: &Point<f64, D>,
    ) -> bool {
        let [a, b] = *indices;
        point_on_segment(query, &vertices[a], &vertices[b])
    }
}

impl Element for TriangleElement {
    const KIND: ElementKind = ElementKind::Triangle;
    type Indices = [usize; 3];

    fn pack(row: &[usize]) -> Self::Indices {
        [row[0], row[1], row[2]]
    }

    fn closest_point<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
        query: &Point<f64, D>,
    ) -> (Point<f64, D>, f64) {
        let [a, b, c] = *indices;
        closest_point_on_triangle(query, &vertices[a], &vertices[b], &vertices[c])
    }

    fn contains<const D: usize>(
        vertices: &[Point<f64, D>],
        indices: &Self::Indices,
        query: &Point<f64, D>,
    ) -> bool {
        let [a, b, c] = *indices;
        point_in_triangle(query, &vertices[a], &vertices[b], &vertices[c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn test_kind_display_and_arity() {
        assert_eq!(ElementKind::Triangle.to_string(), "triangle");
        assert_eq!(ElementKind::Edge.arity(), 2);
        assert_eq!(PointElement::KIND.arity(), 1);
    }

    #[test]
    fn test_edge_geometry() {
        let vertices = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let edge = EdgeElement::pack(&[0, 1]);
        let (p, d) = EdgeElement::closest_point(&vertices, &edge, &Point2::new(1.0, 3.0));
        assert_eq!(p, Point2::new(1.0, 0.0));
        assert_eq!(d, 9.0);
        assert!(EdgeElement::contains(&vertices, &edge, &Point2::new(0.5, 0.0)));
        assert!(!EdgeElement::contains(&vertices, &edge, &Point2::new(0.5, 1e-300)));
        assert_eq!(EdgeElement::centroid(&vertices, &edge), Point2::new(1.0, 0.0));
    }

    #[test]
    fn test_triangle_bounding_box() {
        let vertices = [
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(-1.0, 2.0),
        ];
        let bbox = TriangleElement::bounding_box(&vertices, &[0, 1, 2]);
        assert_eq!(bbox.min, Point2::new(-1.0, 0.0));
        assert_eq!(bbox.max, Point2::new(3.0, 2.0));
    }
}
