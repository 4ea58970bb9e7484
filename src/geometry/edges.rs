// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Undirected edge connectivity for triangle meshes
//!
//! Edges are numbered in order of first appearance while walking the
//! triangles corner by corner. Corner `c` of a triangle owns the edge from
//! its vertex `c` to vertex `(c + 1) % 3`.

use super::Triangle;
use ahash::AHashMap;

/// Unique edges of a triangle mesh with their facet incidence
#[derive(Debug, Clone, Default)]
pub struct EdgeTopology {
    /// Edge endpoints, smaller vertex index first
    edges: Vec<[usize; 2]>,
    /// Number of facets incident to each edge
    facet_counts: Vec<usize>,
    /// Edge index per triangle corner
    corner_edges: Vec<[usize; 3]>,
}

impl EdgeTopology {
    /// Build edge connectivity for `triangles`
    pub fn build(triangles: &[Triangle]) -> Self {
        let mut edge_map: AHashMap<(usize, usize), usize> =
            AHashMap::with_capacity(triangles.len() * 3 / 2);
        let mut edges = Vec::new();
        let mut facet_counts = Vec::new();
        let mut corner_edges = Vec::with_capacity(triangles.len());

        for triangle in triangles {
            let mut corners = [0; 3];
            for (corner, slot) in corners.iter_mut().enumerate() {
                let v_from = triangle.indices[corner];
                let v_to = triangle.indices[(corner + 1) % 3];
                let key = if v_from <= v_to {
                    (v_from, v_to)
                } else {
                    (v_to, v_from)
                };

                let edge = *edge_map.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    facet_counts.push(0);
                    edges.len() - 1
                });
                facet_counts[edge] += 1;
                *slot = edge;
            }
            corner_edges.push(corners);
        }

        Self {
            edges,
            facet_counts,
            corner_edges,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_vertices(&self, edge: usize) -> [usize; 2] {
        self.edges[edge]
    }

    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Number of facets sharing `edge`
    pub fn facet_count(&self, edge: usize) -> usize {
        self.facet_counts[edge]
    }

    /// Edge owned by `corner` of `facet`
    pub fn corner_edge(&self, facet: usize, corner: usize) -> usize {
        self.corner_edges[facet][corner]
    }

    /// An edge is on the boundary when it is not shared by exactly two facets
    ///
    /// This covers both open borders (one facet) and non-manifold edges
    /// (three or more).
    pub fn is_boundary_edge(&self, edge: usize) -> bool {
        self.facet_counts[edge] != 2
    }

    pub fn boundary_edge_count(&self) -> usize {
        self.facet_counts.iter().filter(|&&count| count != 2).count()
    }

    /// Flags every vertex below `vertex_count` touching a boundary edge
    pub fn boundary_vertices(&self, vertex_count: usize) -> Vec<bool> {
        let mut is_boundary = vec![false; vertex_count];
        for (edge, vertices) in self.edges.iter().enumerate() {
            if self.is_boundary_edge(edge) {
                for &v in vertices {
                    if let Some(flag) = is_boundary.get_mut(v) {
                        *flag = true;
                    }
                }
            }
        }
        is_boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Triangle> {
        vec![Triangle::new([0, 1, 2]), Triangle::new([0, 2, 3])]
    }

    #[test]
    fn test_edge_numbering() {
        let topology = EdgeTopology::build(&quad());
        assert_eq!(topology.edge_count(), 5);
        assert_eq!(topology.edge_vertices(0), [0, 1]);
        assert_eq!(topology.edge_vertices(2), [0, 2]);
        assert_eq!(topology.corner_edge(1, 0), 2);
        assert_eq!(topology.facet_count(2), 2);
    }

    #[test]
    fn test_boundary_classification() {
        let topology = EdgeTopology::build(&quad());
        assert_eq!(topology.boundary_edge_count(), 4);
        assert!(!topology.is_boundary_edge(2));
        assert_eq!(topology.boundary_vertices(5), vec![true, true, true, true, false]);
    }

    #[test]
    fn test_non_manifold_edge_is_boundary() {
        let triangles = vec![
            Triangle::new([0, 1, 2]),
            Triangle::new([1, 0, 3]),
            Triangle::new([0, 1, 4]),
        ];
        let topology = EdgeTopology::build(&triangles);
        assert_eq!(topology.facet_count(0), 3);
        assert!(topology.is_boundary_edge(0));
    }
}
