// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh connectivity checks

use super::edges::EdgeTopology;
use super::SurfaceMesh;
use ahash::AHashMap;
use serde::Serialize;

/// Every edge is shared by at most two triangles
pub fn is_edge_manifold<const D: usize>(mesh: &SurfaceMesh<D>) -> bool {
    let topology = EdgeTopology::build(&mesh.triangles);
    (0..topology.edge_count()).all(|edge| topology.facet_count(edge) <= 2)
}

/// Every edge is shared by exactly two triangles
pub fn is_closed<const D: usize>(mesh: &SurfaceMesh<D>) -> bool {
    let topology = EdgeTopology::build(&mesh.triangles);
    (0..topology.edge_count()).all(|edge| topology.facet_count(edge) == 2)
}

/// Every vertex is surrounded by a single fan of triangles
///
/// The link of a vertex (the edges opposite to it in its incident triangles)
/// must be one connected chain or loop. A triangle that references the
/// vertex more than once, or one that references a missing vertex, makes the
/// mesh non-manifold. Isolated vertices are manifold.
pub fn is_vertex_manifold<const D: usize>(mesh: &SurfaceMesh<D>) -> bool {
    let mut links: Vec<Vec<[usize; 2]>> = vec![Vec::new(); mesh.vertex_count()];
    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.indices;
        if triangle.is_degenerate() || triangle.indices.iter().any(|&v| v >= links.len()) {
            return false;
        }
        links[a].push([b, c]);
        links[b].push([c, a]);
        links[c].push([a, b]);
    }

    links.iter().all(|link| is_single_fan(link))
}

/// Link edges form one path or one cycle
fn is_single_fan(link: &[[usize; 2]]) -> bool {
    if link.is_empty() {
        return true;
    }

    // Union-find over the link vertices with degree tracking
    let mut slots: AHashMap<usize, usize> = AHashMap::new();
    let mut parent: Vec<usize> = Vec::new();
    let mut degree: Vec<usize> = Vec::new();

    let mut slot_of = |v: usize, parent: &mut Vec<usize>, degree: &mut Vec<usize>| {
        *slots.entry(v).or_insert_with(|| {
            parent.push(parent.len());
            degree.push(0);
            parent.len() - 1
        })
    };

    fn root(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for &[u, v] in link {
        let su = slot_of(u, &mut parent, &mut degree);
        let sv = slot_of(v, &mut parent, &mut degree);
        degree[su] += 1;
        degree[sv] += 1;
        let (ru, rv) = (root(&mut parent, su), root(&mut parent, sv));
        if ru != rv {
            parent[ru.max(rv)] = ru.min(rv);
        }
    }

    if degree.iter().any(|&d| d > 2) {
        return false;
    }
    let first = root(&mut parent, 0);
    (1..parent.len()).all(|slot| root(&mut parent, slot) == first)
}

/// Euler characteristic `V - E + F`
pub fn euler_characteristic<const D: usize>(mesh: &SurfaceMesh<D>) -> i64 {
    let topology = EdgeTopology::build(&mesh.triangles);
    mesh.vertex_count() as i64 - topology.edge_count() as i64 + mesh.triangle_count() as i64
}

/// Connectivity summary of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeshValidation {
    pub is_edge_manifold: bool,
    pub is_vertex_manifold: bool,
    pub is_closed: bool,
    pub edge_count: usize,
    pub boundary_edge_count: usize,
    pub degenerate_triangle_count: usize,
    pub euler_characteristic: i64,
}

pub fn validate_mesh<const D: usize>(mesh: &SurfaceMesh<D>) -> MeshValidation {
    let topology = EdgeTopology::build(&mesh.triangles);
    let counts: Vec<usize> = (0..topology.edge_count())
        .map(|edge| topology.facet_count(edge))
        .collect();

    MeshValidation {
        is_edge_manifold: counts.iter().all(|&count| count <= 2),
        is_vertex_manifold: is_vertex_manifold(mesh),
        is_closed: counts.iter().all(|&count| count == 2),
        edge_count: topology.edge_count(),
        boundary_edge_count: topology.boundary_edge_count(),
        degenerate_triangle_count: mesh.triangles.iter().filter(|t| t.is_degenerate()).count(),
        euler_characteristic: mesh.vertex_count() as i64 - topology.edge_count() as i64
            + mesh.triangle_count() as i64,
    }
}
