// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Proximity-based vertex welding
//!
//! Welding runs in phases: validate options, make edge data available for
//! boundary detection, scan candidate vertices with radius queries on a point
//! tree, union all discovered pairs, then rewrite the mesh. Candidate pairs
//! are collected in parallel and merged sequentially, so the disjoint-set
//! forest is never shared between threads.
//!
//! Merging is transitive: a chain of vertices each within `radius` of the
//! next collapses into one vertex even when its ends are farther apart.

mod options;
mod remap;
mod union_find;

pub use options::{MappingPolicy, RemapVerticesOptions, WeldOptions};
pub use remap::remap_vertices;
pub use union_find::DisjointSet;

use crate::bvh::PointTree;
use crate::error::{BvhError, Result};
use crate::geometry::SurfaceMesh;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Old-to-new vertex mapping produced by the candidate scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexMapping {
    /// New index of every original vertex
    pub old_to_new: Vec<usize>,
    /// Number of vertices after welding
    pub vertex_count: usize,
    /// Vertices that took part in the radius scan
    pub candidates: usize,
    /// Distinct candidate pairs found within the radius
    pub candidate_pairs: usize,
}

impl VertexMapping {
    fn identity(vertex_count: usize) -> Self {
        Self {
            old_to_new: (0..vertex_count).collect(),
            vertex_count,
            candidates: 0,
            candidate_pairs: 0,
        }
    }
}

/// Summary of a weld
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeldReport {
    pub input_vertices: usize,
    pub output_vertices: usize,
    pub candidates: usize,
    pub candidate_pairs: usize,
}

impl WeldReport {
    pub fn merged_vertices(&self) -> usize {
        self.input_vertices - self.output_vertices
    }
}

/// Compute which vertices merge, without modifying geometry
///
/// Each set of merged vertices is represented by its lowest original index.
/// New indices follow the order of the representatives, so vertices that do
/// not merge keep their relative order. In boundary-only mode the mesh's
/// edge connectivity is initialized as a side effect.
#[instrument(skip_all, fields(radius = options.radius, boundary_only = options.boundary_only))]
pub fn compute_vertex_mapping<const D: usize>(
    mesh: &mut SurfaceMesh<D>,
    options: &WeldOptions,
) -> Result<VertexMapping> {
    let vertex_count = mesh.vertex_count();

    // Init
    if options.radius.is_nan() || options.radius < 0.0 {
        return Err(BvhError::InvalidRadius(options.radius));
    }
    mesh.validate()?;
    if options.radius == 0.0 {
        debug!("zero radius, identity mapping");
        return Ok(VertexMapping::identity(vertex_count));
    }

    // Edge data
    let is_candidate = if options.boundary_only {
        mesh.initialize_edges().boundary_vertices(vertex_count)
    } else {
        vec![true; vertex_count]
    };
    let candidates: Vec<usize> = (0..vertex_count).filter(|&v| is_candidate[v]).collect();
    debug!(candidates = candidates.len(), "selected weld candidates");
    if candidates.is_empty() {
        return Ok(VertexMapping::identity(vertex_count));
    }

    // Candidate scan
    let positions: Vec<_> = candidates.iter().map(|&v| mesh.vertices[v]).collect();
    let tree = PointTree::from_point_cloud(positions)?;
    let squared_radius = options.radius * options.radius;
    let pairs: Vec<(usize, usize)> = (0..candidates.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let mut found = Vec::new();
            tree.foreach_element_in_radius(&tree.vertices()[i], squared_radius, |_, j, _| {
                if j > i {
                    found.push((i, j));
                }
            });
            found
        })
        .collect();
    debug!(pairs = pairs.len(), "collected candidate pairs");

    // Union-find
    let mut sets = DisjointSet::new(vertex_count);
    for &(i, j) in &pairs {
        sets.merge(candidates[i], candidates[j]);
    }

    let mut old_to_new = vec![0; vertex_count];
    let mut next = 0;
    for v in 0..vertex_count {
        let root = sets.find(v);
        if root == v {
            old_to_new[v] = next;
            next += 1;
        } else {
            old_to_new[v] = old_to_new[root];
        }
    }

    Ok(VertexMapping {
        old_to_new,
        vertex_count: next,
        candidates: candidates.len(),
        candidate_pairs: pairs.len(),
    })
}

/// Merge vertices of `mesh` closer than `options.radius`, in place
///
/// The triangle count never changes: triangles whose corners collapse are
/// kept as degenerate triangles. The output may be non-manifold.
#[instrument(skip_all, fields(vertices = mesh.vertex_count(), triangles = mesh.triangle_count()))]
pub fn weld_vertices<const D: usize>(
    mesh: &mut SurfaceMesh<D>,
    options: WeldOptions,
) -> Result<WeldReport> {
    let input_vertices = mesh.vertex_count();
    let mapping = compute_vertex_mapping(mesh, &options)?;

    // Rewrite
    if mapping.vertex_count != input_vertices {
        remap_vertices(mesh, &mapping.old_to_new, options.remap_options())?;
    }

    let report = WeldReport {
        input_vertices,
        output_vertices: mesh.vertex_count(),
        candidates: mapping.candidates,
        candidate_pairs: mapping.candidate_pairs,
    };
    info!(
        input = report.input_vertices,
        output = report.output_vertices,
        pairs = report.candidate_pairs,
        "welded vertices"
    );
    Ok(report)
}
