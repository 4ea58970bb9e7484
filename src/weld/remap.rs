// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex remapping: renumber vertices, rewrite triangles and attributes

use super::options::{MappingPolicy, RemapVerticesOptions};
use crate::error::{BvhError, Result};
use crate::geometry::{AttributeValues, SurfaceMesh};
use rayon::prelude::*;
use std::ops::AddAssign;
use tracing::{debug, instrument};

/// Inverse of an old-to-new vertex mapping, stored as offsets into a flat
/// list of source vertices
///
/// Sources of each target appear in increasing order.
#[derive(Debug, Clone)]
pub(crate) struct InverseMapping {
    offsets: Vec<usize>,
    data: Vec<usize>,
}

impl InverseMapping {
    pub(crate) fn new(old_to_new: &[usize], target_count: usize) -> Self {
        let mut offsets = vec![0; target_count + 1];
        for &target in old_to_new {
            offsets[target + 1] += 1;
        }
        for i in 0..target_count {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut data = vec![0; old_to_new.len()];
        for (source, &target) in old_to_new.iter().enumerate() {
            data[cursor[target]] = source;
            cursor[target] += 1;
        }
        Self { offsets, data }
    }

    pub(crate) fn target_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub(crate) fn sources(&self, target: usize) -> &[usize] {
        &self.data[self.offsets[target]..self.offsets[target + 1]]
    }
}

/// Renumber mesh vertices through `old_to_new`
///
/// `old_to_new[v]` is the new index of vertex `v`. The mapping must cover
/// every vertex and hit every index in `0..=max`. Triangles keep their count
/// and are rewritten in place; collapsed triangles are kept. Vertex positions
/// come from the lowest source index of each target, attributes follow the
/// collision policies in `options`. Cached edges are rebuilt if present.
#[instrument(level = "debug", skip_all, fields(vertices = mesh.vertex_count()))]
pub fn remap_vertices<const D: usize>(
    mesh: &mut SurfaceMesh<D>,
    old_to_new: &[usize],
    options: RemapVerticesOptions,
) -> Result<()> {
    let vertex_count = mesh.vertex_count();
    if old_to_new.len() != vertex_count {
        return Err(BvhError::MappingSize {
            expected: vertex_count,
            found: old_to_new.len(),
        });
    }
    mesh.validate()?;

    let target_count = old_to_new.iter().max().map_or(0, |&max| max + 1);
    let inverse = InverseMapping::new(old_to_new, target_count);
    if let Some(target) = (0..target_count).find(|&t| inverse.sources(t).is_empty()) {
        return Err(BvhError::MappingNotSurjective { target });
    }

    // Remap attributes first so a collision error leaves the mesh untouched
    let mut remapped = Vec::new();
    for (name, attribute) in mesh.attributes_mut().iter() {
        let channels = attribute.channels;
        let values = match &attribute.values {
            AttributeValues::Float(values) => AttributeValues::Float(remap_rows(
                name,
                values,
                channels,
                &inverse,
                options.collision_policy_float,
                |sum: f64, count| sum / count as f64,
            )?),
            AttributeValues::Integral(values) => AttributeValues::Integral(remap_rows(
                name,
                values,
                channels,
                &inverse,
                options.collision_policy_integral,
                // The mean of i64 values always fits back into i64
                |sum: i128, count| (sum / count as i128) as i64,
            )?),
        };
        remapped.push((name.clone(), values));
    }
    for (name, values) in remapped {
        if let Some(attribute) = mesh.attributes_mut().get_mut(&name) {
            attribute.values = values;
        }
    }

    let vertices: Vec<_> = (0..target_count)
        .into_par_iter()
        .map(|target| mesh.vertices[inverse.sources(target)[0]])
        .collect();
    mesh.vertices = vertices;

    mesh.triangles.par_iter_mut().for_each(|triangle| {
        triangle.indices = triangle.indices.map(|v| old_to_new[v]);
    });

    if mesh.has_edges() {
        mesh.clear_edges();
        mesh.initialize_edges();
    }

    debug!(from = vertex_count, to = target_count, "remapped vertices");
    Ok(())
}

/// Remap one attribute buffer; averages accumulate in `A` so integral sums
/// cannot overflow
fn remap_rows<T, A, F>(
    name: &str,
    values: &[T],
    channels: usize,
    inverse: &InverseMapping,
    policy: MappingPolicy,
    divide: F,
) -> Result<Vec<T>>
where
    T: Copy + Default + Send + Sync,
    A: Copy + Default + AddAssign + From<T>,
    F: Fn(A, usize) -> T + Sync,
{
    if policy == MappingPolicy::Error {
        if let Some(target) =
            (0..inverse.target_count()).find(|&t| inverse.sources(t).len() > 1)
        {
            return Err(BvhError::MappingCollision {
                attribute: name.to_string(),
                target,
            });
        }
    }

    let mut out = vec![T::default(); inverse.target_count() * channels];
    out.par_chunks_mut(channels)
        .enumerate()
        .for_each(|(target, row)| {
            let sources = inverse.sources(target);
            match policy {
                MappingPolicy::Average => {
                    for (channel, slot) in row.iter_mut().enumerate() {
                        let mut sum = A::default();
                        for &source in sources {
                            sum += A::from(values[source * channels + channel]);
                        }
                        *slot = divide(sum, sources.len());
                    }
                }
                MappingPolicy::KeepFirst | MappingPolicy::Error => {
                    let start = sources[0] * channels;
                    row.copy_from_slice(&values[start..start + channels]);
                }
            }
        });
    Ok(out)
}
