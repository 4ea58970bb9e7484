// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types shared by tree construction, queries and welding

use crate::bvh::ElementKind;
use thiserror::Error;

/// Errors reported by the BVH engine
#[derive(Debug, Error)]
pub enum BvhError {
    /// Flat vertex buffer length is not a multiple of the dimension
    #[error("vertex buffer of length {len} cannot be split into {dim}-dimensional points")]
    InvalidVertexData { len: usize, dim: usize },

    /// Element column count does not match the element kind
    #[error("{kind} elements have {expected} vertices, got {found}")]
    ArityMismatch {
        kind: ElementKind,
        expected: usize,
        found: usize,
    },

    /// An element references a vertex that does not exist
    #[error("element {element} references vertex {vertex}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        element: usize,
        vertex: usize,
        vertex_count: usize,
    },

    /// A vertex has a NaN or infinite coordinate
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex { vertex: usize },

    /// Operation not available for this element kind
    #[error("{operation} is not supported by {kind} trees")]
    Unsupported {
        kind: ElementKind,
        operation: &'static str,
    },

    /// Weld radius is negative or NaN
    #[error("weld radius must be >= 0, got {0}")]
    InvalidRadius(f64),

    /// Vertex mapping length differs from the vertex count
    #[error("vertex mapping has {found} entries, mesh has {expected} vertices")]
    MappingSize { expected: usize, found: usize },

    /// Some target vertex receives no source vertex
    #[error("vertex mapping is not surjective: no vertex maps to {target}")]
    MappingNotSurjective { target: usize },

    /// Collision under `MappingPolicy::Error`
    #[error("attribute `{attribute}` does not allow collisions, but several vertices map to {target}")]
    MappingCollision { attribute: String, target: usize },

    #[error("attribute `{0}` already exists")]
    DuplicateAttribute(String),

    #[error("attribute `{0}` does not exist")]
    MissingAttribute(String),

    /// Attribute buffer does not hold `vertex_count * channels` values
    #[error("attribute `{name}` expects {expected} values, got {found}")]
    AttributeSize {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("mesh edges have not been initialized")]
    EdgesNotInitialized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid STL data: {0}")]
    Stl(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for BVH operations
pub type Result<T> = std::result::Result<T, BvhError>;
