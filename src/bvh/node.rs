// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arena node of an AABB tree

use crate::geometry::BoundingBox;

/// Leaf or internal payload of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Holds exactly one element
    Leaf { element: usize },
    /// Indices of the two children in the node arena
    Internal { left: usize, right: usize },
}

/// BVH node
#[derive(Debug, Clone)]
pub struct Node<const D: usize> {
    /// Bounding box of every element below this node
    pub bbox: BoundingBox<D>,
    /// Parent node, `None` for the root
    pub parent: Option<usize>,
    pub kind: NodeKind,
}

impl<const D: usize> Node<D> {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn element(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf { element } => Some(element),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(usize, usize)> {
        match self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { left, right } => Some((left, right)),
        }
    }
}
