// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! AABB tree construction
//!
//! Nodes live in a flat arena in preorder: the root is node 0 and the left
//! child of an internal node immediately follows it. A tree over `N`
//! elements has exactly `2N - 1` nodes, or none when `N == 0`.

use super::element::{EdgeElement, Element, PointElement, TriangleElement};
use super::node::{Node, NodeKind};
use crate::error::{BvhError, Result};
use crate::geometry::{BoundingBox, EdgeTopology, SurfaceMesh};
use nalgebra::Point;
use rayon::prelude::*;
use std::marker::PhantomData;
use tracing::{debug, instrument};

/// Bounding volume hierarchy over elements of kind `E` in `D` dimensions
///
/// The tree owns a snapshot of the vertex positions and element indices it
/// was built from, and is immutable afterwards.
#[derive(Debug, Clone)]
pub struct AabbTree<E: Element, const D: usize> {
    pub(crate) vertices: Vec<Point<f64, D>>,
    pub(crate) elements: Vec<E::Indices>,
    pub(crate) nodes: Vec<Node<D>>,
    marker: PhantomData<E>,
}

pub type TriangleTree<const D: usize> = AabbTree<TriangleElement, D>;
pub type EdgeTree<const D: usize> = AabbTree<EdgeElement, D>;
pub type PointTree<const D: usize> = AabbTree<PointElement, D>;

impl<E: Element, const D: usize> AabbTree<E, D> {
    /// Build a tree over `elements`, which index into `vertices`
    ///
    /// Fails on non-finite vertex coordinates and out-of-range indices.
    /// Empty inputs produce an empty tree.
    #[instrument(level = "debug", skip_all, fields(vertices = vertices.len(), elements = elements.len()))]
    pub fn new(vertices: Vec<Point<f64, D>>, elements: Vec<E::Indices>) -> Result<Self> {
        if let Some(vertex) = vertices
            .iter()
            .position(|v| v.coords.iter().any(|c| !c.is_finite()))
        {
            return Err(BvhError::NonFiniteVertex { vertex });
        }

        for (element, indices) in elements.iter().enumerate() {
            if let Some(&vertex) = indices.as_ref().iter().find(|&&v| v >= vertices.len()) {
                return Err(BvhError::IndexOutOfRange {
                    element,
                    vertex,
                    vertex_count: vertices.len(),
                });
            }
        }

        let nodes = build_nodes::<E, D>(&vertices, &elements);
        debug!(kind = %E::KIND, nodes = nodes.len(), "built AABB tree");

        Ok(Self {
            vertices,
            elements,
            nodes,
            marker: PhantomData,
        })
    }

    /// Build from flat row-major buffers
    ///
    /// `vertex_data` holds `D` coordinates per vertex and `element_data`
    /// holds `columns` indices per element. `columns` must match the
    /// element kind.
    pub fn from_flat(vertex_data: &[f64], element_data: &[usize], columns: usize) -> Result<Self> {
        let arity = E::KIND.arity();
        if columns != arity {
            return Err(BvhError::ArityMismatch {
                kind: E::KIND,
                expected: arity,
                found: columns,
            });
        }
        if vertex_data.len() % D != 0 {
            return Err(BvhError::InvalidVertexData {
                len: vertex_data.len(),
                dim: D,
            });
        }
        if element_data.len() % arity != 0 {
            return Err(BvhError::ArityMismatch {
                kind: E::KIND,
                expected: arity,
                found: element_data.len() % arity,
            });
        }

        let vertices = vertex_data.chunks_exact(D).map(Point::from_slice).collect();
        let elements = element_data.chunks_exact(arity).map(E::pack).collect();
        Self::new(vertices, elements)
    }

    /// Build a tree whose elements are the given points
    ///
    /// Only point trees support this; other kinds report
    /// [`BvhError::Unsupported`].
    pub fn from_point_cloud(points: Vec<Point<f64, D>>) -> Result<Self> {
        if E::KIND.arity() != 1 {
            return Err(BvhError::Unsupported {
                kind: E::KIND,
                operation: "point cloud construction",
            });
        }
        let elements = (0..points.len()).map(|i| E::pack(&[i])).collect();
        Self::new(points, elements)
    }

    /// True when no element was indexed
    pub fn empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of indexed elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    pub fn nodes(&self) -> &[Node<D>] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&Node<D>> {
        self.nodes.first()
    }

    pub fn vertices(&self) -> &[Point<f64, D>] {
        &self.vertices
    }

    /// Vertex indices of `element`, or `None` if no such element exists
    pub fn element_indices(&self, element: usize) -> Option<&[usize]> {
        self.elements.get(element).map(|indices| indices.as_ref())
    }

    pub fn element_bbox(&self, element: usize) -> Option<BoundingBox<D>> {
        let indices = self.elements.get(element)?;
        Some(E::bounding_box(&self.vertices, indices))
    }

    /// Length of the longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = Vec::new();
        if !self.nodes.is_empty() {
            stack.push((0, 0));
        }
        while let Some((index, level)) = stack.pop() {
            depth = depth.max(level);
            if let Some((left, right)) = self.nodes[index].children() {
                stack.push((left, level + 1));
                stack.push((right, level + 1));
            }
        }
        depth
    }

    /// Verify the structural invariants of the tree
    ///
    /// Checks the node count, parent links, that every element appears in
    /// exactly one leaf whose box is the element's box, and that every
    /// child box is contained in its parent's box.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let n = self.elements.len();
        if n == 0 {
            return if self.nodes.is_empty() {
                Ok(())
            } else {
                Err(format!("empty tree has {} nodes", self.nodes.len()))
            };
        }
        if self.nodes.len() != 2 * n - 1 {
            return Err(format!(
                "expected {} nodes for {} elements, found {}",
                2 * n - 1,
                n,
                self.nodes.len()
            ));
        }
        if self.nodes[0].parent.is_some() {
            return Err("root has a parent".to_string());
        }

        let mut seen = vec![false; n];
        for (index, node) in self.nodes.iter().enumerate() {
            match node.kind {
                NodeKind::Leaf { element } => {
                    if element >= n || std::mem::replace(&mut seen[element], true) {
                        return Err(format!("leaf {index} holds invalid or repeated element {element}"));
                    }
                    if self.element_bbox(element) != Some(node.bbox) {
                        return Err(format!("leaf {index} box does not bound element {element}"));
                    }
                }
                NodeKind::Internal { left, right } => {
                    for child in [left, right] {
                        let Some(child_node) = self.nodes.get(child) else {
                            return Err(format!("node {index} has missing child {child}"));
                        };
                        if child_node.parent != Some(index) {
                            return Err(format!("node {child} does not point back to {index}"));
                        }
                        if !node.bbox.contains(&child_node.bbox) {
                            return Err(format!("node {child} box escapes its parent {index}"));
                        }
                    }
                }
            }
        }

        match seen.iter().position(|&s| !s) {
            Some(element) => Err(format!("element {element} has no leaf")),
            None => Ok(()),
        }
    }
}

impl<const D: usize> AabbTree<TriangleElement, D> {
    /// Triangle tree over a surface mesh
    pub fn from_mesh(mesh: &SurfaceMesh<D>) -> Result<Self> {
        let elements = mesh.triangles.iter().map(|t| t.indices).collect();
        Self::new(mesh.vertices.clone(), elements)
    }
}

impl<const D: usize> AabbTree<EdgeElement, D> {
    /// Edge tree over the unique edges of a surface mesh
    ///
    /// Element ids follow the edge numbering of [`EdgeTopology`].
    pub fn from_mesh_edges(mesh: &SurfaceMesh<D>) -> Result<Self> {
        let topology = EdgeTopology::build(&mesh.triangles);
        Self::new(mesh.vertices.clone(), topology.edges().to_vec())
    }
}

/// Top-down median split on the longest axis of the centroid box
fn build_nodes<E: Element, const D: usize>(
    vertices: &[Point<f64, D>],
    elements: &[E::Indices],
) -> Vec<Node<D>> {
    if elements.is_empty() {
        return Vec::new();
    }

    let boxes: Vec<BoundingBox<D>> = elements
        .par_iter()
        .map(|indices| E::bounding_box(vertices, indices))
        .collect();
    let centroids: Vec<Point<f64, D>> = elements
        .par_iter()
        .map(|indices| E::centroid(vertices, indices))
        .collect();

    let mut order: Vec<usize> = (0..elements.len()).collect();
    let mut builder = Builder {
        boxes: &boxes,
        centroids: &centroids,
        nodes: Vec::with_capacity(2 * elements.len() - 1),
    };
    builder.build(&mut order, None);
    builder.nodes
}

struct Builder<'a, const D: usize> {
    boxes: &'a [BoundingBox<D>],
    centroids: &'a [Point<f64, D>],
    nodes: Vec<Node<D>>,
}

impl<const D: usize> Builder<'_, D> {
    fn build(&mut self, order: &mut [usize], parent: Option<usize>) -> usize {
        let index = self.nodes.len();

        if let [element] = *order {
            self.nodes.push(Node {
                bbox: self.boxes[element],
                parent,
                kind: NodeKind::Leaf { element },
            });
            return index;
        }

        // Reserve the slot so children land after their parent
        self.nodes.push(Node {
            bbox: BoundingBox::empty(),
            parent,
            kind: NodeKind::Leaf { element: order[0] },
        });

        let centroid_box = BoundingBox::from_points(order.iter().map(|&e| &self.centroids[e]));
        let axis = centroid_box.longest_axis();
        let mid = order.len() / 2;
        let centroids = self.centroids;
        order.select_nth_unstable_by(mid, |&a, &b| {
            centroids[a][axis]
                .total_cmp(&centroids[b][axis])
                .then(a.cmp(&b))
        });

        let (left_order, right_order) = order.split_at_mut(mid);
        let left = self.build(left_order, Some(index));
        let right = self.build(right_order, Some(index));

        let bbox = BoundingBox::union(&self.nodes[left].bbox, &self.nodes[right].bbox);
        let node = &mut self.nodes[index];
        node.bbox = bbox;
        node.kind = NodeKind::Internal { left, right };
        index
    }
}
