// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Queries against a built AABB tree
//!
//! All queries are read-only and may run concurrently on a shared tree.
//! Traversals use an explicit stack; subtrees are pruned by the squared
//! distance from the query point to their bounding box.

use super::element::Element;
use super::node::NodeKind;
use super::tree::AabbTree;
use crate::geometry::BoundingBox;
use nalgebra::Point;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, instrument};

/// Result of a closest-point query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint<const D: usize> {
    /// Element containing the closest point
    pub element: usize,
    pub point: Point<f64, D>,
    pub squared_distance: f64,
    /// Vertex of `element` nearest to `point`
    ///
    /// Only the vertices of the winning element are considered, so this is
    /// not necessarily the globally nearest mesh vertex.
    pub closest_vertex: usize,
}

/// Element reported by radius and k-nearest queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHit<const D: usize> {
    pub element: usize,
    pub point: Point<f64, D>,
    pub squared_distance: f64,
}

impl<const D: usize> ElementHit<D> {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.squared_distance
            .total_cmp(&other.squared_distance)
            .then(self.element.cmp(&other.element))
    }
}

/// Max-heap entry ordered by (squared distance, element)
struct HeapEntry<const D: usize>(ElementHit<D>);

impl<const D: usize> PartialEq for HeapEntry<D> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<const D: usize> Eq for HeapEntry<D> {}

impl<const D: usize> PartialOrd for HeapEntry<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const D: usize> Ord for HeapEntry<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.key_cmp(&other.0)
    }
}

impl<E: Element, const D: usize> AabbTree<E, D> {
    /// Closest element to `query`, or `None` on an empty tree
    ///
    /// Equidistant elements resolve to the lowest element index.
    pub fn get_closest_point(&self, query: &Point<f64, D>) -> Option<ClosestPoint<D>> {
        self.get_closest_point_filtered(query, |_| true)
    }

    /// Closest element among those accepted by `filter`
    ///
    /// Returns `None` when the tree is empty or `filter` rejects every
    /// element.
    pub fn get_closest_point_filtered<F>(
        &self,
        query: &Point<f64, D>,
        filter: F,
    ) -> Option<ClosestPoint<D>>
    where
        F: Fn(usize) -> bool,
    {
        let mut best: Option<(usize, Point<f64, D>)> = None;
        let mut best_distance = f64::INFINITY;

        let mut stack = Vec::with_capacity(64);
        if !self.nodes.is_empty() {
            stack.push(0);
        }

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            // Equal distances are still visited so ties reach the lowest index
            if node.bbox.squared_distance(query) > best_distance {
                continue;
            }

            match node.kind {
                NodeKind::Leaf { element } => {
                    if !filter(element) {
                        continue;
                    }
                    let (point, distance) =
                        E::closest_point(&self.vertices, &self.elements[element], query);
                    let improves = match best {
                        None => distance <= best_distance,
                        Some((current, _)) => {
                            distance < best_distance
                                || (distance == best_distance && element < current)
                        }
                    };
                    if improves {
                        best = Some((element, point));
                        best_distance = distance;
                    }
                }
                NodeKind::Internal { left, right } => {
                    let left_distance = self.nodes[left].bbox.squared_distance(query);
                    let right_distance = self.nodes[right].bbox.squared_distance(query);
                    // Nearer child is pushed last so it is explored first
                    let (near, far) = if right_distance < left_distance {
                        ((right, right_distance), (left, left_distance))
                    } else {
                        ((left, left_distance), (right, right_distance))
                    };
                    if far.1 <= best_distance {
                        stack.push(far.0);
                    }
                    if near.1 <= best_distance {
                        stack.push(near.0);
                    }
                }
            }
        }

        best.map(|(element, point)| ClosestPoint {
            element,
            point,
            squared_distance: best_distance,
            closest_vertex: self.closest_vertex_of(element, &point),
        })
    }

    /// Closest point on one given element, `None` if the element does not exist
    pub fn get_element_closest_point(
        &self,
        query: &Point<f64, D>,
        element: usize,
    ) -> Option<ClosestPoint<D>> {
        let indices = self.elements.get(element)?;
        let (point, squared_distance) = E::closest_point(&self.vertices, indices, query);
        Some(ClosestPoint {
            element,
            point,
            squared_distance,
            closest_vertex: self.closest_vertex_of(element, &point),
        })
    }

    /// Invoke `callback(squared_distance, element, closest_point)` for every
    /// element within `squared_radius` of `query` (inclusive)
    ///
    /// The comparison is done in floating point, so elements right at the
    /// radius may go either way. Callback order is unspecified.
    pub fn foreach_element_in_radius<F>(&self, query: &Point<f64, D>, squared_radius: f64, mut callback: F)
    where
        F: FnMut(f64, usize, &Point<f64, D>),
    {
        let mut stack = Vec::with_capacity(64);
        if !self.nodes.is_empty() {
            stack.push(0);
        }

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.bbox.squared_distance(query) > squared_radius {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { element } => {
                    let (point, distance) =
                        E::closest_point(&self.vertices, &self.elements[element], query);
                    if distance <= squared_radius {
                        callback(distance, element, &point);
                    }
                }
                NodeKind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }

    /// Elements within `squared_radius`, sorted by distance then element index
    pub fn elements_in_radius(&self, query: &Point<f64, D>, squared_radius: f64) -> Vec<ElementHit<D>> {
        let mut hits = Vec::new();
        self.foreach_element_in_radius(query, squared_radius, |squared_distance, element, point| {
            hits.push(ElementHit {
                element,
                point: *point,
                squared_distance,
            });
        });
        hits.sort_by(ElementHit::key_cmp);
        hits
    }

    /// Invoke `callback(element)` for every element that exactly contains `query`
    ///
    /// Containment uses exact orientation predicates, never a distance
    /// threshold.
    pub fn foreach_element_containing<F>(&self, query: &Point<f64, D>, mut callback: F)
    where
        F: FnMut(usize),
    {
        let mut stack = Vec::with_capacity(64);
        if !self.nodes.is_empty() {
            stack.push(0);
        }

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.bbox.contains_point(query) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { element } => {
                    if E::contains(&self.vertices, &self.elements[element], query) {
                        callback(element);
                    }
                }
                NodeKind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }

    /// Elements containing `query`, in increasing index order
    pub fn elements_containing(&self, query: &Point<f64, D>) -> Vec<usize> {
        let mut found = Vec::new();
        self.foreach_element_containing(query, |element| found.push(element));
        found.sort_unstable();
        found
    }

    /// Closest point for every query, computed in parallel
    ///
    /// Results are in query order. Each entry is `None` only when the tree
    /// is empty.
    #[instrument(level = "debug", skip_all, fields(queries = queries.len(), elements = self.len()))]
    pub fn batch_closest_point(&self, queries: &[Point<f64, D>]) -> Vec<Option<ClosestPoint<D>>> {
        let results: Vec<_> = queries
            .par_iter()
            .map(|query| self.get_closest_point(query))
            .collect();
        debug!(resolved = results.iter().filter(|r| r.is_some()).count(), "batch closest point done");
        results
    }

    /// Invoke `callback(element)` for every element whose box intersects `bbox`
    ///
    /// Traversal stops as soon as `callback` returns `false`. Returns `false`
    /// if it was stopped early.
    pub fn intersect_box<F>(&self, bbox: &BoundingBox<D>, mut callback: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        let mut stack = Vec::with_capacity(64);
        if !self.nodes.is_empty() {
            stack.push(0);
        }

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.bbox.intersects(bbox) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { element } => {
                    if !callback(element) {
                        return false;
                    }
                }
                NodeKind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        true
    }

    /// First element in traversal order whose box intersects `bbox`
    pub fn intersect_first(&self, bbox: &BoundingBox<D>) -> Option<usize> {
        let mut found = None;
        self.intersect_box(bbox, |element| {
            found = Some(element);
            false
        });
        found
    }

    /// The `k` elements nearest to `query`, sorted by distance then index
    pub fn k_nearest(&self, query: &Point<f64, D>, k: usize) -> Vec<ElementHit<D>> {
        if k == 0 || self.nodes.is_empty() {
            return Vec::new();
        }

        let mut heap: BinaryHeap<HeapEntry<D>> = BinaryHeap::with_capacity(k + 1);
        let worst = |heap: &BinaryHeap<HeapEntry<D>>| {
            if heap.len() < k {
                f64::INFINITY
            } else {
                heap.peek().map_or(f64::INFINITY, |top| top.0.squared_distance)
            }
        };

        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.bbox.squared_distance(query) > worst(&heap) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { element } => {
                    let (point, squared_distance) =
                        E::closest_point(&self.vertices, &self.elements[element], query);
                    let hit = HeapEntry(ElementHit {
                        element,
                        point,
                        squared_distance,
                    });
                    if heap.len() < k {
                        heap.push(hit);
                    } else if heap.peek().is_some_and(|top| hit < *top) {
                        heap.pop();
                        heap.push(hit);
                    }
                }
                NodeKind::Internal { left, right } => {
                    let left_distance = self.nodes[left].bbox.squared_distance(query);
                    let right_distance = self.nodes[right].bbox.squared_distance(query);
                    if right_distance < left_distance {
                        stack.push(left);
                        stack.push(right);
                    } else {
                        stack.push(right);
                        stack.push(left);
                    }
                }
            }
        }

        let mut hits: Vec<ElementHit<D>> = heap.into_iter().map(|entry| entry.0).collect();
        hits.sort_by(ElementHit::key_cmp);
        hits
    }

    /// Global index of the vertex of `element` nearest to `point`, first corner on ties
    fn closest_vertex_of(&self, element: usize, point: &Point<f64, D>) -> usize {
        let corners = self.elements[element].as_ref();
        let mut best = corners[0];
        let mut best_distance = (self.vertices[best] - point).norm_squared();
        for &vertex in &corners[1..] {
            let distance = (self.vertices[vertex] - point).norm_squared();
            if distance < best_distance {
                best = vertex;
                best_distance = distance;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use crate::bvh::{EdgeTree, PointTree, TriangleTree};
    use crate::geometry::{shapes, BoundingBox};
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Point3};

    fn two_triangles() -> TriangleTree<3> {
        TriangleTree::from_flat(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
            &[0, 1, 2, 1, 3, 2],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_closest_point_on_empty_tree() {
        let tree = TriangleTree::<3>::new(Vec::new(), Vec::new()).unwrap();
        assert!(tree.get_closest_point(&Point3::origin()).is_none());
        assert!(tree.k_nearest(&Point3::origin(), 3).is_empty());
        assert!(tree.elements_in_radius(&Point3::origin(), 1.0).is_empty());
        assert_eq!(tree.batch_closest_point(&[Point3::origin()]), vec![None]);
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        let tree = two_triangles();
        // On the shared edge, both triangles are at distance zero
        let result = tree.get_closest_point(&Point3::new(0.5, 0.5, 0.0)).unwrap();
        assert_eq!(result.element, 0);

        // Above the shared edge, still equidistant
        let result = tree.get_closest_point(&Point3::new(0.5, 0.5, 2.0)).unwrap();
        assert_eq!(result.element, 0);
        assert_relative_eq!(result.squared_distance, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_filter_skips_elements() {
        let tree = two_triangles();
        let result = tree
            .get_closest_point_filtered(&Point3::new(0.1, 0.1, 0.0), |e| e != 0)
            .unwrap();
        assert_eq!(result.element, 1);
        assert_relative_eq!(result.point, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(result.squared_distance, 0.32, epsilon = 1e-12);

        assert!(tree
            .get_closest_point_filtered(&Point3::origin(), |_| false)
            .is_none());
    }

    #[test]
    fn test_closest_vertex_is_local_to_element() {
        let tree = two_triangles();
        let result = tree.get_closest_point(&Point3::new(2.0, 2.0, 0.0)).unwrap();
        assert_eq!(result.element, 1);
        assert_eq!(result.closest_vertex, 3);

        let result = tree
            .get_element_closest_point(&Point3::new(2.0, 2.0, 0.0), 0)
            .unwrap();
        assert_relative_eq!(result.point, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        assert_eq!(result.closest_vertex, 1);
        assert!(tree.get_element_closest_point(&Point3::origin(), 2).is_none());
    }

    #[test]
    fn test_radius_is_inclusive() {
        let tree = PointTree::from_point_cloud(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(3.0, 0.0),
        ])
        .unwrap();
        let hits = tree.elements_in_radius(&Point2::new(0.0, 0.0), 1.0);
        let ids: Vec<usize> = hits.iter().map(|h| h.element).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(hits[1].squared_distance, 1.0);
    }

    #[test]
    fn test_containment_is_exact() {
        let tree = EdgeTree::<2>::from_flat(&[0.0, 0.0, 3.0, 1.0, 3.0, 0.0], &[0, 1, 1, 2], 2).unwrap();
        assert_eq!(tree.elements_containing(&Point2::new(3.0, 1.0)), vec![0, 1]);
        assert!(tree.elements_containing(&Point2::new(1.0, 1.0 / 3.0)).is_empty());
        assert_eq!(tree.elements_containing(&Point2::new(3.0, 0.5)), vec![1]);
    }

    #[test]
    fn test_intersect_box() {
        let tree = TriangleTree::from_mesh(&shapes::grid(4, 1, 1.0)).unwrap();
        let query = BoundingBox::new(Point3::new(3.5, -1.0, -1.0), Point3::new(10.0, 2.0, 1.0));
        let mut hits = Vec::new();
        assert!(tree.intersect_box(&query, |e| {
            hits.push(e);
            true
        }));
        hits.sort_unstable();
        assert_eq!(hits, vec![6, 7]);
        assert!(matches!(tree.intersect_first(&query), Some(6 | 7)));

        let mut visited = 0;
        assert!(!tree.intersect_box(&query, |_| {
            visited += 1;
            false
        }));
        assert_eq!(visited, 1);

        let far = BoundingBox::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        assert_eq!(tree.intersect_first(&far), None);
    }

    #[test]
    fn test_k_nearest() {
        let points: Vec<Point2<f64>> = (0..10).map(|i| Point2::new(i as f64, 0.0)).collect();
        let tree = PointTree::from_point_cloud(points).unwrap();
        let hits = tree.k_nearest(&Point2::new(4.5, 0.0), 3);
        let ids: Vec<usize> = hits.iter().map(|h| h.element).collect();
        assert_eq!(ids, vec![4, 5, 3]);
        assert_eq!(tree.k_nearest(&Point2::new(0.0, 0.0), 20).len(), 10);
    }
}
