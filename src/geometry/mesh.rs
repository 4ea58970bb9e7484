// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Surface mesh representation and utilities

use super::attributes::{AttributeValues, VertexAttribute};
use super::edges::EdgeTopology;
use super::BoundingBox;
use crate::error::{BvhError, Result};
use nalgebra::Point;
use std::collections::BTreeMap;

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    /// True when two corners reference the same vertex
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || c == a
    }
}

/// Triangle mesh embedded in `D` dimensions
#[derive(Debug, Clone)]
pub struct SurfaceMesh<const D: usize> {
    pub vertices: Vec<Point<f64, D>>,
    pub triangles: Vec<Triangle>,
    attributes: BTreeMap<String, VertexAttribute>,
    edges: Option<EdgeTopology>,
}

/// Three-dimensional surface mesh
pub type Mesh = SurfaceMesh<3>;

impl<const D: usize> SurfaceMesh<D> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            attributes: BTreeMap::new(),
            edges: None,
        }
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            ..Self::new()
        }
    }

    /// Build a mesh from existing vertices and triangles, checking indices
    pub fn from_parts(vertices: Vec<Point<f64, D>>, triangles: Vec<Triangle>) -> Result<Self> {
        let mesh = Self {
            vertices,
            triangles,
            ..Self::new()
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Check that triangles reference existing vertices and that every
    /// attribute holds one row per vertex
    ///
    /// `vertices` and `triangles` are public, so a mesh edited in place can
    /// break either property.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (element, triangle) in self.triangles.iter().enumerate() {
            if let Some(&vertex) = triangle.indices.iter().find(|&&v| v >= vertex_count) {
                return Err(BvhError::IndexOutOfRange {
                    element,
                    vertex,
                    vertex_count,
                });
            }
        }
        for (name, attribute) in &self.attributes {
            let expected = vertex_count * attribute.channels;
            if attribute.channels == 0 || attribute.values.len() != expected {
                return Err(BvhError::AttributeSize {
                    name: name.clone(),
                    expected,
                    found: attribute.values.len(),
                });
            }
        }
        Ok(())
    }

    /// Build a mesh from flat coordinate and index buffers
    pub fn from_flat(vertex_data: &[f64], triangle_data: &[usize]) -> Result<Self> {
        if vertex_data.len() % D != 0 {
            return Err(BvhError::InvalidVertexData {
                len: vertex_data.len(),
                dim: D,
            });
        }
        if triangle_data.len() % 3 != 0 {
            return Err(BvhError::ArityMismatch {
                kind: crate::bvh::ElementKind::Triangle,
                expected: 3,
                found: triangle_data.len() % 3,
            });
        }

        let vertices = vertex_data
            .chunks_exact(D)
            .map(Point::from_slice)
            .collect();
        let triangles = triangle_data
            .chunks_exact(3)
            .map(|chunk| Triangle::new([chunk[0], chunk[1], chunk[2]]))
            .collect();
        Self::from_parts(vertices, triangles)
    }

    /// Add a vertex and return its index
    ///
    /// Existing attributes grow by a zero row.
    pub fn add_vertex(&mut self, position: Point<f64, D>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        for attribute in self.attributes.values_mut() {
            attribute.pad(1);
        }
        self.edges = None;
        index
    }

    /// Add a triangle and return its index
    pub fn add_triangle(&mut self, indices: [usize; 3]) -> usize {
        let index = self.triangles.len();
        self.triangles.push(Triangle::new(indices));
        self.edges = None;
        index
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Corner positions of one triangle
    pub fn triangle_vertices(&self, triangle: usize) -> [Point<f64, D>; 3] {
        self.triangles[triangle].indices.map(|v| self.vertices[v])
    }

    pub fn bounding_box(&self) -> BoundingBox<D> {
        BoundingBox::from_points(&self.vertices)
    }

    /// Append another mesh, offsetting its indices
    ///
    /// Attributes of `self` are extended with the matching rows of `other`,
    /// or zero rows when `other` lacks them.
    pub fn merge(&mut self, other: &SurfaceMesh<D>) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        for (name, attribute) in self.attributes.iter_mut() {
            attribute.extend_from(other.attributes.get(name), other.vertex_count());
        }

        for triangle in &other.triangles {
            self.triangles
                .push(Triangle::new(triangle.indices.map(|v| v + offset)));
        }
        self.edges = None;
    }

    /// Combine several meshes into one
    pub fn combine<'a, I>(meshes: I) -> Self
    where
        I: IntoIterator<Item = &'a SurfaceMesh<D>>,
    {
        let mut combined = Self::new();
        for mesh in meshes {
            combined.merge(mesh);
        }
        combined
    }

    /// Register a vertex attribute; the buffer must hold `vertex_count * channels` values
    pub fn create_attribute(
        &mut self,
        name: &str,
        channels: usize,
        values: AttributeValues,
    ) -> Result<()> {
        if self.attributes.contains_key(name) {
            return Err(BvhError::DuplicateAttribute(name.to_string()));
        }
        let expected = self.vertices.len() * channels;
        if values.len() != expected || channels == 0 {
            return Err(BvhError::AttributeSize {
                name: name.to_string(),
                expected,
                found: values.len(),
            });
        }
        self.attributes
            .insert(name.to_string(), VertexAttribute { channels, values });
        Ok(())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attribute(&self, name: &str) -> Result<&VertexAttribute> {
        self.attributes
            .get(name)
            .ok_or_else(|| BvhError::MissingAttribute(name.to_string()))
    }

    pub fn remove_attribute(&mut self, name: &str) -> Result<VertexAttribute> {
        self.attributes
            .remove(name)
            .ok_or_else(|| BvhError::MissingAttribute(name.to_string()))
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut BTreeMap<String, VertexAttribute> {
        &mut self.attributes
    }

    /// Compute edge connectivity if it is not already available
    pub fn initialize_edges(&mut self) -> &EdgeTopology {
        let triangles = &self.triangles;
        self.edges
            .get_or_insert_with(|| EdgeTopology::build(triangles))
    }

    pub fn has_edges(&self) -> bool {
        self.edges.is_some()
    }

    pub fn edges(&self) -> Result<&EdgeTopology> {
        self.edges.as_ref().ok_or(BvhError::EdgesNotInitialized)
    }

    pub fn is_boundary_edge(&self, edge: usize) -> Result<bool> {
        Ok(self.edges()?.is_boundary_edge(edge))
    }

    /// Drop cached connectivity after the triangles changed
    pub fn clear_edges(&mut self) {
        self.edges = None;
    }
}

impl<const D: usize> Default for SurfaceMesh<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point2, Point3};

    #[test]
    fn test_from_flat() {
        let mesh =
            SurfaceMesh::<2>::from_flat(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], &[0, 1, 2]).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices[2], Point2::new(0.0, 1.0));
    }

    #[test]
    fn test_from_flat_rejects_bad_shapes() {
        assert!(matches!(
            SurfaceMesh::<3>::from_flat(&[0.0, 1.0], &[]),
            Err(BvhError::InvalidVertexData { len: 2, dim: 3 })
        ));
        assert!(matches!(
            SurfaceMesh::<2>::from_flat(&[0.0, 0.0], &[0, 0, 1]),
            Err(BvhError::IndexOutOfRange { vertex: 1, .. })
        ));
    }

    #[test]
    fn test_merge_offsets_and_attributes() {
        let mut a = Mesh::new();
        a.add_vertex(Point3::new(0.0, 0.0, 0.0));
        a.add_vertex(Point3::new(1.0, 0.0, 0.0));
        a.add_vertex(Point3::new(0.0, 1.0, 0.0));
        a.add_triangle([0, 1, 2]);
        a.create_attribute("id", 1, AttributeValues::Integral(vec![1, 2, 3]))
            .unwrap();

        let b = a.clone();
        let mut c = a.clone();
        c.remove_attribute("id").unwrap();

        a.merge(&b);
        a.merge(&c);
        assert_eq!(a.vertex_count(), 9);
        assert_eq!(a.triangles[2].indices, [6, 7, 8]);
        assert_eq!(
            a.attribute("id").unwrap().as_integral(),
            Some(&[1, 2, 3, 1, 2, 3, 0, 0, 0][..])
        );
    }

    #[test]
    fn test_attribute_errors() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::origin());
        assert!(matches!(
            mesh.create_attribute("uv", 2, AttributeValues::Float(vec![0.0])),
            Err(BvhError::AttributeSize { expected: 2, found: 1, .. })
        ));
        mesh.create_attribute("uv", 2, AttributeValues::Float(vec![0.0, 1.0]))
            .unwrap();
        assert!(matches!(
            mesh.create_attribute("uv", 2, AttributeValues::Float(vec![0.0, 1.0])),
            Err(BvhError::DuplicateAttribute(_))
        ));
        assert!(matches!(mesh.attribute("normal"), Err(BvhError::MissingAttribute(_))));
    }

    #[test]
    fn test_validate_after_direct_edits() {
        let mut mesh = Mesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            mesh.add_vertex(Point3::from(p));
        }
        mesh.add_triangle([0, 1, 2]);
        mesh.create_attribute("id", 1, AttributeValues::Integral(vec![0, 1, 2]))
            .unwrap();
        assert!(mesh.validate().is_ok());

        mesh.triangles.push(Triangle::new([2, 1, 3]));
        assert!(matches!(
            mesh.validate(),
            Err(BvhError::IndexOutOfRange { element: 1, vertex: 3, vertex_count: 3 })
        ));

        mesh.triangles.pop();
        mesh.vertices.push(Point3::new(1.0, 1.0, 0.0));
        assert!(matches!(
            mesh.validate(),
            Err(BvhError::AttributeSize { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_edges_lifecycle() {
        let mut mesh = Mesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            mesh.add_vertex(Point3::from(p));
        }
        mesh.add_triangle([0, 1, 2]);
        assert!(matches!(mesh.edges(), Err(BvhError::EdgesNotInitialized)));

        assert_eq!(mesh.initialize_edges().edge_count(), 3);
        assert!(mesh.is_boundary_edge(0).unwrap());

        mesh.add_triangle([0, 2, 1]);
        assert!(!mesh.has_edges());
    }
}
