// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export

use crate::error::{BvhError, Result};
use crate::geometry::Mesh;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::{debug, instrument};

/// Read an STL file (ASCII or binary) as a triangle soup
///
/// Every facet gets three fresh vertices, so shared corners are duplicated
/// until the mesh is welded.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn read_stl(path: impl AsRef<Path>) -> Result<Mesh> {
    let mut file = File::open(path.as_ref())?;
    read_stl_from(&mut file)
}

/// Read STL data from any seekable reader
pub fn read_stl_from<R: Read + Seek>(reader: &mut R) -> Result<Mesh> {
    let stl = stl_io::read_stl(reader).map_err(|e| BvhError::Stl(e.to_string()))?;

    let mut mesh = Mesh::with_capacity(stl.faces.len() * 3, stl.faces.len());
    for (facet, face) in stl.faces.iter().enumerate() {
        let mut corners = [0; 3];
        for (corner, &index) in corners.iter_mut().zip(&face.vertices) {
            let v = stl.vertices.get(index).ok_or_else(|| {
                BvhError::Stl(format!("facet {facet} references missing vertex {index}"))
            })?;
            *corner = mesh.add_vertex(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
        }
        mesh.add_triangle(corners);
    }

    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "read STL"
    );
    Ok(mesh)
}

/// Write a mesh as binary STL
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn write_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_stl_to(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as binary STL to any writer
///
/// Facet normals are computed from the triangle winding. Degenerate
/// triangles get a zero normal.
pub fn write_stl_to<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|triangle| {
            let [a, b, c] = triangle.indices.map(|v| mesh.vertices[v]);
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            StlTriangle {
                normal: Normal::new(to_f32(&normal)),
                vertices: [
                    StlVertex::new(to_f32(&a.coords)),
                    StlVertex::new(to_f32(&b.coords)),
                    StlVertex::new(to_f32(&c.coords)),
                ],
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())?;
    debug!(triangles = triangles.len(), "wrote STL");
    Ok(())
}

fn to_f32(v: &Vector3<f64>) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}
