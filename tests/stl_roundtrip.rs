// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL round trips through welding

use anyhow::Result;
use polyframe_bvh::geometry::{mesh_utils, shapes};
use polyframe_bvh::{io, weld_vertices, WeldOptions};
use tempfile::NamedTempFile;

#[test]
fn test_stl_export_then_weld() -> Result<()> {
    let original = shapes::uv_sphere(1.0, 16);
    let file = NamedTempFile::with_suffix(".stl")?;
    io::write_stl(&original, file.path())?;

    let metadata = std::fs::metadata(file.path())?;
    // 80-byte header, facet count, 50 bytes per facet
    assert_eq!(metadata.len(), 84 + 50 * original.triangle_count() as u64);

    let mut mesh = io::read_stl(file.path())?;
    assert_eq!(mesh.triangle_count(), original.triangle_count());
    assert_eq!(mesh.vertex_count(), 3 * original.triangle_count());

    let report = weld_vertices(&mut mesh, WeldOptions::with_radius(1e-5))?;
    println!(
        "Welded STL sphere: {} -> {} vertices",
        report.input_vertices, report.output_vertices
    );
    assert_eq!(report.output_vertices, 2 + 15 * 16);
    // Triangles touching the poles collapse but are kept
    let validation = mesh_utils::validate_mesh(&mesh);
    assert_eq!(validation.degenerate_triangle_count, 2 * 16);
    assert_eq!(mesh.triangle_count(), original.triangle_count());
    Ok(())
}

#[test]
fn test_cube_soup_survives_round_trip() -> Result<()> {
    let file = NamedTempFile::with_suffix(".stl")?;
    io::write_stl(&shapes::cube(10.0), file.path())?;

    let mut mesh = io::read_stl(file.path())?;
    weld_vertices(&mut mesh, WeldOptions::default())?;
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh_utils::euler_characteristic(&mesh), 2);
    assert!(mesh_utils::is_vertex_manifold(&mesh));

    // Writing the welded mesh and reading it back produces the soup again
    let welded = NamedTempFile::with_suffix(".stl")?;
    io::write_stl(&mesh, welded.path())?;
    assert_eq!(io::read_stl(welded.path())?.vertex_count(), 36);
    Ok(())
}

#[test]
fn test_missing_file() {
    assert!(io::read_stl("/nonexistent/mesh.stl").is_err());
}
