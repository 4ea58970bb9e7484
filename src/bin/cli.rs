// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe BVH CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use nalgebra::Point3;
use polyframe_bvh::geometry::mesh_utils;
use polyframe_bvh::{io, logging, weld_vertices, EngineConfig, Mesh, TriangleTree, WeldOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "polyframe-bvh")]
#[command(about = "Polyframe BVH - AABB trees, closest-point queries and vertex welding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./polyframe-bvh.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Worker threads
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Weld nearby vertices of an STL mesh
    Weld {
        /// Input STL file
        input: PathBuf,

        /// Output STL file
        #[arg(short, long)]
        output: PathBuf,

        /// Weld radius
        #[arg(short, long)]
        radius: Option<f64>,

        /// Only weld vertices on boundary or non-manifold edges
        #[arg(short, long)]
        boundary_only: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Closest points on an STL mesh for query points given as x,y,z
    Closest {
        /// Input STL file
        input: PathBuf,

        /// Query points, e.g. 1.0,2.0,0.5
        #[arg(required = true, allow_hyphen_values = true)]
        points: Vec<String>,
    },

    /// Show mesh and tree statistics
    Stats {
        /// Input STL file
        input: PathBuf,

        /// Weld with this radius before reporting connectivity
        #[arg(short, long)]
        weld: Option<f64>,

        /// Print connectivity as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = EngineConfig::from_file(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => EngineConfig::load()?,
    };
    if cli.threads.is_some() {
        config.threads = cli.threads;
    }
    logging::init(cli.verbose, config.log_filter.as_deref())?;

    match cli.command {
        Commands::Weld {
            input,
            output,
            radius,
            boundary_only,
            json,
        } => {
            let mut options = config.weld;
            if let Some(radius) = radius {
                options.radius = radius;
            }
            options.boundary_only |= boundary_only;
            config.install(|| weld_command(&input, &output, options, json))??;
        }
        Commands::Closest { input, points } => {
            config.install(|| closest_command(&input, &points))??;
        }
        Commands::Stats { input, weld, json } => {
            config.install(|| stats_command(&input, weld, json))??;
        }
        Commands::Version => {
            println!("Polyframe BVH v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_mesh(path: &Path) -> Result<Mesh> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }
    io::read_stl(path).with_context(|| format!("Failed to read STL file: {}", path.display()))
}

fn weld_command(input: &Path, output: &Path, options: WeldOptions, json: bool) -> Result<()> {
    let mut mesh = load_mesh(input)?;

    let start = Instant::now();
    let report = weld_vertices(&mut mesh, options)?;
    let elapsed = start.elapsed();

    io::write_stl(&mesh, output)
        .with_context(|| format!("Failed to write STL file: {}", output.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", "✓".green(), "Weld complete".bold());
    println!("  {} {}", "Radius:".bright_black(), options.radius.to_string().cyan());
    println!(
        "  {} {} → {}",
        "Vertices:".bright_black(),
        report.input_vertices.to_string().cyan(),
        report.output_vertices.to_string().green()
    );
    println!("  {} {}", "Candidate pairs:".bright_black(), report.candidate_pairs);
    println!("  {} {:.2?}", "Time:".bright_black(), elapsed);
    println!("  {} {}", "Output:".bright_black(), output.display().to_string().cyan());
    Ok(())
}

fn closest_command(input: &Path, points: &[String]) -> Result<()> {
    let mesh = load_mesh(input)?;
    let queries = points
        .iter()
        .map(|p| parse_point(p))
        .collect::<Result<Vec<_>>>()?;

    let tree = TriangleTree::from_mesh(&mesh)?;
    let hits = tree.batch_closest_point(&queries);

    for (query, hit) in queries.iter().zip(hits) {
        let label = format!("({}, {}, {})", query.x, query.y, query.z);
        match hit {
            Some(hit) => println!(
                "{} {} triangle {} at ({:.6}, {:.6}, {:.6}), distance {:.6}",
                label.bold(),
                "→".bright_black(),
                hit.element.to_string().cyan(),
                hit.point.x,
                hit.point.y,
                hit.point.z,
                hit.squared_distance.sqrt().to_string().yellow()
            ),
            None => println!("{} {}", label.bold(), "mesh is empty".red()),
        }
    }
    Ok(())
}

fn stats_command(input: &Path, weld: Option<f64>, json: bool) -> Result<()> {
    let mut mesh = load_mesh(input)?;
    if let Some(radius) = weld {
        weld_vertices(&mut mesh, WeldOptions::with_radius(radius))?;
    }

    let start = Instant::now();
    let tree = TriangleTree::from_mesh(&mesh)?;
    let build_time = start.elapsed();
    let validation = mesh_utils::validate_mesh(&mesh);

    if json {
        println!("{}", serde_json::to_string_pretty(&validation)?);
        return Ok(());
    }

    let bbox = mesh.bounding_box();
    let flag = |ok: bool| if ok { "yes".green() } else { "no".red() };

    println!("{}", "Mesh".bold());
    println!("  {} {}", "Vertices:".bright_black(), mesh.vertex_count().to_string().cyan());
    println!("  {} {}", "Triangles:".bright_black(), mesh.triangle_count().to_string().cyan());
    println!("  {} {}", "Edges:".bright_black(), validation.edge_count);
    println!("  {} {}", "Boundary edges:".bright_black(), validation.boundary_edge_count);
    println!("  {} {}", "Degenerate triangles:".bright_black(), validation.degenerate_triangle_count);
    println!("  {} {}", "Edge manifold:".bright_black(), flag(validation.is_edge_manifold));
    println!("  {} {}", "Vertex manifold:".bright_black(), flag(validation.is_vertex_manifold));
    println!("  {} {}", "Closed:".bright_black(), flag(validation.is_closed));
    println!("  {} {}", "Euler characteristic:".bright_black(), validation.euler_characteristic);
    if !bbox.is_empty() {
        println!(
            "  {} [{:.4}, {:.4}, {:.4}] - [{:.4}, {:.4}, {:.4}]",
            "Bounds:".bright_black(),
            bbox.min.x,
            bbox.min.y,
            bbox.min.z,
            bbox.max.x,
            bbox.max.y,
            bbox.max.z
        );
    }

    println!("\n{}", "Tree".bold());
    println!("  {} {}", "Nodes:".bright_black(), tree.nodes().len());
    println!("  {} {}", "Depth:".bright_black(), tree.depth());
    println!("  {} {:.2?}", "Build time:".bright_black(), build_time);
    Ok(())
}

fn parse_point(text: &str) -> Result<Point3<f64>> {
    let coords = text
        .split(',')
        .map(|c| c.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid point: {text}"))?;
    match coords[..] {
        [x, y, z] => Ok(Point3::new(x, y, z)),
        _ => bail!("Expected three coordinates, got {}: {text}", coords.len()),
    }
}
