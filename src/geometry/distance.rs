// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closest-point projections onto points, segments and triangles
//!
//! All routines work in any dimension and only use dot products, so the same
//! code serves 2D and 3D trees. Each returns the closest point together with
//! its squared distance to the query.

use nalgebra::Point;

/// Closest point on segment `[a, b]`; a zero-length segment collapses to `a`
pub fn closest_point_on_segment<const D: usize>(
    p: &Point<f64, D>,
    a: &Point<f64, D>,
    b: &Point<f64, D>,
) -> (Point<f64, D>, f64) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= 0.0 {
        return (*a, (p - a).norm_squared());
    }

    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (closest, (p - closest).norm_squared())
}

/// Closest point on triangle `abc` (Voronoi region walk)
///
/// Degenerate triangles (collinear or coincident corners) fall back to the
/// closest point over their three edges.
pub fn closest_point_on_triangle<const D: usize>(
    p: &Point<f64, D>,
    a: &Point<f64, D>,
    b: &Point<f64, D>,
    c: &Point<f64, D>,
) -> (Point<f64, D>, f64) {
    let ab = b - a;
    let ac = c - a;

    let ab_sq = ab.norm_squared();
    let ac_sq = ac.norm_squared();
    let ab_ac = ab.dot(&ac);
    let gram = ab_sq * ac_sq - ab_ac * ab_ac;
    if gram <= f64::EPSILON * ab_sq * ac_sq {
        return closest_point_on_degenerate_triangle(p, a, b, c);
    }

    // Vertex region A
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (*a, ap.norm_squared());
    }

    // Vertex region B
    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (*b, bp.norm_squared());
    }

    // Edge region AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        let closest = a + ab * v;
        return (closest, (p - closest).norm_squared());
    }

    // Vertex region C
    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (*c, cp.norm_squared());
    }

    // Edge region AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        let closest = a + ac * w;
        return (closest, (p - closest).norm_squared());
    }

    // Edge region BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        let closest = b + (c - b) * w;
        return (closest, (p - closest).norm_squared());
    }

    // Face region
    let sum = va + vb + vc;
    if sum <= 0.0 {
        return closest_point_on_degenerate_triangle(p, a, b, c);
    }
    let v = vb / sum;
    let w = vc / sum;
    let closest = a + ab * v + ac * w;
    (closest, (p - closest).norm_squared())
}

fn closest_point_on_degenerate_triangle<const D: usize>(
    p: &Point<f64, D>,
    a: &Point<f64, D>,
    b: &Point<f64, D>,
    c: &Point<f64, D>,
) -> (Point<f64, D>, f64) {
    let mut best = closest_point_on_segment(p, a, b);
    for (s, t) in [(b, c), (c, a)] {
        let candidate = closest_point_on_segment(p, s, t);
        if candidate.1 < best.1 {
            best = candidate;
        }
    }
    best
}
