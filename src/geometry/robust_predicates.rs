// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact geometric predicates
//!
//! `orient2d` and `orient3d` follow Shewchuk's adaptive scheme: a floating
//! point determinant is returned directly when it clears a forward error
//! bound, otherwise the determinant is re-evaluated exactly from the input
//! coordinates with expansion arithmetic. The sign of the returned value is
//! always exact. Its magnitude is only an approximation of the determinant.
//!
//! Segment and triangle containment are built on top of these predicates and
//! work in any dimension by projecting onto coordinate planes.

use nalgebra::{Point, Point2, Point3};

/// Half machine epsilon, the unit roundoff of f64
const EPSILON: f64 = f64::EPSILON * 0.5;
const CCW_ERRBOUND_A: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
const O3D_ERRBOUND_A: f64 = (7.0 + 56.0 * EPSILON) * EPSILON;

/// Orientation of the triangle `(a, b, c)`
///
/// Positive if counterclockwise, negative if clockwise, zero if collinear.
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let det_left = (a.x - c.x) * (b.y - c.y);
    let det_right = (a.y - c.y) * (b.x - c.x);
    let det = det_left - det_right;

    let det_sum = det_left.abs() + det_right.abs();
    let err_bound = CCW_ERRBOUND_A * det_sum;
    if det > err_bound || -det > err_bound {
        return det;
    }

    orient2d_exact(a, b, c)
}

/// Orientation of `d` relative to the plane through `a`, `b`, `c`
///
/// Positive if `d` lies below the plane, where "above" is the side from which
/// `a`, `b`, `c` appear counterclockwise. Zero if the four points are coplanar.
pub fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let ad = a - d;
    let bd = b - d;
    let cd = c - d;

    let bdx_cdy = bd.x * cd.y;
    let cdx_bdy = cd.x * bd.y;
    let cdx_ady = cd.x * ad.y;
    let adx_cdy = ad.x * cd.y;
    let adx_bdy = ad.x * bd.y;
    let bdx_ady = bd.x * ad.y;

    let det = ad.z * (bdx_cdy - cdx_bdy) + bd.z * (cdx_ady - adx_cdy) + cd.z * (adx_bdy - bdx_ady);

    let permanent = (bdx_cdy.abs() + cdx_bdy.abs()) * ad.z.abs()
        + (cdx_ady.abs() + adx_cdy.abs()) * bd.z.abs()
        + (adx_bdy.abs() + bdx_ady.abs()) * cd.z.abs();
    let err_bound = O3D_ERRBOUND_A * permanent;
    if det > err_bound || -det > err_bound {
        return det;
    }

    orient3d_exact(a, b, c, d)
}

/// Whether `p` lies on the closed segment `[a, b]`, decided exactly
///
/// A zero-length segment contains only its endpoint.
pub fn point_on_segment<const D: usize>(
    p: &Point<f64, D>,
    a: &Point<f64, D>,
    b: &Point<f64, D>,
) -> bool {
    for i in 0..D {
        for j in (i + 1)..D {
            let o = orient2d(&project2(a, i, j), &project2(b, i, j), &project2(p, i, j));
            if o != 0.0 {
                return false;
            }
        }
    }

    (0..D).all(|axis| {
        let (lo, hi) = if a[axis] <= b[axis] {
            (a[axis], b[axis])
        } else {
            (b[axis], a[axis])
        };
        lo <= p[axis] && p[axis] <= hi
    })
}

/// Whether `p` lies in the closed triangle `abc`, decided exactly
///
/// Boundary points count as inside. Degenerate triangles reduce to their
/// edges.
pub fn point_in_triangle<const D: usize>(
    p: &Point<f64, D>,
    a: &Point<f64, D>,
    b: &Point<f64, D>,
    c: &Point<f64, D>,
) -> bool {
    // Coplanarity: every 3x3 minor of [b - a, c - a, p - a] vanishes
    for i in 0..D {
        for j in (i + 1)..D {
            for k in (j + 1)..D {
                let o = orient3d(
                    &project3(a, i, j, k),
                    &project3(b, i, j, k),
                    &project3(c, i, j, k),
                    &project3(p, i, j, k),
                );
                if o != 0.0 {
                    return false;
                }
            }
        }
    }

    // Any coordinate plane onto which the triangle projects non-degenerately
    // is in bijection with the supporting plane.
    for i in 0..D {
        for j in (i + 1)..D {
            let (a2, b2, c2) = (project2(a, i, j), project2(b, i, j), project2(c, i, j));
            let area = orient2d(&a2, &b2, &c2);
            if area == 0.0 {
                continue;
            }

            let p2 = project2(p, i, j);
            let o1 = orient2d(&a2, &b2, &p2);
            let o2 = orient2d(&b2, &c2, &p2);
            let o3 = orient2d(&c2, &a2, &p2);
            return if area > 0.0 {
                o1 >= 0.0 && o2 >= 0.0 && o3 >= 0.0
            } else {
                o1 <= 0.0 && o2 <= 0.0 && o3 <= 0.0
            };
        }
    }

    point_on_segment(p, a, b) || point_on_segment(p, b, c) || point_on_segment(p, c, a)
}

fn project2<const D: usize>(p: &Point<f64, D>, i: usize, j: usize) -> Point2<f64> {
    Point2::new(p[i], p[j])
}

fn project3<const D: usize>(p: &Point<f64, D>, i: usize, j: usize, k: usize) -> Point3<f64> {
    Point3::new(p[i], p[j], p[k])
}

fn orient2d_exact(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    // (ax - cx)(by - cy) - (ay - cy)(bx - cx), expanded over input coordinates
    let terms = [
        [a.x, b.y, 1.0],
        [-a.x, c.y, 1.0],
        [-c.x, b.y, 1.0],
        [-a.y, b.x, 1.0],
        [a.y, c.x, 1.0],
        [c.y, b.x, 1.0],
    ];
    exact_sum_of_products(&terms)
}

fn orient3d_exact(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    // Cofactor expansion of the lifted 4x4 determinant along its column of ones
    let mut terms = Vec::with_capacity(24);
    push_det3_terms(&mut terms, b, c, d, -1.0);
    push_det3_terms(&mut terms, a, c, d, 1.0);
    push_det3_terms(&mut terms, a, b, d, -1.0);
    push_det3_terms(&mut terms, a, b, c, 1.0);
    exact_sum_of_products(&terms)
}

/// Appends the six triple products of `sign * det[p; q; r]`
///
/// Negation is exact, so the sign is folded into the first factor.
fn push_det3_terms(
    terms: &mut Vec<[f64; 3]>,
    p: &Point3<f64>,
    q: &Point3<f64>,
    r: &Point3<f64>,
    sign: f64,
) {
    terms.push([sign * p.x, q.y, r.z]);
    terms.push([-sign * p.x, q.z, r.y]);
    terms.push([-sign * p.y, q.x, r.z]);
    terms.push([sign * p.y, q.z, r.x]);
    terms.push([sign * p.z, q.x, r.y]);
    terms.push([-sign * p.z, q.y, r.x]);
}

/// Sum of triple products, returned as the most significant component of the
/// exact expansion
fn exact_sum_of_products(terms: &[[f64; 3]]) -> f64 {
    let mut acc: Vec<f64> = Vec::new();
    for &[x, y, z] in terms {
        let (hi, lo) = two_product(x, y);
        let product = scale_expansion(&[lo, hi], z);
        for component in product {
            acc = grow_expansion(&acc, component);
        }
    }
    acc.last().copied().unwrap_or(0.0)
}

/// Error-free sum: `a + b == sum + err` exactly
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    let b_virtual = sum - a;
    let a_virtual = sum - b_virtual;
    let b_roundoff = b - b_virtual;
    let a_roundoff = a - a_virtual;
    (sum, a_roundoff + b_roundoff)
}

/// Error-free product: `a * b == product + err` exactly
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let product = a * b;
    (product, a.mul_add(b, -product))
}

/// Adds `b` to the nonoverlapping expansion `e`, dropping zero components
fn grow_expansion(e: &[f64], b: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(e.len() + 1);
    let mut q = b;
    for &component in e {
        let (sum, err) = two_sum(q, component);
        if err != 0.0 {
            out.push(err);
        }
        q = sum;
    }
    if q != 0.0 || out.is_empty() {
        out.push(q);
    }
    out.retain(|&v| v != 0.0);
    out
}

/// Multiplies the expansion `e` by `b`, dropping zero components
fn scale_expansion(e: &[f64], b: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(2 * e.len());
    let Some((&first, rest)) = e.split_first() else {
        return out;
    };

    let (mut q, h) = two_product(first, b);
    out.push(h);
    for &component in rest {
        let (t_hi, t_lo) = two_product(component, b);
        let (sum, h) = two_sum(q, t_lo);
        out.push(h);
        let (next, h) = two_sum(t_hi, sum);
        out.push(h);
        q = next;
    }
    out.push(q);
    out.retain(|&v| v != 0.0);
    out
}
