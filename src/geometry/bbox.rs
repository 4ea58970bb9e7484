// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Axis-aligned bounding boxes in any dimension

use nalgebra::{Point, SVector};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: Point<f64, D>,
    pub max: Point<f64, D>,
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: Point<f64, D>, max: Point<f64, D>) -> Self {
        Self { min, max }
    }

    /// Box that contains nothing; extending it by a point yields that point
    pub fn empty() -> Self {
        Self {
            min: Point::from([f64::INFINITY; D]),
            max: Point::from([f64::NEG_INFINITY; D]),
        }
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point<f64, D>>,
    {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(point);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        (0..D).any(|axis| self.min[axis] > self.max[axis])
    }

    pub fn expand_to_include(&mut self, point: &Point<f64, D>) {
        for axis in 0..D {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    /// Grow this box to enclose `other`
    pub fn merge(&mut self, other: &BoundingBox<D>) {
        for axis in 0..D {
            self.min[axis] = self.min[axis].min(other.min[axis]);
            self.max[axis] = self.max[axis].max(other.max[axis]);
        }
    }

    pub fn union(a: &BoundingBox<D>, b: &BoundingBox<D>) -> Self {
        let mut bbox = *a;
        bbox.merge(b);
        bbox
    }

    pub fn center(&self) -> Point<f64, D> {
        Point::from((self.min.coords + self.max.coords) * 0.5)
    }

    pub fn size(&self) -> SVector<f64, D> {
        self.max - self.min
    }

    /// Axis with the largest extent, lowest axis on ties
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        let mut best = 0;
        for axis in 1..D {
            if size[axis] > size[best] {
                best = axis;
            }
        }
        best
    }

    /// Inclusive point containment
    pub fn contains_point(&self, point: &Point<f64, D>) -> bool {
        (0..D).all(|axis| self.min[axis] <= point[axis] && point[axis] <= self.max[axis])
    }

    /// Whether `other` lies entirely inside this box
    pub fn contains(&self, other: &BoundingBox<D>) -> bool {
        (0..D).all(|axis| self.min[axis] <= other.min[axis] && other.max[axis] <= self.max[axis])
    }

    pub fn intersects(&self, other: &BoundingBox<D>) -> bool {
        (0..D).all(|axis| self.min[axis] <= other.max[axis] && self.max[axis] >= other.min[axis])
    }

    /// Squared distance from `point` to the box, zero when the point is inside
    pub fn squared_distance(&self, point: &Point<f64, D>) -> f64 {
        let mut result = 0.0;
        for axis in 0..D {
            let p = point[axis];
            if p < self.min[axis] {
                let d = self.min[axis] - p;
                result += d * d;
            } else if p > self.max[axis] {
                let d = p - self.max[axis];
                result += d * d;
            }
        }
        result
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox<D>, tolerance: f64) -> bool {
        (0..D).all(|axis| {
            (self.min[axis] - other.min[axis]).abs() < tolerance
                && (self.max[axis] - other.max[axis]).abs() < tolerance
        })
    }
}

impl<const D: usize> Default for BoundingBox<D> {
    fn default() -> Self {
        Self::empty()
    }
}
