// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-vertex attributes stored alongside a mesh
//!
//! Values are kept row-major: vertex `v` owns `values[v * channels..(v + 1) * channels]`.

use serde::{Deserialize, Serialize};

/// Attribute buffer, either floating point or integral
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValues {
    Float(Vec<f64>),
    Integral(Vec<i64>),
}

impl AttributeValues {
    pub fn len(&self) -> usize {
        match self {
            AttributeValues::Float(values) => values.len(),
            AttributeValues::Integral(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, AttributeValues::Integral(_))
    }
}

/// Named vertex attribute with a fixed number of channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexAttribute {
    pub channels: usize,
    pub values: AttributeValues,
}

impl VertexAttribute {
    pub fn float(channels: usize, values: Vec<f64>) -> Self {
        Self {
            channels,
            values: AttributeValues::Float(values),
        }
    }

    pub fn integral(channels: usize, values: Vec<i64>) -> Self {
        Self {
            channels,
            values: AttributeValues::Integral(values),
        }
    }

    /// Number of vertices covered by this attribute
    pub fn num_elements(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.values.len() / self.channels
        }
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match &self.values {
            AttributeValues::Float(values) => Some(values),
            AttributeValues::Integral(_) => None,
        }
    }

    pub fn as_integral(&self) -> Option<&[i64]> {
        match &self.values {
            AttributeValues::Integral(values) => Some(values),
            AttributeValues::Float(_) => None,
        }
    }

    /// Row of values for one vertex
    pub fn float_row(&self, vertex: usize) -> Option<&[f64]> {
        let start = vertex * self.channels;
        self.as_float()?.get(start..start + self.channels)
    }

    pub fn integral_row(&self, vertex: usize) -> Option<&[i64]> {
        let start = vertex * self.channels;
        self.as_integral()?.get(start..start + self.channels)
    }

    /// Append `count` zero rows
    pub(crate) fn pad(&mut self, count: usize) {
        let extra = count * self.channels;
        match &mut self.values {
            AttributeValues::Float(values) => values.resize(values.len() + extra, 0.0),
            AttributeValues::Integral(values) => values.resize(values.len() + extra, 0),
        }
    }

    /// Append the rows of `other` if it has the same layout, zero rows otherwise
    pub(crate) fn extend_from(&mut self, other: Option<&VertexAttribute>, count: usize) {
        match (&mut self.values, other) {
            (AttributeValues::Float(dst), Some(src)) if src.channels == self.channels => {
                if let AttributeValues::Float(values) = &src.values {
                    dst.extend_from_slice(values);
                    return;
                }
            }
            (AttributeValues::Integral(dst), Some(src)) if src.channels == self.channels => {
                if let AttributeValues::Integral(values) = &src.values {
                    dst.extend_from_slice(values);
                    return;
                }
            }
            _ => {}
        }
        self.pad(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        let attr = VertexAttribute::float(2, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(attr.num_elements(), 2);
        assert_eq!(attr.float_row(1), Some(&[2.0, 3.0][..]));
        assert_eq!(attr.float_row(2), None);
        assert_eq!(attr.integral_row(0), None);
    }

    #[test]
    fn test_extend_mismatched_layout_pads() {
        let mut attr = VertexAttribute::integral(1, vec![7]);
        let other = VertexAttribute::float(1, vec![1.5, 2.5]);
        attr.extend_from(Some(&other), 2);
        assert_eq!(attr.as_integral(), Some(&[7, 0, 0][..]));

        let same = VertexAttribute::integral(1, vec![4]);
        attr.extend_from(Some(&same), 1);
        assert_eq!(attr.as_integral(), Some(&[7, 0, 0, 4][..]));
    }
}
