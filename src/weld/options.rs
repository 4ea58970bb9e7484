// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Options for vertex welding and remapping

use serde::{Deserialize, Serialize};

/// What to do when several vertices collapse into one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingPolicy {
    /// Keep the value of the lowest original index
    #[default]
    KeepFirst,
    /// Average the collapsed values (integer division for integral data)
    Average,
    /// Fail on any collision
    Error,
}

/// Attribute handling for [`remap_vertices`](super::remap_vertices)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemapVerticesOptions {
    pub collision_policy_float: MappingPolicy,
    pub collision_policy_integral: MappingPolicy,
}

/// Vertex welding options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeldOptions {
    /// Vertices closer than this distance are merged; zero disables welding
    pub radius: f64,
    /// Only weld vertices that touch a boundary or non-manifold edge
    pub boundary_only: bool,
    pub collision_policy_float: MappingPolicy,
    pub collision_policy_integral: MappingPolicy,
}

impl Default for WeldOptions {
    fn default() -> Self {
        Self {
            radius: 1e-6,
            boundary_only: false,
            collision_policy_float: MappingPolicy::KeepFirst,
            collision_policy_integral: MappingPolicy::KeepFirst,
        }
    }
}

impl WeldOptions {
    pub fn with_radius(radius: f64) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    pub fn remap_options(&self) -> RemapVerticesOptions {
        RemapVerticesOptions {
            collision_policy_float: self.collision_policy_float,
            collision_policy_integral: self.collision_policy_integral,
        }
    }
}
