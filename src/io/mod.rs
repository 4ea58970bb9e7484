// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh import and export

mod stl;

pub use stl::{read_stl, read_stl_from, write_stl, write_stl_to};
