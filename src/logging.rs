// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tracing subscriber setup for binaries

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor a configured filter is set
pub const DEFAULT_FILTER: &str = "polyframe_bvh=info";

/// Pick the filter directive
///
/// `verbose` wins, then the configured filter, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`].
pub fn filter_directive(verbose: bool, configured: Option<&str>) -> String {
    if verbose {
        return "polyframe_bvh=debug".to_string();
    }
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install a global fmt subscriber writing to stderr
pub fn init(verbose: bool, configured: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_new(filter_directive(verbose, configured))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
