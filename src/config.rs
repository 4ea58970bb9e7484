// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Engine configuration

use crate::error::BvhError;
use crate::weld::WeldOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`EngineConfig::load`]
pub const CONFIG_FILE: &str = "polyframe-bvh.toml";

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for parallel queries and welding (None = rayon default)
    pub threads: Option<usize>,
    /// Tracing filter directive, e.g. `polyframe_bvh=debug`
    pub log_filter: Option<String>,
    /// Default weld options
    pub weld: WeldOptions,
}

impl EngineConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Reject settings no run could honor
    pub fn validate(&self) -> crate::Result<()> {
        if self.threads == Some(0) {
            return Err(BvhError::Config("threads must be at least 1".to_string()));
        }
        if self.weld.radius.is_nan() || self.weld.radius < 0.0 {
            return Err(BvhError::Config(format!(
                "weld.radius must be >= 0, got {}",
                self.weld.radius
            )));
        }
        Ok(())
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `POLYFRAME_BVH_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(threads) = lookup("POLYFRAME_BVH_THREADS") {
            self.threads = Some(
                threads
                    .parse()
                    .with_context(|| format!("Invalid POLYFRAME_BVH_THREADS: {threads}"))?,
            );
        }

        if let Some(radius) = lookup("POLYFRAME_BVH_WELD_RADIUS") {
            self.weld.radius = radius
                .parse()
                .with_context(|| format!("Invalid POLYFRAME_BVH_WELD_RADIUS: {radius}"))?;
        }

        if let Some(boundary_only) = lookup("POLYFRAME_BVH_BOUNDARY_ONLY") {
            self.weld.boundary_only = boundary_only.parse().unwrap_or(false);
        }

        if let Some(filter) = lookup("POLYFRAME_BVH_LOG") {
            self.log_filter = Some(filter);
        }

        self.validate()?;
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Thread pool honoring `threads`
    pub fn thread_pool(&self) -> Result<rayon::ThreadPool> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.threads {
            builder = builder.num_threads(threads);
        }
        builder.build().context("Failed to build thread pool")
    }

    /// Run `f` inside this configuration's thread pool
    pub fn install<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        Ok(self.thread_pool()?.install(f))
    }
}
