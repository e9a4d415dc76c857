//! Layered grader configuration: defaults, config file, environment, flags.

use anyhow::{anyhow, Context, Result};
use libgrade::{GraderConfig, Isolation};
use std::fs;
use std::path::Path;

use crate::suite;

/// Command-line overrides, applied last.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub node: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_memory_mb: Option<u64>,
    pub concurrency: Option<usize>,
    pub entry: Option<String>,
    pub isolation: Option<Isolation>,
    pub container_image: Option<String>,
}

/// Build the effective configuration.
pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<GraderConfig> {
    let mut config = match file {
        Some(path) => load_file(path)?,
        None => GraderConfig::default(),
    };
    config.apply_env()?;

    if let Some(node) = overrides.node {
        config.node_binary = node;
    }
    if let Some(ms) = overrides.timeout_ms {
        config.timeout_ms = ms;
    }
    if let Some(mb) = overrides.max_memory_mb {
        config.max_memory_mb = mb;
    }
    if let Some(n) = overrides.concurrency {
        config.max_concurrency = n;
    }
    if overrides.entry.is_some() {
        config.entry_point = overrides.entry;
    }
    if let Some(isolation) = overrides.isolation {
        config.isolation = isolation;
    }
    if let Some(image) = overrides.container_image {
        config.container_image = image;
    }
    Ok(config)
}

/// Read a TOML config file. Missing keys keep their defaults.
pub fn load_file(path: &Path) -> Result<GraderConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn parse(text: &str) -> Result<GraderConfig> {
    let doc = suite::toml::decode(text).map_err(|e| anyhow!(e))?;
    Ok(serde_json::from_value(doc)?)
}
