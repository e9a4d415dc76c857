//! Grader configuration.
//!
//! Every field has a default, so a config file only names what it changes.
//! Environment overrides are applied on top by [`GraderConfig::apply_env`].

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const ENV_NODE: &str = "GRADE_NODE";
pub const ENV_TIMEOUT_MS: &str = "GRADE_TIMEOUT_MS";
pub const ENV_MAX_MEMORY_MB: &str = "GRADE_MAX_MEMORY_MB";
pub const ENV_CONCURRENCY: &str = "GRADE_CONCURRENCY";
pub const ENV_ISOLATION: &str = "GRADE_ISOLATION";
pub const ENV_CONTAINER_IMAGE: &str = "GRADE_CONTAINER_IMAGE";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: expected a positive integer")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Invalid value {value:?} for {var}: expected \"permission\" or \"container\"")]
    InvalidIsolation { var: &'static str, value: String },
}

/// How a submission's process is confined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Isolation {
    /// A local `node` under its permission model: file reads limited to the
    /// run directory, no writes, no child processes, workers or addons.
    #[default]
    Permission,
    /// `node` inside a throwaway container with no network, a read-only
    /// filesystem and memory and process limits.
    Container,
}

impl std::str::FromStr for Isolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permission" => Ok(Isolation::Permission),
            "container" => Ok(Isolation::Container),
            _ => Err(format!("expected \"permission\" or \"container\", got {:?}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    /// Program used to run submissions.
    pub node_binary: String,

    /// Wall-clock limit per testcase.
    pub timeout_ms: u64,

    /// Heap cap passed to the runtime.
    pub max_memory_mb: u64,

    /// Testcases executed at once.
    pub max_concurrency: usize,

    /// Confinement for submission processes.
    pub isolation: Isolation,

    /// Container engine used with [`Isolation::Container`].
    pub container_runtime: String,

    /// Image providing `node` for [`Isolation::Container`].
    pub container_image: String,

    /// Function to call; detected from the submission when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            node_binary: default_node_binary(),
            timeout_ms: default_timeout_ms(),
            max_memory_mb: default_max_memory_mb(),
            max_concurrency: default_max_concurrency(),
            isolation: Isolation::default(),
            container_runtime: "docker".to_string(),
            container_image: "node:22-alpine".to_string(),
            entry_point: None,
        }
    }
}

fn default_node_binary() -> String {
    "node".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_memory_mb() -> u64 {
    128
}

fn default_max_concurrency() -> usize {
    4
}

impl GraderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Apply `GRADE_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Apply `GRADE_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(node) = get(ENV_NODE) {
            self.node_binary = node;
        }
        if let Some(v) = get(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_positive(ENV_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = get(ENV_MAX_MEMORY_MB) {
            self.max_memory_mb = parse_positive(ENV_MAX_MEMORY_MB, &v)?;
        }
        if let Some(v) = get(ENV_CONCURRENCY) {
            self.max_concurrency = parse_positive(ENV_CONCURRENCY, &v)? as usize;
        }
        if let Some(v) = get(ENV_ISOLATION) {
            self.isolation = v.parse().map_err(|_| ConfigError::InvalidIsolation {
                var: ENV_ISOLATION,
                value: v.clone(),
            })?;
        }
        if let Some(image) = get(ENV_CONTAINER_IMAGE) {
            self.container_image = image;
        }
        Ok(())
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}
