//! Execution configuration
//!
//! Controls whether the sync query batch may be fanned out to isolated
//! units. Loadable from YAML:
//!
//! ```yaml
//! useWorkers: true
//! minSizeForWorkers: 250000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default serialized size (bytes) at which isolated units pay off
pub const DEFAULT_MIN_SIZE_FOR_WORKERS: usize = 100_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Force isolated units on/off
    #[serde(alias = "useWorkers")]
    pub use_workers: bool,

    /// Minimum serialized document size in bytes before units are used
    #[serde(alias = "minSizeForWorkers")]
    pub min_size_for_workers: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            use_workers: true,
            min_size_for_workers: DEFAULT_MIN_SIZE_FOR_WORKERS,
        }
    }
}

impl ExecutionConfig {
    pub fn with_workers(mut self, enabled: bool) -> Self {
        self.use_workers = enabled;
        self
    }

    pub fn with_min_size(mut self, bytes: usize) -> Self {
        self.min_size_for_workers = bytes;
        self
    }

    /// Always run in the caller's context
    pub fn sequential() -> Self {
        Self::default().with_workers(false)
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
