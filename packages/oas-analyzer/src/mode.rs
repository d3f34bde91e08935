//! Execution mode selection
//!
//! Isolated units cost a spawn and a document copy each, which dominates
//! on small documents. The default strategy only fans out once the
//! serialized document reaches `min_size_for_workers`.

use crate::config::ExecutionConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the sync query batch is run. Never affects result values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    Parallel,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pluggable policy: `(serialized size in bytes, config) -> mode`
pub type ModeStrategy = fn(usize, &ExecutionConfig) -> ExecutionMode;

/// Parallel iff workers are enabled and the document is at least the threshold
pub fn size_threshold_strategy(size: usize, config: &ExecutionConfig) -> ExecutionMode {
    if config.use_workers && size >= config.min_size_for_workers {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    }
}

/// Pick the mode for one batch.
///
/// Isolation availability is checked here rather than in the strategy, so
/// no strategy can select `Parallel` without an executor to run it.
pub fn select_mode(
    strategy: ModeStrategy,
    size: usize,
    config: &ExecutionConfig,
    isolation_available: bool,
) -> ExecutionMode {
    let mode = if isolation_available {
        strategy(size, config)
    } else {
        ExecutionMode::Sequential
    };

    debug!(
        "Mode: {} (size={} bytes, threshold={}, use_workers={}, isolation={})",
        mode, size, config.min_size_for_workers, config.use_workers, isolation_available
    );
    mode
}
