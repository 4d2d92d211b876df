//! Configuration options for the CFR solver.
//!
//! This module provides configuration structs that control the behavior
//! of the CFR algorithm. The defaults give plain vanilla CFR on a single
//! thread; CFR+ regret flooring and linear averaging are opt-in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the CFR solver.
///
/// # Example
/// ```
/// use cfr_engine::cfr::CFRConfig;
///
/// let config = CFRConfig::default();
/// assert!(!config.use_cfr_plus);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CFRConfig {
    /// Use CFR+ regret accumulation (floor cumulative regret at 0).
    pub use_cfr_plus: bool,

    /// Use Linear CFR weighting (weight strategy sums by iteration number).
    pub use_linear_cfr: bool,

    /// Maximum recursion depth of a single walk.
    ///
    /// Games deeper than this are rejected as malformed. Every level is a
    /// stack frame, so raising it far past the default needs a bigger stack.
    pub max_depth: usize,

    /// Number of worker threads.
    ///
    /// `Some(1)` runs everything on the calling thread. `None` uses all
    /// available cores.
    pub num_threads: Option<usize>,

    /// Iterations per parallel batch when running on more than one thread.
    pub batch_size: usize,

    /// How often (in iterations) to log progress. 0 disables it.
    pub progress_interval: u64,
}

impl Default for CFRConfig {
    fn default() -> Self {
        Self {
            use_cfr_plus: false,
            use_linear_cfr: false,
            max_depth: 256,
            num_threads: Some(1),
            batch_size: 1024,
            progress_interval: 10_000,
        }
    }
}

impl CFRConfig {
    /// Create a configuration with CFR+ and linear averaging enabled.
    pub fn fast() -> Self {
        Self {
            use_cfr_plus: true,
            use_linear_cfr: true,
            ..Default::default()
        }
    }

    /// Builder method: set whether to use CFR+.
    pub fn with_cfr_plus(mut self, enable: bool) -> Self {
        self.use_cfr_plus = enable;
        self
    }

    /// Builder method: set whether to use Linear CFR.
    pub fn with_linear_cfr(mut self, enable: bool) -> Self {
        self.use_linear_cfr = enable;
        self
    }

    /// Builder method: set the recursion depth cap.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builder method: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Builder method: set the parallel batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder method: set the progress logging interval.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Thread count to actually use.
    pub fn threads(&self) -> usize {
        match self.num_threads {
            Some(n) => n,
            None => rayon::current_num_threads(),
        }
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }

        if self.num_threads == Some(0) {
            return Err(ConfigError::InvalidThreads);
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }

        Ok(())
    }
}

/// Errors that can occur when validating CFR configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Depth cap of zero would reject every game.
    #[error("max_depth must be at least 1")]
    InvalidMaxDepth,
    /// Thread count of zero.
    #[error("num_threads must be at least 1")]
    InvalidThreads,
    /// Batch size of zero.
    #[error("batch_size must be at least 1")]
    InvalidBatchSize,
}

/// Statistics tracked during CFR training.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CFRStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of unique information sets discovered.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Mean root value per player over all iterations so far.
    pub expected_values: Vec<f64>,
}

impl CFRStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }
}
