//! Run configuration

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// Default number of worker lanes
pub const DEFAULT_LANES: usize = 8;

/// Configuration for one benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of worker lanes (each owns one backend session)
    pub lanes: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES,
        }
    }
}

impl RunConfig {
    /// Create a config with the given lane count
    pub fn new(lanes: usize) -> Self {
        Self { lanes }
    }

    /// Validate the configuration
    pub fn validate(&self) -> BenchResult<()> {
        if self.lanes == 0 {
            return Err(BenchError::config("lane count must be at least 1"));
        }
        Ok(())
    }
}
