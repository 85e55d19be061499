//! Error types for querybench-core
//!
//! Every variant is fatal for the run: the harness aborts on the first
//! error it observes and no summary is produced. A benchmark with silently
//! missing data points would report meaningless statistics.

use thiserror::Error;

use crate::router::RouteError;
use crate::traits::{BackendError, SourceError};

/// Core error type
#[derive(Error, Debug)]
pub enum BenchError {
    /// Malformed input record
    #[error("invalid input: {0}")]
    Input(#[from] SourceError),

    /// Affinity key could not be routed to a lane
    #[error("routing failed: {0}")]
    Routing(#[from] RouteError),

    /// Backend connect or query failure
    #[error("query execution failed: {0}")]
    Execution(#[from] BackendError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Broken internal invariant (out-of-range lane index, shutdown
    /// ordering violation, lost observation). Indicates a bug.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;

impl BenchError {
    /// Build a configuration error from any message
    pub fn config(msg: impl Into<String>) -> Self {
        BenchError::Config(msg.into())
    }

    /// Build an internal invariant error from any message
    pub fn internal(msg: impl Into<String>) -> Self {
        BenchError::Internal(msg.into())
    }
}
