//! Collaborator traits for the backend and the input source
//!
//! These traits are defined in core to avoid circular dependencies.
//! Implementations live in their respective crates (backend/, source/).

use crate::item::WorkItem;
use async_trait::async_trait;
use std::time::Duration;

// ============================================================================
// Backend traits
// ============================================================================

/// Factory for backend sessions
///
/// Each worker lane calls `connect` exactly once at startup and holds the
/// returned session exclusively for the duration of the run. Sessions are
/// never shared or handed between lanes.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Backend identifier (e.g. "timescaledb"), used in log output
    fn backend_name(&self) -> &str;

    /// Open one exclusive session
    async fn connect(&self) -> Result<Box<dyn QuerySession>, BackendError>;
}

/// One exclusive backend session owned by a single lane
///
/// The session is released by dropping it; lanes rely on ownership to
/// guarantee release on every exit path, including error exits.
#[async_trait]
pub trait QuerySession: Send {
    /// Execute the benchmark query for one work item and return the
    /// elapsed wall-clock time of the call
    ///
    /// The core treats this as an opaque, possibly slow, possibly failing
    /// remote operation. Any error is fatal for the whole run.
    async fn run_query(&mut self, item: &WorkItem) -> Result<Duration, BackendError>;
}

/// Backend-specific errors
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Failed to establish a session
    #[error("connect failed: {0}")]
    Connect(String),

    /// Database error from the driver
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// Query execution failed
    #[error("query failed: {0}")]
    Query(String),
}

// ============================================================================
// Source trait
// ============================================================================

/// Produces the sequence of work items to benchmark
///
/// The dispatcher pulls items one at a time, in source order, until `None`.
/// A structurally invalid record yields `Some(Err(..))` and aborts the run.
pub trait QuerySource: Send {
    /// Next work item, a decode error, or `None` once the source is exhausted
    fn next_item(&mut self) -> Option<Result<WorkItem, SourceError>>;
}

/// Source-specific errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// IO error (e.g. reading the query file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record is structurally invalid (missing fields, bad framing)
    #[error("malformed record: {0}")]
    Malformed(String),

    /// Timestamp field could not be parsed
    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp {
        /// The raw field value
        value: String,
        /// Parser failure detail
        reason: String,
    },
}
