//! querybench-core: Concurrent execution engine for query benchmarking
//!
//! This crate provides the core of querybench:
//!
//! - Work item and affinity routing types
//! - The worker lane pool with host-to-lane affinity
//! - Dispatch, drain, and shutdown coordination
//! - Thread-safe latency aggregation
//! - Traits for the backend and input-source collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod error;
pub mod harness;
pub mod item;
pub mod lane;
pub mod router;
pub mod sink;
pub mod traits;

pub use channel::ChannelConfig;
pub use config::RunConfig;
pub use error::{BenchError, BenchResult};
pub use harness::{Harness, HarnessBuilder, RunReport, RunState};
pub use item::WorkItem;
pub use lane::{Lane, LaneStats};
pub use router::route;
pub use sink::{LatencySummary, ResultSink};
pub use traits::{BackendError, QueryBackend, QuerySession, QuerySource, SourceError};
