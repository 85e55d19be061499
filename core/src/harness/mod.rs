//! Harness: run lifecycle coordination
//!
//! The harness drives a complete benchmark run:
//! - Spawning one lane task per worker, each with its own inbound channel
//! - Fanning work items out to lanes by affinity (dispatch)
//! - Draining every in-flight delivery before closing the lane channels
//! - Joining all lanes before the summary is computed
//! - Escalating the first fatal error and aborting surviving lanes
//!
//! # Example
//!
//! ```ignore
//! use querybench_core::{HarnessBuilder, RunConfig};
//!
//! let harness = HarnessBuilder::new()
//!     .config(RunConfig::new(8))
//!     .backend(backend)
//!     .source(Box::new(source))
//!     .build()?;
//!
//! let report = harness.run().await?;
//! println!("median: {:.2}ms", report.summary.median_ms);
//! ```

mod builder;
mod coordinator;
mod dispatch;
mod executor;

pub use builder::HarnessBuilder;
pub use coordinator::RunState;
pub use executor::{Harness, RunReport};

#[cfg(test)]
mod tests;
