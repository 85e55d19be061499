//! Worker lane: one independent sequential query executor
//!
//! A lane is the unit of concurrency in querybench. Each lane is a single
//! tokio task that owns one exclusive backend session and consumes work
//! items from its dedicated inbound channel: **receive -> execute ->
//! record -> repeat** until the channel closes.
//!
//! Items sharing an affinity key always land on the same lane (see
//! [`crate::router`]), so queries against one host are strictly serialized
//! in dispatch order. A backend failure is fatal for the whole run: the
//! lane broadcasts the abort signal and exits with the error instead of
//! skipping the item.

mod executor;
mod stats;

pub use executor::Lane;
pub use stats::LaneStats;
