//! Work item type

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single unit of benchmark work: one time-ranged, host-scoped query.
///
/// Items are immutable once constructed and are owned by exactly one
/// component at a time: the source produces them, the dispatcher moves each
/// one into a single lane's channel, and the owning lane consumes it.
/// `range_start <= range_end` is assumed valid on input; enforcing it is the
/// source collaborator's concern, not the engine's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Host identifier the query targets; also the affinity key that pins
    /// the item to one lane (e.g. `host_000042`)
    pub affinity_key: String,

    /// Inclusive lower bound of the queried time range
    pub range_start: NaiveDateTime,

    /// Inclusive upper bound of the queried time range
    pub range_end: NaiveDateTime,
}

impl WorkItem {
    /// Create a new work item
    pub fn new(
        affinity_key: impl Into<String>,
        range_start: NaiveDateTime,
        range_end: NaiveDateTime,
    ) -> Self {
        Self {
            affinity_key: affinity_key.into(),
            range_start,
            range_end,
        }
    }
}
