//! Deterministic host-to-lane affinity routing
//!
//! Every work item targeting the same host must be processed by the same
//! lane so that queries against one host are strictly serialized. The lane
//! index is derived from the numeric suffix of the affinity key
//! (`host_000042` -> 42) modulo the lane count: deterministic, stable for
//! the whole run, and uniform for sequentially numbered hosts.

use thiserror::Error;

/// Routing failure
///
/// Misrouting would break the single-lane-per-key guarantee, so an
/// unparsable key is a fatal input error rather than a degradation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// The key has no trailing decimal digit run to derive a lane from
    #[error("affinity key {key:?} has no numeric suffix")]
    UnroutableKey {
        /// The offending key
        key: String,
    },

    /// There are no lanes to route to
    #[error("cannot route with zero lanes")]
    NoLanes,
}

/// Map an affinity key to a lane index in `[0, lane_count)`
///
/// Pure and total for any key ending in a decimal digit run. The same key
/// always yields the same index for a given `lane_count`.
pub fn route(key: &str, lane_count: usize) -> Result<usize, RouteError> {
    if lane_count == 0 {
        return Err(RouteError::NoLanes);
    }

    // trim_end_matches keeps the slice on a char boundary; keys come
    // straight from user input and may contain multi-byte characters.
    let prefix_len = key.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let suffix = &key[prefix_len..];

    // Wider than any realistic host id; avoids u64 overflow on parse.
    let host_id: u128 = suffix.parse().map_err(|_| RouteError::UnroutableKey {
        key: key.to_string(),
    })?;

    Ok((host_id % lane_count as u128) as usize)
}
