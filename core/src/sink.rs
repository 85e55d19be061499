//! Thread-safe latency accumulation and summary statistics

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Concurrency-safe accumulator of observed query latencies
///
/// Every lane appends into the same sink throughout the run. The lock is
/// held only for the push itself; no I/O or blocking call ever happens
/// under it. Insertion order is irrelevant: only the multiset of values
/// matters for the summary.
#[derive(Debug, Default)]
pub struct ResultSink {
    observations: Mutex<Vec<f64>>,
}

impl ResultSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one latency observation
    pub fn record(&self, elapsed: Duration) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.observations
            .lock()
            .expect("result sink lock poisoned")
            .push(ms);
    }

    /// Number of observations recorded so far
    pub fn len(&self) -> usize {
        self.observations
            .lock()
            .expect("result sink lock poisoned")
            .len()
    }

    /// Whether no observation has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute the read-only summary over all recorded observations
    ///
    /// Intended to be called once all lanes have terminated; calling it
    /// repeatedly returns identical values. An empty sink yields a zero
    /// summary, which is a valid outcome for empty input.
    pub fn summarize(&self) -> LatencySummary {
        let guard = self
            .observations
            .lock()
            .expect("result sink lock poisoned");
        LatencySummary::from_values(&guard)
    }
}

/// Latency distribution statistics (all values in milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Total number of observations
    pub count: usize,
    /// Median latency
    pub median_ms: f64,
    /// Mean latency
    pub mean_ms: f64,
    /// Minimum latency
    pub min_ms: f64,
    /// Maximum latency
    pub max_ms: f64,
}

impl LatencySummary {
    /// Calculate the summary from a slice of millisecond values
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = sorted.len();
        let mean_ms = sorted.iter().sum::<f64>() / count as f64;
        let median_ms = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        Self {
            count,
            median_ms,
            mean_ms,
            min_ms: sorted[0],
            max_ms: sorted[count - 1],
        }
    }
}
