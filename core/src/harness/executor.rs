//! Harness execution logic

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult};
use crate::lane::{Lane, LaneStats};
use crate::sink::{LatencySummary, ResultSink};
use crate::traits::{QueryBackend, QuerySource};

use super::coordinator::ShutdownCoordinator;
use super::dispatch::Dispatcher;

/// Final report of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Latency distribution over every executed query
    pub summary: LatencySummary,

    /// Per-lane processing statistics, indexed by lane id
    pub lane_stats: Vec<LaneStats>,

    /// Number of work items dispatched (always equals `summary.count`)
    pub dispatched: usize,

    /// Wall-clock duration of the whole run
    pub wall_time: Duration,
}

/// Drives one complete benchmark run
///
/// Owns the source, the dispatcher, the shutdown coordinator, and the
/// result sink. Lanes communicate with the harness only through their
/// inbound channels, the abort broadcast, and the shared sink.
pub struct Harness {
    config: RunConfig,
    channel_config: ChannelConfig,
    backend: Arc<dyn QueryBackend>,
    source: Box<dyn QuerySource>,
    sink: Arc<ResultSink>,
    coordinator: ShutdownCoordinator,
}

impl Harness {
    /// Create a new harness
    ///
    /// Use [`super::HarnessBuilder`] for a more ergonomic construction.
    pub fn new(
        config: RunConfig,
        channel_config: ChannelConfig,
        backend: Arc<dyn QueryBackend>,
        source: Box<dyn QuerySource>,
    ) -> Self {
        Self {
            config,
            channel_config,
            backend,
            source,
            sink: Arc::new(ResultSink::new()),
            coordinator: ShutdownCoordinator::new(),
        }
    }

    /// Get the run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run: spawn lanes, dispatch every item, drain, join
    /// lanes, and summarize
    ///
    /// The first fatal error (malformed input, routing failure, backend
    /// failure) aborts the run: surviving lanes are signalled to stop, no
    /// summary is produced, and the error is returned.
    pub async fn run(mut self) -> BenchResult<RunReport> {
        let started = Instant::now();
        let lane_count = self.config.lanes;

        tracing::info!(
            lanes = lane_count,
            backend = self.backend.backend_name(),
            "Starting benchmark run"
        );

        // Spawn lane tasks, one bounded inbound channel each.
        let mut senders = Vec::with_capacity(lane_count);
        let mut handles: Vec<JoinHandle<BenchResult<LaneStats>>> =
            Vec::with_capacity(lane_count);
        for lane_id in 0..lane_count {
            let (tx, rx) = mpsc::channel(self.channel_config.lane_buffer);
            senders.push(tx);

            let lane = Lane::new(
                lane_id,
                rx,
                Arc::clone(&self.backend),
                Arc::clone(&self.sink),
                self.coordinator.abort_handle(),
            );
            let abort_rx = self.coordinator.subscribe();
            handles.push(tokio::spawn(lane.run(abort_rx)));
        }

        // Intake: route every item as the source produces it. Deliveries
        // run concurrently; a full channel suspends only its own delivery.
        let mut dispatcher = Dispatcher::new(senders);
        let mut dispatched = 0usize;
        let intake_error = loop {
            let item = match self.source.next_item() {
                None => break None,
                Some(Ok(item)) => item,
                Some(Err(e)) => break Some(BenchError::from(e)),
            };
            match dispatcher.dispatch(item) {
                Ok(()) => dispatched += 1,
                Err(e) => break Some(e),
            }
        };

        // Drain: every initiated delivery completes before any lane
        // channel closes. On the error path the queues are discarded and
        // lanes are told to stop instead.
        self.coordinator.begin_drain()?;
        let drain_error = if intake_error.is_some() {
            self.coordinator.abort();
            dispatcher.abandon();
            None
        } else {
            tracing::debug!(dispatched, "Source exhausted, draining deliveries");
            dispatcher.drain().await.err()
        };

        // Join every lane before touching the summary.
        let mut lane_stats = Vec::with_capacity(lane_count);
        let mut lane_error: Option<BenchError> = None;
        for (lane_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(stats)) => lane_stats.push(stats),
                Ok(Err(e)) => {
                    lane_error.get_or_insert(e);
                }
                Err(e) => {
                    lane_error.get_or_insert(BenchError::internal(format!(
                        "lane {lane_id} panicked: {e}"
                    )));
                }
            }
        }
        self.coordinator.mark_stopped()?;

        // Report the first fatal error; delivery failures are usually a
        // symptom of a lane failure, so lane errors take precedence.
        if let Some(e) = intake_error.or(lane_error).or(drain_error) {
            tracing::error!(error = %e, "Benchmark run failed");
            return Err(e);
        }

        let summary = self.sink.summarize();
        if summary.count != dispatched {
            return Err(BenchError::internal(format!(
                "drain incomplete: {} observations for {} dispatched items",
                summary.count, dispatched
            )));
        }

        let wall_time = started.elapsed();
        tracing::info!(
            total = summary.count,
            median_ms = summary.median_ms,
            mean_ms = summary.mean_ms,
            elapsed_secs = wall_time.as_secs_f64(),
            "Benchmark run completed"
        );

        Ok(RunReport {
            summary,
            lane_stats,
            dispatched,
            wall_time,
        })
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .field("backend", &self.backend.backend_name())
            .field("state", &self.coordinator.state())
            .finish()
    }
}
