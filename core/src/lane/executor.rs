//! Lane consumption loop

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::error::BenchResult;
use crate::item::WorkItem;
use crate::sink::ResultSink;
use crate::traits::QueryBackend;

use super::stats::LaneStats;

/// An independent sequential worker with its own backend session and
/// inbound queue
///
/// Lanes are tokio tasks spawned by the harness. They share the backend
/// factory and the result sink via `Arc`; the inbound receiver and the
/// session are owned exclusively.
pub struct Lane {
    /// Lane identifier, equal to the routing index
    id: usize,

    /// Dedicated inbound channel (dispatcher -> this lane)
    rx: mpsc::Receiver<WorkItem>,

    /// Session factory (shared across lanes via Arc)
    backend: Arc<dyn QueryBackend>,

    /// Shared latency accumulator
    sink: Arc<ResultSink>,

    /// Abort signal sender, fired when this lane hits a fatal error
    abort_tx: broadcast::Sender<()>,
}

impl Lane {
    /// Create a new lane
    pub fn new(
        id: usize,
        rx: mpsc::Receiver<WorkItem>,
        backend: Arc<dyn QueryBackend>,
        sink: Arc<ResultSink>,
        abort_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            id,
            rx,
            backend,
            sink,
            abort_tx,
        }
    }

    /// Run the lane loop
    ///
    /// Acquires one exclusive session, then consumes the inbound channel
    /// until it closes (end of drain) or the abort signal fires. The
    /// session is dropped on every exit path. Returns `LaneStats` on a
    /// clean exit; any backend error broadcasts the abort signal and is
    /// returned as-is, failing the whole run.
    pub async fn run(mut self, mut abort: broadcast::Receiver<()>) -> BenchResult<LaneStats> {
        let mut stats = LaneStats::new(self.id);
        stats.start();

        let mut session = match self.backend.connect().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(lane_id = self.id, error = %e, "Session acquisition failed");
                let _ = self.abort_tx.send(());
                return Err(e.into());
            }
        };

        tracing::debug!(
            lane_id = self.id,
            backend = self.backend.backend_name(),
            "Lane started"
        );

        loop {
            tokio::select! {
                biased;

                // Another lane failed; stop without draining the queue.
                _ = abort.recv() => {
                    tracing::debug!(lane_id = self.id, "Lane received abort signal");
                    break;
                }

                item = self.rx.recv() => match item {
                    Some(item) => {
                        let elapsed = match session.run_query(&item).await {
                            Ok(elapsed) => elapsed,
                            Err(e) => {
                                tracing::error!(
                                    lane_id = self.id,
                                    host = %item.affinity_key,
                                    error = %e,
                                    "Query failed"
                                );
                                let _ = self.abort_tx.send(());
                                return Err(e.into());
                            }
                        };

                        self.sink.record(elapsed);
                        stats.record_item();
                    }
                    // Channel closed: every delivery destined for this
                    // lane has been consumed.
                    None => break,
                }
            }
        }

        stats.stop();
        tracing::debug!(
            lane_id = self.id,
            processed = stats.processed,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Lane finished"
        );

        Ok(stats)
    }

    /// Get the lane ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lane")
            .field("id", &self.id)
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}
