//! Fan-out dispatch of work items to lanes

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::error::{BenchError, BenchResult};
use crate::item::WorkItem;
use crate::router::route;

/// Routes each work item to its lane's inbound channel
///
/// Every delivery runs as an independent task: a send to a saturated lane
/// suspends only that delivery, never intake for the other lanes.
/// Deliveries destined for the same lane are chained so they enter the
/// channel in dispatch order, which together with the FIFO channel gives
/// per-key ordering. The dispatcher tracks every delivery it has initiated
/// so the drain phase can guarantee that channel close happens-after the
/// last delivery into that channel.
pub(crate) struct Dispatcher {
    senders: Vec<mpsc::Sender<WorkItem>>,
    /// Completion signal of the most recent delivery per lane
    tails: Vec<Option<oneshot::Receiver<()>>>,
    deliveries: JoinSet<BenchResult<()>>,
}

impl Dispatcher {
    pub(crate) fn new(senders: Vec<mpsc::Sender<WorkItem>>) -> Self {
        let tails = senders.iter().map(|_| None).collect();
        Self {
            senders,
            tails,
            deliveries: JoinSet::new(),
        }
    }

    /// Route one item and start its delivery
    ///
    /// Returns immediately; the send itself runs as a spawned task and may
    /// suspend on a full channel (backpressure).
    pub(crate) fn dispatch(&mut self, item: WorkItem) -> BenchResult<()> {
        let lane = route(&item.affinity_key, self.senders.len())?;
        let tx = self.senders.get(lane).cloned().ok_or_else(|| {
            BenchError::internal(format!(
                "router produced lane {lane} for {} lanes",
                self.senders.len()
            ))
        })?;

        tracing::trace!(host = %item.affinity_key, lane, "Dispatching item");

        // Chain behind the previous delivery to this lane so same-lane
        // sends enter the FIFO channel in dispatch order.
        let predecessor = self.tails[lane].take();
        let (done_tx, done_rx) = oneshot::channel();
        self.tails[lane] = Some(done_rx);

        self.deliveries.spawn(async move {
            if let Some(predecessor) = predecessor {
                // A missing signal means the predecessor was aborted; the
                // run is failing and order no longer matters.
                let _ = predecessor.await;
            }

            let result = tx.send(item).await.map_err(|e| {
                BenchError::internal(format!(
                    "lane {lane} stopped accepting work mid-run: {}",
                    e.0.affinity_key
                ))
            });
            let _ = done_tx.send(());
            result
        });

        Ok(())
    }

    /// Wait for every initiated delivery to complete, then close all lane
    /// channels by dropping the senders
    ///
    /// This is the Draining contract: no channel closes while a delivery
    /// to it is still in flight.
    pub(crate) async fn drain(mut self) -> BenchResult<()> {
        let mut first_error = None;
        while let Some(joined) = self.deliveries.join_next().await {
            let delivered = joined
                .map_err(|e| BenchError::internal(format!("delivery task failed: {e}")))
                .and_then(|r| r);
            if let Err(e) = delivered {
                first_error.get_or_insert(e);
            }
        }

        // Dropping the senders here closes every lane channel; each lane
        // observes the close only after consuming all queued items.
        drop(self.senders);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Abort all outstanding deliveries, then drop the senders to close
    /// the lane channels
    ///
    /// Used on the fatal-error path, where partial results are discarded
    /// and lanes need not finish draining their queues.
    pub(crate) fn abandon(mut self) {
        self.deliveries.abort_all();
        drop(self.senders);
    }
}
