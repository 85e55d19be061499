//! Shutdown coordination state machine

use tokio::sync::broadcast;

use crate::error::{BenchError, BenchResult};

/// Phase of a benchmark run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Source still producing items; dispatcher actively routing
    Running,
    /// Source exhausted; in-flight deliveries completing, lane channels
    /// closing once every delivery is acknowledged
    Draining,
    /// Every lane has finished its in-flight work, released its session,
    /// and exited; the summary may now be computed
    Stopped,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Running => write!(f, "running"),
            RunState::Draining => write!(f, "draining"),
            RunState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Tracks the Running -> Draining -> Stopped lifecycle and owns the abort
/// broadcast channel
///
/// Transitions are enforced: attempting them out of order is an internal
/// invariant error, since a channel closed while a delivery to it is still
/// in flight would be a race the design must never permit.
pub(crate) struct ShutdownCoordinator {
    state: RunState,
    abort_tx: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    pub(crate) fn new() -> Self {
        let (abort_tx, _) = broadcast::channel(1);
        Self {
            state: RunState::Running,
            abort_tx,
        }
    }

    /// Current lifecycle phase
    pub(crate) fn state(&self) -> RunState {
        self.state
    }

    /// Subscribe a lane to the abort signal
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<()> {
        self.abort_tx.subscribe()
    }

    /// Get a sender handle lanes use to escalate fatal errors
    pub(crate) fn abort_handle(&self) -> broadcast::Sender<()> {
        self.abort_tx.clone()
    }

    /// Tell every subscriber to stop without draining
    pub(crate) fn abort(&self) {
        let _ = self.abort_tx.send(());
    }

    /// Transition Running -> Draining once the source is exhausted
    pub(crate) fn begin_drain(&mut self) -> BenchResult<()> {
        self.transition(RunState::Running, RunState::Draining)
    }

    /// Transition Draining -> Stopped once every lane has exited
    pub(crate) fn mark_stopped(&mut self) -> BenchResult<()> {
        self.transition(RunState::Draining, RunState::Stopped)
    }

    fn transition(&mut self, from: RunState, to: RunState) -> BenchResult<()> {
        if self.state != from {
            return Err(BenchError::internal(format!(
                "shutdown ordering violated: {} -> {} while {}",
                from, to, self.state
            )));
        }
        tracing::debug!(from = %from, to = %to, "Run state transition");
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinator_full_lifecycle() {
        let mut coordinator = ShutdownCoordinator::new();
        assert_eq!(coordinator.state(), RunState::Running);

        coordinator.begin_drain().unwrap();
        assert_eq!(coordinator.state(), RunState::Draining);

        coordinator.mark_stopped().unwrap();
        assert_eq!(coordinator.state(), RunState::Stopped);
    }

    #[test]
    fn test_coordinator_rejects_out_of_order_transitions() {
        let mut coordinator = ShutdownCoordinator::new();

        // Stopping before draining is a shutdown-ordering violation.
        let err = coordinator.mark_stopped().unwrap_err();
        assert!(matches!(err, BenchError::Internal(_)));

        coordinator.begin_drain().unwrap();
        let err = coordinator.begin_drain().unwrap_err();
        assert!(matches!(err, BenchError::Internal(_)));
    }

    #[tokio::test]
    async fn test_coordinator_abort_reaches_subscribers() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();

        coordinator.abort();
        rx.recv().await.expect("abort signal lost");
    }
}
