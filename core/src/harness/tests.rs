//! Tests for the Harness module

use super::builder::HarnessBuilder;
use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::error::BenchError;
use crate::item::WorkItem;
use crate::traits::{BackendError, QueryBackend, QuerySession, QuerySource, SourceError};

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock source
// ============================================================================

struct VecSource {
    items: VecDeque<Result<WorkItem, SourceError>>,
}

impl VecSource {
    fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items: items.into_iter().map(Ok).collect(),
        }
    }

    fn empty() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    fn with_error_after(items: Vec<WorkItem>, error: SourceError) -> Self {
        let mut queue: VecDeque<_> = items.into_iter().map(Ok).collect();
        queue.push_back(Err(error));
        Self { items: queue }
    }
}

impl QuerySource for VecSource {
    fn next_item(&mut self) -> Option<Result<WorkItem, SourceError>> {
        self.items.pop_front()
    }
}

// ============================================================================
// Mock backend
// ============================================================================

/// One log entry per executed query: (session id, affinity key, duration)
type ExecutionLog = Vec<(usize, String, Duration)>;

#[derive(Default)]
struct MockState {
    /// Scripted per-key durations, popped front-to-back
    durations: Mutex<HashMap<String, VecDeque<Duration>>>,
    /// Keys whose queries sleep before completing
    slow_keys: Mutex<HashMap<String, Duration>>,
    /// Keys whose queries fail
    failing_keys: Mutex<Vec<String>>,
    log: Mutex<ExecutionLog>,
    open_sessions: AtomicUsize,
    session_counter: AtomicUsize,
}

struct MockBackend {
    state: Arc<MockState>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            state: Arc::new(MockState::default()),
        }
    }

    fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }

    fn script(&self, key: &str, durations_ms: &[u64]) {
        let queue = durations_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect();
        self.state
            .durations
            .lock()
            .unwrap()
            .insert(key.to_string(), queue);
    }

    fn slow_key(&self, key: &str, delay: Duration) {
        self.state
            .slow_keys
            .lock()
            .unwrap()
            .insert(key.to_string(), delay);
    }

    fn fail_key(&self, key: &str) {
        self.state.failing_keys.lock().unwrap().push(key.to_string());
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    fn backend_name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> Result<Box<dyn QuerySession>, BackendError> {
        let id = self.state.session_counter.fetch_add(1, Ordering::SeqCst);
        self.state.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            id,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockSession {
    id: usize,
    state: Arc<MockState>,
}

#[async_trait]
impl QuerySession for MockSession {
    async fn run_query(&mut self, item: &WorkItem) -> Result<Duration, BackendError> {
        let delay = self
            .state
            .slow_keys
            .lock()
            .unwrap()
            .get(&item.affinity_key)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .state
            .failing_keys
            .lock()
            .unwrap()
            .contains(&item.affinity_key)
        {
            return Err(BackendError::Query(format!(
                "simulated failure for {}",
                item.affinity_key
            )));
        }

        let elapsed = self
            .state
            .durations
            .lock()
            .unwrap()
            .get_mut(&item.affinity_key)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Duration::from_millis(1));

        self.state
            .log
            .lock()
            .unwrap()
            .push((self.id, item.affinity_key.clone(), elapsed));
        Ok(elapsed)
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.state.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn item(key: &str) -> WorkItem {
    let start = chrono::NaiveDateTime::parse_from_str("2017-01-01 08:59:22", "%Y-%m-%d %H:%M:%S")
        .unwrap();
    WorkItem::new(key, start, start + chrono::Duration::hours(1))
}

// ============================================================================
// Builder tests
// ============================================================================

#[test]
fn test_builder_missing_backend() {
    let result = HarnessBuilder::new()
        .source(Box::new(VecSource::empty()))
        .build();
    assert!(matches!(result, Err(BenchError::Config(_))));
}

#[test]
fn test_builder_missing_source() {
    let result = HarnessBuilder::new()
        .backend(Arc::new(MockBackend::new()))
        .build();
    assert!(matches!(result, Err(BenchError::Config(_))));
}

#[test]
fn test_builder_invalid_config() {
    let result = HarnessBuilder::new()
        .backend(Arc::new(MockBackend::new()))
        .source(Box::new(VecSource::empty()))
        .lanes(0)
        .build();
    assert!(matches!(result, Err(BenchError::Config(_))));
}

// ============================================================================
// Integration tests
// ============================================================================

#[tokio::test]
async fn test_harness_drain_completeness() {
    let items: Vec<WorkItem> = (0..100)
        .map(|i| item(&format!("host_{:06}", i % 20)))
        .collect();

    let backend = MockBackend::new();
    let state = backend.state();
    let harness = HarnessBuilder::new()
        .lanes(4)
        .backend(Arc::new(backend))
        .source(Box::new(VecSource::new(items)))
        .build()
        .expect("Failed to build harness");

    let report = harness.run().await.expect("Run failed");

    // Exactly M observations: none lost, none duplicated.
    assert_eq!(report.dispatched, 100);
    assert_eq!(report.summary.count, 100);
    assert_eq!(report.lane_stats.len(), 4);
    let processed: usize = report.lane_stats.iter().map(|s| s.processed).sum();
    assert_eq!(processed, 100);

    // Every session released.
    assert_eq!(state.open_sessions.load(Ordering::SeqCst), 0);
    assert_eq!(state.session_counter.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_harness_empty_input() {
    let harness = HarnessBuilder::new()
        .lanes(3)
        .backend(Arc::new(MockBackend::new()))
        .source(Box::new(VecSource::empty()))
        .build()
        .expect("Failed to build harness");

    let report = harness.run().await.expect("Run failed");
    assert_eq!(report.summary.count, 0);
    assert_eq!(report.summary.mean_ms, 0.0);
    assert_eq!(report.summary.median_ms, 0.0);
}

#[tokio::test]
async fn test_harness_concrete_scenario() {
    // Two hosts, two queries each, two lanes. Host A: 10ms then 30ms.
    // Host B: 20ms then 5ms.
    let host_a = "host_000000";
    let host_b = "host_000001";
    let items = vec![item(host_a), item(host_b), item(host_a), item(host_b)];

    let backend = MockBackend::new();
    backend.script(host_a, &[10, 30]);
    backend.script(host_b, &[20, 5]);
    let state = backend.state();

    let harness = HarnessBuilder::new()
        .lanes(2)
        .backend(Arc::new(backend))
        .source(Box::new(VecSource::new(items)))
        .build()
        .expect("Failed to build harness");

    let report = harness.run().await.expect("Run failed");

    assert_eq!(report.summary.count, 4);
    assert!((report.summary.min_ms - 5.0).abs() < 1e-9);
    assert!((report.summary.max_ms - 30.0).abs() < 1e-9);
    assert!((report.summary.median_ms - 15.0).abs() < 1e-9);
    assert!((report.summary.mean_ms - 16.25).abs() < 1e-9);

    // Host A's two queries ran on one session, in input order.
    let log = state.log.lock().unwrap();
    let host_a_entries: Vec<_> = log.iter().filter(|(_, key, _)| key == host_a).collect();
    assert_eq!(host_a_entries.len(), 2);
    assert_eq!(host_a_entries[0].0, host_a_entries[1].0);
    assert_eq!(host_a_entries[0].2, Duration::from_millis(10));
    assert_eq!(host_a_entries[1].2, Duration::from_millis(30));
}

#[tokio::test]
async fn test_harness_same_key_single_lane() {
    // 30 queries against one host must all execute on the same session.
    let items: Vec<WorkItem> = (0..30).map(|_| item("host_000013")).collect();

    let backend = MockBackend::new();
    let state = backend.state();
    let harness = HarnessBuilder::new()
        .lanes(8)
        .backend(Arc::new(backend))
        .source(Box::new(VecSource::new(items)))
        .build()
        .expect("Failed to build harness");

    harness.run().await.expect("Run failed");

    let log = state.log.lock().unwrap();
    assert_eq!(log.len(), 30);
    let first_session = log[0].0;
    assert!(log.iter().all(|(session, _, _)| *session == first_session));
}

#[tokio::test]
async fn test_harness_fatal_query_aborts_run() {
    // One failing query among three lanes kills the whole run, not just
    // its lane, and produces no summary.
    let items = vec![
        item("host_000000"),
        item("host_000001"),
        item("host_000002"),
        item("host_000001"),
    ];

    let backend = MockBackend::new();
    backend.fail_key("host_000002");

    let harness = HarnessBuilder::new()
        .lanes(3)
        .backend(Arc::new(backend))
        .source(Box::new(VecSource::new(items)))
        .build()
        .expect("Failed to build harness");

    let result = harness.run().await;
    assert!(matches!(result, Err(BenchError::Execution(_))));
}

#[tokio::test]
async fn test_harness_source_error_aborts_run() {
    let source = VecSource::with_error_after(
        vec![item("host_000000")],
        SourceError::Malformed("missing end_time field".into()),
    );

    let harness = HarnessBuilder::new()
        .lanes(2)
        .backend(Arc::new(MockBackend::new()))
        .source(Box::new(source))
        .build()
        .expect("Failed to build harness");

    let result = harness.run().await;
    assert!(matches!(result, Err(BenchError::Input(_))));
}

#[tokio::test]
async fn test_harness_unroutable_key_aborts_run() {
    let items = vec![item("host_000000"), item("hostname-without-id")];

    let harness = HarnessBuilder::new()
        .lanes(2)
        .backend(Arc::new(MockBackend::new()))
        .source(Box::new(VecSource::new(items)))
        .build()
        .expect("Failed to build harness");

    let result = harness.run().await;
    assert!(matches!(result, Err(BenchError::Routing(_))));
}

#[tokio::test]
async fn test_harness_slow_lane_does_not_stall_others() {
    // Interleave items for a slow host (lane 0) and a fast host (lane 1)
    // with the tightest channel buffer. Deliveries to the busy lane must
    // not delay the fast lane's work.
    let slow = "host_000000";
    let fast = "host_000001";
    let mut items = Vec::new();
    for _ in 0..4 {
        items.push(item(slow));
        items.push(item(fast));
        items.push(item(fast));
    }

    let backend = MockBackend::new();
    backend.slow_key(slow, Duration::from_millis(50));
    let state = backend.state();

    let harness = HarnessBuilder::new()
        .lanes(2)
        .channel_config(ChannelConfig::default().with_lane_buffer(1))
        .backend(Arc::new(backend))
        .source(Box::new(VecSource::new(items)))
        .build()
        .expect("Failed to build harness");

    let report = harness.run().await.expect("Run failed");
    assert_eq!(report.summary.count, 12);

    // All fast-host queries finish before the slow host's last query even
    // begins; a dispatcher with head-of-line blocking would interleave them.
    let log = state.log.lock().unwrap();
    let last_fast = log
        .iter()
        .rposition(|(_, key, _)| key == fast)
        .expect("fast host executed");
    let last_slow = log
        .iter()
        .rposition(|(_, key, _)| key == slow)
        .expect("slow host executed");
    assert!(
        last_fast < last_slow,
        "fast lane stalled behind slow lane: fast at {last_fast}, slow at {last_slow}"
    );
}

#[tokio::test]
async fn test_harness_config_accessor() {
    let harness = HarnessBuilder::new()
        .config(RunConfig::new(5))
        .backend(Arc::new(MockBackend::new()))
        .source(Box::new(VecSource::empty()))
        .build()
        .expect("Failed to build harness");

    assert_eq!(harness.config().lanes, 5);
}
