//! Per-lane processing statistics

use std::time::{Duration, Instant};

/// Statistics tracked by each lane
#[derive(Debug, Default, Clone)]
pub struct LaneStats {
    /// Lane identifier
    pub lane_id: usize,

    /// Number of work items executed and recorded
    pub processed: usize,

    /// Lane start time
    pub started_at: Option<Instant>,

    /// Lane end time
    pub ended_at: Option<Instant>,
}

impl LaneStats {
    /// Create empty stats for a lane
    pub fn new(lane_id: usize) -> Self {
        Self {
            lane_id,
            ..Self::default()
        }
    }

    /// Record the lane start time
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Record the lane end time
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Count one executed item
    pub fn record_item(&mut self) {
        self.processed += 1;
    }

    /// Time the lane spent running, if it started
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }
}
