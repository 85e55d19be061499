//! Channel configuration for lane communication

/// Buffer configuration for the per-lane inbound channels
///
/// A small buffer is deliberate backpressure: a saturated lane must not
/// accept unbounded queued work. Deliveries to a full channel suspend
/// without stalling deliveries to other lanes.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Inbound channel capacity per lane (dispatcher -> lane)
    pub lane_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { lane_buffer: 1 }
    }
}

impl ChannelConfig {
    /// Create a channel config with a custom per-lane buffer size
    pub fn with_lane_buffer(mut self, size: usize) -> Self {
        self.lane_buffer = size;
        self
    }
}
