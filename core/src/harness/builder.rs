//! Builder pattern for Harness construction

use std::sync::Arc;

use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult};
use crate::traits::{QueryBackend, QuerySource};

use super::executor::Harness;

/// Builder for creating a [`Harness`] with proper configuration
///
/// # Example
///
/// ```ignore
/// let harness = HarnessBuilder::new()
///     .lanes(8)
///     .backend(backend)
///     .source(Box::new(source))
///     .build()?;
/// ```
pub struct HarnessBuilder {
    config: RunConfig,
    channel_config: ChannelConfig,
    backend: Option<Arc<dyn QueryBackend>>,
    source: Option<Box<dyn QuerySource>>,
}

impl HarnessBuilder {
    /// Create a new harness builder with default configuration
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            channel_config: ChannelConfig::default(),
            backend: None,
            source: None,
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of worker lanes
    pub fn lanes(mut self, lanes: usize) -> Self {
        self.config.lanes = lanes;
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Set the backend the lanes connect to
    pub fn backend(mut self, backend: Arc<dyn QueryBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the work item source
    pub fn source(mut self, source: Box<dyn QuerySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the harness
    ///
    /// # Errors
    ///
    /// Returns an error if backend or source are not set, or if the
    /// configuration is invalid.
    pub fn build(self) -> BenchResult<Harness> {
        let backend = self
            .backend
            .ok_or_else(|| BenchError::config("backend is required"))?;
        let source = self
            .source
            .ok_or_else(|| BenchError::config("source is required"))?;

        self.config.validate()?;

        Ok(Harness::new(
            self.config,
            self.channel_config,
            backend,
            source,
        ))
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}
