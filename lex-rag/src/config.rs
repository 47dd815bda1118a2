//! Configuration for the answer pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Canonical embedding dimensionality expected by the `legal_documents` table.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Number of documents retrieved per question.
pub const DEFAULT_MATCH_COUNT: usize = 5;

/// How long to wait before retrying a Hugging Face model that is still loading.
pub const DEFAULT_MODEL_LOADING_DELAY: Duration = Duration::from_secs(10);

/// Configuration parameters for retrieval and embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Length every embedding is normalised to before storage or search.
    pub dimensions: usize,
    /// Maximum number of matches requested from the document store.
    pub match_count: usize,
    /// Delay before retrying an endpoint that answered 503.
    pub model_loading_delay: Duration,
    /// Surface 401/429 from the first embedding provider instead of falling back.
    pub short_circuit_first_provider: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            match_count: DEFAULT_MATCH_COUNT,
            model_loading_delay: DEFAULT_MODEL_LOADING_DELAY,
            short_circuit_first_provider: true,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    pub fn match_count(mut self, count: usize) -> Self {
        self.config.match_count = count;
        self
    }

    pub fn model_loading_delay(mut self, delay: Duration) -> Self {
        self.config.model_loading_delay = delay;
        self
    }

    pub fn short_circuit_first_provider(mut self, enabled: bool) -> Self {
        self.config.short_circuit_first_provider = enabled;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `dimensions == 0`
    /// - `match_count == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.dimensions == 0 {
            return Err(RagError::ConfigError("dimensions must be greater than zero".to_string()));
        }
        if self.config.match_count == 0 {
            return Err(RagError::ConfigError("match_count must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
