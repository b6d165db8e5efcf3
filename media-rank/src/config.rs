//! Ranking configuration with sensible defaults.
//!
//! [`RankingConfig`] controls factor weights, result limits, batch size,
//! and the optional embedding endpoint. It can be built in code or
//! loaded from TOML; missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RankError;
use crate::ranking::weights::RankingWeights;

/// Configuration for an OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL without the `/v1/embeddings` path.
    pub base_url: String,
    /// Embedding model name.
    pub model: String,
    /// Bearer token. Never written back out when serialising.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum number of cached embeddings. Set to 0 to disable caching.
    pub cache_capacity: u64,
    /// How long a cached embedding stays valid, in seconds.
    pub cache_ttl_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "text-embedding-3-small".into(),
            api_key: String::new(),
            timeout_seconds: 30,
            cache_capacity: 1000,
            cache_ttl_seconds: 3600,
        }
    }
}

impl EmbeddingConfig {
    /// Default endpoint settings with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `model` must not be empty
    /// - `base_url` must parse as a URL
    pub fn validate(&self) -> Result<(), RankError> {
        if self.timeout_seconds == 0 {
            return Err(RankError::Config(
                "embedding timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(RankError::Config("embedding model must not be empty".into()));
        }
        Url::parse(&self.base_url)
            .map_err(|e| RankError::Config(format!("invalid embedding base_url: {e}")))?;
        Ok(())
    }
}

/// Configuration for ranking operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Result limit used by [`crate::Ranker::rank_default`].
    pub default_limit: usize,
    /// Upper bound callers are expected to respect for `limit`.
    pub max_limit: usize,
    /// Maximum number of requests ranked by one batch call.
    pub max_batch_size: usize,
    /// Raw factor weights; normalised when a ranker is built.
    pub weights: RankingWeights,
    /// Embedding endpoint. `None` ranks without semantic similarity.
    pub embedding: Option<EmbeddingConfig>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            max_batch_size: 10,
            weights: RankingWeights::default(),
            embedding: None,
        }
    }
}

impl RankingConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    pub fn from_file(path: &Path) -> Result<Self, RankError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RankError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, RankError> {
        let config: Self =
            toml::from_str(content).map_err(|e| RankError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - every weight is finite and non-negative
    /// - `default_limit` and `max_limit` are greater than 0
    /// - `default_limit` <= `max_limit`
    /// - `max_batch_size` is greater than 0
    /// - the embedding section, if present, is valid
    pub fn validate(&self) -> Result<(), RankError> {
        self.weights.validate()?;
        if self.default_limit == 0 {
            return Err(RankError::Config(
                "default_limit must be greater than 0".into(),
            ));
        }
        if self.max_limit == 0 {
            return Err(RankError::Config("max_limit must be greater than 0".into()));
        }
        if self.default_limit > self.max_limit {
            return Err(RankError::Config(
                "default_limit must be <= max_limit".into(),
            ));
        }
        if self.max_batch_size == 0 {
            return Err(RankError::Config(
                "max_batch_size must be greater than 0".into(),
            ));
        }
        if let Some(embedding) = &self.embedding {
            embedding.validate()?;
        }
        Ok(())
    }
}
