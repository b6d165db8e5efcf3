//! OpenAI-compatible embeddings endpoint.
//!
//! Sends one `POST {base_url}/v1/embeddings` request per batch and
//! re-orders the returned vectors by their `index` field, so callers can
//! rely on input order even if the server answers out of order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::RankError;
use crate::http;

/// Request body for the embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response body from the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding provider backed by an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiEmbedder {
    /// Create an embedder from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Config`] if the configuration is invalid, or
    /// [`RankError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, RankError> {
        config.validate()?;
        let client = http::build_client(config)?;
        let endpoint = format!("{}/v1/embeddings", config.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// The full embeddings URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::trace!(count = texts.len(), model = %self.model, "embedding request");

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RankError::Http(format!("embedding request failed: {e}")))?
            .error_for_status()
            .map_err(|e| RankError::Http(format!("embedding HTTP error: {e}")))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RankError::Http(format!("embedding response read failed: {e}")))?;

        let parsed: EmbeddingResponse = serde_json::from_slice(&bytes)
            .map_err(|e| RankError::Parse(format!("invalid embedding response: {e}")))?;

        order_embeddings(parsed.data, texts.len())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Sort response entries by index and check one vector came back per text.
fn order_embeddings(
    mut data: Vec<EmbeddingData>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, RankError> {
    if data.len() != expected {
        return Err(RankError::Parse(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(RankError::Parse(
            "embedding indices are not a contiguous range".into(),
        ));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}
