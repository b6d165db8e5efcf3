//! Trait definition for pluggable embedding providers.
//!
//! The scorer needs exactly one capability from its environment: turning
//! a batch of texts into equal-length vectors. Ranking without any
//! provider is fully supported; semantic relevance then falls back to a
//! neutral default.

use async_trait::async_trait;

use crate::error::RankError;

/// A backend that embeds text for semantic relevance scoring.
///
/// Implementations must return exactly one vector per input text, in
/// input order. They own their own timeout handling so a hung request
/// cannot stall a ranking call indefinitely.
///
/// All implementations must be `Send + Sync` so one provider can serve
/// many concurrent ranking calls.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `texts` in a single round-trip.
    ///
    /// # Errors
    ///
    /// Returns [`RankError`] if the request fails or the response cannot
    /// be parsed. Callers in this crate treat any error as "no
    /// embeddings available" rather than failing the ranking call.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError>;

    /// Short identifier used in logs and cache keys.
    fn name(&self) -> &str;
}
