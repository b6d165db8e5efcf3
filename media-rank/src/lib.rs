//! # media-rank
//!
//! Ranking and deduplication core for a multilingual stock-media search
//! aggregator.
//!
//! Fetchers collect image and video candidates from several stock-media
//! sources for a generated search query. This crate turns that pile into
//! one ordered, duplicate-free list.
//!
//! ## Design
//!
//! - Deduplicates by candidate ID and download URL, first occurrence wins
//! - Scores six weighted factors: semantic relevance, keyword match,
//!   visual quality, popularity, recency and source diversity
//! - Semantic relevance comes from one batched embedding call per request;
//!   ranking without an embedding provider is fully supported
//! - Embedding failures degrade to a neutral score instead of failing
//! - Optional in-memory embedding cache with bounded capacity and TTL
//!
//! ## Security
//!
//! - The embedding API key is never logged or serialised
//! - Query text is logged only at trace level

pub mod cache;
pub mod config;
pub mod embedders;
pub mod embedding;
pub mod error;
pub mod http;
pub mod ranking;
pub mod types;

pub use cache::{CachedEmbedder, EmbeddingCache};
pub use config::{EmbeddingConfig, RankingConfig};
pub use embedders::OpenAiEmbedder;
pub use embedding::EmbeddingProvider;
pub use error::{RankError, Result};
pub use ranking::rank::{BatchRankOutcome, RankOutcome, RankRequest, Ranker};
pub use ranking::weights::{RankingFactor, RankingWeights};
pub use types::{
    LanguageInfo, MediaCandidate, MediaDimensions, MediaSource, MediaType, MediaUrls,
    SearchQuery,
};

/// Rank candidates with default configuration and no embedding provider.
///
/// Convenience wrapper around [`Ranker::rank`]. Semantic relevance is the
/// neutral default for every candidate.
///
/// # Errors
///
/// Returns [`RankError::Config`] if `limit` is 0 or `min_quality_score`
/// is not finite.
///
/// # Examples
///
/// ```no_run
/// # async fn example(items: Vec<media_rank::MediaCandidate>) -> media_rank::Result<()> {
/// use media_rank::{LanguageInfo, SearchQuery};
///
/// let query = SearchQuery::new("sunset over the sea", "sunset sea", LanguageInfo::english())
///     .with_keywords(["sunset", "sea"]);
/// let outcome = media_rank::rank(items, &query, 10, 0.0).await?;
/// for item in &outcome.items {
///     println!("{} {:.2}", item.id, item.final_score);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn rank(
    items: Vec<MediaCandidate>,
    query: &SearchQuery,
    limit: usize,
    min_quality_score: f64,
) -> Result<RankOutcome> {
    Ranker::new(RankingConfig::default(), None)?
        .rank(items, query, limit, min_quality_score)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn make_item(id: &str) -> MediaCandidate {
        MediaCandidate::new(
            MediaSource::Pixabay,
            id,
            MediaType::Video,
            MediaUrls::original(Url::parse(&format!("https://cdn.example/{id}.mp4")).expect("url")),
            MediaDimensions::new(1920, 1080),
            Url::parse(&format!("https://example.com/v/{id}")).expect("url"),
        )
    }

    fn query() -> SearchQuery {
        SearchQuery::new("city night", "city night", LanguageInfo::english())
    }

    #[tokio::test]
    async fn rank_validates_limit() {
        let result = rank(vec![make_item("1")], &query(), 0, 0.0).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("limit"));
    }

    #[tokio::test]
    async fn rank_without_provider_uses_default_relevance() {
        let outcome = rank(vec![make_item("1"), make_item("1"), make_item("2")], &query(), 10, 0.0)
            .await
            .expect("rank");
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.duplicates_removed, 1);
        for item in &outcome.items {
            assert_eq!(item.relevance_score, 0.5);
        }
    }

    #[test]
    fn ranker_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ranker>();
        assert_send_sync::<RankError>();
    }
}
