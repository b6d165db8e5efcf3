//! Ranking orchestrator: dedup, score, filter, sort, truncate.
//!
//! A [`Ranker`] owns the scorer and configuration and is shared by
//! reference across concurrent calls. Batch ranking fans independent
//! requests out concurrently and can optionally remove candidates that
//! appear in more than one result list.

use std::sync::Arc;

use crate::cache::{CachedEmbedder, EmbeddingCache};
use crate::config::{EmbeddingConfig, RankingConfig};
use crate::embedders::OpenAiEmbedder;
use crate::embedding::EmbeddingProvider;
use crate::error::RankError;
use crate::types::{MediaCandidate, SearchQuery};

use super::dedup::deduplicate;
use super::scoring::MediaScorer;

/// Result of one ranking call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankOutcome {
    /// Ranked candidates, best first.
    pub items: Vec<MediaCandidate>,
    /// Candidates dropped by deduplication (not by filtering or truncation).
    pub duplicates_removed: usize,
}

/// One independent request in a [`Ranker::rank_batch`] call.
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub items: Vec<MediaCandidate>,
    pub query: SearchQuery,
    /// Result limit. `None` uses the configured default; larger values are
    /// clamped to `max_limit`.
    pub limit: Option<usize>,
    pub min_quality_score: f64,
}

impl RankRequest {
    /// A request with the default limit and no quality threshold.
    pub fn new(items: Vec<MediaCandidate>, query: SearchQuery) -> Self {
        Self {
            items,
            query,
            limit: None,
            min_quality_score: 0.0,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_min_quality_score(mut self, threshold: f64) -> Self {
        self.min_quality_score = threshold;
        self
    }
}

/// Results of a batch ranking call.
#[derive(Debug)]
pub struct BatchRankOutcome {
    /// One result per processed request, in request order.
    pub outcomes: Vec<Result<RankOutcome, RankError>>,
    /// Candidates removed because an earlier result list already held them.
    pub cross_duplicates_removed: usize,
}

/// Ranks media candidates against a generated search query.
pub struct Ranker {
    scorer: MediaScorer,
    config: RankingConfig,
}

impl Ranker {
    /// Create a ranker with an optional embedding provider.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Config`] if `config` fails validation.
    pub fn new(
        config: RankingConfig,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self, RankError> {
        config.validate()?;
        let scorer = MediaScorer::new(config.weights, embedder);
        Ok(Self { scorer, config })
    }

    /// Create a ranker, building the HTTP embedder from `config.embedding`
    /// when present.
    ///
    /// The embedder is wrapped in a fresh [`EmbeddingCache`] unless
    /// `cache_capacity` is 0.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Config`] for invalid configuration, or
    /// [`RankError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: RankingConfig) -> Result<Self, RankError> {
        let embedder = match &config.embedding {
            Some(embedding) => Some(build_embedder(embedding)?),
            None => None,
        };
        Self::new(config, embedder)
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Whether semantic relevance is computed from embeddings.
    pub fn has_embedder(&self) -> bool {
        self.scorer.has_embedder()
    }

    /// Rank candidates for `query`.
    ///
    /// # Pipeline
    ///
    /// 1. Deduplicate by ID and download URL
    /// 2. Score every survivor (one batched embedding call at most)
    /// 3. If `min_quality_score > 0`, keep scores `>= min_quality_score`
    /// 4. Stable sort by final score, descending
    /// 5. Truncate to `limit`
    ///
    /// Embedding failures never surface here; they degrade semantic
    /// relevance to its default.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Config`] if `limit` is 0 or
    /// `min_quality_score` is not finite. These are checked before
    /// anything else, including for empty input.
    pub async fn rank(
        &self,
        items: Vec<MediaCandidate>,
        query: &SearchQuery,
        limit: usize,
        min_quality_score: f64,
    ) -> Result<RankOutcome, RankError> {
        if limit == 0 {
            return Err(RankError::Config("limit must be greater than 0".into()));
        }
        if !min_quality_score.is_finite() {
            return Err(RankError::Config(
                "min_quality_score must be a finite number".into(),
            ));
        }

        if items.is_empty() {
            return Ok(RankOutcome::default());
        }

        tracing::trace!(query = %query.english_query, "ranking candidates");

        let received = items.len();
        let (unique, duplicates_removed) = deduplicate(items);
        let mut ranked = self.scorer.score_items(unique, query).await;

        if min_quality_score > 0.0 {
            ranked.retain(|item| item.final_score >= min_quality_score);
        }

        ranked.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(limit);

        tracing::debug!(
            received,
            duplicates_removed,
            returned = ranked.len(),
            "ranking complete"
        );

        Ok(RankOutcome {
            items: ranked,
            duplicates_removed,
        })
    }

    /// Rank with the configured default limit and no quality threshold.
    ///
    /// # Errors
    ///
    /// Same as [`rank`](Self::rank).
    pub async fn rank_default(
        &self,
        items: Vec<MediaCandidate>,
        query: &SearchQuery,
    ) -> Result<RankOutcome, RankError> {
        self.rank(items, query, self.config.default_limit, 0.0).await
    }

    /// Rank several independent requests concurrently.
    ///
    /// At most `max_batch_size` requests are processed; extras are dropped
    /// with a warning. Each request keeps its own `Result`. When
    /// `deduplicate_across` is set and more than one request succeeded, a
    /// candidate already returned for an earlier request is removed from
    /// later ones.
    pub async fn rank_batch(
        &self,
        mut requests: Vec<RankRequest>,
        deduplicate_across: bool,
    ) -> BatchRankOutcome {
        if requests.len() > self.config.max_batch_size {
            tracing::warn!(
                count = requests.len(),
                max_batch_size = self.config.max_batch_size,
                "batch too large; extra requests dropped"
            );
            requests.truncate(self.config.max_batch_size);
        }

        let futures: Vec<_> = requests
            .into_iter()
            .map(|request| async move {
                let limit = request
                    .limit
                    .unwrap_or(self.config.default_limit)
                    .min(self.config.max_limit);
                self.rank(request.items, &request.query, limit, request.min_quality_score)
                    .await
            })
            .collect();

        let mut outcomes = futures::future::join_all(futures).await;

        let succeeded = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let mut cross_duplicates_removed = 0;

        if deduplicate_across && succeeded > 1 {
            let batches: Vec<Vec<MediaCandidate>> = outcomes
                .iter_mut()
                .filter_map(|outcome| outcome.as_mut().ok())
                .map(|outcome| std::mem::take(&mut outcome.items))
                .collect();

            let (deduped, removed) = super::dedup::deduplicate_across(batches);

            for (outcome, items) in outcomes
                .iter_mut()
                .filter_map(|outcome| outcome.as_mut().ok())
                .zip(deduped)
            {
                outcome.items = items;
            }
            cross_duplicates_removed = removed;
        }

        for (index, outcome) in outcomes.iter().enumerate() {
            if let Err(err) = outcome {
                tracing::warn!(index, error = %err, "batch request failed");
            }
        }

        BatchRankOutcome {
            outcomes,
            cross_duplicates_removed,
        }
    }
}

/// Build the HTTP embedder, cached unless caching is disabled.
fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, RankError> {
    let http: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbedder::new(config)?);
    if config.cache_capacity == 0 {
        return Ok(http);
    }
    let cache = EmbeddingCache::new(config.cache_capacity, config.cache_ttl_seconds);
    Ok(Arc::new(CachedEmbedder::new(http, cache)))
}
