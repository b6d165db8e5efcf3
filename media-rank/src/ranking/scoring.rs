//! Six-factor weighted scoring for media candidates.
//!
//! Each candidate gets six independent factor scores in `[0, 1]`:
//!
//! | factor              | signal                                        |
//! |---------------------|-----------------------------------------------|
//! | semantic relevance  | rescaled cosine of query vs item embedding    |
//! | keyword match       | share of query terms found in the item        |
//! | visual quality      | resolution tier                               |
//! | popularity          | log-scaled weighted engagement                |
//! | recency             | age bucket                                    |
//! | source diversity    | how under-represented the item's source is    |
//!
//! The final score is the weighted sum under normalised weights, clamped
//! to `[0, 1]`. Scoring never reorders candidates.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::embedding::EmbeddingProvider;
use crate::types::{MediaCandidate, MediaDimensions, MediaSource, SearchQuery};

use super::similarity::cosine_similarity;
use super::weights::{RankingFactor, RankingWeights};

/// Semantic relevance used when no embeddings are available.
pub const DEFAULT_SEMANTIC_RELEVANCE: f64 = 0.5;

/// Keyword score when the query carries no terms at all.
const NO_QUERY_TERMS_SCORE: f64 = 0.5;

/// Popularity score for items with no recorded engagement.
const NO_ENGAGEMENT_SCORE: f64 = 0.3;

/// Recency score for items without a creation date.
const UNKNOWN_AGE_SCORE: f64 = 0.5;

/// Text embedded for items with no title, description or tags.
const FALLBACK_ITEM_TEXT: &str = "media";

/// The six factor scores computed for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorScores {
    pub semantic_relevance: f64,
    pub keyword_match: f64,
    pub visual_quality: f64,
    pub popularity: f64,
    pub recency: f64,
    pub source_diversity: f64,
}

impl FactorScores {
    pub fn get(&self, factor: RankingFactor) -> f64 {
        match factor {
            RankingFactor::SemanticRelevance => self.semantic_relevance,
            RankingFactor::KeywordMatch => self.keyword_match,
            RankingFactor::VisualQuality => self.visual_quality,
            RankingFactor::Popularity => self.popularity,
            RankingFactor::Recency => self.recency,
            RankingFactor::SourceDiversity => self.source_diversity,
        }
    }

    /// Weighted sum of all factors, clamped to `[0, 1]`.
    ///
    /// A non-finite sum scores `0.0`.
    pub fn weighted_sum(&self, weights: &RankingWeights) -> f64 {
        let total: f64 = RankingFactor::all()
            .iter()
            .map(|factor| self.get(*factor) * weights.get(*factor))
            .sum();
        if !total.is_finite() {
            return 0.0;
        }
        total.clamp(0.0, 1.0)
    }
}

/// Per-call state shared by every candidate in one scoring pass.
struct ScoringContext {
    query_terms: HashSet<String>,
    source_counts: HashMap<MediaSource, usize>,
    total: usize,
    now: DateTime<Utc>,
}

/// Scores candidates against a query under a fixed set of weights.
///
/// Holds no per-request state, so one scorer can serve many concurrent
/// calls.
pub struct MediaScorer {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    weights: RankingWeights,
}

impl MediaScorer {
    /// Create a scorer. `weights` are normalised here.
    pub fn new(weights: RankingWeights, embedder: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self {
            embedder,
            weights: weights.normalized(),
        }
    }

    /// The normalised weights in use.
    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    /// Whether an embedding provider is configured.
    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Score every candidate, writing `relevance_score`, `quality_score`
    /// and `final_score` in place. Order is unchanged.
    pub async fn score_items(
        &self,
        items: Vec<MediaCandidate>,
        query: &SearchQuery,
    ) -> Vec<MediaCandidate> {
        self.score_items_at(items, query, Utc::now()).await
    }

    /// Like [`score_items`](Self::score_items) with an explicit "now" for
    /// recency.
    pub async fn score_items_at(
        &self,
        mut items: Vec<MediaCandidate>,
        query: &SearchQuery,
        now: DateTime<Utc>,
    ) -> Vec<MediaCandidate> {
        if items.is_empty() {
            return items;
        }

        let embeddings = self.embeddings(&items, query).await;

        let context = ScoringContext {
            query_terms: query_terms(query),
            source_counts: source_counts(&items),
            total: items.len(),
            now,
        };

        for (i, item) in items.iter_mut().enumerate() {
            let semantic = embeddings
                .as_ref()
                .and_then(|(query_vec, item_vecs)| semantic_relevance(query_vec, &item_vecs[i]));
            let scores = factor_scores(item, semantic, &context);
            item.relevance_score = scores.semantic_relevance;
            item.quality_score = scores.visual_quality;
            item.final_score = scores.weighted_sum(&self.weights);
        }

        tracing::debug!(count = items.len(), "items scored");
        items
    }

    /// Embed the query and every item in one batch call.
    ///
    /// Returns `None` when no provider is configured or the call fails;
    /// failures are logged and never propagated.
    async fn embeddings(
        &self,
        items: &[MediaCandidate],
        query: &SearchQuery,
    ) -> Option<(Vec<f32>, Vec<Vec<f32>>)> {
        let embedder = self.embedder.as_ref()?;

        let mut texts = Vec::with_capacity(items.len() + 1);
        texts.push(query_text(query));
        texts.extend(items.iter().map(item_text));

        match embedder.embed_batch(&texts).await {
            Ok(mut vectors) if vectors.len() == texts.len() => {
                let item_vectors = vectors.split_off(1);
                let query_vector = vectors.pop()?;
                Some((query_vector, item_vectors))
            }
            Ok(vectors) => {
                tracing::warn!(
                    provider = embedder.name(),
                    expected = texts.len(),
                    got = vectors.len(),
                    "embedding count mismatch; using default semantic relevance"
                );
                None
            }
            Err(err) => {
                tracing::warn!(
                    provider = embedder.name(),
                    error = %err,
                    "embedding generation failed; using default semantic relevance"
                );
                None
            }
        }
    }
}

/// Rescaled cosine similarity, or `None` when either vector is empty or
/// holds a non-finite component.
fn semantic_relevance(query: &[f32], item: &[f32]) -> Option<f64> {
    if !is_usable_embedding(query) || !is_usable_embedding(item) {
        return None;
    }
    Some(cosine_similarity(query, item))
}

fn is_usable_embedding(vector: &[f32]) -> bool {
    !vector.is_empty() && vector.iter().all(|component| component.is_finite())
}

/// Compute all six factors for one candidate.
///
/// `semantic` is the rescaled cosine similarity, or `None` when no
/// embeddings were available.
fn factor_scores(
    item: &MediaCandidate,
    semantic: Option<f64>,
    context: &ScoringContext,
) -> FactorScores {
    FactorScores {
        semantic_relevance: semantic.unwrap_or(DEFAULT_SEMANTIC_RELEVANCE),
        keyword_match: keyword_score(item, &context.query_terms),
        visual_quality: quality_score(&item.dimensions),
        popularity: popularity_score(item),
        recency: recency_score(item.created_at, context.now),
        source_diversity: diversity_score(item.source, &context.source_counts, context.total),
    }
}

/// Text embedded for the query: the English query followed by its keywords.
pub fn query_text(query: &SearchQuery) -> String {
    format!("{} {}", query.english_query, query.keywords.join(" "))
}

/// Text embedded for an item: title, description and tags, or `"media"`.
pub fn item_text(item: &MediaCandidate) -> String {
    let tags = item.tags.join(" ");
    let fields = [
        item.title.as_deref(),
        item.description.as_deref(),
        Some(tags.as_str()),
    ];
    let parts: Vec<&str> = fields
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        FALLBACK_ITEM_TEXT.to_string()
    } else {
        parts.join(" ")
    }
}

/// Lower-cased union of keywords, semantic concepts and synonyms.
pub fn query_terms(query: &SearchQuery) -> HashSet<String> {
    query
        .keywords
        .iter()
        .chain(&query.semantic_concepts)
        .chain(&query.synonyms)
        .map(|term| term.to_lowercase())
        .collect()
}

/// Lower-cased title words, description words and tags.
fn item_terms(item: &MediaCandidate) -> HashSet<String> {
    let words = [item.title.as_deref(), item.description.as_deref()]
        .into_iter()
        .flatten()
        .flat_map(str::split_whitespace);
    words
        .chain(item.tags.iter().map(String::as_str))
        .map(str::to_lowercase)
        .collect()
}

/// Fraction of query terms present in the item.
///
/// `0.5` when the query has no terms, `0.0` when the item has none.
pub fn keyword_score(item: &MediaCandidate, query_terms: &HashSet<String>) -> f64 {
    if query_terms.is_empty() {
        return NO_QUERY_TERMS_SCORE;
    }

    let item_terms = item_terms(item);
    if item_terms.is_empty() {
        return 0.0;
    }

    let matches = query_terms.intersection(&item_terms).count();
    (matches as f64 / query_terms.len() as f64).min(1.0)
}

/// Resolution tier score.
///
/// | pixels       | score |
/// |--------------|-------|
/// | >= 4,000,000 | 1.00  |
/// | >= 2,000,000 | 0.85  |
/// | >= 1,000,000 | 0.70  |
/// | >= 500,000   | 0.50  |
/// | below        | 0.30  |
pub fn quality_score(dimensions: &MediaDimensions) -> f64 {
    match dimensions.pixel_count() {
        p if p >= 4_000_000 => 1.0,
        p if p >= 2_000_000 => 0.85,
        p if p >= 1_000_000 => 0.7,
        p if p >= 500_000 => 0.5,
        _ => 0.3,
    }
}

/// Log-scaled engagement score.
///
/// ```text
/// popularity = views * 0.5 + downloads * 1.5 + likes * 2.0
/// score      = min(1, log10(popularity + 1) / 5)
/// ```
///
/// Around 100k weighted interactions saturate the score.
pub fn popularity_score(item: &MediaCandidate) -> f64 {
    let popularity =
        item.views as f64 * 0.5 + item.downloads as f64 * 1.5 + item.likes as f64 * 2.0;
    if popularity <= 0.0 {
        return NO_ENGAGEMENT_SCORE;
    }
    ((popularity + 1.0).log10() / 5.0).min(1.0)
}

/// Age bucket score relative to `now`.
pub fn recency_score(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(created_at) = created_at else {
        return UNKNOWN_AGE_SCORE;
    };

    match (now - created_at).num_days() {
        d if d <= 30 => 1.0,
        d if d <= 180 => 0.8,
        d if d <= 365 => 0.6,
        d if d <= 730 => 0.4,
        _ => 0.2,
    }
}

/// Number of candidates per source.
pub fn source_counts(items: &[MediaCandidate]) -> HashMap<MediaSource, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item.source).or_insert(0) += 1;
    }
    counts
}

/// `1 - share of the batch from this source`; `0.5` for an empty batch.
pub fn diversity_score(
    source: MediaSource,
    counts: &HashMap<MediaSource, usize>,
    total: usize,
) -> f64 {
    if total == 0 {
        return 0.5;
    }
    let same_source = counts.get(&source).copied().unwrap_or(0);
    1.0 - same_source as f64 / total as f64
}
