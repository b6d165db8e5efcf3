//! Integration tests for the ranking pipeline.
//!
//! These tests exercise the full dedup → score → filter → sort → truncate
//! pipeline through the public API using in-process embedding providers
//! (no network calls).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use media_rank::ranking::dedup::{deduplicate, deduplicate_across};
use media_rank::{
    CachedEmbedder, EmbeddingCache, EmbeddingProvider, LanguageInfo, MediaCandidate,
    MediaDimensions, MediaSource, MediaType, MediaUrls, RankError, RankRequest, Ranker,
    RankingConfig, RankingFactor, RankingWeights, SearchQuery,
};
use url::Url;

fn make_item(source: MediaSource, id: &str, width: u32, height: u32) -> MediaCandidate {
    MediaCandidate::new(
        source,
        id,
        MediaType::Image,
        MediaUrls::original(
            Url::parse(&format!("https://cdn.{source}.example/{id}.jpg")).expect("url"),
        ),
        MediaDimensions::new(width, height),
        Url::parse(&format!("https://{source}.example/photo/{id}")).expect("url"),
    )
}

fn sunset_query() -> SearchQuery {
    let russian = LanguageInfo {
        code: "ru".into(),
        name: "Russian".into(),
        confidence: 0.98,
        is_english: false,
    };
    SearchQuery::new("закат над морем", "sunset over the sea", russian)
        .with_semantic_concepts(["sunset", "sea"])
        .with_keywords(["sunset", "sea", "ocean"])
        .with_synonyms(["dusk"])
}

/// Embeds any text mentioning "sunset" along one axis, everything else
/// along an orthogonal one.
struct TopicProvider {
    calls: AtomicUsize,
}

impl TopicProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for TopicProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                if text.to_lowercase().contains("sunset") {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        "topic"
    }
}

struct DownProvider;

#[async_trait]
impl EmbeddingProvider for DownProvider {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, RankError> {
        Err(RankError::Http("service unavailable".into()))
    }

    fn name(&self) -> &str {
        "down"
    }
}

/// Returns the same vector for every text, whatever its contents.
struct ConstantProvider(Vec<f32>);

#[async_trait]
impl EmbeddingProvider for ConstantProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError> {
        Ok(vec![self.0.clone(); texts.len()])
    }

    fn name(&self) -> &str {
        "constant"
    }
}

fn mixed_candidates() -> Vec<MediaCandidate> {
    vec![
        make_item(MediaSource::Pexels, "101", 3840, 2160)
            .with_title("Mountain lake")
            .with_tags(["mountain", "lake"])
            .with_engagement(50_000, 2_000, 900),
        make_item(MediaSource::Pexels, "102", 1920, 1080)
            .with_title("Golden sunset over the sea")
            .with_tags(["sunset", "sea", "ocean"])
            .with_engagement(10_000, 500, 300),
        make_item(MediaSource::Pixabay, "201", 1280, 720)
            .with_description("Dusk at the harbour")
            .with_tags(["dusk", "boats"])
            .with_engagement(200, 10, 5),
        make_item(MediaSource::Pixabay, "202", 640, 480).with_tags(["cat"]),
        // Same Pexels photo delivered twice.
        make_item(MediaSource::Pexels, "102", 1920, 1080),
    ]
}

#[tokio::test]
async fn full_pipeline_without_provider() {
    let ranker = Ranker::new(RankingConfig::default(), None).expect("ranker");
    let outcome = ranker
        .rank(mixed_candidates(), &sunset_query(), 10, 0.0)
        .await
        .expect("rank");

    assert_eq!(outcome.duplicates_removed, 1);
    assert_eq!(outcome.items.len(), 4);
    for window in outcome.items.windows(2) {
        assert!(window[0].final_score >= window[1].final_score);
    }
    for item in &outcome.items {
        assert!((0.0..=1.0).contains(&item.final_score));
        assert_eq!(item.relevance_score, 0.5);
    }
    // Strong keyword overlap and good quality put the sunset photo first.
    assert_eq!(outcome.items[0].id, "pexels_102");
}

#[tokio::test]
async fn full_pipeline_with_provider_uses_one_batch_call() {
    let provider = Arc::new(TopicProvider::new());
    let ranker = Ranker::new(RankingConfig::default(), Some(provider.clone())).expect("ranker");

    let outcome = ranker
        .rank(mixed_candidates(), &sunset_query(), 10, 0.0)
        .await
        .expect("rank");

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    let sunset = outcome
        .items
        .iter()
        .find(|item| item.id == "pexels_102")
        .expect("sunset photo kept");
    let lake = outcome
        .items
        .iter()
        .find(|item| item.id == "pexels_101")
        .expect("lake photo kept");
    assert_eq!(sunset.relevance_score, 1.0);
    assert_eq!(lake.relevance_score, 0.5);
}

#[tokio::test]
async fn failing_provider_still_ranks_everything() {
    let ranker =
        Ranker::new(RankingConfig::default(), Some(Arc::new(DownProvider))).expect("ranker");
    let outcome = ranker
        .rank(mixed_candidates(), &sunset_query(), 10, 0.0)
        .await
        .expect("embedding failure must not propagate");

    assert_eq!(outcome.items.len(), 4);
    for item in &outcome.items {
        assert_eq!(item.relevance_score, 0.5);
        assert!(item.final_score > 0.0);
    }
}

#[tokio::test]
async fn degenerate_vectors_keep_scores_bounded() {
    let vectors = [
        vec![f32::INFINITY, 0.0],
        vec![f32::NAN, 1.0],
        vec![f32::NEG_INFINITY, f32::INFINITY],
        vec![],
    ];
    for vector in vectors {
        let provider = Arc::new(ConstantProvider(vector.clone()));
        let ranker = Ranker::new(RankingConfig::default(), Some(provider)).expect("ranker");
        let outcome = ranker
            .rank(mixed_candidates(), &sunset_query(), 10, 0.0)
            .await
            .expect("rank");

        assert_eq!(outcome.items.len(), 4, "{vector:?}");
        for item in &outcome.items {
            assert_eq!(item.relevance_score, 0.5, "{vector:?}");
            assert!((0.0..=1.0).contains(&item.final_score), "{vector:?}");
        }
        for window in outcome.items.windows(2) {
            assert!(window[0].final_score >= window[1].final_score);
        }
    }
}

#[tokio::test]
async fn threshold_and_limit_hold_together() {
    let ranker = Ranker::new(RankingConfig::default(), Some(Arc::new(TopicProvider::new())))
        .expect("ranker");
    let items: Vec<_> = (0..30)
        .map(|i| {
            make_item(MediaSource::Pexels, &i.to_string(), 400 + i * 150, 300 + i * 100)
                .with_tags(if i % 3 == 0 { vec!["sunset"] } else { vec!["street"] })
                .with_engagement(u64::from(i) * 1000, 0, 0)
        })
        .collect();

    for threshold in [0.0, 0.3, 0.5, 0.9] {
        let outcome = ranker
            .rank(items.clone(), &sunset_query(), 10, threshold)
            .await
            .expect("rank");
        assert!(outcome.items.len() <= 10);
        for item in &outcome.items {
            assert!(item.final_score >= threshold);
        }
    }
}

#[tokio::test]
async fn quality_only_weights_order_by_resolution() {
    let config = RankingConfig {
        weights: RankingWeights::only(RankingFactor::VisualQuality),
        ..Default::default()
    };
    let ranker = Ranker::new(config, None).expect("ranker");
    let outcome = ranker
        .rank(mixed_candidates(), &sunset_query(), 10, 0.0)
        .await
        .expect("rank");

    let mut by_quality = outcome.items.clone();
    by_quality.sort_by(|a, b| {
        b.quality_score
            .partial_cmp(&a.quality_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    assert_eq!(outcome.items, by_quality);
    assert_eq!(outcome.items[0].id, "pexels_101");
}

#[test]
fn dedup_preserves_first_occurrence_order() {
    let a = make_item(MediaSource::Pexels, "a", 300, 300);
    let b = make_item(MediaSource::Pexels, "b", 100, 100);
    let c = make_item(MediaSource::Pexels, "c", 200, 200);
    let (unique, removed) = deduplicate(vec![a.clone(), b, a, c]);

    let ids: Vec<&str> = unique.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["pexels_a", "pexels_b", "pexels_c"]);
    assert_eq!(removed, 1);
}

#[test]
fn cross_batch_dedup_first_batch_wins() {
    let item = |id: &str| make_item(MediaSource::Pixabay, id, 100, 100);
    let batches = vec![
        vec![item("1"), item("2")],
        vec![item("2"), item("3")],
        vec![item("1"), item("4")],
    ];
    let (result, removed) = deduplicate_across(batches);

    let ids: Vec<Vec<&str>> = result
        .iter()
        .map(|batch| batch.iter().map(|i| i.id.as_str()).collect())
        .collect();
    assert_eq!(
        ids,
        vec![
            vec!["pixabay_1", "pixabay_2"],
            vec!["pixabay_3"],
            vec!["pixabay_4"]
        ]
    );
    assert_eq!(removed, 2);
}

#[tokio::test]
async fn batch_ranking_shares_cache_and_dedups_across() {
    let provider = Arc::new(TopicProvider::new());
    let cached = CachedEmbedder::new(provider.clone(), EmbeddingCache::new(100, 600));
    let ranker = Ranker::new(RankingConfig::default(), Some(Arc::new(cached))).expect("ranker");

    let requests = vec![
        RankRequest::new(mixed_candidates(), sunset_query()),
        RankRequest::new(mixed_candidates(), sunset_query()).with_limit(2),
    ];
    let batch = ranker.rank_batch(requests, true).await;

    assert_eq!(batch.outcomes.len(), 2);
    let first = batch.outcomes[0].as_ref().expect("first ok");
    let second = batch.outcomes[1].as_ref().expect("second ok");
    assert_eq!(first.items.len(), 4);
    // Everything in the second list was already returned by the first.
    assert!(second.items.is_empty());
    assert_eq!(batch.cross_duplicates_removed, 2);
}

#[tokio::test]
async fn config_file_drives_ranker() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ranking.toml");
    std::fs::write(
        &path,
        r#"
default_limit = 2

[weights]
visual_quality = 1.0
semantic_relevance = 0.0
keyword_match = 0.0
popularity = 0.0
recency = 0.0
source_diversity = 0.0
"#,
    )
    .expect("write config");

    let config = RankingConfig::from_file(&path).expect("load config");
    let ranker = Ranker::from_config(config).expect("ranker");
    assert!(!ranker.has_embedder());

    let outcome = ranker
        .rank_default(mixed_candidates(), &sunset_query())
        .await
        .expect("rank");
    assert_eq!(outcome.items.len(), 2);
    assert_eq!(outcome.items[0].quality_score, 1.0);
}
