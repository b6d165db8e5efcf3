//! In-memory cache for text embeddings.
//!
//! Candidates from popular queries repeat across requests, so their
//! title/description text is embedded again and again. [`EmbeddingCache`]
//! keeps recent vectors keyed by (provider, exact text) using [`moka`],
//! with a bounded capacity and TTL.
//!
//! The cache is an ordinary value: the composition root builds one and
//! hands clones to whichever embedders should share it. Clones share
//! the same underlying storage.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::embedding::EmbeddingProvider;
use crate::error::RankError;

/// Composite cache key: provider name + exact input text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    provider: String,
    text: String,
}

impl CacheKey {
    /// Build a key. Text is used verbatim; case and whitespace matter to
    /// embedding models.
    pub fn new(provider: &str, text: &str) -> Self {
        Self {
            provider: provider.to_string(),
            text: text.to_string(),
        }
    }
}

/// Shared, bounded store of embedding vectors.
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    inner: Cache<CacheKey, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    /// Create a cache holding at most `capacity` vectors for `ttl_seconds` each.
    pub fn new(capacity: u64, ttl_seconds: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build(),
        }
    }

    /// Look up a cached vector.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Vec<f32>>> {
        self.inner.get(key).await
    }

    /// Insert or replace a vector.
    pub async fn insert(&self, key: CacheKey, embedding: Vec<f32>) {
        self.inner.insert(key, Arc::new(embedding)).await;
    }
}

/// Embedding provider that consults an [`EmbeddingCache`] first.
///
/// Only texts missing from the cache are sent to the inner provider,
/// still as a single batch, and the results are stored for next time.
pub struct CachedEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    cache: EmbeddingCache,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, cache: EmbeddingCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl EmbeddingProvider for CachedEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError> {
        let provider = self.inner.name().to_string();
        let mut slots: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut misses: Vec<String> = Vec::new();
        let mut miss_slots: Vec<usize> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(&CacheKey::new(&provider, text)).await {
                Some(hit) => slots.push(Some(hit.as_ref().clone())),
                None => {
                    slots.push(None);
                    misses.push(text.clone());
                    miss_slots.push(i);
                }
            }
        }

        tracing::trace!(
            provider = %provider,
            hits = texts.len() - misses.len(),
            misses = misses.len(),
            "embedding cache lookup"
        );

        if !misses.is_empty() {
            let fetched = self.inner.embed_batch(&misses).await?;
            if fetched.len() != misses.len() {
                return Err(RankError::Embedding(format!(
                    "{provider} returned {} vectors for {} texts",
                    fetched.len(),
                    misses.len()
                )));
            }
            for ((slot, text), embedding) in miss_slots.into_iter().zip(misses).zip(fetched) {
                self.cache
                    .insert(CacheKey::new(&provider, &text), embedding.clone())
                    .await;
                slots[slot] = Some(embedding);
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| RankError::Embedding("embedding missing after lookup".into()))
            })
            .collect()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
