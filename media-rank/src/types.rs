//! Core types for media candidates and generated search queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Stock-media provider a candidate was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    /// Pexels photo and video API.
    Pexels,
    /// Pixabay photo and video API.
    Pixabay,
}

impl MediaSource {
    /// Returns the lowercase identifier used in candidate IDs and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pexels => "pexels",
            Self::Pixabay => "pixabay",
        }
    }

    /// Returns all available source variants.
    pub fn all() -> &'static [MediaSource] {
        &[Self::Pexels, Self::Pixabay]
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pixel dimensions of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaDimensions {
    pub width: u32,
    pub height: u32,
}

impl MediaDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, or `0.0` when the height is zero.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }

    /// Total pixel count. Computed in `u64` so 8K frames cannot overflow.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Download URLs for the size variants a provider offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUrls {
    pub original: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Url>,
}

impl MediaUrls {
    /// URLs with only the required original variant set.
    pub fn original(original: Url) -> Self {
        Self {
            original,
            large: None,
            medium: None,
            small: None,
            thumbnail: None,
        }
    }
}

/// A single media result from one stock-media source.
///
/// Fetchers build candidates; the scorer owns the three score fields and
/// overwrites them on every scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCandidate {
    /// Unique identifier in the form `{source}_{original_id}`.
    pub id: String,
    pub source: MediaSource,
    pub media_type: MediaType,
    pub urls: MediaUrls,
    pub dimensions: MediaDimensions,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub photographer: Option<String>,
    #[serde(default)]
    pub photographer_url: Option<Url>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub likes: u64,
    /// Video duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Page on the provider's site describing this item.
    pub source_url: Url,
    /// Semantic relevance factor from the last scoring pass, in `[0, 1]`.
    #[serde(default)]
    pub relevance_score: f64,
    /// Visual quality factor from the last scoring pass, in `[0, 1]`.
    #[serde(default)]
    pub quality_score: f64,
    /// Weighted final score from the last scoring pass, in `[0, 1]`.
    #[serde(default)]
    pub final_score: f64,
}

impl MediaCandidate {
    /// Create a candidate with empty descriptive fields and zero engagement.
    ///
    /// The ID is derived from the source and the provider's own ID so that
    /// two providers can never collide.
    pub fn new(
        source: MediaSource,
        original_id: impl fmt::Display,
        media_type: MediaType,
        urls: MediaUrls,
        dimensions: MediaDimensions,
        source_url: Url,
    ) -> Self {
        Self {
            id: format!("{source}_{original_id}"),
            source,
            media_type,
            urls,
            dimensions,
            title: None,
            description: None,
            tags: Vec::new(),
            photographer: None,
            photographer_url: None,
            views: 0,
            downloads: 0,
            likes: 0,
            duration: None,
            created_at: None,
            source_url,
            relevance_score: 0.0,
            quality_score: 0.0,
            final_score: 0.0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_photographer(mut self, name: impl Into<String>, profile: Option<Url>) -> Self {
        self.photographer = Some(name.into());
        self.photographer_url = profile;
        self
    }

    /// Set view, download and like counts.
    pub fn with_engagement(mut self, views: u64, downloads: u64, likes: u64) -> Self {
        self.views = views;
        self.downloads = downloads;
        self.likes = likes;
        self
    }

    /// Set the video duration. Negative or non-finite values are dropped.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = (seconds.is_finite() && seconds >= 0.0).then_some(seconds);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Detected language of the user's original query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    /// ISO 639-1 code, e.g. `"en"` or `"zh"`.
    pub code: String,
    pub name: String,
    pub confidence: f64,
    pub is_english: bool,
}

impl LanguageInfo {
    pub fn english() -> Self {
        Self {
            code: "en".into(),
            name: "English".into(),
            confidence: 1.0,
            is_english: true,
        }
    }
}

/// A search query after LLM intent extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Text exactly as the user typed it, in any language.
    pub original_text: String,
    /// Optimised English query sent to the stock-media APIs.
    pub english_query: String,
    #[serde(default)]
    pub native_query: Option<String>,
    #[serde(default)]
    pub semantic_concepts: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub bilingual_keywords: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub visual_elements: Vec<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    pub language: LanguageInfo,
}

impl SearchQuery {
    /// Create a query with no extracted terms.
    pub fn new(
        original_text: impl Into<String>,
        english_query: impl Into<String>,
        language: LanguageInfo,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            english_query: english_query.into(),
            native_query: None,
            semantic_concepts: Vec::new(),
            keywords: Vec::new(),
            bilingual_keywords: Vec::new(),
            synonyms: Vec::new(),
            visual_elements: Vec::new(),
            mood: None,
            style: None,
            language,
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_semantic_concepts<I, S>(mut self, concepts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.semantic_concepts = concepts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}
