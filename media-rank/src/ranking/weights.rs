//! Ranking factors and their relative weights.
//!
//! Weights are stored raw as configured and normalised to sum to `1.0`
//! when a scorer is built. Partial overrides are merged over the
//! defaults, so a factor the caller does not mention keeps its default
//! weight; set it to `0.0` explicitly to switch it off.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RankError;

/// One of the six independently computed scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingFactor {
    /// Embedding similarity between query and item text.
    SemanticRelevance,
    /// Overlap between query terms and item title/description/tags.
    KeywordMatch,
    /// Resolution tier.
    VisualQuality,
    /// Log-scaled weighted engagement.
    Popularity,
    /// Age bucket of the item.
    Recency,
    /// Rewards items from sources under-represented in the batch.
    SourceDiversity,
}

impl RankingFactor {
    /// Returns the snake_case name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SemanticRelevance => "semantic_relevance",
            Self::KeywordMatch => "keyword_match",
            Self::VisualQuality => "visual_quality",
            Self::Popularity => "popularity",
            Self::Recency => "recency",
            Self::SourceDiversity => "source_diversity",
        }
    }

    /// Returns the default (already normalised) weight of this factor.
    pub fn default_weight(&self) -> f64 {
        match self {
            Self::SemanticRelevance => 0.35,
            Self::KeywordMatch => 0.20,
            Self::VisualQuality => 0.15,
            Self::Popularity => 0.10,
            Self::Recency => 0.10,
            Self::SourceDiversity => 0.10,
        }
    }

    /// Returns all factors in a fixed order.
    pub fn all() -> &'static [RankingFactor] {
        &[
            Self::SemanticRelevance,
            Self::KeywordMatch,
            Self::VisualQuality,
            Self::Popularity,
            Self::Recency,
            Self::SourceDiversity,
        ]
    }
}

impl fmt::Display for RankingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-factor weights for the final score.
///
/// Missing fields in a TOML table fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub semantic_relevance: f64,
    pub keyword_match: f64,
    pub visual_quality: f64,
    pub popularity: f64,
    pub recency: f64,
    pub source_diversity: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            semantic_relevance: RankingFactor::SemanticRelevance.default_weight(),
            keyword_match: RankingFactor::KeywordMatch.default_weight(),
            visual_quality: RankingFactor::VisualQuality.default_weight(),
            popularity: RankingFactor::Popularity.default_weight(),
            recency: RankingFactor::Recency.default_weight(),
            source_diversity: RankingFactor::SourceDiversity.default_weight(),
        }
    }
}

impl RankingWeights {
    /// Weights with every factor set to zero.
    pub fn zero() -> Self {
        Self {
            semantic_relevance: 0.0,
            keyword_match: 0.0,
            visual_quality: 0.0,
            popularity: 0.0,
            recency: 0.0,
            source_diversity: 0.0,
        }
    }

    /// Weights where only `factor` contributes.
    pub fn only(factor: RankingFactor) -> Self {
        Self::zero().with(factor, 1.0)
    }

    /// Merge caller overrides over the defaults.
    pub fn from_overrides(overrides: &HashMap<RankingFactor, f64>) -> Self {
        overrides
            .iter()
            .fold(Self::default(), |weights, (factor, weight)| {
                weights.with(*factor, *weight)
            })
    }

    /// Return a copy with `factor` set to `weight`.
    pub fn with(mut self, factor: RankingFactor, weight: f64) -> Self {
        *self.slot(factor) = weight;
        self
    }

    /// Weight of a single factor.
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

    fn slot(&mut self, factor: RankingFactor) -> &mut f64 {
        match factor {
            RankingFactor::SemanticRelevance => &mut self.semantic_relevance,
            RankingFactor::KeywordMatch => &mut self.keyword_match,
            RankingFactor::VisualQuality => &mut self.visual_quality,
            RankingFactor::Popularity => &mut self.popularity,
            RankingFactor::Recency => &mut self.recency,
            RankingFactor::SourceDiversity => &mut self.source_diversity,
        }
    }

    /// Sum of all six weights.
    pub fn total(&self) -> f64 {
        RankingFactor::all().iter().map(|f| self.get(*f)).sum()
    }

    /// Scale weights so they sum to `1.0`.
    ///
    /// An all-zero set is returned unchanged; every factor then
    /// contributes nothing to the final score.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return *self;
        }
        RankingFactor::all()
            .iter()
            .fold(Self::zero(), |weights, factor| {
                weights.with(*factor, self.get(*factor) / total)
            })
    }

    /// Validates that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), RankError> {
        for factor in RankingFactor::all() {
            let weight = self.get(*factor);
            if !weight.is_finite() || weight < 0.0 {
                return Err(RankError::Config(format!(
                    "weight for {factor} must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }
}
