//! Error types for the media-rank crate.
//!
//! All errors use stable string messages suitable for logging and
//! programmatic handling. API keys never appear in error messages.

/// Errors that can occur while configuring or running the ranking core.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// The embedding provider failed or returned an unusable response.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// An HTTP request to the embedding endpoint failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a response body or configuration file.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration or call arguments.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for media-rank results.
pub type Result<T> = std::result::Result<T, RankError>;
