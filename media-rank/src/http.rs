//! Shared HTTP client construction for outbound embedding requests.
//!
//! Every client gets a bounded request timeout, so a hung embedding
//! call fails with an error instead of stalling a ranking call.

use crate::config::EmbeddingConfig;
use crate::error::RankError;
use std::time::Duration;

/// User-Agent sent with every outbound request.
const USER_AGENT: &str = concat!("media-rank/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for an embeddings endpoint.
///
/// The client has:
/// - Timeout from config (covers connect, send and body read)
/// - A fixed, crate-versioned User-Agent
/// - gzip decompression
///
/// # Errors
///
/// Returns [`RankError::Http`] if the client cannot be constructed.
pub fn build_client(config: &EmbeddingConfig) -> Result<reqwest::Client, RankError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| RankError::Http(format!("failed to build HTTP client: {e}")))
}
