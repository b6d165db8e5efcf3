//! Embedding provider implementations.
//!
//! Each module provides a struct implementing
//! [`crate::embedding::EmbeddingProvider`].

pub mod openai;

pub use openai::OpenAiEmbedder;
