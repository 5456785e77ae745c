//! Text embedding for the vector index.
//!
//! Providers map text to fixed-length vectors: Gemini and Ollama over
//! HTTP, plus a deterministic offline provider for development.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, ensure_non_empty, EmbeddingProvider};
