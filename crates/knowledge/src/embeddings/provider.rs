//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{GeminiEmbeddingProvider, MockProvider, OllamaEmbeddingProvider};
use scholar_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Every failure (network, auth, rate limit, malformed reply) is reported
/// as `AppError::EmbeddingService`, except a missing API key which is
/// `AppError::MissingCredential`.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "gemini", "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts, one vector per text in order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::EmbeddingService("No embedding returned".to_string()))
    }
}

/// Reject blank input before any request is made.
pub fn ensure_non_empty(texts: &[String]) -> AppResult<()> {
    match texts.iter().position(|t| t.trim().is_empty()) {
        Some(index) => Err(AppError::EmbeddingService(format!(
            "Cannot embed empty text (input {})",
            index
        ))),
        None => Ok(()),
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.to_lowercase().as_str() {
        "gemini" | "google" => Ok(Arc::new(GeminiEmbeddingProvider::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaEmbeddingProvider::new(config)?)),
        "mock" => Ok(Arc::new(MockProvider::new(config.dimensions))),
        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: gemini, ollama, mock",
            other
        ))),
    }
}
