//! Gemini embedding provider.
//!
//! Uses the `batchEmbedContents` endpoint of the Generative Language API,
//! sending at most 100 texts per request and retrying transient failures
//! with exponential backoff.

use crate::embeddings::provider::{ensure_non_empty, EmbeddingProvider};
use crate::embeddings::EmbeddingConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scholar_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// API limit on requests per batch call
const MAX_BATCH_SIZE: usize = 100;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 200;

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// A failed call, tagged with whether trying again could help.
enum Failure {
    Transient(String),
    Permanent(String),
}

impl Failure {
    fn into_error(self) -> AppError {
        match self {
            Failure::Transient(msg) | Failure::Permanent(msg) => AppError::EmbeddingService(msg),
        }
    }
}

/// Gemini embedding provider.
#[derive(Debug, Clone)]
pub struct GeminiEmbeddingProvider {
    client: Client,
    base_url: String,
    /// Fully qualified model name, e.g. `models/embedding-001`
    model: String,
    dimensions: usize,
    api_key: Option<String>,
    api_key_env: String,
    batch_size: usize,
}

impl GeminiEmbeddingProvider {
    /// Create a provider. A missing API key is reported on first use.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::EmbeddingService(format!("Failed to create HTTP client for Gemini: {}", e))
            })?;

        let model = if config.model.starts_with("models/") {
            config.model.clone()
        } else {
            format!("models/{}", config.model)
        };

        Ok(Self {
            client,
            base_url: config
                .endpoint
                .as_deref()
                .unwrap_or(DEFAULT_GEMINI_URL)
                .trim_end_matches('/')
                .to_string(),
            model,
            dimensions: config.dimensions,
            api_key: config.api_key.clone(),
            api_key_env: config.api_key_env.clone(),
            batch_size: config.batch_size.clamp(1, MAX_BATCH_SIZE),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/{}:batchEmbedContents", self.base_url, self.model)
    }

    fn build_request<'a>(&'a self, texts: &'a [String]) -> BatchEmbedRequest<'a> {
        BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: &self.model,
                    content: Content {
                        parts: vec![Part { text }],
                    },
                })
                .collect(),
        }
    }

    fn parse_response(
        &self,
        body: BatchEmbedResponse,
        expected: usize,
    ) -> Result<Vec<Vec<f32>>, Failure> {
        if body.embeddings.len() != expected {
            return Err(Failure::Permanent(format!(
                "Gemini returned {} embeddings for {} texts",
                body.embeddings.len(),
                expected
            )));
        }

        Ok(body.embeddings.into_iter().map(|e| e.values).collect())
    }

    #[instrument(skip(self, api_key, texts), fields(batch = texts.len(), model = %self.model))]
    async fn embed_with_retries(
        &self,
        api_key: &str,
        texts: &[String],
    ) -> AppResult<Vec<Vec<f32>>> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.send_batch(api_key, texts).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(Failure::Transient(msg)) if attempt < MAX_RETRIES => {
                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1);
                    warn!(
                        "Embedding failed (attempt {}/{}): {}; retrying in {}ms",
                        attempt, MAX_RETRIES, msg, backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(failure) => return Err(failure.into_error()),
            }
        }
    }

    async fn send_batch(&self, api_key: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, Failure> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(texts))
            .send()
            .await
            .map_err(|e| Failure::Transient(format!("Failed to send request to Gemini: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = format!("Gemini API error ({}): {}", status, error_text);

            return Err(if is_transient(status) {
                Failure::Transient(message)
            } else {
                Failure::Permanent(message)
            });
        }

        let body: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| Failure::Permanent(format!("Failed to parse Gemini response: {}", e)))?;

        self.parse_response(body, texts.len())
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        ensure_non_empty(texts)?;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::missing_credential("Gemini API key", &self.api_key_env))?;

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_with_retries(api_key, batch).await?);
        }

        debug!("Generated {} embeddings with {}", embeddings.len(), self.model);
        Ok(embeddings)
    }
}
