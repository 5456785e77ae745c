//! Embedding provider settings.

use scholar_core::{AppConfig, ProviderConfig};

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_BATCH_SIZE: usize = 100;

/// Settings for one embedding provider.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Provider identifier ("gemini", "ollama", "mock")
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Expected vector length
    pub dimensions: usize,

    /// Custom endpoint URL
    pub endpoint: Option<String>,

    /// API key, if one was found; checked when the first request is made
    pub api_key: Option<String>,

    /// Environment variable the API key is read from
    pub api_key_env: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Maximum texts per request
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "models/embedding-001".to_string(),
            dimensions: 768,
            endpoint: None,
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl EmbeddingConfig {
    /// Derive embedding settings from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let provider_config = config.get_provider_config(&config.embedding_provider);

        let api_key_env = match provider_config {
            Some(ProviderConfig::Gemini { api_key_env, .. }) => api_key_env.clone(),
            _ => "GEMINI_API_KEY".to_string(),
        };

        let api_key = config.api_key.clone().or_else(|| {
            std::env::var(&api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty())
        });

        Self {
            provider: config.embedding_provider.clone(),
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimensions,
            endpoint: provider_config
                .and_then(|pc| pc.endpoint())
                .map(str::to_string),
            api_key,
            api_key_env,
            timeout_secs: provider_config
                .and_then(|pc| pc.timeout())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}
