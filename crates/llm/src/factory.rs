//! Chat client factory.
//!
//! Maps a provider name from configuration onto a concrete client,
//! injecting endpoint, credential and timeout.

use crate::client::ChatClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use scholar_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Create a chat client for the named provider.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by Gemini
/// * `timeout` - Per-request timeout
///
/// # Errors
/// Returns `MissingCredential` when Gemini has no key and `Config` for an
/// unknown provider.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn ChatClient>> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Gemini) => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| AppError::missing_credential("Gemini API key", "GEMINI_API_KEY"))?;
            let base_url = endpoint.unwrap_or(DEFAULT_GEMINI_ENDPOINT);
            let client = GeminiClient::with_options(api_key, base_url, timeout)?;
            Ok(Arc::new(client))
        }
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            let client = OllamaClient::with_timeout(base_url, timeout)?;
            Ok(Arc::new(client))
        }
        None => Err(AppError::Config(format!("Unknown chat provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None, TIMEOUT);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_gemini_client() {
        let client = create_client("gemini", None, Some("key"), TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "gemini");
    }

    #[test]
    fn test_gemini_requires_api_key() {
        match create_client("gemini", None, None, TIMEOUT) {
            Err(AppError::MissingCredential { env_var, .. }) => {
                assert_eq!(env_var, "GEMINI_API_KEY")
            }
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected error for Gemini without API key"),
        }
    }

    #[test]
    fn test_gemini_rejects_blank_api_key() {
        assert!(create_client("gemini", None, Some("  "), TIMEOUT).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, TIMEOUT) {
            Err(err) => assert!(err.to_string().contains("Unknown chat provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
