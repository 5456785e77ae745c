//! Web search fallback.
//!
//! The last tier of the retrieval funnel. [`GoogleSearchClient`] talks to
//! the Custom Search JSON API; credentials are read from the environment
//! on the first search so a session that never reaches the web tier never
//! needs them.

use async_trait::async_trait;
use scholar_core::{AppConfig, AppError, AppResult, SearchConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Custom Search returns at most ten results per request.
const MAX_RESULTS: usize = 10;

/// One web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// A free-text web search service.
///
/// An empty result list is a valid outcome, not an error.
#[async_trait]
pub trait WebSearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, count: usize) -> AppResult<Vec<SearchHit>>;
}

/// Render hits as `"{title}: {link}\n{snippet}"` blocks separated by blank lines.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("{}: {}\n{}", hit.title, hit.link, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl From<SearchItem> for SearchHit {
    fn from(item: SearchItem) -> Self {
        Self {
            title: item.title,
            link: item.link,
            snippet: item.snippet,
        }
    }
}

/// Google Custom Search JSON API client.
pub struct GoogleSearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key_env: String,
    engine_id_env: String,
}

impl GoogleSearchClient {
    pub fn from_config(config: &SearchConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::WebSearch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            api_key_env: config.api_key_env.clone(),
            engine_id_env: config.engine_id_env.clone(),
        })
    }

    fn credentials(&self) -> AppResult<(String, String)> {
        let api_key = AppConfig::resolve_credential(&self.api_key_env, "Google search API key")?;
        let engine_id =
            AppConfig::resolve_credential(&self.engine_id_env, "Google search engine ID")?;
        Ok((api_key, engine_id))
    }
}

#[async_trait]
impl WebSearch for GoogleSearchClient {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str, count: usize) -> AppResult<Vec<SearchHit>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let (api_key, engine_id) = self.credentials()?;
        let num = count.min(MAX_RESULTS).to_string();

        tracing::info!("Searching the web for: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", api_key.as_str()),
                ("cx", engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::WebSearch(format!("Failed to reach search API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::WebSearch(format!(
                "Search API error ({}): {}",
                status, error_text
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::WebSearch(format!("Failed to parse search response: {}", e)))?;

        let hits: Vec<SearchHit> = body.items.into_iter().take(count).map(Into::into).collect();
        tracing::debug!("Web search returned {} results", hits.len());
        Ok(hits)
    }
}
