//! Configuration management for the Scholar assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (.scholar/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Credentials are deliberately absent from the loaded configuration. Only the
//! names of the environment variables holding them are stored, and they are
//! read at the moment a service is first used.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the assistant knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 3] = ["gemini", "ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .scholar/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Directory holding the default document corpus
    pub corpus_dir: PathBuf,

    /// Chat provider (e.g., "gemini", "ollama")
    pub provider: String,

    /// Chat model identifier
    pub model: String,

    /// Sampling temperature for chat completions
    pub temperature: f32,

    /// Optional cap on generated tokens
    pub max_tokens: Option<u32>,

    /// Embedding provider (e.g., "gemini", "ollama", "mock")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Expected embedding vector length
    pub embedding_dimensions: usize,

    /// Explicit API key override (SCHOLAR_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Retrieval funnel settings
    pub retrieval: RetrievalConfig,

    /// Chunking settings
    pub chunking: ChunkingConfig,

    /// Web search settings
    pub search: SearchConfig,

    /// Provider-specific configurations
    pub providers: HashMap<String, ProviderConfig>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Retrieval funnel settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Results requested from each index
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,

    /// Minimum similarity a chunk needs to be used as context (inclusive)
    #[serde(rename = "scoreThreshold", default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Results requested from the web search fallback
    #[serde(rename = "webResults", default = "default_web_results")]
    pub web_results: usize,
}

fn default_top_k() -> usize {
    3
}

fn default_score_threshold() -> f32 {
    0.75
}

fn default_web_results() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
            web_results: default_web_results(),
        }
    }
}

/// Chunking settings, measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(rename = "chunkSize", default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(rename = "chunkOverlap", default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// Google Custom Search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Environment variable holding the search API key
    #[serde(rename = "apiKeyEnv", default = "default_search_key_env")]
    pub api_key_env: String,

    /// Environment variable holding the search engine id
    #[serde(rename = "engineIdEnv", default = "default_search_engine_env")]
    pub engine_id_env: String,

    /// Optional endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_search_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_search_engine_env() -> String {
    "GOOGLE_CSE_ID".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            engine_id_env: default_search_engine_env(),
            endpoint: None,
            timeout: None,
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
    Mock {
        dimensions: usize,
    },
}

impl ProviderConfig {
    /// Chat model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Gemini { model, .. } | Self::Ollama { model, .. } => model,
            Self::Mock { .. } => "mock",
        }
    }

    /// Embedding model configured for this provider, if any.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            Self::Gemini {
                embedding_model, ..
            }
            | Self::Ollama {
                embedding_model, ..
            } => embedding_model.as_deref(),
            Self::Mock { .. } => Some("trigram-v1"),
        }
    }

    /// Natural vector length of this provider's embedding model.
    pub fn embedding_dimensions(&self) -> usize {
        match self {
            Self::Gemini { .. } | Self::Ollama { .. } => 768,
            Self::Mock { dimensions } => *dimensions,
        }
    }

    /// Custom endpoint, if configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Gemini { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
            Self::Mock { .. } => None,
        }
    }

    /// Request timeout in seconds, if configured.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::Gemini { timeout, .. } | Self::Ollama { timeout, .. } => *timeout,
            Self::Mock { .. } => None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalConfig>,
    chunking: Option<ChunkingConfig>,
    search: Option<SearchConfig>,
    corpus: Option<CorpusSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    #[serde(rename = "activeProvider")]
    active_provider: Option<String>,

    #[serde(rename = "activeEmbeddingProvider")]
    active_embedding_provider: Option<String>,

    temperature: Option<f32>,

    #[serde(rename = "maxTokens")]
    max_tokens: Option<u32>,

    #[serde(rename = "embeddingDimensions")]
    embedding_dimensions: Option<usize>,

    #[serde(default)]
    providers: HashMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorpusSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();
    providers.insert(
        "gemini".to_string(),
        ProviderConfig::Gemini {
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-1.5-pro".to_string(),
            embedding_model: Some("models/embedding-001".to_string()),
            endpoint: None,
            timeout: Some(60),
        },
    );
    providers.insert(
        "ollama".to_string(),
        ProviderConfig::Ollama {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            embedding_model: Some("nomic-embed-text".to_string()),
            timeout: Some(30),
        },
    );
    providers.insert("mock".to_string(), ProviderConfig::Mock { dimensions: 384 });
    providers
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            corpus_dir: PathBuf::from("data"),
            provider: "gemini".to_string(),
            model: "gemini-1.5-pro".to_string(),
            temperature: 0.7,
            max_tokens: None,
            embedding_provider: "gemini".to_string(),
            embedding_model: "models/embedding-001".to_string(),
            embedding_dimensions: 768,
            api_key: None,
            retrieval: RetrievalConfig::default(),
            chunking: ChunkingConfig::default(),
            search: SearchConfig::default(),
            providers: default_providers(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and environment variables.
    ///
    /// Environment variables:
    /// - `SCHOLAR_WORKSPACE`: Override workspace path
    /// - `SCHOLAR_CONFIG`: Path to config file
    /// - `SCHOLAR_PROVIDER`: Chat provider
    /// - `SCHOLAR_MODEL`: Chat model identifier
    /// - `SCHOLAR_CORPUS`: Default corpus directory
    /// - `SCHOLAR_API_KEY`: API key override for the chat/embedding provider
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use scholar_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Corpus: {:?}", config.corpus_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration with an explicit workspace and config file.
    ///
    /// Both arguments win over `SCHOLAR_WORKSPACE` and `SCHOLAR_CONFIG`, and
    /// decide which YAML file is merged.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace
            .or_else(|| std::env::var("SCHOLAR_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        if let Some(config_file) =
            config_file.or_else(|| std::env::var("SCHOLAR_CONFIG").ok().map(PathBuf::from))
        {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.scholar_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("SCHOLAR_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("SCHOLAR_MODEL") {
            config.model = model;
        }

        if let Ok(corpus) = std::env::var("SCHOLAR_CORPUS") {
            config.corpus_dir = PathBuf::from(corpus);
        }

        config.api_key = std::env::var("SCHOLAR_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.apply_yaml(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merged configuration from {:?}", path);
        Ok(result)
    }

    /// Apply the sections of a YAML document on top of this config.
    fn apply_yaml(&mut self, contents: &str) -> AppResult<()> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        if let Some(corpus) = config_file.corpus {
            if let Some(path) = corpus.path {
                self.corpus_dir = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            self.retrieval = retrieval;
        }

        if let Some(chunking) = config_file.chunking {
            self.chunking = chunking;
        }

        if let Some(search) = config_file.search {
            self.search = search;
        }

        if let Some(llm) = config_file.llm {
            self.providers.extend(llm.providers);

            if let Some(provider) = llm.active_provider {
                self.provider = provider;
            }
            if let Some(provider_config) = self.providers.get(&self.provider) {
                self.model = provider_config.model().to_string();
            }

            if let Some(embedding_provider) = llm.active_embedding_provider {
                self.embedding_provider = embedding_provider;
            }
            if let Some(provider_config) = self.providers.get(&self.embedding_provider) {
                if let Some(model) = provider_config.embedding_model() {
                    self.embedding_model = model.to_string();
                }
                self.embedding_dimensions = provider_config.embedding_dimensions();
            }

            if let Some(dimensions) = llm.embedding_dimensions {
                self.embedding_dimensions = dimensions;
            }
            if let Some(temperature) = llm.temperature {
                self.temperature = temperature;
            }
            if llm.max_tokens.is_some() {
                self.max_tokens = llm.max_tokens;
            }
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        corpus: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            if let Some(provider_config) = self.providers.get(&provider) {
                self.model = provider_config.model().to_string();
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(corpus) = corpus {
            self.corpus_dir = corpus;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .scholar directory.
    pub fn scholar_dir(&self) -> PathBuf {
        self.workspace.join(".scholar")
    }

    /// Absolute location of the default corpus.
    pub fn corpus_path(&self) -> PathBuf {
        if self.corpus_dir.is_absolute() {
            self.corpus_dir.clone()
        } else {
            self.workspace.join(&self.corpus_dir)
        }
    }

    /// Get the configuration for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }

    /// Resolve the API key a provider needs, if it needs one.
    ///
    /// Returns `Ok(None)` for providers that do not authenticate and
    /// `MissingCredential` when a required key is absent.
    pub fn resolve_api_key(&self, provider: &str) -> AppResult<Option<String>> {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::Gemini { api_key_env, .. }) => {
                if let Some(ref key) = self.api_key {
                    return Ok(Some(key.clone()));
                }
                Self::resolve_credential(api_key_env, "Gemini API key").map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Read a credential from the environment at the point of use.
    pub fn resolve_credential(env_var: &str, label: &str) -> AppResult<String> {
        match std::env::var(env_var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(AppError::missing_credential(label, env_var)),
        }
    }

    /// Validate configuration for the active providers and retrieval settings.
    pub fn validate(&self) -> AppResult<()> {
        for (role, provider) in [
            ("chat", &self.provider),
            ("embedding", &self.embedding_provider),
        ] {
            if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown {} provider: {}. Supported: {}",
                    role,
                    provider,
                    KNOWN_PROVIDERS.join(", ")
                )));
            }
        }

        if self.provider == "mock" {
            return Err(AppError::Config(
                "The mock provider only supplies embeddings; choose gemini or ollama for chat"
                    .to_string(),
            ));
        }

        if self.chunking.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be greater than 0".to_string()));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be at least 1".to_string()));
        }

        if !(-1.0..=1.0).contains(&self.retrieval.score_threshold) {
            return Err(AppError::Config(format!(
                "scoreThreshold must be within [-1, 1], got {}",
                self.retrieval.score_threshold
            )));
        }

        if self.embedding_dimensions == 0 {
            return Err(AppError::Config(
                "embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.embedding_model, "models/embedding-001");
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.score_threshold, 0.75);
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scholar_dir() {
        let config = AppConfig::default();
        assert!(config.scholar_dir().ends_with(".scholar"));
    }

    #[test]
    fn test_corpus_path_relative_to_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/tmp/ws");
        assert_eq!(config.corpus_path(), PathBuf::from("/tmp/ws/data"));

        config.corpus_dir = PathBuf::from("/srv/docs");
        assert_eq!(config.corpus_path(), PathBuf::from("/srv/docs"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            None,
            Some(PathBuf::from("notes")),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert_eq!(overridden.corpus_dir, PathBuf::from("notes"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_apply_yaml_sections() {
        let yaml = r#"
llm:
  activeProvider: ollama
  activeEmbeddingProvider: mock
  temperature: 0.2
  providers:
    mock:
      dimensions: 64
retrieval:
  topK: 5
  scoreThreshold: 0.6
chunking:
  chunkSize: 500
  chunkOverlap: 50
corpus:
  path: library
logging:
  level: warn
  color: false
"#;
        let mut config = AppConfig::default();
        config.apply_yaml(yaml).unwrap();

        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.embedding_provider, "mock");
        assert_eq!(config.embedding_dimensions, 64);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.score_threshold, 0.6);
        assert_eq!(config.retrieval.web_results, 3);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.corpus_dir, PathBuf::from("library"));
        assert_eq!(config.log_level, Some("warn".to_string()));
        assert!(config.no_color);
    }

    #[test]
    fn test_merge_yaml_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "retrieval:\n  topK: 7\n").unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.retrieval.top_k, 7);
        assert_eq!(merged.retrieval.score_threshold, 0.75);
    }

    #[test]
    fn test_load_with_explicit_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        std::fs::write(&path, "retrieval:\n  topK: 7\n  scoreThreshold: 0.5\n").unwrap();

        let config = AppConfig::load_with(Some(temp.path().to_path_buf()), Some(path.clone())).unwrap();
        assert_eq!(config.config_file, Some(path));
        assert_eq!(config.retrieval.top_k, 7);
        assert_eq!(config.retrieval.score_threshold, 0.5);
    }

    #[test]
    fn test_load_with_workspace_reads_its_config() {
        let temp = tempfile::TempDir::new().unwrap();
        let scholar_dir = temp.path().join(".scholar");
        std::fs::create_dir_all(&scholar_dir).unwrap();
        std::fs::write(scholar_dir.join("config.yaml"), "chunking:\n  chunkSize: 400\n  chunkOverlap: 40\n").unwrap();

        let config = AppConfig::load_with(Some(temp.path().to_path_buf()), None).unwrap();
        assert_eq!(config.workspace, temp.path().to_path_buf());
        assert_eq!(config.chunking.chunk_size, 400);
        assert_eq!(config.chunking.chunk_overlap, 40);
    }

    #[test]
    fn test_load_with_missing_workspace_fails() {
        let result = AppConfig::load_with(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_not_smaller_than_size() {
        let mut config = AppConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_credential_missing() {
        let err = AppConfig::resolve_credential("SCHOLAR_TEST_NEVER_SET_7F3A", "Test key")
            .unwrap_err();
        assert!(matches!(err, AppError::MissingCredential { .. }));
        assert!(err.to_string().contains("SCHOLAR_TEST_NEVER_SET_7F3A"));
    }

    #[test]
    fn test_resolve_api_key_not_needed_for_ollama() {
        let config = AppConfig::default();
        assert_eq!(config.resolve_api_key("ollama").unwrap(), None);
        assert_eq!(config.resolve_api_key("mock").unwrap(), None);
    }

    #[test]
    fn test_resolve_api_key_prefers_override() {
        let mut config = AppConfig::default();
        config.api_key = Some("override-key".to_string());
        assert_eq!(
            config.resolve_api_key("gemini").unwrap(),
            Some("override-key".to_string())
        );
    }
}
