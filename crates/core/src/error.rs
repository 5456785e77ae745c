//! Error types for the Scholar assistant.
//!
//! This module defines a unified error enum shared by every crate in the
//! workspace. File-level variants are recoverable per file, service-level
//! variants are recoverable per turn, and only configuration problems and
//! missing credentials are allowed to end the process.

use thiserror::Error;

/// Unified error type for the Scholar assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic: errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// No loader is registered for the file's extension
    #[error("Unsupported file type: {name}")]
    UnsupportedFileType { name: String },

    /// A single document could not be read or parsed
    #[error("Failed to parse document {name}: {reason}")]
    DocumentParse { name: String, reason: String },

    /// The embedding service failed (network, auth, rate limit, bad reply)
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    /// The chat-completion service failed
    #[error("Chat service error: {0}")]
    ChatService(String),

    /// The web search service failed
    #[error("Web search error: {0}")]
    WebSearch(String),

    /// A credential required by the service being used is not configured
    #[error("Missing credential: {credential} (set the {env_var} environment variable)")]
    MissingCredential { credential: String, env_var: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Knowledge base errors (index construction, merging)
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a `MissingCredential` error for an environment variable.
    pub fn missing_credential(credential: impl Into<String>, env_var: impl Into<String>) -> Self {
        AppError::MissingCredential {
            credential: credential.into(),
            env_var: env_var.into(),
        }
    }

    /// Whether a conversation turn can absorb this error and carry on.
    ///
    /// Missing credentials and broken configuration cannot be fixed by
    /// retrying the next question, so they propagate to the caller.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AppError::MissingCredential { .. } | AppError::Config(_)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
