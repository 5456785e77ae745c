//! Prompt types for the Scholar tutor.
//!
//! This module defines the persona the tutor speaks with and the YAML
//! shape of a system-prompt template.

use scholar_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Interest used when none (or a blank one) is chosen.
pub const DEFAULT_INTEREST: &str = "General";

/// Interests offered by the interactive menu. Any other text is accepted
/// as a custom interest.
pub const SUGGESTED_INTERESTS: [&str; 4] = ["General", "Cricket", "F1", "Cooking"];

/// How long the tutor's answers should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    #[default]
    Concise,
    Detailed,
}

impl ResponseMode {
    /// Parse a response mode, case-insensitively.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "concise" => Ok(Self::Concise),
            "detailed" => Ok(Self::Detailed),
            other => Err(AppError::Prompt(format!(
                "Unknown response mode: {} (expected concise or detailed)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer style plus the topic examples should be drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub mode: ResponseMode,
    pub interest: String,
}

impl Persona {
    pub fn new(mode: ResponseMode, interest: impl Into<String>) -> Self {
        let mut persona = Self {
            mode,
            interest: DEFAULT_INTEREST.to_string(),
        };
        persona.set_interest(interest);
        persona
    }

    /// Change the interest; blank input falls back to the default.
    pub fn set_interest(&mut self, interest: impl Into<String>) {
        let interest = interest.into();
        let trimmed = interest.trim();
        self.interest = if trimmed.is_empty() {
            DEFAULT_INTEREST.to_string()
        } else {
            trimmed.to_string()
        };
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            mode: ResponseMode::default(),
            interest: DEFAULT_INTEREST.to_string(),
        }
    }
}

/// A system-prompt template loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Handlebars template; `{{mode}}` and `{{interest}}` are available
    pub template: String,
}

/// A rendered system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Rendered system text
    pub system: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

impl BuiltPrompt {
    pub fn new(
        system: String,
        source_prompt_id: String,
        resolved_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            system,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                resolved_variables,
            },
        }
    }
}
