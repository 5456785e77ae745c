//! Prompt system for the Scholar tutor.
//!
//! This crate provides:
//! - The tutor persona (response mode and interest)
//! - YAML-based system prompt definitions with a built-in default
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_system_prompt;
pub use loader::{
    default_prompt, list_prompts, load_prompt, load_prompt_or_default, DEFAULT_PROMPT_ID,
};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, Persona, PromptDefinition, ResponseMode, DEFAULT_INTEREST,
    SUGGESTED_INTERESTS,
};
