//! Chat-completion integration crate for Scholar.
//!
//! This crate provides a provider-agnostic abstraction over chat models.
//! A turn is a single request carrying the ordered, role-tagged messages
//! and a single reply.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use scholar_llm::{ChatClient, ChatMessage, ChatRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = ChatRequest::new("llama3.2", vec![ChatMessage::user("Hello!")]);
//! let response = client.chat(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatClient, ChatRequest, ChatResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, OllamaClient};
pub use types::{ChatMessage, ChatRole, ProviderType};
