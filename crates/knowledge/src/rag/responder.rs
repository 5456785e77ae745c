//! Chat responder.
//!
//! Folds the retrieved context and the latest question into the system
//! message, sends it with the conversation history, and turns any failure
//! into a visible reply so the session stays usable.

use crate::rag::types::RetrievedContext;
use scholar_llm::{ChatClient, ChatMessage, ChatRequest, ChatRole};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one responder call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub content: String,

    /// Set when `content` describes a failure rather than an answer
    pub is_error: bool,

    /// Model that answered, when the call succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Reply {
    fn answer(content: String, model: String) -> Self {
        Self {
            content,
            is_error: false,
            model: Some(model),
        }
    }

    pub(crate) fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            content: format!("Error getting response: {}", error),
            is_error: true,
            model: None,
        }
    }
}

#[derive(Clone)]
pub struct ChatResponder {
    client: Arc<dyn ChatClient>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl ChatResponder {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Assemble the message list for one turn.
    ///
    /// The system message carries the prompt, the question and the context.
    /// History follows in order; if it does not already end with `question`
    /// as a user turn, that turn is appended.
    pub fn build_messages(
        system_prompt: &str,
        history: &[ChatMessage],
        question: &str,
        context: &RetrievedContext,
    ) -> Vec<ChatMessage> {
        let system = format!(
            "{}\n{}\n\n{}:\n{}",
            system_prompt,
            question,
            context.heading(),
            context.render()
        );

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend(history.iter().cloned());

        let ends_with_question = history
            .last()
            .is_some_and(|m| m.role == ChatRole::User && m.content == question);
        if !ends_with_question {
            messages.push(ChatMessage::user(question));
        }

        messages
    }

    /// Ask the chat model once. Never fails; errors become the reply text.
    pub async fn respond(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        question: &str,
        context: &RetrievedContext,
    ) -> Reply {
        let messages = Self::build_messages(system_prompt, history, question, context);
        let mut request = ChatRequest::new(&self.model, messages);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            "Sending {} messages to {} ({})",
            request.messages.len(),
            self.client.provider_name(),
            self.model
        );

        match self.client.chat(&request).await {
            Ok(response) => {
                tracing::debug!(
                    "Chat reply: {} chars, {} tokens",
                    response.content.len(),
                    response.usage.total_tokens
                );
                Reply::answer(response.content, response.model)
            }
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                Reply::failure(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchHit;
    use crate::tests::doubles::{FailingChat, StubChat};

    fn web_context() -> RetrievedContext {
        RetrievedContext::Web {
            hits: vec![SearchHit {
                title: "Rust".to_string(),
                link: "https://www.rust-lang.org".to_string(),
                snippet: "A language".to_string(),
            }],
        }
    }

    #[test]
    fn test_build_messages_puts_context_in_system_prompt() {
        let history = vec![
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello!"),
            ChatMessage::user("What is Rust?"),
        ];

        let messages = ChatResponder::build_messages(
            "You are helpful.",
            &history,
            "What is Rust?",
            &web_context(),
        );

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(
            messages[0].content,
            "You are helpful.\nWhat is Rust?\n\nWeb Search Results:\nRust: https://www.rust-lang.org\nA language"
        );
        assert_eq!(&messages[1..], &history[..]);
    }

    #[test]
    fn test_build_messages_appends_missing_question() {
        let messages = ChatResponder::build_messages(
            "sys",
            &[ChatMessage::user("earlier")],
            "now",
            &web_context(),
        );

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], ChatMessage::user("now"));
    }

    #[tokio::test]
    async fn test_respond_passes_model_settings() {
        let chat = Arc::new(StubChat::new("An answer"));
        let responder = ChatResponder::new(chat.clone(), "gemini-1.5-pro")
            .with_temperature(0.7)
            .with_max_tokens(Some(256));

        let reply = responder
            .respond("sys", &[ChatMessage::user("q")], "q", &web_context())
            .await;

        assert_eq!(reply.content, "An answer");
        assert!(!reply.is_error);
        let request = chat.last_request().unwrap();
        assert_eq!(request.model, "gemini-1.5-pro");
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_respond_turns_failure_into_reply() {
        let responder = ChatResponder::new(Arc::new(FailingChat), "model");

        let reply = responder
            .respond("sys", &[ChatMessage::user("q")], "q", &web_context())
            .await;

        assert!(reply.is_error);
        assert!(reply.content.starts_with("Error getting response: "));
        assert!(reply.content.contains("request timed out"));
        assert_eq!(reply.model, None);
    }
}
