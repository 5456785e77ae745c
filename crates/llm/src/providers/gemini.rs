//! Google Gemini chat provider implementation.
//!
//! Gemini API: https://ai.google.dev/api/generate-content

use crate::client::{ChatClient, ChatRequest, ChatResponse, LlmUsage};
use crate::types::ChatRole;
use scholar_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Gemini chat client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against the public Gemini endpoint.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_options(
            api_key,
            DEFAULT_GEMINI_URL,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    /// Create a client with a custom endpoint and request timeout.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ChatService(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.trim_start_matches("models/");
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Convert ChatRequest to the generateContent format.
    ///
    /// System messages are folded into `systemInstruction`; assistant turns
    /// use Gemini's `model` role.
    fn to_gemini_request(&self, request: &ChatRequest) -> GenerateContentRequest {
        let system_text = request
            .messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system_instruction = if system_text.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part { text: system_text }],
            })
        };

        let contents = request
            .messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .map(|m| Content {
                role: Some(
                    match m.role {
                        ChatRole::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config,
        }
    }

    fn convert_response(
        &self,
        request: &ChatRequest,
        response: GenerateContentResponse,
    ) -> AppResult<ChatResponse> {
        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| {
                AppError::ChatService("Gemini returned no candidates".to_string())
            })?;

        let usage = response
            .usage_metadata
            .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(ChatResponse {
            content,
            model: response
                .model_version
                .unwrap_or_else(|| request.model.clone()),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl ChatClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!("Sending chat request to Gemini (model: {})", request.model);
        tracing::debug!("Request has {} messages", request.messages.len());

        let body = self.to_gemini_request(request);

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ChatService(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ChatService(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::ChatService(format!("Failed to parse Gemini response: {}", e)))?;

        let chat_response = self.convert_response(request, parsed)?;

        tracing::info!("Received completion from Gemini");
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}",
            chat_response.usage.prompt_tokens,
            chat_response.usage.completion_tokens
        );

        Ok(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    fn client() -> GeminiClient {
        GeminiClient::new("test-key").unwrap()
    }

    #[test]
    fn test_endpoint_accepts_prefixed_model() {
        let client = client();
        assert_eq!(
            client.endpoint("models/gemini-1.5-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(client.endpoint("gemini-1.5-pro"), client.endpoint("models/gemini-1.5-pro"));
    }

    #[test]
    fn test_request_conversion_maps_roles() {
        let request = ChatRequest::new(
            "gemini-1.5-pro",
            vec![
                ChatMessage::system("You are a tutor."),
                ChatMessage::user("What is X?"),
                ChatMessage::assistant("X is a letter."),
                ChatMessage::user("And Y?"),
            ],
        )
        .with_temperature(0.7);

        let body = serde_json::to_value(client().to_gemini_request(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a tutor.");
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert!(body["generationConfig"]["temperature"].is_number());
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let raw = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 2, "totalTokenCount": 12}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let request = ChatRequest::new("gemini-1.5-pro", vec![]);

        let response = client().convert_response(&request, parsed).unwrap();
        assert_eq!(response.content, "Hello there");
        assert_eq!(response.model, "gemini-1.5-pro");
        assert_eq!(response.usage.total_tokens, 12);
    }

    #[test]
    fn test_empty_candidates_is_chat_error() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let request = ChatRequest::new("gemini-1.5-pro", vec![]);

        let err = client().convert_response(&request, parsed).unwrap_err();
        assert!(matches!(err, AppError::ChatService(_)));
    }
}
