//! Groq generation provider.
//!
//! Speaks the OpenAI-compatible chat-completions API hosted by Groq.
//! API reference: https://console.groq.com/docs/api-reference

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use caduceus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hosted Groq endpoint.
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// One chat message on the wire.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Groq generation client.
pub struct GroqClient {
    /// Base URL for the chat-completions API
    base_url: String,

    /// Bearer token for the hosted API
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a new Groq client against the hosted endpoint.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout)
    }

    /// Create a new Groq client with a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Generation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert an LlmRequest to the chat-completions format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::new();

        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Groq");
        tracing::debug!("Model: {}", request.model);

        let chat_request = self.to_chat_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to send request to Groq: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "Groq API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse Groq response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::Generation("Groq response contained no choices".to_string())
            })?;

        let usage = chat_response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        tracing::info!("Received completion from Groq");

        Ok(LlmResponse {
            content,
            model: chat_response.model,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GroqClient {
        GroqClient::new("gsk_test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_groq_client_creation() {
        let client = test_client();
        assert_eq!(client.provider_name(), "groq");
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_chat_request_message_order() {
        let client = test_client();
        let request = LlmRequest::new("the question", "deepseek-r1-distill-llama-70b")
            .with_system("the persona")
            .with_temperature(0.6)
            .with_top_p(0.95)
            .with_max_tokens(2048);

        let chat = client.to_chat_request(&request);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[0].content, "the persona");
        assert_eq!(chat.messages[1].role, "user");
        assert_eq!(chat.messages[1].content, "the question");
        assert_eq!(chat.temperature, Some(0.6));
        assert_eq!(chat.top_p, Some(0.95));
        assert_eq!(chat.max_tokens, Some(2048));
        assert!(!chat.stream);
    }

    #[test]
    fn test_chat_request_without_system() {
        let client = test_client();
        let request = LlmRequest::new("hello", "llama3");

        let chat = client.to_chat_request(&request);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].role, "user");
    }

    #[test]
    fn test_parse_chat_response() {
        let json = r#"{
            "model": "deepseek-r1-distill-llama-70b",
            "choices": [{"message": {"role": "assistant", "content": "Refined."}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
        }"#;

        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Refined.");
        assert_eq!(parsed.usage.as_ref().map(|u| u.prompt_tokens), Some(42));
    }
}
