//! Generation client abstraction and request/response types.

use caduceus_core::AppResult;
use serde::{Deserialize, Serialize};

/// Generation completion request.
///
/// The refinement contract is non-streaming: one request in, one complete
/// response out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The user-level message to send
    pub prompt: String,

    /// Model identifier (e.g., "deepseek-r1-distill-llama-70b")
    pub model: String,

    /// System-level instruction (persona)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p nucleus sampling threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl LlmRequest {
    /// Create a new request with required fields.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
        }
    }

    /// Set the system-level instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the nucleus sampling threshold.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Generation completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text, as returned by the provider
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Usage statistics
    pub usage: LlmUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Trait for generation providers.
///
/// Abstracts the backend performing the refinement call (Groq, Ollama, a
/// test double) behind a single completion method.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "groq", "ollama").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming completion.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::new("question", "deepseek-r1-distill-llama-70b")
            .with_system("persona")
            .with_temperature(0.6)
            .with_top_p(0.95)
            .with_max_tokens(2048);

        assert_eq!(request.prompt, "question");
        assert_eq!(request.system.as_deref(), Some("persona"));
        assert_eq!(request.temperature, Some(0.6));
        assert_eq!(request.top_p, Some(0.95));
        assert_eq!(request.max_tokens, Some(2048));
    }

    #[test]
    fn test_usage_totals() {
        let usage = LlmUsage::new(120, 80);
        assert_eq!(usage.total_tokens, 200);
    }
}
