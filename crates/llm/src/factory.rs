//! Generation provider factory.
//!
//! Creates generation clients from the application configuration: provider
//! name in, boxed `LlmClient` out, with secrets supplied by the caller.

use crate::client::LlmClient;
use crate::providers::{GroqClient, OllamaClient};
use caduceus_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create a generation client for the named provider.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq" or "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for Groq)
/// * `timeout` - Request timeout applied to the HTTP client
///
/// # Errors
/// Returns an error when the provider is unknown, a required key is
/// missing, or client initialization fails.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "groq" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Groq provider requires an API key".to_string())
            })?;

            let client = match endpoint {
                Some(url) => GroqClient::with_base_url(url, api_key, timeout)?,
                None => GroqClient::new(api_key, timeout)?,
            };

            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url, timeout)?,
                None => OllamaClient::new(timeout)?,
            };

            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
