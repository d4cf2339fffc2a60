//! Generation backend integration for Caduceus.
//!
//! This crate provides a provider-agnostic abstraction over the hosted LLM
//! that performs response refinement. Groq is the hosted default; Ollama
//! covers keyless local runs.
//!
//! # Example
//! ```no_run
//! use caduceus_llm::{GroqClient, LlmClient, LlmRequest};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GroqClient::new("gsk_...", Duration::from_secs(60))?;
//! let request = LlmRequest::new("Summarize the labs.", "deepseek-r1-distill-llama-70b");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GroqClient, OllamaClient};
