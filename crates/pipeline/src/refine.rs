//! Response refinement stage.
//!
//! Takes the grounded answer from retrieval and re-styles it through a
//! second generation call carrying the clinical persona. Reasoning models
//! may emit a delimited thinking trace; that block is removed before the
//! answer is considered final.

use caduceus_core::{AppError, AppResult};
use caduceus_llm::{LlmClient, LlmRequest};
use caduceus_prompt::build_refinement_prompt;
use regex::Regex;
use std::sync::Arc;

/// Answer text shown when the generation call fails.
pub const REFINEMENT_ERROR_FALLBACK: &str = "Error processing the request.";

/// Sampling temperature for the refinement call.
const TEMPERATURE: f32 = 0.6;

/// Nucleus sampling threshold for the refinement call.
const TOP_P: f32 = 0.95;

/// Token budget for the refined answer.
const MAX_TOKENS: u32 = 2048;

/// Matches a delimited internal-reasoning block, non-greedy, across
/// newlines.
const THINK_BLOCK_PATTERN: &str = r"(?s)<think>.*?</think>";

/// The refined final answer.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementResult {
    /// Cleaned answer text with any reasoning trace removed
    pub text: String,
}

/// Persona-styled refinement over a generation backend.
pub struct RefinementStage {
    client: Arc<dyn LlmClient>,
    model: String,
    think_block: Regex,
}

impl RefinementStage {
    /// Create a refinement stage over a generation client.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> AppResult<Self> {
        let think_block = Regex::new(THINK_BLOCK_PATTERN)
            .map_err(|e| AppError::Prompt(format!("Invalid reasoning-block pattern: {}", e)))?;

        Ok(Self {
            client,
            model: model.into(),
            think_block,
        })
    }

    /// Refine a retrieved answer into the final persona-styled answer.
    ///
    /// Generation failures are logged and recovered into a fixed fallback
    /// answer; they never propagate to the orchestrator. The retrieved
    /// answer may itself be a retrieval fallback string; refinement runs
    /// on whatever text is available.
    pub async fn refine(&self, question: &str, retrieved_answer: &str) -> RefinementResult {
        let prompt = match build_refinement_prompt(question, retrieved_answer) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!(operation = "refine", error = %e, "Prompt construction failed");
                return RefinementResult {
                    text: REFINEMENT_ERROR_FALLBACK.to_string(),
                };
            }
        };

        let request = LlmRequest::new(prompt.user, &self.model)
            .with_system(prompt.system)
            .with_temperature(TEMPERATURE)
            .with_top_p(TOP_P)
            .with_max_tokens(MAX_TOKENS);

        match self.client.complete(&request).await {
            Ok(response) => RefinementResult {
                text: self.clean(&response.content),
            },
            Err(e) => {
                tracing::error!(
                    operation = "refine",
                    provider = self.client.provider_name(),
                    error = %e,
                    "Generation failed, substituting fallback answer"
                );
                RefinementResult {
                    text: REFINEMENT_ERROR_FALLBACK.to_string(),
                }
            }
        }
    }

    /// Remove delimited reasoning blocks and trim surrounding whitespace.
    fn clean(&self, raw: &str) -> String {
        self.think_block.replace_all(raw, "").trim().to_string()
    }
}
