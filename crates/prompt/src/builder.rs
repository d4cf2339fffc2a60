//! Refinement prompt builder.

use crate::persona::CLINICAL_PERSONA;
use crate::types::RefinementPrompt;
use caduceus_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// Template joining the user's question with the grounded answer.
///
/// The "RAG Response:" label tells the refinement model which part of the
/// message is retrieved material. Downstream behavior depends on the exact
/// separator, so it lives here as data.
const REFINEMENT_TEMPLATE: &str = "{{question}} RAG Response:{{answer}}";

#[derive(Serialize)]
struct RefinementVars<'a> {
    question: &'a str,
    answer: &'a str,
}

/// Build the refinement prompt for a question and its retrieved answer.
///
/// # Example
/// ```
/// use caduceus_prompt::build_refinement_prompt;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = build_refinement_prompt("What changed?", "Creatinine rose.")?;
/// assert_eq!(prompt.user, "What changed? RAG Response:Creatinine rose.");
/// # Ok(())
/// # }
/// ```
pub fn build_refinement_prompt(
    question: &str,
    retrieved_answer: &str,
) -> AppResult<RefinementPrompt> {
    tracing::debug!("Building refinement prompt");

    let user = render_template(
        REFINEMENT_TEMPLATE,
        &RefinementVars {
            question,
            answer: retrieved_answer,
        },
    )?;

    Ok(RefinementPrompt {
        system: CLINICAL_PERSONA.to_string(),
        user,
    })
}

/// Render a Handlebars template with the given variables.
fn render_template<T: Serialize>(template: &str, variables: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // The message goes to an API, not a browser
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("refine", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("refine", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
