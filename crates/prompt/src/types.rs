//! Prompt types for the Caduceus assistant.

/// A fully built refinement prompt ready for the generation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementPrompt {
    /// System-level persona instruction
    pub system: String,

    /// User-level message (question plus retrieved answer)
    pub user: String,
}
