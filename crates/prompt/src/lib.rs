//! Prompt system for the Caduceus assistant.
//!
//! This crate holds the refinement stage's prompt material:
//! - The static clinical persona (system-level instruction)
//! - The refinement prompt builder (Handlebars template rendering)
//!
//! The persona is configuration, not logic: it is kept as a single static
//! artifact and injected as the system-level input of every refinement
//! call.

pub mod builder;
pub mod persona;
pub mod types;

// Re-export main types
pub use builder::build_refinement_prompt;
pub use persona::CLINICAL_PERSONA;
pub use types::RefinementPrompt;
