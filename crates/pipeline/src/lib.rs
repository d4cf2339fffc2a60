//! Retrieval-augmented response pipeline for the Caduceus assistant.
//!
//! This crate owns the orchestration contract between the two backends:
//! a remote RAG server produces a grounded answer, and a generation
//! backend re-styles it through the clinical persona. Everything else
//! (indexing, inference, storage) lives behind those backends.
//!
//! The pipeline favors always returning a displayable answer: backend
//! failures are recovered locally into fixed fallback strings and never
//! reach the conversation as errors.

pub mod documents;
pub mod orchestrator;
pub mod refine;
pub mod retrieval;
pub mod session;

// Re-export main types
pub use documents::DocumentCache;
pub use orchestrator::ChatSession;
pub use refine::{RefinementResult, RefinementStage, REFINEMENT_ERROR_FALLBACK};
pub use retrieval::{
    DocumentMetadata, HttpRetrievalClient, RetrievalBackend, RetrievalClient, RetrievalResult,
    NO_RESPONSE_FALLBACK, RETRIEVAL_ERROR_FALLBACK,
};
pub use session::{Conversation, Role, Turn};
