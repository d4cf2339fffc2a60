//! Command handlers for the Caduceus CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod chat;
pub mod documents;
pub mod folders;
pub mod upload;

// Re-export command types for convenience
pub use chat::ChatCommand;
pub use documents::DocumentsCommand;
pub use folders::FoldersCommand;
pub use upload::UploadCommand;
