//! Caduceus Core Library
//!
//! This crate provides the foundational utilities shared by the Caduceus
//! workspace:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Pipeline manifest handling

pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
