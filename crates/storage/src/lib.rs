//! File storage integration for Caduceus.
//!
//! Source documents live in a cloud drive, one folder per patient. This
//! crate covers the two operations the surrounding tooling needs: listing
//! folders under a parent and uploading a file into a folder. It is not
//! part of the chat pipeline.

pub mod client;
pub mod types;

// Re-export main types
pub use client::{DriveClient, StorageBackend};
pub use types::{StorageFile, StorageFolder};
