//! Storage backend types.

use serde::{Deserialize, Serialize};

/// A folder in the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFolder {
    /// Backend-assigned folder identifier
    pub id: String,

    /// Display name (e.g., the patient name)
    pub name: String,
}

/// A file stored in the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFile {
    /// Backend-assigned file identifier
    pub id: String,

    /// File name
    pub name: String,
}
