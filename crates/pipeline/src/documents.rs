//! Session-scoped document metadata cache.

use crate::retrieval::{DocumentMetadata, RetrievalClient};
use caduceus_core::AppResult;

/// Snapshot of the server's indexed documents for one session.
///
/// Refreshes are user-triggered only; there is no expiry. Each refresh
/// replaces the snapshot wholesale, never merging entries, and a failed
/// refresh keeps the previous snapshot so the display never goes blank on
/// a transient error.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: Vec<DocumentMetadata>,
    populated: bool,
}

impl DocumentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entries, in server order.
    pub fn entries(&self) -> &[DocumentMetadata] {
        &self.entries
    }

    /// Whether the cache has been populated at least once.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// File names for sidebar-style display.
    pub fn file_names(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.file_name()).collect()
    }

    /// Re-issue the listing call and replace the snapshot wholesale.
    pub async fn refresh(&mut self, client: &RetrievalClient) -> AppResult<&[DocumentMetadata]> {
        let entries = client.list_documents().await?;
        tracing::debug!("Document cache refreshed with {} entries", entries.len());

        self.entries = entries;
        self.populated = true;
        Ok(&self.entries)
    }
}
