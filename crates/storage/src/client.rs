//! Drive-style storage client.
//!
//! Speaks the Drive v3 REST surface. Obtaining the access token is the
//! operator's concern; the client only consumes a bearer token.
//! API reference: https://developers.google.com/drive/api/reference/rest/v3

use crate::types::{StorageFile, StorageFolder};
use caduceus_core::{AppError, AppResult};
use serde::Deserialize;
use std::time::Duration;

/// Metadata endpoint.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Upload endpoint (separate host path in Drive v3).
const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// MIME type Drive assigns to folders.
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Narrow interface over the file storage backend.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// List folders directly under a parent folder.
    async fn list_folders(&self, parent_id: &str) -> AppResult<Vec<StorageFolder>>;

    /// Upload a file into a folder.
    async fn upload_file(&self, parent_id: &str, name: &str, bytes: Vec<u8>)
        -> AppResult<StorageFile>;
}

/// Wire response for file listings.
#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Wire representation of a Drive file or folder.
#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

/// Drive v3 storage client.
pub struct DriveClient {
    base_url: String,
    upload_url: String,
    token: String,
    client: reqwest::Client,
}

impl DriveClient {
    /// Create a client against the hosted Drive endpoints.
    pub fn new(token: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Self::with_base_urls(DEFAULT_BASE_URL, DEFAULT_UPLOAD_URL, token, timeout)
    }

    /// Create a client with custom endpoints.
    pub fn with_base_urls(
        base_url: impl Into<String>,
        upload_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Storage(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_url: upload_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        })
    }

    /// Query selecting non-trashed folders under a parent.
    fn folder_query(parent_id: &str) -> String {
        format!(
            "'{}' in parents and mimeType = '{}' and trashed=false",
            parent_id, FOLDER_MIME_TYPE
        )
    }

    async fn check_status(response: reqwest::Response, context: &str) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(AppError::Storage(format!(
            "{} ({}): {}",
            context, status, error_text
        )))
    }
}

#[async_trait::async_trait]
impl StorageBackend for DriveClient {
    async fn list_folders(&self, parent_id: &str) -> AppResult<Vec<StorageFolder>> {
        tracing::info!("Listing storage folders under parent");

        let url = format!("{}/files", self.base_url);
        let query = Self::folder_query(parent_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("q", query.as_str()), ("fields", "files(id, name)")])
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to reach storage backend: {}", e)))?;

        let response = Self::check_status(response, "Storage list error").await?;

        let list: FileListResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to parse storage response: {}", e)))?;

        Ok(list
            .files
            .into_iter()
            .map(|f| StorageFolder {
                id: f.id,
                name: f.name,
            })
            .collect())
    }

    async fn upload_file(
        &self,
        parent_id: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> AppResult<StorageFile> {
        tracing::info!("Uploading {} ({} bytes) to storage", name, bytes.len());

        let metadata = serde_json::json!({
            "name": name,
            "parents": [parent_id],
        });

        let metadata_part = reqwest::multipart::Part::text(metadata.to_string())
            .mime_str("application/json")
            .map_err(|e| AppError::Storage(format!("Failed to build upload metadata: {}", e)))?;

        let media_part = reqwest::multipart::Part::bytes(bytes).file_name(name.to_string());

        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata_part)
            .part("media", media_part);

        let url = format!("{}/files", self.upload_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[("uploadType", "multipart"), ("fields", "id, name")])
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to reach storage backend: {}", e)))?;

        let response = Self::check_status(response, "Storage upload error").await?;

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to parse storage response: {}", e)))?;

        Ok(StorageFile {
            id: file.id,
            name: file.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_query() {
        assert_eq!(
            DriveClient::folder_query("folder-123"),
            "'folder-123' in parents and mimeType = 'application/vnd.google-apps.folder' and trashed=false"
        );
    }

    #[test]
    fn test_parse_file_list() {
        let json = r#"{"files": [
            {"id": "1a", "name": "Smith, John"},
            {"id": "2b", "name": "Doe, Jane"}
        ]}"#;

        let parsed: FileListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.files.len(), 2);
        assert_eq!(parsed.files[0].name, "Smith, John");
    }

    #[test]
    fn test_parse_empty_file_list() {
        let parsed: FileListResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn test_client_creation() {
        let client = DriveClient::new("ya29.token", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "https://www.googleapis.com/drive/v3");
        assert_eq!(client.upload_url, "https://www.googleapis.com/upload/drive/v3");
    }
}
