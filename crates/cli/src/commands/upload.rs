//! Upload command handler.
//!
//! Uploads a local file into a patient folder in storage. The RAG server
//! indexes the new document on its own schedule.

use crate::commands::folders::storage_client;
use caduceus_core::{config::AppConfig, manifest, AppError, AppResult};
use caduceus_storage::StorageBackend;
use clap::Args;
use std::path::PathBuf;

/// Upload a file to patient storage
#[derive(Args, Debug)]
pub struct UploadCommand {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination folder id (defaults to the manifest's current target)
    #[arg(long)]
    pub folder: Option<String>,
}

impl UploadCommand {
    /// Execute the upload command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing upload command");

        let folder_id = match &self.folder {
            Some(folder) => folder.clone(),
            None => manifest::read_object_id(&config.manifest_path)?.ok_or_else(|| {
                AppError::Config(format!(
                    "No destination folder. Pass --folder or set object_id in {:?}.",
                    config.manifest_path
                ))
            })?,
        };

        let name = self
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::Validation(format!("Invalid file name: {:?}", self.file))
            })?;

        let bytes = std::fs::read(&self.file)?;
        tracing::debug!("Read {} bytes from {:?}", bytes.len(), self.file);

        let client = storage_client(config)?;
        let uploaded = client.upload_file(&folder_id, name, bytes).await?;

        println!("Uploaded {} (id {}).", uploaded.name, uploaded.id);

        Ok(())
    }
}
