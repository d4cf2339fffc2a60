//! Folders command handler.
//!
//! Lists patient folders in storage and binds the pipeline manifest to a
//! selected folder. The RAG server picks up the new binding on restart.

use caduceus_core::{config::AppConfig, manifest, AppError, AppResult};
use caduceus_storage::{DriveClient, StorageBackend};
use clap::{Args, Subcommand};
use std::time::Duration;

/// Environment variable holding the storage bearer token.
const TOKEN_ENV: &str = "DRIVE_ACCESS_TOKEN";

/// List patient folders or bind the pipeline to one
#[derive(Args, Debug)]
pub struct FoldersCommand {
    #[command(subcommand)]
    pub action: FoldersAction,
}

#[derive(Subcommand, Debug)]
pub enum FoldersAction {
    /// List patient folders under the configured parent folder
    List {
        /// Parent folder holding per-patient subfolders
        #[arg(long, env = "PARENT_FOLDER_ID")]
        parent: Option<String>,
    },

    /// Bind the pipeline manifest to a patient folder
    Select {
        /// Folder identifier to write into the manifest
        folder_id: String,
    },
}

impl FoldersCommand {
    /// Execute the folders command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing folders command");

        match &self.action {
            FoldersAction::List { parent } => self.list(config, parent.as_deref()).await,
            FoldersAction::Select { folder_id } => self.select(config, folder_id),
        }
    }

    async fn list(&self, config: &AppConfig, parent: Option<&str>) -> AppResult<()> {
        let parent_id = parent
            .map(str::to_string)
            .or_else(|| config.parent_folder_id.clone())
            .ok_or_else(|| {
                AppError::Config(
                    "No parent folder configured. Set PARENT_FOLDER_ID or pass --parent."
                        .to_string(),
                )
            })?;

        let client = storage_client(config)?;
        let folders = client.list_folders(&parent_id).await?;

        if folders.is_empty() {
            println!("No patient folders found.");
            return Ok(());
        }

        for folder in &folders {
            println!("{}  {}", folder.id, folder.name);
        }

        Ok(())
    }

    fn select(&self, config: &AppConfig, folder_id: &str) -> AppResult<()> {
        manifest::set_object_id(&config.manifest_path, folder_id)?;
        println!(
            "Pipeline manifest {:?} now targets folder {}.",
            config.manifest_path, folder_id
        );
        println!("Restart the RAG server to pick up the new folder.");
        Ok(())
    }
}

/// Build the storage client from the environment-held token.
pub(crate) fn storage_client(config: &AppConfig) -> AppResult<DriveClient> {
    let token = std::env::var(TOKEN_ENV).map_err(|_| {
        AppError::Config(format!(
            "Storage access token not found. Set {}.",
            TOKEN_ENV
        ))
    })?;

    DriveClient::new(token, Duration::from_secs(config.timeout_secs))
}
