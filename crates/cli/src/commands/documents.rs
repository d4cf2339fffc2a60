//! Documents command handler.
//!
//! Lists the files currently indexed by the RAG server.

use caduceus_core::{config::AppConfig, AppResult};
use caduceus_pipeline::{HttpRetrievalClient, RetrievalClient};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

/// List documents indexed by the RAG server
#[derive(Args, Debug)]
pub struct DocumentsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show full paths instead of file names
    #[arg(long)]
    pub full_paths: bool,
}

impl DocumentsCommand {
    /// Execute the documents command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing documents command");

        let timeout = Duration::from_secs(config.timeout_secs);
        let backend = HttpRetrievalClient::new(config.retrieval_url(), timeout)?;
        let client = RetrievalClient::new(Arc::new(backend));

        let documents = client.list_documents().await?;

        if self.json {
            let paths: Vec<&str> = documents.iter().map(|d| d.path.as_str()).collect();
            println!("{}", serde_json::to_string_pretty(&paths)?);
            return Ok(());
        }

        if documents.is_empty() {
            println!("No indexed files found.");
            return Ok(());
        }

        for doc in &documents {
            if self.full_paths {
                println!("- {}", doc.path);
            } else {
                println!("- {}", doc.file_name());
            }
        }

        Ok(())
    }
}
