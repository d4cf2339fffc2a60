//! Caduceus CLI
//!
//! Front end for the Caduceus healthcare chat assistant. Hosts the
//! retrieval-and-refinement pipeline and the surrounding tooling:
//! document listing, patient-folder selection, and file upload.

mod commands;

use caduceus_core::{config::AppConfig, logging, AppResult};
use clap::{Parser, Subcommand};
use commands::{ChatCommand, DocumentsCommand, FoldersCommand, UploadCommand};
use std::path::PathBuf;

/// Caduceus - healthcare diagnostics support over a RAG backend
#[derive(Parser, Debug)]
#[command(name = "caduceus")]
#[command(about = "Healthcare diagnostics support chat over a RAG backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "CADUCEUS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generation provider (groq, ollama)
    #[arg(short, long, global = true, env = "CADUCEUS_PROVIDER")]
    provider: Option<String>,

    /// Model identifier for the refinement call
    #[arg(short, long, global = true, env = "CADUCEUS_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the assistant
    Chat(ChatCommand),

    /// List documents indexed by the RAG server
    Documents(DocumentsCommand),

    /// List patient folders or bind the pipeline to one
    Folders(FoldersCommand),

    /// Upload a file to patient storage
    Upload(UploadCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    // Log startup
    tracing::info!("Caduceus CLI starting");
    tracing::debug!("Retrieval backend: {}", config.retrieval_url());
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Documents(_) => "documents",
        Commands::Folders(_) => "folders",
        Commands::Upload(_) => "upload",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Documents(cmd) => cmd.execute(&config).await,
        Commands::Folders(cmd) => cmd.execute(&config).await,
        Commands::Upload(cmd) => cmd.execute(&config).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
