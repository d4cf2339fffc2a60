//! Configuration management for the Caduceus assistant.
//!
//! This module handles loading and merging configuration from multiple
//! sources, later layers winning:
//! - Built-in defaults
//! - An optional YAML config file (`caduceus.yaml` or `$CADUCEUS_CONFIG`)
//! - Environment variables
//! - Command-line flags (applied via [`AppConfig::with_overrides`])
//!
//! The retrieval backend's host and port keep their original environment
//! names (`PATHWAY_HOST`/`PATHWAY_PORT`); Caduceus-owned settings use a
//! `CADUCEUS_` prefix.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// RAG server host when `PATHWAY_HOST` is unset.
const DEFAULT_RETRIEVAL_HOST: &str = "localhost";

/// RAG server port when `PATHWAY_PORT` is unset.
const DEFAULT_RETRIEVAL_PORT: u16 = 8000;

/// Request timeout applied to backend HTTP clients, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable consulted for the Groq API key when the provider
/// table does not name one.
const DEFAULT_GROQ_KEY_ENV: &str = "GROQ_API_KEY";

/// Main application configuration.
///
/// Holds everything the front end needs to wire the pipeline: where the
/// retrieval backend lives, which generation provider refines answers, and
/// where the pipeline manifest sits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// RAG server host
    pub retrieval_host: String,

    /// RAG server port
    pub retrieval_port: u16,

    /// Active generation provider ("groq" or "ollama")
    pub provider: String,

    /// Model identifier for the refinement call
    pub model: String,

    /// Explicit API key override for the generation provider
    pub api_key: Option<String>,

    /// Request timeout for backend calls, in seconds
    pub timeout_secs: u64,

    /// Path to the pipeline manifest consumed by the RAG server
    pub manifest_path: PathBuf,

    /// Storage folder holding per-patient subfolders
    pub parent_folder_id: Option<String>,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Generation provider table from the config file
    pub llm: Option<LlmConfig>,
}

/// Generation provider configuration from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Groq {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
    },
}

impl ProviderConfig {
    /// Get the model name for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Groq { model, .. } => model,
            Self::Ollama { model, .. } => model,
        }
    }

    /// Get the custom endpoint, if one is configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Groq { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    retrieval: Option<RetrievalConfig>,
    llm: Option<LlmConfig>,
    storage: Option<StorageConfig>,
    logging: Option<LoggingConfig>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalConfig {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageConfig {
    #[serde(rename = "parentFolderId")]
    parent_folder_id: Option<String>,
    manifest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            retrieval_host: DEFAULT_RETRIEVAL_HOST.to_string(),
            retrieval_port: DEFAULT_RETRIEVAL_PORT,
            provider: "groq".to_string(),
            model: "deepseek-r1-distill-llama-70b".to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            manifest_path: PathBuf::from("app.yaml"),
            parent_folder_id: None,
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `PATHWAY_HOST` / `PATHWAY_PORT`: RAG server location
    /// - `CADUCEUS_CONFIG`: Path to config file
    /// - `CADUCEUS_PROVIDER`: Generation provider
    /// - `CADUCEUS_MODEL`: Model identifier
    /// - `CADUCEUS_API_KEY`: Explicit API key override
    /// - `CADUCEUS_MANIFEST`: Pipeline manifest path
    /// - `PARENT_FOLDER_ID`: Storage parent folder
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("CADUCEUS_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("caduceus.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the config file
        if let Ok(host) = std::env::var("PATHWAY_HOST") {
            config.retrieval_host = host;
        }

        if let Ok(port) = std::env::var("PATHWAY_PORT") {
            config.retrieval_port = port
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid PATHWAY_PORT value: {}", port)))?;
        }

        if let Ok(provider) = std::env::var("CADUCEUS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CADUCEUS_MODEL") {
            config.model = model;
        }

        if let Ok(manifest) = std::env::var("CADUCEUS_MANIFEST") {
            config.manifest_path = PathBuf::from(manifest);
        }

        if let Ok(parent) = std::env::var("PARENT_FOLDER_ID") {
            config.parent_folder_id = Some(parent);
        }

        config.api_key = std::env::var("CADUCEUS_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(retrieval) = config_file.retrieval {
            if let Some(host) = retrieval.host {
                result.retrieval_host = host;
            }
            if let Some(port) = retrieval.port {
                result.retrieval_port = port;
            }
        }

        if let Some(storage) = config_file.storage {
            if let Some(parent) = storage.parent_folder_id {
                result.parent_folder_id = Some(parent);
            }
            if let Some(manifest) = storage.manifest {
                result.manifest_path = PathBuf::from(manifest);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(timeout) = config_file.timeout_secs {
            result.timeout_secs = timeout;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over both the config file and
    /// environment variables.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Base URL of the retrieval backend.
    pub fn retrieval_url(&self) -> String {
        format!("http://{}:{}", self.retrieval_host, self.retrieval_port)
    }

    /// Get the configuration entry for a provider, if present.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Custom endpoint for the active provider, if one is configured.
    pub fn provider_endpoint(&self) -> Option<&str> {
        self.get_provider_config(&self.provider)
            .and_then(|pc| pc.endpoint())
    }

    /// Resolve the API key for the active provider.
    ///
    /// An explicit `CADUCEUS_API_KEY` wins; otherwise the provider table's
    /// `apiKeyEnv` is consulted, falling back to `GROQ_API_KEY` for the
    /// default Groq provider. Ollama needs no key.
    pub fn resolve_api_key(&self) -> AppResult<Option<String>> {
        if let Some(ref key) = self.api_key {
            return Ok(Some(key.clone()));
        }

        let env_var = match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::Groq { api_key_env, .. }) => Some(api_key_env.clone()),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if self.provider == "groq" => Some(DEFAULT_GROQ_KEY_ENV.to_string()),
            None => None,
        };

        if let Some(env_var) = env_var {
            if let Ok(key) = std::env::var(&env_var) {
                return Ok(Some(key));
            }
        }

        Ok(None)
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;
        let known_providers = ["groq", "ollama"];

        if !known_providers.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                known_providers.join(", ")
            )));
        }

        if provider == "groq" && self.resolve_api_key()?.is_none() {
            return Err(AppError::Config(format!(
                "Groq API key not found. Set {} or configure apiKeyEnv.",
                DEFAULT_GROQ_KEY_ENV
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.retrieval_host, "localhost");
        assert_eq!(config.retrieval_port, 8000);
        assert_eq!(config.provider, "groq");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.manifest_path, PathBuf::from("app.yaml"));
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_retrieval_url() {
        let mut config = AppConfig::default();
        config.retrieval_host = "rag.internal".to_string();
        config.retrieval_port = 9001;
        assert_eq!(config.retrieval_url(), "http://rag.internal:9001");
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let mut config = AppConfig::default();
        config.api_key = Some("gsk_test".to_string());
        assert_eq!(config.resolve_api_key().unwrap(), Some("gsk_test".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let yaml = r#"
retrieval:
  host: rag.example.org
  port: 8080
timeoutSecs: 30
storage:
  parentFolderId: folder-123
  manifest: pipeline/app.yaml
logging:
  level: debug
  color: false
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
"#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&file.path().to_path_buf()).unwrap();

        assert_eq!(merged.retrieval_host, "rag.example.org");
        assert_eq!(merged.retrieval_port, 8080);
        assert_eq!(merged.timeout_secs, 30);
        assert_eq!(merged.parent_folder_id, Some("folder-123".to_string()));
        assert_eq!(merged.manifest_path, PathBuf::from("pipeline/app.yaml"));
        assert_eq!(merged.log_level, Some("debug".to_string()));
        assert!(merged.no_color);
        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "llama3.2");
        assert_eq!(merged.provider_endpoint(), Some("http://localhost:11434"));
    }
}
