//! Configuration management for Deskchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{DeskchatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Deskchat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Language model backend configuration
    pub provider: ProviderConfig,
    /// Web search backend configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Page fetcher configuration
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Research pipeline configuration
    #[serde(default)]
    pub research: ResearchConfig,
    /// Storage locations
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provider configuration
///
/// Specifies which generation backend to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use for generation
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Base URL of the generative language API
    ///
    /// Overridable so tests can point the provider at a mock server.
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search backend: "duckduckgo" or "brave"
    #[serde(default = "default_search_engine")]
    pub engine: String,

    /// Number of result URLs the research pipeline considers
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Timeout for the search request itself (seconds)
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,

    /// DuckDuckGo HTML endpoint settings
    #[serde(default)]
    pub duckduckgo: DuckDuckGoConfig,

    /// Brave search API settings
    #[serde(default)]
    pub brave: BraveConfig,
}

fn default_search_engine() -> String {
    "duckduckgo".to_string()
}

fn default_result_limit() -> usize {
    3
}

fn default_search_timeout() -> u64 {
    15
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: default_search_engine(),
            result_limit: default_result_limit(),
            timeout_seconds: default_search_timeout(),
            duckduckgo: DuckDuckGoConfig::default(),
            brave: BraveConfig::default(),
        }
    }
}

/// DuckDuckGo HTML search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuckDuckGoConfig {
    /// HTML search endpoint
    #[serde(default = "default_duckduckgo_endpoint")]
    pub endpoint: String,
}

fn default_duckduckgo_endpoint() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            endpoint: default_duckduckgo_endpoint(),
        }
    }
}

/// Brave search API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BraveConfig {
    /// Web search endpoint
    #[serde(default = "default_brave_endpoint")]
    pub endpoint: String,

    /// Subscription token; falls back to `BRAVE_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_brave_endpoint() -> String {
    "https://api.search.brave.com/res/v1/web/search".to_string()
}

impl Default for BraveConfig {
    fn default() -> Self {
        Self {
            endpoint: default_brave_endpoint(),
            api_key: None,
        }
    }
}

/// Page fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-URL timeout (seconds)
    #[serde(default = "default_fetch_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Allow fetching loopback and private network hosts
    #[serde(default)]
    pub allow_private_hosts: bool,
}

fn default_fetch_timeout_seconds() -> u64 {
    10
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_fetch_timeout_seconds(),
            allow_private_hosts: false,
        }
    }
}

/// Research pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Characters of scraped text kept in the summarization prompt
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,
}

fn default_max_document_chars() -> usize {
    10_000
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_document_chars: default_max_document_chars(),
        }
    }
}

/// File locations for the conversation store and the settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path; the user data directory is used when unset
    #[serde(default)]
    pub history_db: Option<String>,

    /// Settings JSON path; the user config directory is used when unset
    #[serde(default)]
    pub settings_file: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "gemini".to_string(),
                gemini: GeminiConfig::default(),
                ollama: OllamaConfig::default(),
            },
            search: SearchConfig::default(),
            fetch: FetchConfig::default(),
            research: ResearchConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DeskchatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DeskchatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("DESKCHAT_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("DESKCHAT_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("DESKCHAT_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(host) = std::env::var("DESKCHAT_OLLAMA_HOST") {
            self.provider.ollama.host = host;
        }

        if let Ok(model) = std::env::var("DESKCHAT_OLLAMA_MODEL") {
            self.provider.ollama.model = model;
        }

        if let Ok(engine) = std::env::var("DESKCHAT_SEARCH_ENGINE") {
            self.search.engine = engine;
        }

        if let Ok(timeout) = std::env::var("DESKCHAT_FETCH_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.fetch.timeout_seconds = secs,
                Err(_) => tracing::warn!(
                    "Ignoring invalid DESKCHAT_FETCH_TIMEOUT_SECONDS value: {}",
                    timeout
                ),
            }
        }

        if let Ok(db_path) = std::env::var("DESKCHAT_HISTORY_DB") {
            self.storage.history_db = Some(db_path);
        }

        if let Ok(settings_path) = std::env::var("DESKCHAT_SETTINGS_FILE") {
            self.storage.settings_file = Some(settings_path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(db_path) = &cli.storage_path {
            tracing::debug!("Using storage DB override from CLI: {}", db_path);
            self.storage.history_db = Some(db_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(DeskchatError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["gemini", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(DeskchatError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        let valid_engines = ["duckduckgo", "brave"];
        if !valid_engines.contains(&self.search.engine.as_str()) {
            return Err(DeskchatError::Config(format!(
                "Invalid search engine: {}. Must be one of: {}",
                self.search.engine,
                valid_engines.join(", ")
            ))
            .into());
        }

        if self.search.result_limit == 0 {
            return Err(DeskchatError::Config(
                "search.result_limit must be greater than 0".to_string(),
            )
            .into());
        }

        if self.search.timeout_seconds == 0 {
            return Err(DeskchatError::Config(
                "search.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.fetch.timeout_seconds == 0 {
            return Err(DeskchatError::Config(
                "fetch.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.research.max_document_chars == 0 {
            return Err(DeskchatError::Config(
                "research.max_document_chars must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cli_with_storage(storage_path: Option<String>) -> crate::cli::Cli {
        crate::cli::Cli {
            config: None,
            verbose: false,
            storage_path,
            command: crate::cli::Commands::Chats {
                command: crate::cli::ChatsCommand::List,
            },
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, "gemini");
        assert_eq!(config.provider.gemini.model, "gemini-pro");
        assert_eq!(config.search.engine, "duckduckgo");
        assert_eq!(config.search.result_limit, 3);
        assert_eq!(config.fetch.timeout_seconds, 10);
        assert_eq!(config.research.max_document_chars, 10_000);
        assert!(!config.fetch.allow_private_hosts);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_provider() {
        let mut config = Config::default();
        config.provider.provider_type = "copilot".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid provider type"));
    }

    #[test]
    fn test_config_validation_empty_provider() {
        let mut config = Config::default();
        config.provider.provider_type = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_engine() {
        let mut config = Config::default();
        config.search.engine = "altavista".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_limits() {
        let mut config = Config::default();
        config.search.result_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fetch.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.research.max_document_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  type: ollama
  ollama:
    host: http://gpu-box:11434
    model: mistral:latest
search:
  engine: brave
  brave:
    api_key: test-token
fetch:
  timeout_seconds: 4
research:
  max_document_chars: 500
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.provider.ollama.host, "http://gpu-box:11434");
        assert_eq!(config.provider.gemini.model, "gemini-pro");
        assert_eq!(config.search.engine, "brave");
        assert_eq!(config.search.brave.api_key.as_deref(), Some("test-token"));
        assert_eq!(config.search.result_limit, 3);
        assert_eq!(config.fetch.timeout_seconds, 4);
        assert_eq!(config.research.max_document_chars, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let config = Config::load("nonexistent.yaml", &cli_with_storage(None)).unwrap();
        assert_eq!(config.provider.provider_type, "gemini");
    }

    #[test]
    #[serial]
    fn test_cli_storage_path_overrides_config() {
        let config = Config::load(
            "nonexistent.yaml",
            &cli_with_storage(Some("/tmp/deskchat-cli.db".to_string())),
        )
        .unwrap();
        assert_eq!(
            config.storage.history_db.as_deref(),
            Some("/tmp/deskchat-cli.db")
        );
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        std::env::set_var("DESKCHAT_PROVIDER", "ollama");
        std::env::set_var("DESKCHAT_GEMINI_API_BASE", "http://127.0.0.1:9999");
        std::env::set_var("DESKCHAT_FETCH_TIMEOUT_SECONDS", "3");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("DESKCHAT_PROVIDER");
        std::env::remove_var("DESKCHAT_GEMINI_API_BASE");
        std::env::remove_var("DESKCHAT_FETCH_TIMEOUT_SECONDS");

        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.provider.gemini.api_base, "http://127.0.0.1:9999");
        assert_eq!(config.fetch.timeout_seconds, 3);
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_invalid_timeout() {
        std::env::set_var("DESKCHAT_FETCH_TIMEOUT_SECONDS", "soon");
        let mut config = Config::default();
        config.apply_env_vars();
        std::env::remove_var("DESKCHAT_FETCH_TIMEOUT_SECONDS");

        assert_eq!(config.fetch.timeout_seconds, 10);
    }
}
