//! Provider module for Deskchat
//!
//! This module contains the generation backend abstraction and its
//! implementations for Gemini and Ollama.

pub mod base;
pub mod gemini;
pub mod ollama;

pub use base::{GenerationError, Provider};
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

use crate::config::ProviderConfig;
use crate::error::{DeskchatError, Result};
use crate::settings::Settings;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration; `provider_type` picks the backend
/// * `explicit_key` - API key supplied by the caller, highest precedence
/// * `settings` - Persisted settings, lowest precedence key source
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
///
/// # Examples
///
/// ```
/// use deskchat::config::Config;
/// use deskchat::providers::create_provider;
/// use deskchat::settings::Settings;
///
/// let config = Config::default();
/// let provider = create_provider(&config.provider, None, &Settings::default()).unwrap();
/// assert_eq!(provider.name(), "gemini");
/// ```
pub fn create_provider(
    config: &ProviderConfig,
    explicit_key: Option<String>,
    settings: &Settings,
) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "gemini" => Ok(Box::new(GeminiProvider::from_settings(
            config.gemini.clone(),
            explicit_key,
            settings,
        )?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone())?)),
        other => Err(DeskchatError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}
