//! Ollama provider implementation for Deskchat
//!
//! This module implements the Provider trait for Ollama, connecting to a local
//! or remote Ollama server and using its non-streaming `/api/generate`
//! endpoint. No credential is involved.

use crate::config::OllamaConfig;
use crate::error::{DeskchatError, Result};
use crate::providers::{GenerationError, Provider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```
/// use deskchat::config::OllamaConfig;
/// use deskchat::providers::OllamaProvider;
///
/// let config = OllamaConfig {
///     host: "http://localhost:11434".to_string(),
///     model: "llama3.2:latest".to_string(),
/// };
/// let provider = OllamaProvider::new(config).unwrap();
/// assert_eq!(provider.model(), "llama3.2:latest");
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for `/api/generate`
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response structure from `/api/generate`
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("deskchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeskchatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.config.host.trim_end_matches('/'));
        let request = OllamaGenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        tracing::debug!("Sending Ollama request: model={}", self.config.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse Ollama response: {}", e);
            GenerationError::UnexpectedFormat("Ollama")
        })?;

        tracing::debug!(
            "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
            parsed.done,
            parsed.prompt_eval_count,
            parsed.eval_count
        );

        parsed
            .response
            .ok_or(GenerationError::UnexpectedFormat("Ollama"))
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
