//! Gemini provider implementation for Deskchat
//!
//! Calls the `generateContent` REST endpoint of the Gemini API with a
//! single-turn prompt and reads the first candidate's first text part.
//! The API key can be swapped at runtime; the next call picks it up.

use crate::config::GeminiConfig;
use crate::error::{DeskchatError, Result};
use crate::providers::{GenerationError, Provider};
use crate::settings::Settings;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Environment variable consulted for the API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Header carrying the API key
///
/// The key never goes into the request URL, so transport errors that echo
/// the URL cannot expose it.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use deskchat::config::GeminiConfig;
/// use deskchat::providers::{GeminiProvider, Provider};
///
/// # async fn example() -> deskchat::error::Result<()> {
/// let provider = GeminiProvider::new(GeminiConfig::default(), Some("my-key".to_string()))?;
/// let text = provider.generate("Say hello").await;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: Arc<RwLock<Option<String>>>,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiRequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiRequestContent<'a> {
    parts: Vec<GeminiRequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiRequestPart<'a> {
    text: &'a str,
}

/// Response body from `generateContent`
///
/// Every level is optional so that a response missing the generated text
/// is reported as a format error rather than a parse failure.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
    }
}

fn transport_error(err: reqwest::Error) -> GenerationError {
    GenerationError::Transport(err.without_url().to_string())
}

fn normalize_key(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

/// Pick the API key: explicit argument, then environment, then settings
///
/// # Examples
///
/// ```
/// use deskchat::providers::gemini::resolve_api_key;
/// use deskchat::settings::Settings;
///
/// let settings = Settings {
///     gemini_api_key: Some("from-settings".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(
///     resolve_api_key(Some("explicit".to_string()), &settings),
///     Some("explicit".to_string())
/// );
/// ```
pub fn resolve_api_key(explicit: Option<String>, settings: &Settings) -> Option<String> {
    normalize_key(explicit)
        .or_else(|| normalize_key(std::env::var(GEMINI_API_KEY_ENV).ok()))
        .or_else(|| settings.api_key().map(str::to_string))
}

impl GeminiProvider {
    /// Create a provider with an already resolved API key
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("deskchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeskchatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = normalize_key(api_key);
        tracing::info!(
            "Initialized Gemini provider: model={}, api_base={}, key_configured={}",
            config.model,
            config.api_base,
            api_key.is_some()
        );

        Ok(Self {
            client,
            config,
            api_key: Arc::new(RwLock::new(api_key)),
        })
    }

    /// Create a provider resolving the key from argument, environment and settings
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn from_settings(
        config: GeminiConfig,
        explicit_key: Option<String>,
        settings: &Settings,
    ) -> Result<Self> {
        Self::new(config, resolve_api_key(explicit_key, settings))
    }

    /// Configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Whether a credential is currently set
    pub fn has_api_key(&self) -> bool {
        self.current_key().is_some()
    }

    fn current_key(&self) -> Option<String> {
        self.api_key.read().ok().and_then(|key| key.clone())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let api_key = self.current_key().ok_or(GenerationError::MissingApiKey)?;

        let request = GeminiRequest {
            contents: vec![GeminiRequestContent {
                parts: vec![GeminiRequestPart { text: prompt }],
            }],
        };

        tracing::debug!(
            "Sending Gemini request: model={}, prompt_chars={}",
            self.config.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Gemini response was not valid JSON: {}", e);
            GenerationError::UnexpectedFormat("Gemini")
        })?;

        parsed
            .first_text()
            .ok_or(GenerationError::UnexpectedFormat("Gemini"))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn set_api_key(&self, api_key: Option<String>) {
        match self.api_key.write() {
            Ok(mut guard) => {
                *guard = normalize_key(api_key);
                tracing::info!("Gemini API key updated (set={})", guard.is_some());
            }
            Err(_) => tracing::error!("Failed to acquire write lock on Gemini API key"),
        }
    }
}
