//! Base provider trait and generation errors for Deskchat
//!
//! This module defines the `Provider` trait every generation backend
//! implements, together with the typed failures a backend can report.
//! Failures are part of the conversation: `Provider::generate` renders them
//! as the text shown to the user instead of raising.

use async_trait::async_trait;
use thiserror::Error;

/// Reasons a generation request did not produce text
///
/// The `Display` output of each variant is the exact text placed into the
/// conversation in place of a model response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No credential is configured for a backend that requires one
    #[error("Error: Gemini API key is not set.")]
    MissingApiKey,

    /// Endpoint answered with a non-success status
    #[error("Error: API call failed with status {status}. Response: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Request could not be sent or the response could not be read
    #[error("An error occurred during the API call: {0}")]
    Transport(String),

    /// Response arrived but lacked the generated text field
    #[error("Error: Unexpected response format from {0} API.")]
    UnexpectedFormat(&'static str),
}

/// Text generation backend
///
/// # Examples
///
/// ```
/// use deskchat::providers::{GenerationError, Provider};
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Provider for Echo {
///     async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
///         Ok(prompt.to_uppercase())
///     }
///
///     fn name(&self) -> &'static str {
///         "echo"
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate text for `prompt`
    ///
    /// # Errors
    ///
    /// Returns a `GenerationError` describing why no text was produced
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerationError>;

    /// Backend name, for logging and display
    fn name(&self) -> &'static str;

    /// Generate text for `prompt`, rendering any failure as text
    ///
    /// This is the boundary used by the research pipeline and the chat
    /// session; it never fails.
    async fn generate(&self, prompt: &str) -> String {
        match self.complete(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("{} generation failed: {}", self.name(), e);
                e.to_string()
            }
        }
    }

    /// Replace the credential used for subsequent calls
    ///
    /// Backends without credentials ignore this.
    fn set_api_key(&self, _api_key: Option<String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(std::result::Result<String, GenerationError>);

    #[async_trait]
    impl Provider for FixedProvider {
        async fn complete(&self, _prompt: &str) -> std::result::Result<String, GenerationError> {
            self.0.clone()
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_generation_error_messages() {
        assert_eq!(
            GenerationError::MissingApiKey.to_string(),
            "Error: Gemini API key is not set."
        );
        assert_eq!(
            GenerationError::Status {
                status: 403,
                body: "denied".to_string()
            }
            .to_string(),
            "Error: API call failed with status 403. Response: denied"
        );
        assert_eq!(
            GenerationError::Transport("connection reset".to_string()).to_string(),
            "An error occurred during the API call: connection reset"
        );
        assert_eq!(
            GenerationError::UnexpectedFormat("Gemini").to_string(),
            "Error: Unexpected response format from Gemini API."
        );
    }

    #[tokio::test]
    async fn test_generate_passes_text_through() {
        let provider = FixedProvider(Ok("generated".to_string()));
        assert_eq!(provider.generate("prompt").await, "generated");
    }

    #[tokio::test]
    async fn test_generate_renders_errors() {
        let provider = FixedProvider(Err(GenerationError::MissingApiKey));
        assert_eq!(
            provider.generate("").await,
            "Error: Gemini API key is not set."
        );
    }

    #[test]
    fn test_default_set_api_key_is_noop() {
        let provider = FixedProvider(Ok(String::new()));
        provider.set_api_key(Some("ignored".to_string()));
    }
}
