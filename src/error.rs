//! Error types for Deskchat
//!
//! This module defines the crate-level error enum used by configuration,
//! storage, settings and the front end, using `thiserror` for ergonomic
//! error handling. Component boundaries that must never fail outward
//! (generation, fetching) carry their own typed errors next to the
//! component and render them as text.

use thiserror::Error;

/// Main error type for Deskchat operations
#[derive(Error, Debug)]
pub enum DeskchatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (construction, unknown backend)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Search backend errors
    #[error("Search error: {0}")]
    Search(String),

    /// Fetcher construction errors
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Conversation storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Settings file errors
    #[error("Settings error: {0}")]
    Settings(String),

    /// A chat id that does not exist in the store
    #[error("Chat not found: {0}")]
    ChatNotFound(i64),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Deskchat operations
///
/// Uses `anyhow::Error` so callers can attach context while propagating.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = DeskchatError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_storage_error_display() {
        let error = DeskchatError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let error = DeskchatError::Fetch("client build failed".to_string());
        assert_eq!(error.to_string(), "Fetch error: client build failed");
    }

    #[test]
    fn test_chat_not_found_display() {
        let error = DeskchatError::ChatNotFound(42);
        assert_eq!(error.to_string(), "Chat not found: 42");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: DeskchatError = io_error.into();
        assert!(matches!(error, DeskchatError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: DeskchatError = json_error.into();
        assert!(matches!(error, DeskchatError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: DeskchatError = yaml_error.into();
        assert!(matches!(error, DeskchatError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeskchatError>();
    }
}
