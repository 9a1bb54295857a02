//! Locally persisted user settings
//!
//! A small JSON document holding the generation credential. It is read once
//! at startup and rewritten whenever the credential changes. A missing or
//! unreadable file is treated as empty settings, never as an error.

use crate::config::Config;
use crate::error::{DeskchatError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User settings persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Gemini API key
    #[serde(
        rename = "GEMINI_API_KEY",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gemini_api_key: Option<String>,

    /// Keys this crate does not interpret, written back untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Settings {
    /// Load settings from `path`
    ///
    /// Missing files and files that fail to parse yield `Settings::default()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use deskchat::settings::Settings;
    ///
    /// let settings = Settings::load("/definitely/not/here/settings.json");
    /// assert!(settings.gemini_api_key.is_none());
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}", path.display());
                return Self::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read settings file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "Ignoring corrupt settings file {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Write settings to `path`, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DeskchatError::Settings(format!(
                        "Failed to create settings directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            DeskchatError::Settings(format!(
                "Failed to write settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Stored API key, treating blank values as unset
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    /// Resolve where the settings file lives
    ///
    /// Uses `storage.settings_file` from configuration, falling back to
    /// `settings.json` in the user's config directory.
    ///
    /// # Errors
    ///
    /// Returns error if no config directory can be determined
    pub fn resolve_path(config: &Config) -> Result<PathBuf> {
        if let Some(path) = &config.storage.settings_file {
            return Ok(PathBuf::from(path));
        }

        let proj_dirs = ProjectDirs::from("com", "deskchat", "deskchat").ok_or_else(|| {
            DeskchatError::Settings("Could not determine config directory".into())
        })?;
        Ok(proj_dirs.config_dir().join("settings.json"))
    }
}
