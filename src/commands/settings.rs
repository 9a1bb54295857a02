use crate::cli::SettingsCommand;
use crate::config::Config;
use crate::error::Result;
use crate::providers::gemini::GEMINI_API_KEY_ENV;
use crate::settings::Settings;
use colored::Colorize;

/// Handle settings commands
pub fn handle_settings(config: &Config, command: SettingsCommand) -> Result<()> {
    let path = Settings::resolve_path(config)?;
    let mut settings = Settings::load(&path);

    match command {
        SettingsCommand::SetKey { key } => {
            settings.gemini_api_key = Some(key).filter(|k| !k.trim().is_empty());
            settings.save(&path)?;
            println!("{}", format!("API key saved to {}", path.display()).green());
        }
        SettingsCommand::ClearKey => {
            settings.gemini_api_key = None;
            settings.save(&path)?;
            println!("{}", "API key removed.".green());
        }
        SettingsCommand::Show => {
            println!("Settings file: {}", path.display().to_string().cyan());
            let stored = if settings.api_key().is_some() {
                "set".green()
            } else {
                "not set".yellow()
            };
            println!("Stored API key: {}", stored);
            if std::env::var(GEMINI_API_KEY_ENV).is_ok() {
                println!(
                    "{}",
                    format!("{} is set and takes precedence.", GEMINI_API_KEY_ENV).dimmed()
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_and_clear_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut config = Config::default();
        config.storage.settings_file = Some(path.to_string_lossy().to_string());

        handle_settings(
            &config,
            SettingsCommand::SetKey {
                key: "secret".to_string(),
            },
        )
        .unwrap();
        assert_eq!(Settings::load(&path).api_key(), Some("secret"));

        handle_settings(&config, SettingsCommand::ClearKey).unwrap();
        assert!(Settings::load(&path).api_key().is_none());
    }
}
