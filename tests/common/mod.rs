use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use deskchat::config::Config;
use deskchat::storage::ConversationStore;

#[allow(dead_code)]
pub fn create_temp_store() -> (ConversationStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("history.db");
    let store =
        ConversationStore::new_with_path(db_path).expect("failed to create store with path");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config whose history and settings files live in `dir`
#[allow(dead_code)]
pub fn isolated_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.history_db = Some(dir.path().join("history.db").to_string_lossy().to_string());
    config.storage.settings_file =
        Some(dir.path().join("settings.json").to_string_lossy().to_string());
    config
}

/// Minimal HTML page with one paragraph
#[allow(dead_code)]
pub fn html_page(text: &str) -> String {
    format!(
        "<html><head><title>t</title></head><body><p>{}</p></body></html>",
        text
    )
}
