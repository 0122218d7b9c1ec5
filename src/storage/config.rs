//! Configuration management

use crate::error::{InsightError, Result};
use crate::types::Config;
use crate::utils::paths::{default_download_dir, ensure_dir, get_config_dir, get_config_path};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;

/// Load configuration from file, merging with defaults
pub async fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    let mut config = if Path::new(&config_path).exists() {
        let content = fs::read_to_string(&config_path).await?;
        serde_json::from_str(&content)?
    } else {
        Config::default()
    };

    if config.model.trim().is_empty() {
        return Err(InsightError::InvalidConfig("model must not be empty".into()));
    }

    // Set download_dir with default if empty
    if config.download_dir.is_empty() {
        config.download_dir = default_download_dir();
    }

    Ok(config)
}

/// Save configuration to file
pub async fn save_config(config: &Config) -> Result<()> {
    ensure_dir(&get_config_dir()).await?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(get_config_path(), content).await?;
    Ok(())
}

/// Open config file in editor
pub async fn edit_config(editor: &str) -> Result<()> {
    let config_path = get_config_path();

    // Ensure config file exists
    if !Path::new(&config_path).exists() {
        save_config(&Config::default()).await?;
    }

    Command::new(editor).arg(&config_path).status().await?;

    Ok(())
}
