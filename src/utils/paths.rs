//! Path utilities for yt-insight
//!
//! Respects XDG Base Directory Specification

use crate::error::Result;
use std::env;
use tokio::fs;

const APP_NAME: &str = "yt-insight";

/// Get config directory path
/// Respects XDG_CONFIG_HOME, defaults to ~/.config/yt-insight
pub fn get_config_dir() -> String {
    let base = env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        dirs::config_dir()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}/.config", env::var("HOME").unwrap_or_default()))
    });

    format!("{}/{}", base, APP_NAME)
}

/// Get config file path
pub fn get_config_path() -> String {
    format!("{}/config.json", get_config_dir())
}

/// Get log directory path, under the local data dir
pub fn get_log_dir() -> String {
    let base = dirs::data_local_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".into());

    format!("{}/{}/logs", base, APP_NAME)
}

/// Default download directory (~/Downloads)
pub fn default_download_dir() -> String {
    dirs::download_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".into())
}

/// Ensure a directory exists
pub async fn ensure_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}

/// Ensure all required app directories exist
pub async fn ensure_app_dirs() -> Result<()> {
    ensure_dir(&get_config_dir()).await?;
    ensure_dir(&get_log_dir()).await?;
    Ok(())
}
