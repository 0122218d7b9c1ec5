//! Downloader module - yt-dlp integration

use crate::error::{InsightError, Result};
use crate::types::Config;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::path::PathBuf;
use tokio::process::Command;

/// Download a video using yt-dlp, returning the local file path
///
/// Files are named by video id, so re-downloading the same video overwrites
/// rather than colliding on title.
pub async fn download(config: &Config, url: &str, video_id: &str) -> Result<PathBuf> {
    if !is_command_available("yt-dlp").await {
        return Err(InsightError::MissingDependency("yt-dlp".into()));
    }

    let args = build_args(config, url, video_id);
    debug!("Running yt-dlp {}", args.join(" "));

    // Show progress spinner
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message("Downloading video...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let output = Command::new("yt-dlp")
        .args(&args)
        .output()
        .await
        .map_err(|e| InsightError::Spawn(format!("Failed to start yt-dlp: {}", e)))?;

    spinner.finish_and_clear();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InsightError::Download(format!(
            "yt-dlp exited with code {:?}: {}",
            output.status.code(),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let path = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .map(PathBuf::from)
        .ok_or_else(|| InsightError::Download("yt-dlp did not report an output file".into()))?;

    if !path.exists() {
        return Err(InsightError::Download(format!(
            "expected output file missing: {}",
            path.display()
        )));
    }

    Ok(path)
}

/// yt-dlp argument list; the rate/fragment/chunk knobs come straight from config
fn build_args(config: &Config, url: &str, video_id: &str) -> Vec<String> {
    let output_template = format!("{}/{}.%(ext)s", config.download_dir, video_id);

    vec![
        "--no-playlist".into(),
        "-f".into(),
        "best".into(),
        "--concurrent-fragments".into(),
        config.concurrent_fragments.to_string(),
        "--limit-rate".into(),
        config.limit_rate.clone(),
        "--throttled-rate".into(),
        config.throttled_rate.clone(),
        "--http-chunk-size".into(),
        config.http_chunk_size.to_string(),
        "-o".into(),
        output_template,
        "--no-simulate".into(),
        "--print".into(),
        "after_move:filepath".into(),
        url.into(),
    ]
}

/// Check if a command is available in PATH
async fn is_command_available(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}
