//! Error types for yt-insight

use thiserror::Error;

/// Main error type for yt-insight
///
/// Failures are caught at the action boundary and shown as a short message;
/// none of them terminate the session.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("No transcript available: {0}")]
    TranscriptUnavailable(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("File upload failed: {0}")]
    Upload(String),

    #[error("Model call failed: {0}")]
    Model(String),

    #[error("Unexpected model response: {0}")]
    ModelResponse(String),

    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Missing dependency: {0}. Please install it.")]
    MissingDependency(String),

    #[error("No video selected")]
    NoVideoSelected,

    #[error("Video has not been processed yet")]
    NotProcessed,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InsightError>;
