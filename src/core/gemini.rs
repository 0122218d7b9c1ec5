//! Gemini API client: content generation and the File API

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde_json::{Value, json};

use crate::error::{InsightError, Result};

const API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Remote file lifecycle state reported by the File API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Active,
    Pending,
    Failed,
}

impl FileState {
    fn from_api(state: &str) -> Self {
        match state {
            "ACTIVE" => FileState::Active,
            "FAILED" => FileState::Failed,
            _ => FileState::Pending,
        }
    }
}

/// Handle to a file uploaded to the remote store
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Resource name, e.g. "files/abc-123"
    pub name: String,
    pub uri: String,
    pub mime_type: String,
    pub state: FileState,
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Build a client from the GEMINI_API_KEY environment variable
    pub fn from_env(model: &str) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| InsightError::MissingApiKey)?;

        Ok(Self {
            api_key,
            model: model.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .build()?,
        })
    }

    /// Text-only generation
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_parts(system, vec![json!({ "text": prompt })])
            .await
    }

    /// Generation over an uploaded file plus an instruction
    pub async fn generate_with_file(
        &self,
        system: &str,
        instruction: &str,
        file: &RemoteFile,
    ) -> Result<String> {
        self.generate_parts(
            system,
            vec![
                json!({ "text": instruction }),
                json!({ "file_data": { "mime_type": file.mime_type, "file_uri": file.uri } }),
            ],
        )
        .await
    }

    async fn generate_parts(&self, system: &str, parts: Vec<Value>) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            API_BASE, self.model, self.api_key
        );

        let body = json!({
            "system_instruction": { "parts": [{ "text": system }] },
            "contents": [{ "role": "user", "parts": parts }]
        });

        debug!("Calling {}:generateContent", self.model);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Model(format!(
                "Gemini API returned {}: {}",
                status, body
            )));
        }

        let json: Value = response.json().await?;
        extract_response_text(&json)
    }

    /// Upload a local file via the resumable upload protocol
    pub async fn upload_file(&self, path: &Path) -> Result<RemoteFile> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = guess_mime(path);
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".into());

        debug!("Uploading {} ({} bytes)", path.display(), bytes.len());

        // Start request yields the upload session URL
        let start_url = format!("{}/upload/v1beta/files?key={}", API_BASE, self.api_key);
        let start = self
            .client
            .post(&start_url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type.as_str())
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;

        if !start.status().is_success() {
            return Err(InsightError::Upload(format!(
                "upload start returned HTTP {}",
                start.status()
            )));
        }

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| InsightError::Upload("missing upload session URL".into()))?;

        // One request carries the bytes and finalizes the session
        let response = self
            .client
            .post(&upload_url)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InsightError::Upload(format!(
                "upload returned HTTP {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        parse_file_info(json.get("file").unwrap_or(&Value::Null))
    }

    /// Fetch the current state of an uploaded file
    pub async fn get_file(&self, name: &str) -> Result<RemoteFile> {
        let url = format!("{}/v1beta/{}?key={}", API_BASE, name, self.api_key);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(InsightError::Upload(format!(
                "file status returned HTTP {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        parse_file_info(&json)
    }

    /// Delete an uploaded file from the remote store
    pub async fn delete_file(&self, name: &str) -> Result<()> {
        let url = format!("{}/v1beta/{}?key={}", API_BASE, name, self.api_key);
        let response = self.client.delete(&url).send().await?;

        if !response.status().is_success() {
            return Err(InsightError::Upload(format!(
                "file delete returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Poll until the uploaded file becomes ACTIVE
    pub async fn wait_until_active(
        &self,
        file: &RemoteFile,
        max_retries: u32,
        delay: Duration,
    ) -> Result<()> {
        if file.state == FileState::Active {
            return Ok(());
        }

        let name = file.name.clone();
        poll_until_active(
            || {
                let this = self;
                let name = name.clone();
                async move { this.get_file(&name).await.map(|f| f.state) }
            },
            max_retries,
            delay,
        )
        .await
    }
}

/// Bounded fixed-delay poll over a file-state source
///
/// FAILED aborts at once; exhausting the retry budget is a timeout. The delay
/// is fixed rather than backed off: activation latency is small and the cap
/// bounds the total wait.
pub async fn poll_until_active<F, Fut>(
    mut fetch_state: F,
    max_retries: u32,
    delay: Duration,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<FileState>>,
{
    for attempt in 0..max_retries {
        match fetch_state().await? {
            FileState::Active => return Ok(()),
            FileState::Failed => {
                return Err(InsightError::Upload("remote file processing failed".into()));
            }
            FileState::Pending => {
                debug!("file not active yet (attempt {}/{})", attempt + 1, max_retries);
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(InsightError::Upload("file activation timed out".into()))
}

fn extract_response_text(json: &Value) -> Result<String> {
    if let Some(parts) = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }

    Err(InsightError::ModelResponse("no text in Gemini response".into()))
}

fn parse_file_info(value: &Value) -> Result<RemoteFile> {
    let name = value
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| InsightError::Upload("file response missing name".into()))?;

    Ok(RemoteFile {
        name: name.to_string(),
        uri: value
            .get("uri")
            .and_then(|u| u.as_str())
            .unwrap_or_default()
            .to_string(),
        mime_type: value
            .get("mimeType")
            .and_then(|m| m.as_str())
            .unwrap_or("video/mp4")
            .to_string(),
        state: value
            .get("state")
            .and_then(|s| s.as_str())
            .map(FileState::from_api)
            .unwrap_or(FileState::Pending),
    })
}

fn guess_mime(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("mov") => "video/quicktime",
        _ => "video/mp4",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_extract_response_text() {
        let json = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Here is the summary." }] } }
            ]
        });
        assert_eq!(extract_response_text(&json).unwrap(), "Here is the summary.");
    }

    #[test]
    fn test_extract_response_text_multiple_parts() {
        let json = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "part one " }, { "text": "part two" }] } }
            ]
        });
        assert_eq!(extract_response_text(&json).unwrap(), "part one part two");
    }

    #[test]
    fn test_extract_response_text_empty() {
        let json = json!({ "candidates": [] });
        assert!(extract_response_text(&json).is_err());
    }

    #[test]
    fn test_parse_file_info() {
        let json = json!({
            "name": "files/abc-123",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc-123",
            "mimeType": "video/mp4",
            "state": "PROCESSING"
        });
        let file = parse_file_info(&json).unwrap();
        assert_eq!(file.name, "files/abc-123");
        assert_eq!(file.state, FileState::Pending);
    }

    #[test]
    fn test_parse_file_info_missing_name() {
        assert!(parse_file_info(&json!({ "state": "ACTIVE" })).is_err());
    }

    #[test]
    fn test_file_state_from_api() {
        assert_eq!(FileState::from_api("ACTIVE"), FileState::Active);
        assert_eq!(FileState::from_api("FAILED"), FileState::Failed);
        assert_eq!(FileState::from_api("PROCESSING"), FileState::Pending);
        assert_eq!(FileState::from_api("STATE_UNSPECIFIED"), FileState::Pending);
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("/tmp/v.webm")), "video/webm");
        assert_eq!(guess_mime(Path::new("/tmp/v.mp4")), "video/mp4");
        assert_eq!(guess_mime(Path::new("/tmp/noext")), "video/mp4");
    }

    #[test]
    fn test_poll_failed_aborts_without_retrying() {
        let calls = AtomicU32::new(0);
        let result = tokio_test::block_on(poll_until_active(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(FileState::Failed) }
            },
            5,
            Duration::from_millis(1),
        ));

        assert!(matches!(result, Err(InsightError::Upload(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_poll_active_succeeds() {
        let result = tokio_test::block_on(poll_until_active(
            || async { Ok(FileState::Active) },
            5,
            Duration::from_millis(1),
        ));
        assert!(result.is_ok());
    }

    #[test]
    fn test_poll_becomes_active_after_pending() {
        let calls = AtomicU32::new(0);
        let result = tokio_test::block_on(poll_until_active(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Ok(FileState::Pending)
                    } else {
                        Ok(FileState::Active)
                    }
                }
            },
            5,
            Duration::from_millis(1),
        ));

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_poll_exhaustion_times_out() {
        let calls = AtomicU32::new(0);
        let result = tokio_test::block_on(poll_until_active(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(FileState::Pending) }
            },
            3,
            Duration::from_millis(1),
        ));

        match result {
            Err(InsightError::Upload(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
