//! Type definitions for yt-insight
//!
//! Source of truth for all data structures.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================
// Analysis Types
// ============================================

/// Which analysis pipeline runs for the selected video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Knowledge,
    Entertainment,
}

impl AnalysisMode {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::Knowledge => "Knowledge Analytics",
            AnalysisMode::Entertainment => "Entertainment Analytics",
        }
    }
}

/// Transcript of a video: original track text plus its English rendering
///
/// Immutable once created; re-processing replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub original: String,
    pub translated: String,
    /// Native language code of the selected caption track, e.g. "fr"
    pub language: String,
}

/// Structured result of an AI analysis
///
/// The model returns a JSON object whose keys depend on the analysis mode.
/// Stored as the raw mapping; accessors degrade to empty defaults when a key
/// is missing or has the wrong shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightRecord(pub serde_json::Map<String, Value>);

impl InsightRecord {
    fn text(&self, key: &str) -> String {
        self.0
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    // Knowledge keys

    pub fn video_type(&self) -> String {
        self.text("video_type")
    }

    /// Model-suggested summary prompt; None when absent or blank
    pub fn custom_prompt(&self) -> Option<String> {
        let prompt = self.text("custom_prompt");
        if prompt.trim().is_empty() { None } else { Some(prompt) }
    }

    // Entertainment keys

    pub fn genre(&self) -> String {
        self.text("genre")
    }

    pub fn mood(&self) -> String {
        self.text("mood")
    }

    pub fn similar_content_suggestions(&self) -> Vec<String> {
        self.list("similar_content_suggestions")
    }

    pub fn key_elements(&self) -> Vec<String> {
        self.list("key_elements")
    }

    // Common keys

    pub fn audience_options(&self) -> Vec<String> {
        self.list("audience_options")
    }

    /// Full record as a JSON string, used as chat/summary context
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

// ============================================
// Chat Types
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the per-video chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    /// Unix timestamp when the turn was recorded
    pub timestamp: i64,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

// ============================================
// View Types
// ============================================

/// Tabs offered after a video has been analyzed; availability is mode-gated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Summary,
    Roadmap,
    SimilarContent,
    Transcript,
    Chat,
}

impl ViewKind {
    pub fn label(&self) -> &'static str {
        match self {
            ViewKind::Summary => "Summary",
            ViewKind::Roadmap => "Roadmap",
            ViewKind::SimilarContent => "Similar Content",
            ViewKind::Transcript => "Transcript",
            ViewKind::Chat => "Chat",
        }
    }
}

// ============================================
// Config Types
// ============================================

/// User configuration
///
/// The download knobs are passed through to yt-dlp untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini model used for both content and vision calls
    pub model: String,
    /// Download directory path (empty = set at runtime to ~/Downloads)
    pub download_dir: String,
    /// yt-dlp --concurrent-fragments
    pub concurrent_fragments: u32,
    /// yt-dlp --limit-rate, e.g. "5M"
    pub limit_rate: String,
    /// yt-dlp --throttled-rate, e.g. "10M"
    pub throttled_rate: String,
    /// yt-dlp --http-chunk-size in bytes
    pub http_chunk_size: u64,
    /// File-activation poll attempts before giving up
    pub max_poll_retries: u32,
    /// Fixed delay between activation polls
    pub poll_delay_secs: u64,
    /// Editor command (default: "nvim")
    pub editor: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".into(),
            download_dir: String::new(), // Set at runtime to ~/Downloads
            concurrent_fragments: 10,
            limit_rate: "5M".into(),
            throttled_rate: "10M".into(),
            http_chunk_size: 10_485_760,
            max_poll_retries: 5,
            poll_delay_secs: 5,
            editor: "nvim".into(),
        }
    }
}

// ============================================
// Menu Types
// ============================================

/// Item displayed in a selector menu
#[derive(Debug, Clone)]
pub struct MenuItem<T> {
    /// Display text
    pub label: String,
    /// Underlying value
    pub value: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> InsightRecord {
        match value {
            Value::Object(map) => InsightRecord(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_insight_accessors() {
        let insight = record(json!({
            "genre": "comedy",
            "mood": "light",
            "similar_content_suggestions": ["X"],
            "key_elements": ["Y"],
            "audience_options": ["General", "Kids"]
        }));

        assert_eq!(insight.genre(), "comedy");
        assert_eq!(insight.mood(), "light");
        assert_eq!(insight.similar_content_suggestions(), vec!["X"]);
        assert_eq!(insight.key_elements(), vec!["Y"]);
        assert_eq!(insight.audience_options(), vec!["General", "Kids"]);
    }

    #[test]
    fn test_insight_missing_keys_default_empty() {
        let insight = record(json!({"genre": "drama"}));
        assert_eq!(insight.mood(), "");
        assert!(insight.key_elements().is_empty());
        assert!(insight.audience_options().is_empty());
        assert!(insight.custom_prompt().is_none());
    }

    #[test]
    fn test_insight_wrong_shape_defaults_empty() {
        let insight = record(json!({
            "genre": 42,
            "audience_options": "General",
            "key_elements": [1, 2]
        }));
        assert_eq!(insight.genre(), "");
        assert!(insight.audience_options().is_empty());
        assert!(insight.key_elements().is_empty());
    }

    #[test]
    fn test_custom_prompt_blank_is_none() {
        let insight = record(json!({"custom_prompt": "   "}));
        assert!(insight.custom_prompt().is_none());

        let insight = record(json!({"custom_prompt": "Summarize the lecture"}));
        assert_eq!(insight.custom_prompt().as_deref(), Some("Summarize the lecture"));
    }

    #[test]
    fn test_chat_turn_constructors() {
        let turn = ChatTurn::user("hello");
        assert_eq!(turn.role, ChatRole::User);
        assert_eq!(turn.content, "hello");

        let turn = ChatTurn::assistant("hi");
        assert_eq!(turn.role, ChatRole::Assistant);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.concurrent_fragments, 10);
        assert_eq!(config.max_poll_retries, 5);
        assert_eq!(config.poll_delay_secs, 5);
    }

    #[test]
    fn test_config_partial_json() {
        let config: Config = serde_json::from_str(r#"{"model": "gemini-1.5-pro"}"#).unwrap();
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.limit_rate, "5M");
    }
}
