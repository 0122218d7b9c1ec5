//! Session state machine
//!
//! `SessionState` owns every artifact of the currently selected video:
//! transcript, insight record, per-video chat logs, and the audience choice.
//! `select_video` is the single invalidation trigger; artifacts are only
//! valid for the (video, mode) pair as last set. All mutation goes through
//! the methods here.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use log::{debug, warn};

use crate::core::gemini::{FileState, GeminiClient, RemoteFile};
use crate::core::{downloader, parse, resolver, transcript};
use crate::error::{InsightError, Result};
use crate::prompts;
use crate::types::{AnalysisMode, ChatTurn, Config, InsightRecord, Transcript, ViewKind};

pub const DEFAULT_AUDIENCE: &str = "General";

#[derive(Debug)]
pub struct SessionState {
    active_video: Option<String>,
    active_mode: Option<AnalysisMode>,
    transcript: Option<Transcript>,
    insight: Option<InsightRecord>,
    chat_logs: HashMap<String, Vec<ChatTurn>>,
    selected_audience: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            active_video: None,
            active_mode: None,
            transcript: None,
            insight: None,
            chat_logs: HashMap::new(),
            selected_audience: DEFAULT_AUDIENCE.into(),
        }
    }

    pub fn active_video(&self) -> Option<&str> {
        self.active_video.as_deref()
    }

    pub fn active_mode(&self) -> Option<AnalysisMode> {
        self.active_mode
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    pub fn insight(&self) -> Option<&InsightRecord> {
        self.insight.as_ref()
    }

    pub fn selected_audience(&self) -> &str {
        &self.selected_audience
    }

    /// Switch to a (video, mode) pair
    ///
    /// The single invalidation trigger: when either component differs from
    /// the active pair, the transcript, the insight, and this video's chat
    /// log are cleared before the pair is set. Other videos' chat logs stay.
    /// Calling again with the active pair is a no-op.
    pub fn select_video(&mut self, video_id: &str, mode: AnalysisMode) {
        let unchanged =
            self.active_video.as_deref() == Some(video_id) && self.active_mode == Some(mode);
        if unchanged {
            return;
        }

        debug!("selecting video {} in {:?} mode", video_id, mode);
        self.transcript = None;
        self.insight = None;
        self.chat_logs.insert(video_id.to_string(), Vec::new());
        self.active_video = Some(video_id.to_string());
        self.active_mode = Some(mode);
    }

    pub fn set_transcript(&mut self, transcript: Transcript) {
        self.transcript = Some(transcript);
    }

    /// Store a fresh insight record, reconciling the audience selection:
    /// a still-valid choice is preserved, anything else resets to the new
    /// list's first entry.
    pub fn set_insight(&mut self, insight: InsightRecord) {
        let options = insight.audience_options();
        if !options.is_empty() && !options.iter().any(|o| o == &self.selected_audience) {
            self.selected_audience = options[0].clone();
        }
        self.insight = Some(insight);
    }

    /// Legal at any time; never invalidates artifacts or chat
    pub fn set_audience(&mut self, audience: &str) {
        self.selected_audience = audience.to_string();
    }

    /// Selectable audiences; empty until an insight carries options
    pub fn audience_options(&self) -> Vec<String> {
        self.insight
            .as_ref()
            .map(|i| i.audience_options())
            .unwrap_or_default()
    }

    /// Append-only; creates the log on first use, never truncates
    pub fn append_chat_turn(&mut self, video_id: &str, turn: ChatTurn) {
        self.chat_logs
            .entry(video_id.to_string())
            .or_default()
            .push(turn);
    }

    pub fn chat_log(&self, video_id: &str) -> &[ChatTurn] {
        self.chat_logs
            .get(video_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Views offered for the active mode
    pub fn available_views(&self) -> &'static [ViewKind] {
        match self.active_mode {
            Some(AnalysisMode::Knowledge) => &[
                ViewKind::Summary,
                ViewKind::Roadmap,
                ViewKind::Transcript,
                ViewKind::Chat,
            ],
            Some(AnalysisMode::Entertainment) => &[
                ViewKind::Summary,
                ViewKind::SimilarContent,
                ViewKind::Transcript,
                ViewKind::Chat,
            ],
            None => &[],
        }
    }

    /// A view requested outside its permitted mode is a no-op, not an error
    pub fn allows_view(&self, view: ViewKind) -> bool {
        self.available_views().contains(&view)
    }

    /// Grounding context for summary and chat prompts: the translated
    /// transcript in Knowledge mode, the insight JSON in Entertainment mode
    pub fn chat_context(&self) -> Option<String> {
        match self.active_mode? {
            AnalysisMode::Knowledge => self.transcript.as_ref().map(|t| t.translated.clone()),
            AnalysisMode::Entertainment => self.insight.as_ref().map(|i| i.to_json()),
        }
    }
}

/// Session state plus the clients needed to populate it
pub struct Session {
    pub state: SessionState,
    http: reqwest::Client,
    gemini: GeminiClient,
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        let gemini = GeminiClient::from_env(&config.model)?;

        Ok(Self {
            state: SessionState::new(),
            http: reqwest::Client::new(),
            gemini,
            config,
        })
    }

    /// Run the analysis pipeline for the active (video, mode) pair
    ///
    /// Exactly one pipeline executes, chosen by the active mode at call
    /// time. On failure the transcript/insight keep their prior values.
    pub async fn process(&mut self) -> Result<()> {
        let video_id = self
            .state
            .active_video()
            .ok_or(InsightError::NoVideoSelected)?
            .to_string();
        let mode = self
            .state
            .active_mode()
            .ok_or(InsightError::NoVideoSelected)?;

        match mode {
            AnalysisMode::Knowledge => self.process_knowledge(&video_id).await,
            AnalysisMode::Entertainment => self.process_entertainment(&video_id).await,
        }
    }

    async fn process_knowledge(&mut self, video_id: &str) -> Result<()> {
        let transcript = transcript::fetch_transcript(&self.http, video_id).await?;
        let prompt = prompts::knowledge_analysis(&transcript.translated);
        self.state.set_transcript(transcript);

        let response = self.gemini.generate(prompts::CONTENT_SYSTEM, &prompt).await?;
        let map = parse::extract_json_object(&response).ok_or_else(|| {
            InsightError::ModelResponse("analysis response contained no JSON object".into())
        })?;

        self.state.set_insight(InsightRecord(map));
        Ok(())
    }

    async fn process_entertainment(&mut self, video_id: &str) -> Result<()> {
        // Transcript is best-effort here: visual analysis does not need it
        match transcript::fetch_transcript(&self.http, video_id).await {
            Ok(t) => self.state.set_transcript(t),
            Err(e) => warn!("transcript unavailable for {}: {}", video_id, e),
        }

        let url = resolver::watch_url(video_id);
        let path = downloader::download(&self.config, &url, video_id).await?;

        let outcome = self.extract_visual_insight(&path).await;

        // The scratch file must not outlive the attempt, success or not
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("could not remove {}: {}", path.display(), e);
        }

        self.state.set_insight(outcome?);
        Ok(())
    }

    /// Upload, wait for activation, analyze, and always release the remote file
    async fn extract_visual_insight(&self, path: &Path) -> Result<InsightRecord> {
        let mut file = self.gemini.upload_file(path).await?;
        if file.state == FileState::Failed {
            debug!("upload reported FAILED, re-uploading once");
            file = self.gemini.upload_file(path).await?;
        }

        let outcome = self.visual_analysis(&file).await;

        if let Err(e) = self.gemini.delete_file(&file.name).await {
            warn!("could not delete remote file {}: {}", file.name, e);
        }

        outcome
    }

    async fn visual_analysis(&self, file: &RemoteFile) -> Result<InsightRecord> {
        self.gemini
            .wait_until_active(
                file,
                self.config.max_poll_retries,
                Duration::from_secs(self.config.poll_delay_secs),
            )
            .await?;

        let response = self
            .gemini
            .generate_with_file(prompts::VISION_SYSTEM, prompts::VISUAL_ANALYSIS, file)
            .await?;

        let map = parse::extract_json_object(&response).ok_or_else(|| {
            InsightError::ModelResponse("vision response contained no JSON object".into())
        })?;

        Ok(InsightRecord(map))
    }

    /// Summary for the active video, shaped by mode and audience
    pub async fn generate_summary(&self) -> Result<String> {
        let mode = self
            .state
            .active_mode()
            .ok_or(InsightError::NoVideoSelected)?;

        let (instruction, content) = match mode {
            AnalysisMode::Knowledge => {
                let transcript = self.state.transcript().ok_or(InsightError::NotProcessed)?;
                let instruction = self
                    .state
                    .insight()
                    .and_then(|i| i.custom_prompt())
                    .unwrap_or_else(|| prompts::DEFAULT_SUMMARY_PROMPT.to_string());
                (instruction, transcript.translated.clone())
            }
            AnalysisMode::Entertainment => {
                let insight = self.state.insight().ok_or(InsightError::NotProcessed)?;
                (
                    prompts::ENTERTAINMENT_SUMMARY_PROMPT.to_string(),
                    insight.to_json(),
                )
            }
        };

        let prompt = prompts::summary(&instruction, self.state.selected_audience(), &content);
        self.gemini.generate(prompts::CONTENT_SYSTEM, &prompt).await
    }

    /// Learning roadmap over the translated transcript (Knowledge mode)
    pub async fn generate_roadmap(&self) -> Result<String> {
        let transcript = self.state.transcript().ok_or(InsightError::NotProcessed)?;
        let prompt = prompts::roadmap(self.state.selected_audience(), &transcript.translated);
        self.gemini.generate(prompts::CONTENT_SYSTEM, &prompt).await
    }

    /// One chat exchange: record the question, answer it from the session
    /// context, record the answer
    pub async fn chat(&mut self, question: &str) -> Result<String> {
        let video_id = self
            .state
            .active_video()
            .ok_or(InsightError::NoVideoSelected)?
            .to_string();
        let context = self.state.chat_context().ok_or(InsightError::NotProcessed)?;

        self.state
            .append_chat_turn(&video_id, ChatTurn::user(question));

        let prompt = prompts::chat(self.state.selected_audience(), question, &context);
        let answer = self.gemini.generate(prompts::CONTENT_SYSTEM, &prompt).await?;

        self.state
            .append_chat_turn(&video_id, ChatTurn::assistant(&answer));

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;
    use serde_json::json;

    fn transcript() -> Transcript {
        Transcript {
            original: "bonjour le monde".into(),
            translated: "hello world".into(),
            language: "fr".into(),
        }
    }

    fn insight_with_audiences(options: &[&str]) -> InsightRecord {
        let mut map = serde_json::Map::new();
        map.insert("audience_options".into(), json!(options));
        InsightRecord(map)
    }

    #[test]
    fn test_new_session_defaults() {
        let state = SessionState::new();
        assert!(state.active_video().is_none());
        assert!(state.active_mode().is_none());
        assert!(state.transcript().is_none());
        assert!(state.insight().is_none());
        assert_eq!(state.selected_audience(), "General");
        assert!(state.audience_options().is_empty());
        assert!(state.available_views().is_empty());
    }

    #[test]
    fn test_select_video_is_idempotent() {
        let mut state = SessionState::new();
        state.select_video("vid-a", AnalysisMode::Knowledge);
        state.set_transcript(transcript());
        state.set_insight(insight_with_audiences(&["General"]));
        state.append_chat_turn("vid-a", ChatTurn::user("hi"));

        state.select_video("vid-a", AnalysisMode::Knowledge);

        assert!(state.transcript().is_some());
        assert!(state.insight().is_some());
        assert_eq!(state.chat_log("vid-a").len(), 1);
    }

    #[test]
    fn test_mode_change_invalidates_artifacts() {
        let mut state = SessionState::new();
        state.select_video("vid-a", AnalysisMode::Knowledge);
        state.set_transcript(transcript());
        state.set_insight(insight_with_audiences(&["General"]));
        state.append_chat_turn("vid-a", ChatTurn::user("hi"));
        state.append_chat_turn("vid-b", ChatTurn::user("other video"));

        state.select_video("vid-a", AnalysisMode::Entertainment);

        assert!(state.transcript().is_none());
        assert!(state.insight().is_none());
        assert!(state.chat_log("vid-a").is_empty());
        // Logs for a different video are keyed separately and preserved
        assert_eq!(state.chat_log("vid-b").len(), 1);
        assert_eq!(state.active_mode(), Some(AnalysisMode::Entertainment));
    }

    #[test]
    fn test_video_change_invalidates_artifacts() {
        let mut state = SessionState::new();
        state.select_video("vid-a", AnalysisMode::Knowledge);
        state.set_transcript(transcript());
        state.append_chat_turn("vid-a", ChatTurn::user("hi"));

        state.select_video("vid-b", AnalysisMode::Knowledge);

        assert!(state.transcript().is_none());
        assert!(state.insight().is_none());
        assert_eq!(state.active_video(), Some("vid-b"));
        // The old video's log is untouched; only vid-b's entry was reset
        assert_eq!(state.chat_log("vid-a").len(), 1);
        assert!(state.chat_log("vid-b").is_empty());
    }

    #[test]
    fn test_chat_append_preserves_order() {
        let mut state = SessionState::new();
        for i in 0..5 {
            state.append_chat_turn("vid-a", ChatTurn::user(format!("q{}", i)));
        }

        let log = state.chat_log("vid-a");
        assert_eq!(log.len(), 5);
        for (i, turn) in log.iter().enumerate() {
            assert_eq!(turn.content, format!("q{}", i));
        }
    }

    #[test]
    fn test_chat_logs_do_not_interleave() {
        let mut state = SessionState::new();
        state.append_chat_turn("vid-a", ChatTurn::user("a1"));
        state.append_chat_turn("vid-b", ChatTurn::user("b1"));
        state.append_chat_turn("vid-a", ChatTurn::assistant("a2"));

        assert_eq!(state.chat_log("vid-a").len(), 2);
        assert_eq!(state.chat_log("vid-b").len(), 1);
        assert_eq!(state.chat_log("vid-a")[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_audience_preserved_when_still_valid() {
        let mut state = SessionState::new();
        state.set_insight(insight_with_audiences(&["General", "Kids"]));
        state.set_audience("Kids");

        state.set_insight(insight_with_audiences(&["General", "Kids", "Adults"]));

        assert_eq!(state.selected_audience(), "Kids");
    }

    #[test]
    fn test_audience_reset_when_no_longer_valid() {
        let mut state = SessionState::new();
        state.set_insight(insight_with_audiences(&["General", "Kids"]));
        state.set_audience("Kids");

        state.set_insight(insight_with_audiences(&["General"]));

        assert_eq!(state.selected_audience(), "General");
    }

    #[test]
    fn test_audience_untouched_when_options_absent() {
        let mut state = SessionState::new();
        state.set_audience("Kids");
        state.set_insight(InsightRecord(serde_json::Map::new()));

        assert_eq!(state.selected_audience(), "Kids");
        assert!(state.audience_options().is_empty());
    }

    #[test]
    fn test_view_gating_by_mode() {
        let mut state = SessionState::new();

        state.select_video("vid-a", AnalysisMode::Knowledge);
        assert!(state.allows_view(ViewKind::Roadmap));
        assert!(!state.allows_view(ViewKind::SimilarContent));

        state.select_video("vid-a", AnalysisMode::Entertainment);
        assert!(state.allows_view(ViewKind::SimilarContent));
        assert!(!state.allows_view(ViewKind::Roadmap));

        for view in [ViewKind::Summary, ViewKind::Transcript, ViewKind::Chat] {
            assert!(state.allows_view(view));
        }
    }

    #[test]
    fn test_chat_context_follows_mode() {
        let mut state = SessionState::new();

        state.select_video("vid-a", AnalysisMode::Knowledge);
        state.set_transcript(transcript());
        assert_eq!(state.chat_context().as_deref(), Some("hello world"));

        state.select_video("vid-a", AnalysisMode::Entertainment);
        assert!(state.chat_context().is_none()); // invalidated, nothing processed

        let mut map = serde_json::Map::new();
        map.insert("genre".into(), json!("comedy"));
        state.set_insight(InsightRecord(map));
        assert_eq!(state.chat_context().as_deref(), Some(r#"{"genre":"comedy"}"#));
    }
}
