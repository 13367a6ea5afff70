//! The record-to-clipboard pipeline.
//!
//! One strictly sequential cycle: capture audio, transcribe it, clean the
//! transcript up, put the result on the clipboard. Every stage updates the
//! session status; every failure is absorbed into a status message and the
//! pipeline returns to idle, ready for the next attempt. No stage is retried
//! and no stage starts before the previous one resolves.

pub mod state;

pub use state::PipelineState;

use std::path::PathBuf;
use std::time::Duration;

use crate::clipboard::{ClipboardBackend, ClipboardBridge};
use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::formatting::TextFormatter;
use crate::recording::AudioCapture;
use crate::transcription::{self, Transcriber};

/// Neutral status the pipeline reverts to between cycles.
pub const READY_STATUS: &str = "Ready";

/// How long a completion status stays visible before reverting to ready.
pub const STATUS_RESET_DELAY: Duration = Duration::from_secs(3);

/// Transient per-cycle state. Created on start, never persisted.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    pub is_recording: bool,
    pub audio_path: Option<PathBuf>,
    pub transcript: String,
    pub formatted: String,
    pub status: String,
}

impl Default for RecordingSession {
    fn default() -> Self {
        RecordingSession {
            is_recording: false,
            audio_path: None,
            transcript: String::new(),
            formatted: String::new(),
            status: READY_STATUS.to_string(),
        }
    }
}

/// Sequences capture, transcription, formatting, and clipboard write.
///
/// Generic over its collaborators so the whole cycle can run against fakes.
pub struct RecordingPipeline<A, S, F, B>
where
    A: AudioCapture,
    S: Transcriber,
    F: TextFormatter,
    B: ClipboardBackend,
{
    capture: A,
    transcriber: S,
    formatter: F,
    clipboard: ClipboardBridge<B>,
    state: PipelineState,
    session: RecordingSession,
    auto_paste: bool,
}

impl<A, S, F, B> RecordingPipeline<A, S, F, B>
where
    A: AudioCapture,
    S: Transcriber,
    F: TextFormatter,
    B: ClipboardBackend,
{
    pub fn new(capture: A, transcriber: S, formatter: F, clipboard: ClipboardBridge<B>) -> Self {
        RecordingPipeline {
            capture,
            transcriber,
            formatter,
            clipboard,
            state: PipelineState::Idle,
            session: RecordingSession::default(),
            auto_paste: false,
        }
    }

    /// Sends a paste keystroke after the clipboard write when enabled.
    pub fn with_auto_paste(mut self, auto_paste: bool) -> Self {
        self.auto_paste = auto_paste;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn status(&self) -> &str {
        &self.session.status
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording
    }

    /// Starts a new recording cycle.
    ///
    /// Only one session may be active at a time; the speech-leg preconditions
    /// are enforced here, before capture starts, so an unusable configuration
    /// never records audio it cannot process. On failure the pipeline stays
    /// idle with a status explaining what to fix.
    pub async fn start(&mut self, speech_config: &ProviderConfig) -> Result<(), VoxError> {
        if self.session.is_recording {
            return Err(VoxError::Capture(
                "a recording is already in progress".to_string(),
            ));
        }

        if let Err(err) = transcription::check_preconditions(speech_config) {
            self.session.status = match &err {
                VoxError::MissingApiKey(name) => {
                    format!("Set the {name} API key before recording")
                }
                VoxError::UnsupportedCapability(name) => format!(
                    "{name} cannot transcribe speech; pick a speech-capable provider"
                ),
                other => other.to_string(),
            };
            return Err(err);
        }

        self.session = RecordingSession {
            status: "Recording...".to_string(),
            ..Default::default()
        };

        match self.capture.start().await {
            Ok(()) => {
                self.set_state(PipelineState::Recording);
                self.session.is_recording = true;
                Ok(())
            }
            Err(err) => {
                self.session.status = format!("Recording failed: {err}");
                Err(err)
            }
        }
    }

    /// Stops the capture and runs the remaining stages to completion.
    ///
    /// The configs are captured by value at each stage's call; settings edits
    /// made while the cycle is in flight do not affect it. Returns the
    /// formatted text that landed on the clipboard.
    pub async fn stop_and_finish(
        &mut self,
        speech_config: &ProviderConfig,
        text_config: &ProviderConfig,
        custom_prompt: Option<&str>,
    ) -> Result<String, VoxError> {
        if !self.session.is_recording {
            return Err(VoxError::Capture("no recording in progress".to_string()));
        }

        self.session.status = "Processing recording...".to_string();
        let audio_path = match self.capture.stop().await {
            Ok(path) => path,
            Err(err) => return Err(self.fail(err)),
        };
        self.session.is_recording = false;
        self.session.audio_path = Some(audio_path.clone());

        self.set_state(PipelineState::Transcribing);
        self.session.status = "Transcribing...".to_string();
        let transcript = match self
            .transcriber
            .transcribe(&audio_path, speech_config)
            .await
        {
            Ok(text) => text,
            Err(err) => return Err(self.fail(err)),
        };
        self.session.transcript = transcript.clone();

        self.set_state(PipelineState::Formatting);
        self.session.status = "Formatting...".to_string();
        let formatted = match self
            .formatter
            .format(&transcript, text_config, custom_prompt)
            .await
        {
            Ok(text) => text,
            Err(err) => return Err(self.fail(err)),
        };
        self.session.formatted = formatted.clone();

        self.set_state(PipelineState::CopyingToClipboard);
        self.session.status = "Copying to clipboard...".to_string();
        let mut paste_failure = None;
        if self.auto_paste {
            match self.clipboard.copy_and_paste(&formatted).await {
                Ok(()) => {}
                Err(VoxError::Paste(message)) => {
                    // The text is already on the clipboard; report and move on.
                    tracing::warn!("Auto-paste failed: {message}");
                    paste_failure = Some(message);
                }
                Err(err) => return Err(self.fail(err)),
            }
        } else if let Err(err) = self.clipboard.copy(&formatted) {
            return Err(self.fail(err));
        }

        self.set_state(PipelineState::Idle);
        self.session.status = match paste_failure {
            Some(message) => format!("Copied to clipboard, but auto-paste failed: {message}"),
            None if self.auto_paste => "Done! Copied and pasted into the active window".to_string(),
            None => "Done! Copied to clipboard - paste with Ctrl+V".to_string(),
        };
        tracing::info!("Cycle complete: {}", self.session.status);
        Ok(formatted)
    }

    /// Reverts the status line to ready. Scheduled by the orchestrator a
    /// fixed delay after completion; a no-op while a cycle is in flight.
    pub fn reset_status(&mut self) {
        if self.state == PipelineState::Idle {
            self.session.status = READY_STATUS.to_string();
        }
    }

    /// Records the failure, absorbs it through the error state, and leaves
    /// the pipeline idle and retryable. Transcript and formatted text keep
    /// whatever the cycle produced before the failing stage.
    fn fail(&mut self, err: VoxError) -> VoxError {
        tracing::error!("Stage failed while {}: {err}", self.state);
        self.set_state(PipelineState::Error);
        self.set_state(PipelineState::Idle);
        self.session.is_recording = false;
        self.session.status = format!("Processing failed: {err}");
        err
    }

    fn set_state(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid pipeline transition: {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Pipeline state: {} -> {}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::provider::AiProvider;

    fn speech_config(provider: AiProvider, api_key: &str) -> ProviderConfig {
        ProviderConfig {
            provider,
            api_key: api_key.to_string(),
            base_url: provider.default_base_url().to_string(),
            model: provider.default_speech_model().to_string(),
            azure: None,
        }
    }

    fn text_config() -> ProviderConfig {
        ProviderConfig {
            provider: AiProvider::OpenAi,
            api_key: "sk-test".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            azure: None,
        }
    }

    #[derive(Default)]
    struct FakeCapture {
        starts: Arc<AtomicUsize>,
        fail_stop: bool,
    }

    #[async_trait]
    impl AudioCapture for FakeCapture {
        async fn start(&mut self) -> Result<(), VoxError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&mut self) -> Result<PathBuf, VoxError> {
            if self.fail_stop {
                return Err(VoxError::Capture("stream died".to_string()));
            }
            Ok(PathBuf::from("/tmp/a.wav"))
        }
    }

    enum FakeOutcome {
        Success(String),
        ApiError(u16, String),
    }

    struct FakeTranscriber {
        outcome: FakeOutcome,
        calls: Arc<AtomicUsize>,
    }

    impl FakeTranscriber {
        fn returning(text: &str) -> Self {
            FakeTranscriber {
                outcome: FakeOutcome::Success(text.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(status: u16, body: &str) -> Self {
            FakeTranscriber {
                outcome: FakeOutcome::ApiError(status, body.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(
            &self,
            _audio_path: &Path,
            _config: &ProviderConfig,
        ) -> Result<String, VoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                FakeOutcome::Success(text) => Ok(text.clone()),
                FakeOutcome::ApiError(status, body) => Err(VoxError::Api {
                    status: *status,
                    body: body.clone(),
                }),
            }
        }
    }

    struct FakeFormatter {
        outcome: FakeOutcome,
        calls: Arc<AtomicUsize>,
    }

    impl FakeFormatter {
        fn returning(text: &str) -> Self {
            FakeFormatter {
                outcome: FakeOutcome::Success(text.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(status: u16, body: &str) -> Self {
            FakeFormatter {
                outcome: FakeOutcome::ApiError(status, body.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl TextFormatter for FakeFormatter {
        async fn format(
            &self,
            _text: &str,
            _config: &ProviderConfig,
            _custom_prompt: Option<&str>,
        ) -> Result<String, VoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                FakeOutcome::Success(text) => Ok(text.clone()),
                FakeOutcome::ApiError(status, body) => Err(VoxError::Api {
                    status: *status,
                    body: body.clone(),
                }),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum ClipEvent {
        Write(String),
        Keystroke,
    }

    #[derive(Clone, Default)]
    struct FakeClipboard {
        events: Arc<Mutex<Vec<ClipEvent>>>,
        fail_paste: bool,
    }

    impl ClipboardBackend for FakeClipboard {
        fn write_text(&self, text: &str) -> Result<(), VoxError> {
            self.events
                .lock()
                .unwrap()
                .push(ClipEvent::Write(text.to_string()));
            Ok(())
        }

        fn send_paste_keystroke(&self) -> Result<(), VoxError> {
            if self.fail_paste {
                return Err(VoxError::Paste("no keystroke tool".to_string()));
            }
            self.events.lock().unwrap().push(ClipEvent::Keystroke);
            Ok(())
        }
    }

    type TestPipeline =
        RecordingPipeline<FakeCapture, FakeTranscriber, FakeFormatter, FakeClipboard>;

    fn pipeline(
        transcriber: FakeTranscriber,
        formatter: FakeFormatter,
        clipboard: FakeClipboard,
    ) -> TestPipeline {
        RecordingPipeline::new(
            FakeCapture::default(),
            transcriber,
            formatter,
            ClipboardBridge::new(clipboard),
        )
    }

    #[tokio::test]
    async fn test_start_rejected_without_api_key() {
        let mut pipeline = pipeline(
            FakeTranscriber::returning(""),
            FakeFormatter::returning(""),
            FakeClipboard::default(),
        );
        let starts = Arc::new(AtomicUsize::new(0));
        pipeline.capture.starts = starts.clone();

        let config = speech_config(AiProvider::OpenAi, "");
        let result = pipeline.start(&config).await;

        assert!(matches!(result, Err(VoxError::MissingApiKey(_))));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.is_recording());
        assert!(pipeline.status().contains("API key"));
        assert_eq!(starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_start_rejected_for_speech_incapable_provider() {
        let transcriber = FakeTranscriber::returning("");
        let transcriber_calls = transcriber.calls.clone();
        let mut pipeline = pipeline(
            transcriber,
            FakeFormatter::returning(""),
            FakeClipboard::default(),
        );

        let config = speech_config(AiProvider::Anthropic, "sk-ant-test");
        let result = pipeline.start(&config).await;

        assert!(matches!(result, Err(VoxError::UnsupportedCapability(_))));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(transcriber_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_start_rejected_while_recording() {
        let mut pipeline = pipeline(
            FakeTranscriber::returning(""),
            FakeFormatter::returning(""),
            FakeClipboard::default(),
        );
        let starts = Arc::new(AtomicUsize::new(0));
        pipeline.capture.starts = starts.clone();

        let config = speech_config(AiProvider::OpenAi, "sk-test");
        pipeline.start(&config).await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Recording);

        let second = pipeline.start(&config).await;
        assert!(second.is_err());
        assert_eq!(pipeline.state(), PipelineState::Recording);
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_happy_path_copies_formatted_text() {
        let clipboard = FakeClipboard::default();
        let events = clipboard.events.clone();
        let mut pipeline = pipeline(
            FakeTranscriber::returning("你好世界"),
            FakeFormatter::returning("# 你好\n\n世界"),
            clipboard,
        );

        let speech = speech_config(AiProvider::OpenAi, "sk-test");
        pipeline.start(&speech).await.unwrap();
        let formatted = pipeline
            .stop_and_finish(&speech, &text_config(), None)
            .await
            .unwrap();

        assert_eq!(formatted, "# 你好\n\n世界");
        assert_eq!(pipeline.session().transcript, "你好世界");
        assert_eq!(pipeline.session().formatted, "# 你好\n\n世界");
        assert_eq!(
            pipeline.session().audio_path.as_deref(),
            Some(Path::new("/tmp/a.wav"))
        );
        assert_eq!(
            *events.lock().unwrap(),
            vec![ClipEvent::Write("# 你好\n\n世界".to_string())]
        );
        assert_eq!(
            pipeline.clipboard.last_copied_text(),
            Some("# 你好\n\n世界")
        );
        assert!(pipeline.status().starts_with("Done!"));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.is_recording());
    }

    #[tokio::test]
    async fn test_transcription_api_failure_returns_to_idle() {
        let formatter = FakeFormatter::returning("unused");
        let formatter_calls = formatter.calls.clone();
        let mut pipeline = pipeline(
            FakeTranscriber::failing(401, "Incorrect API key provided"),
            formatter,
            FakeClipboard::default(),
        );

        let speech = speech_config(AiProvider::OpenAi, "sk-bad");
        pipeline.start(&speech).await.unwrap();
        let result = pipeline.stop_and_finish(&speech, &text_config(), None).await;

        assert!(matches!(result, Err(VoxError::Api { status: 401, .. })));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.is_recording());
        assert!(pipeline.status().contains("Processing failed"));
        assert!(pipeline.status().contains("401"));
        // The stage after the failure never ran.
        assert!(pipeline.session().formatted.is_empty());
        assert_eq!(formatter_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_formatting_failure_keeps_transcript() {
        let mut pipeline = pipeline(
            FakeTranscriber::returning("你好世界"),
            FakeFormatter::failing(429, "rate limited"),
            FakeClipboard::default(),
        );

        let speech = speech_config(AiProvider::OpenAi, "sk-test");
        pipeline.start(&speech).await.unwrap();
        let result = pipeline.stop_and_finish(&speech, &text_config(), None).await;

        assert!(result.is_err());
        // Produced before the failing stage, kept for inspection.
        assert_eq!(pipeline.session().transcript, "你好世界");
        assert!(pipeline.session().formatted.is_empty());
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_capture_stop_failure_reports_status() {
        let mut pipeline = pipeline(
            FakeTranscriber::returning(""),
            FakeFormatter::returning(""),
            FakeClipboard::default(),
        );
        pipeline.capture.fail_stop = true;

        let speech = speech_config(AiProvider::OpenAi, "sk-test");
        pipeline.start(&speech).await.unwrap();
        let result = pipeline.stop_and_finish(&speech, &text_config(), None).await;

        assert!(matches!(result, Err(VoxError::Capture(_))));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(pipeline.status().contains("Processing failed"));
    }

    #[tokio::test]
    async fn test_stop_without_start_is_rejected() {
        let mut pipeline = pipeline(
            FakeTranscriber::returning(""),
            FakeFormatter::returning(""),
            FakeClipboard::default(),
        );
        let speech = speech_config(AiProvider::OpenAi, "sk-test");
        let result = pipeline.stop_and_finish(&speech, &text_config(), None).await;
        assert!(matches!(result, Err(VoxError::Capture(_))));
    }

    #[tokio::test]
    async fn test_auto_paste_sends_keystroke_after_copy() {
        let clipboard = FakeClipboard::default();
        let events = clipboard.events.clone();
        let mut pipeline = pipeline(
            FakeTranscriber::returning("hello"),
            FakeFormatter::returning("Hello."),
            clipboard,
        )
        .with_auto_paste(true);

        let speech = speech_config(AiProvider::OpenAi, "sk-test");
        pipeline.start(&speech).await.unwrap();
        pipeline
            .stop_and_finish(&speech, &text_config(), None)
            .await
            .unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![ClipEvent::Write("Hello.".to_string()), ClipEvent::Keystroke]
        );
    }

    #[tokio::test]
    async fn test_paste_failure_does_not_fail_the_cycle() {
        let clipboard = FakeClipboard {
            fail_paste: true,
            ..Default::default()
        };
        let mut pipeline = pipeline(
            FakeTranscriber::returning("hello"),
            FakeFormatter::returning("Hello."),
            clipboard,
        )
        .with_auto_paste(true);

        let speech = speech_config(AiProvider::OpenAi, "sk-test");
        pipeline.start(&speech).await.unwrap();
        let result = pipeline.stop_and_finish(&speech, &text_config(), None).await;

        assert!(result.is_ok());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(pipeline.status().contains("auto-paste failed"));
        assert_eq!(pipeline.clipboard.last_copied_text(), Some("Hello."));
    }

    #[tokio::test]
    async fn test_reset_status_reverts_to_ready() {
        let mut pipeline = pipeline(
            FakeTranscriber::returning("hi"),
            FakeFormatter::returning("Hi."),
            FakeClipboard::default(),
        );

        let speech = speech_config(AiProvider::OpenAi, "sk-test");
        pipeline.start(&speech).await.unwrap();
        pipeline
            .stop_and_finish(&speech, &text_config(), None)
            .await
            .unwrap();
        assert!(pipeline.status().starts_with("Done!"));

        pipeline.reset_status();
        assert_eq!(pipeline.status(), READY_STATUS);
    }

    #[tokio::test]
    async fn test_reset_status_is_a_no_op_while_recording() {
        let mut pipeline = pipeline(
            FakeTranscriber::returning(""),
            FakeFormatter::returning(""),
            FakeClipboard::default(),
        );
        let speech = speech_config(AiProvider::OpenAi, "sk-test");
        pipeline.start(&speech).await.unwrap();

        pipeline.reset_status();
        assert_eq!(pipeline.status(), "Recording...");
    }
}
