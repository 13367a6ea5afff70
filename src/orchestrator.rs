//! Command-driven orchestration of the recording pipeline.
//!
//! Trigger sources (hotkey, tray, CLI timers) never touch the pipeline
//! directly; they post typed commands on an mpsc channel and the run loop
//! executes them one at a time. Provider configs are resolved from the
//! settings store at the moment each command runs, so edits between cycles
//! take effect while in-flight cycles stay untouched.

use tokio::sync::mpsc;

use crate::clipboard::ClipboardBackend;
use crate::config::{Leg, ProviderConfig, SettingsStore};
use crate::formatting::TextFormatter;
use crate::pipeline::{RecordingPipeline, RecordingSession, STATUS_RESET_DELAY};
use crate::recording::AudioCapture;
use crate::transcription::Transcriber;

/// Commands accepted by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Hotkey semantics: start when idle, stop and finish when recording.
    ToggleRecording,
    /// Stop if a recording is active; ignored otherwise.
    StopRecording,
    /// Revert the status line to ready (scheduled after a completed cycle).
    ResetStatus,
    Quit,
}

/// Final state handed back when the run loop exits.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub session: RecordingSession,
    /// The last pipeline error, if any command failed.
    pub error: Option<String>,
}

pub struct Orchestrator<A, S, F, B>
where
    A: AudioCapture,
    S: Transcriber,
    F: TextFormatter,
    B: ClipboardBackend,
{
    pipeline: RecordingPipeline<A, S, F, B>,
    store: SettingsStore,
    api_key_override: Option<String>,
    custom_prompt: Option<String>,
    rx: mpsc::Receiver<AppCommand>,
    tx: mpsc::Sender<AppCommand>,
}

impl<A, S, F, B> Orchestrator<A, S, F, B>
where
    A: AudioCapture,
    S: Transcriber,
    F: TextFormatter,
    B: ClipboardBackend,
{
    /// Builds the orchestrator and hands back the command sender for trigger
    /// sources. `api_key_override` substitutes for both legs' stored keys
    /// (used by the diagnostic run with `OPENAI_API_KEY`).
    pub fn new(
        pipeline: RecordingPipeline<A, S, F, B>,
        store: SettingsStore,
        api_key_override: Option<String>,
        custom_prompt: Option<String>,
    ) -> (Self, mpsc::Sender<AppCommand>) {
        let (tx, rx) = mpsc::channel(16);
        let orchestrator = Orchestrator {
            pipeline,
            store,
            api_key_override,
            custom_prompt,
            rx,
            tx: tx.clone(),
        };
        (orchestrator, tx)
    }

    /// Processes commands until `Quit`, then returns the final session.
    pub async fn run(mut self) -> RunOutcome {
        let mut last_error = None;

        while let Some(command) = self.rx.recv().await {
            tracing::debug!("Handling command {:?}", command);
            match command {
                AppCommand::ToggleRecording => {
                    if self.pipeline.is_recording() {
                        self.handle_stop(&mut last_error).await;
                    } else {
                        self.handle_start(&mut last_error).await;
                    }
                }
                AppCommand::StopRecording => self.handle_stop(&mut last_error).await,
                AppCommand::ResetStatus => self.pipeline.reset_status(),
                AppCommand::Quit => break,
            }
        }

        RunOutcome {
            session: self.pipeline.session().clone(),
            error: last_error,
        }
    }

    fn leg_config(&self, leg: Leg) -> ProviderConfig {
        let mut config = self.store.provider_config(leg);
        if let Some(key) = &self.api_key_override {
            config.api_key = key.clone();
        }
        config
    }

    async fn handle_start(&mut self, last_error: &mut Option<String>) {
        let config = self.leg_config(Leg::Speech);
        if let Err(err) = self.pipeline.start(&config).await {
            if err.is_precondition() {
                tracing::warn!("Recording not started: {}", self.pipeline.status());
            } else {
                tracing::error!("Recording failed to start: {err}");
            }
            *last_error = Some(err.to_string());
        }
    }

    async fn handle_stop(&mut self, last_error: &mut Option<String>) {
        if !self.pipeline.is_recording() {
            tracing::debug!("Stop ignored, nothing is recording");
            return;
        }
        let speech = self.leg_config(Leg::Speech);
        let text = self.leg_config(Leg::Text);
        let prompt = self.custom_prompt.clone();

        match self
            .pipeline
            .stop_and_finish(&speech, &text, prompt.as_deref())
            .await
        {
            Ok(_) => {
                tracing::debug!("Pipeline back to {}", self.pipeline.state());
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(STATUS_RESET_DELAY).await;
                    let _ = tx.send(AppCommand::ResetStatus).await;
                });
            }
            Err(err) => *last_error = Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};

    use crate::clipboard::ClipboardBridge;
    use crate::error::VoxError;

    struct StubCapture;

    #[async_trait]
    impl AudioCapture for StubCapture {
        async fn start(&mut self) -> Result<(), VoxError> {
            Ok(())
        }

        async fn stop(&mut self) -> Result<PathBuf, VoxError> {
            Ok(PathBuf::from("/tmp/a.wav"))
        }
    }

    struct StubTranscriber;

    #[async_trait]
    impl Transcriber for StubTranscriber {
        async fn transcribe(
            &self,
            _audio_path: &Path,
            _config: &ProviderConfig,
        ) -> Result<String, VoxError> {
            Ok("raw words".to_string())
        }
    }

    struct StubFormatter;

    #[async_trait]
    impl TextFormatter for StubFormatter {
        async fn format(
            &self,
            text: &str,
            _config: &ProviderConfig,
            _custom_prompt: Option<&str>,
        ) -> Result<String, VoxError> {
            Ok(format!("formatted: {text}"))
        }
    }

    struct StubClipboard;

    impl ClipboardBackend for StubClipboard {
        fn write_text(&self, _text: &str) -> Result<(), VoxError> {
            Ok(())
        }

        fn send_paste_keystroke(&self) -> Result<(), VoxError> {
            Ok(())
        }
    }

    fn store_with_key(dir: &tempfile::TempDir, key: &str) -> SettingsStore {
        let mut store = SettingsStore::open(dir.path().join("voxclip.toml")).unwrap();
        if !key.is_empty() {
            store.set_api_key(Leg::Speech, key).unwrap();
            store.set_api_key(Leg::Text, key).unwrap();
        }
        store
    }

    fn test_pipeline(
    ) -> RecordingPipeline<StubCapture, StubTranscriber, StubFormatter, StubClipboard> {
        RecordingPipeline::new(
            StubCapture,
            StubTranscriber,
            StubFormatter,
            ClipboardBridge::new(StubClipboard),
        )
    }

    #[tokio::test]
    async fn test_toggle_commands_drive_a_full_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_key(&dir, "sk-test");
        let (orchestrator, tx) = Orchestrator::new(test_pipeline(), store, None, None);

        tx.send(AppCommand::ToggleRecording).await.unwrap();
        tx.send(AppCommand::ToggleRecording).await.unwrap();
        tx.send(AppCommand::Quit).await.unwrap();

        let outcome = orchestrator.run().await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.session.transcript, "raw words");
        assert_eq!(outcome.session.formatted, "formatted: raw words");
        assert!(!outcome.session.is_recording);
    }

    #[tokio::test]
    async fn test_missing_key_surfaces_in_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_key(&dir, "");
        let (orchestrator, tx) = Orchestrator::new(test_pipeline(), store, None, None);

        tx.send(AppCommand::ToggleRecording).await.unwrap();
        tx.send(AppCommand::Quit).await.unwrap();

        let outcome = orchestrator.run().await;
        let error = outcome.error.expect("start should have failed");
        assert!(error.contains("API key"));
        assert!(outcome.session.status.contains("API key"));
    }

    #[tokio::test]
    async fn test_api_key_override_substitutes_stored_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_key(&dir, "");
        let (orchestrator, tx) =
            Orchestrator::new(test_pipeline(), store, Some("sk-env".to_string()), None);

        tx.send(AppCommand::ToggleRecording).await.unwrap();
        tx.send(AppCommand::StopRecording).await.unwrap();
        tx.send(AppCommand::Quit).await.unwrap();

        let outcome = orchestrator.run().await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.session.formatted, "formatted: raw words");
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reverts_to_ready_after_the_delay() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_key(&dir, "sk-test");
        let (orchestrator, tx) = Orchestrator::new(test_pipeline(), store, None, None);

        tx.send(AppCommand::ToggleRecording).await.unwrap();
        tx.send(AppCommand::ToggleRecording).await.unwrap();
        let quit_tx = tx.clone();
        tokio::spawn(async move {
            // Past the reset delay; paused time auto-advances.
            tokio::time::sleep(STATUS_RESET_DELAY * 2).await;
            let _ = quit_tx.send(AppCommand::Quit).await;
        });

        let outcome = orchestrator.run().await;
        assert_eq!(outcome.session.status, crate::pipeline::READY_STATUS);
    }

    #[tokio::test]
    async fn test_stop_without_recording_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_key(&dir, "sk-test");
        let (orchestrator, tx) = Orchestrator::new(test_pipeline(), store, None, None);

        tx.send(AppCommand::StopRecording).await.unwrap();
        tx.send(AppCommand::Quit).await.unwrap();

        let outcome = orchestrator.run().await;
        assert!(outcome.error.is_none());
    }
}
