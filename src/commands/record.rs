//! End-to-end diagnostic recording run.
//!
//! Records from the default microphone for a fixed number of seconds, then
//! drives the full transcribe -> format -> clipboard pipeline and prints each
//! stage's result. An `OPENAI_API_KEY` environment variable substitutes for
//! both legs' stored API keys, so the pipeline can be exercised without a
//! settings file.

use std::time::Duration;

use crate::clipboard::{ClipboardBridge, SystemClipboard};
use crate::config::SettingsStore;
use crate::formatting::ApiFormatter;
use crate::orchestrator::{AppCommand, Orchestrator};
use crate::pipeline::RecordingPipeline;
use crate::recording::CpalCapture;
use crate::transcription::ApiTranscriber;

/// Runs one timed recording cycle through the orchestrator.
///
/// # Errors
/// - If the settings file cannot be loaded
/// - If any pipeline stage failed (after printing whatever was produced)
pub async fn handle_record(
    duration_secs: u64,
    paste: bool,
    prompt: Option<String>,
) -> anyhow::Result<()> {
    tracing::info!("=== voxclip record ({duration_secs}s) ===");

    let store = SettingsStore::load()?;
    let api_key_override = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    if api_key_override.is_some() {
        tracing::info!("Using the API key from OPENAI_API_KEY for both legs");
    }

    let pipeline = RecordingPipeline::new(
        CpalCapture::new(),
        ApiTranscriber,
        ApiFormatter,
        ClipboardBridge::new(SystemClipboard),
    )
    .with_auto_paste(paste);
    let (orchestrator, tx) = Orchestrator::new(pipeline, store, api_key_override, prompt);

    println!("Recording for {duration_secs} second(s). Speak now.");
    tx.send(AppCommand::ToggleRecording).await?;

    let timer_tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(duration_secs)).await;
        let _ = timer_tx.send(AppCommand::StopRecording).await;
        let _ = timer_tx.send(AppCommand::Quit).await;
    });

    let outcome = orchestrator.run().await;

    if let Some(path) = &outcome.session.audio_path {
        println!("Recorded audio: {}", path.display());
    }
    if !outcome.session.transcript.is_empty() {
        println!("\nTranscript:\n{}", outcome.session.transcript);
    }
    if !outcome.session.formatted.is_empty() {
        println!("\nFormatted:\n{}", outcome.session.formatted);
    }
    println!("\n{}", outcome.session.status);

    match outcome.error {
        Some(error) => Err(anyhow::anyhow!(error)),
        None => Ok(()),
    }
}
