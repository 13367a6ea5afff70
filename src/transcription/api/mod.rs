//! Transcription API client with provider-specific implementations.
//!
//! Routes each request to the module matching the configured provider.
//! DeepSeek, Zhipu, and Moonshot expose OpenAI-compatible transcription
//! endpoints and share the OpenAI implementation; Azure uses deployment
//! addressing and Ollama runs unauthenticated.

mod azure;
mod ollama;
mod openai;

use serde::Deserialize;
use std::path::Path;

use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::provider::AiProvider;

/// Response from transcription APIs (shared across providers).
#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptionResponse {
    /// The transcribed text from the audio file
    pub text: String,
}

/// Transcribes an audio file using the configured provider.
///
/// The audio file is deleted after a successful transcription; on failure it
/// is kept so the recording can be retried by hand.
///
/// # Errors
/// - `MissingApiKey` / `UnsupportedCapability` before any network call
/// - `Network` if the request cannot complete
/// - `Api` for a non-2xx response, carrying the provider error body
pub async fn transcribe(audio_path: &Path, config: &ProviderConfig) -> Result<String, VoxError> {
    super::check_preconditions(config)?;

    tracing::info!(
        "Transcribing {} with {} ({})",
        audio_path.display(),
        config.provider.name(),
        config.model
    );

    let text = match config.provider {
        AiProvider::OpenAi | AiProvider::DeepSeek | AiProvider::Zhipu | AiProvider::Moonshot => {
            openai::transcribe(audio_path, config).await
        }
        AiProvider::Azure => azure::transcribe(audio_path, config).await,
        AiProvider::Ollama => ollama::transcribe(audio_path, config).await,
        // check_preconditions rejected this above.
        AiProvider::Anthropic => Err(VoxError::UnsupportedCapability(
            config.provider.name().to_string(),
        )),
    }?;

    if let Err(err) = std::fs::remove_file(audio_path) {
        tracing::warn!("Failed to delete {}: {err}", audio_path.display());
    }

    Ok(text.trim().to_string())
}
