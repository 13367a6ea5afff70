//! Speech-to-text client.
//!
//! Converts a recorded audio file into a transcript through the configured
//! provider's transcription endpoint. Preconditions (API key present,
//! provider capable of speech-to-text) are checked before any network
//! activity; a single failed request surfaces immediately, with no retries.

pub mod api;

pub use api::transcribe;

use async_trait::async_trait;
use std::path::Path;

use crate::config::ProviderConfig;
use crate::error::VoxError;

/// Language hint sent with every transcription request.
pub const TARGET_LANGUAGE: &str = "zh";

/// Checks the speech-leg preconditions without touching the network.
///
/// Shared by the pipeline's start guard and the client itself, so an
/// unsupported provider is rejected both before recording starts and before
/// a request could be built.
pub fn check_preconditions(config: &ProviderConfig) -> Result<(), VoxError> {
    if config.api_key.is_empty() {
        return Err(VoxError::MissingApiKey(config.provider.name().to_string()));
    }
    if !config.provider.supports_speech_to_text() {
        return Err(VoxError::UnsupportedCapability(
            config.provider.name().to_string(),
        ));
    }
    Ok(())
}

/// Seam for the pipeline's transcription stage.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio_path: &Path,
        config: &ProviderConfig,
    ) -> Result<String, VoxError>;
}

/// Production transcriber backed by the provider HTTP APIs.
pub struct ApiTranscriber;

#[async_trait]
impl Transcriber for ApiTranscriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
        config: &ProviderConfig,
    ) -> Result<String, VoxError> {
        api::transcribe(audio_path, config).await
    }
}
