//! OpenAI-compatible transcription endpoint.
//!
//! Multipart form upload with bearer token authentication. Also serves
//! DeepSeek, Zhipu, and Moonshot, whose transcription APIs follow the same
//! contract.

use std::path::Path;

use super::TranscriptionResponse;
use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::net::{error_for_status, join_url, transport_error};
use crate::transcription::TARGET_LANGUAGE;

pub async fn transcribe(audio_path: &Path, config: &ProviderConfig) -> Result<String, VoxError> {
    let form = build_form(audio_path, Some(&config.model))?;
    let url = join_url(&config.base_url, "/audio/transcriptions");
    let provider = config.provider.name();

    tracing::debug!(
        "{provider} transcription request: POST {url} (model={}, language={TARGET_LANGUAGE})",
        config.model
    );

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .bearer_auth(&config.api_key)
        .multipart(form)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let response = error_for_status(provider, response).await?;
    let transcription: TranscriptionResponse = response
        .json()
        .await
        .map_err(|e| VoxError::Network(format!("failed to parse {provider} response: {e}")))?;

    Ok(transcription.text)
}

/// Builds the multipart transcription form. Azure omits the `model` field
/// because the deployment name in the URL selects the model.
pub(crate) fn build_form(
    audio_path: &Path,
    model: Option<&str>,
) -> Result<reqwest::multipart::Form, VoxError> {
    let audio_data = std::fs::read(audio_path)?;
    let file_part = reqwest::multipart::Part::bytes(audio_data)
        .file_name("audio.wav")
        .mime_str("audio/wav")
        .map_err(|e| VoxError::Network(format!("failed to build file part for upload: {e}")))?;

    let mut form = reqwest::multipart::Form::new()
        .text("language", TARGET_LANGUAGE)
        .text("response_format", "json")
        .part("file", file_part);
    if let Some(model) = model {
        form = form.text("model", model.to_string());
    }
    Ok(form)
}
