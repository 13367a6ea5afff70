//! Ollama transcription endpoint.
//!
//! Local Ollama servers expose the OpenAI-compatible routes under `/v1` and
//! take no authentication header.

use std::path::Path;

use super::TranscriptionResponse;
use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::net::{error_for_status, join_url, transport_error};

pub async fn transcribe(audio_path: &Path, config: &ProviderConfig) -> Result<String, VoxError> {
    let form = super::openai::build_form(audio_path, Some(&config.model))?;
    let url = join_url(&config.base_url, "/v1/audio/transcriptions");
    let provider = config.provider.name();

    tracing::debug!("{provider} transcription request: POST {url} (model={})", config.model);

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
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
