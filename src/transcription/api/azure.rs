//! Azure OpenAI transcription endpoint.
//!
//! Azure addresses models through named deployments and authenticates with
//! an `api-key` header instead of a bearer token. The model field stays out
//! of the form; the deployment segment in the URL selects it.

use std::path::Path;

use super::TranscriptionResponse;
use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::net::{error_for_status, join_url, transport_error};

pub async fn transcribe(audio_path: &Path, config: &ProviderConfig) -> Result<String, VoxError> {
    let form = super::openai::build_form(audio_path, None)?;
    let url = build_url(config);
    let provider = config.provider.name();

    tracing::debug!("{provider} transcription request: POST {url}");

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .header("api-key", &config.api_key)
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

fn build_url(config: &ProviderConfig) -> String {
    let (api_version, deployment) = match &config.azure {
        Some(options) => (options.api_version.as_str(), options.deployment.as_str()),
        None => ("2024-02-01", "whisper"),
    };
    join_url(
        &config.base_url,
        &format!("/openai/deployments/{deployment}/audio/transcriptions?api-version={api_version}"),
    )
}
