//! Ollama chat completion endpoint.
//!
//! OpenAI-compatible route under `/v1`, no authentication, streaming
//! explicitly disabled.

use serde::Serialize;

use super::{build_messages, ChatCompletionResponse, ChatMessage};
use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::formatting::{FORMAT_MAX_TOKENS, FORMAT_TEMPERATURE};
use crate::net::{error_for_status, join_url, transport_error};

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

pub async fn format(
    text: &str,
    config: &ProviderConfig,
    custom_prompt: Option<&str>,
) -> Result<String, VoxError> {
    let url = join_url(&config.base_url, "/v1/chat/completions");
    let provider = config.provider.name();

    let request = OllamaChatRequest {
        model: config.model.clone(),
        messages: build_messages(text, custom_prompt),
        temperature: FORMAT_TEMPERATURE,
        max_tokens: FORMAT_MAX_TOKENS,
        stream: false,
    };

    tracing::debug!("{provider} chat request: POST {url} (model={})", config.model);

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let response = error_for_status(provider, response).await?;
    let completion: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| VoxError::Network(format!("failed to parse {provider} response: {e}")))?;

    completion.into_content(provider)
}
