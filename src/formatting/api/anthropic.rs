//! Anthropic messages endpoint.
//!
//! Claude takes the system instruction as a top-level field and returns
//! content blocks instead of choices. Speech-to-text is not offered; this
//! provider only ever serves the formatting leg.

use serde::{Deserialize, Serialize};

use super::ChatMessage;
use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::formatting::DEFAULT_FORMAT_PROMPT;
use crate::net::{error_for_status, join_url, transport_error};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

pub async fn format(
    text: &str,
    config: &ProviderConfig,
    custom_prompt: Option<&str>,
) -> Result<String, VoxError> {
    let url = join_url(&config.base_url, "/v1/messages");
    let provider = config.provider.name();

    let request = MessagesRequest {
        model: config.model.clone(),
        max_tokens: ANTHROPIC_MAX_TOKENS,
        system: custom_prompt.unwrap_or(DEFAULT_FORMAT_PROMPT).to_string(),
        messages: vec![ChatMessage::user(text)],
    };

    tracing::debug!("{provider} chat request: POST {url} (model={})", config.model);

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .header("x-api-key", &config.api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&request)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let response = error_for_status(provider, response).await?;
    let completion: MessagesResponse = response
        .json()
        .await
        .map_err(|e| VoxError::Network(format!("failed to parse {provider} response: {e}")))?;

    completion
        .content
        .into_iter()
        .next()
        .map(|block| block.text)
        .ok_or_else(|| VoxError::Network(format!("{provider} returned no completion content")))
}
