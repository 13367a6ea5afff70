//! Azure OpenAI chat completion endpoint.
//!
//! Deployment-addressed URL with `api-key` authentication; the request body
//! carries no model field because the deployment selects it.

use serde::Serialize;

use super::{build_messages, ChatCompletionResponse, ChatMessage};
use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::formatting::{FORMAT_MAX_TOKENS, FORMAT_TEMPERATURE};
use crate::net::{error_for_status, join_url, transport_error};

#[derive(Debug, Serialize)]
struct AzureChatRequest {
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

pub async fn format(
    text: &str,
    config: &ProviderConfig,
    custom_prompt: Option<&str>,
) -> Result<String, VoxError> {
    let url = build_url(config);
    let provider = config.provider.name();

    let request = AzureChatRequest {
        messages: build_messages(text, custom_prompt),
        temperature: FORMAT_TEMPERATURE,
        max_tokens: FORMAT_MAX_TOKENS,
    };

    tracing::debug!("{provider} chat request: POST {url}");

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .header("api-key", &config.api_key)
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

fn build_url(config: &ProviderConfig) -> String {
    let (api_version, deployment) = match &config.azure {
        Some(options) => (options.api_version.as_str(), options.deployment.as_str()),
        None => ("2024-02-01", "gpt-4"),
    };
    join_url(
        &config.base_url,
        &format!("/openai/deployments/{deployment}/chat/completions?api-version={api_version}"),
    )
}
