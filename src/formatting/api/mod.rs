//! Chat-completion API client with provider-specific implementations.
//!
//! DeepSeek, Zhipu, and Moonshot serve OpenAI-compatible `/chat/completions`
//! routes and share the OpenAI implementation. Azure uses deployment
//! addressing, Anthropic speaks its own messages API, and Ollama runs
//! unauthenticated under `/v1`.

mod anthropic;
mod azure;
mod ollama;
mod openai;

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::VoxError;
use crate::provider::AiProvider;

use super::DEFAULT_FORMAT_PROMPT;

/// One message of the chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Extracts the first completion's message content.
    pub(crate) fn into_content(self, provider: &str) -> Result<String, VoxError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| VoxError::Network(format!("{provider} returned no completion content")))
    }
}

/// Builds the fixed two-message exchange: system instruction plus the raw
/// text as the user turn. A caller-supplied prompt substitutes for the
/// default instruction.
pub fn build_messages(text: &str, custom_prompt: Option<&str>) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(custom_prompt.unwrap_or(DEFAULT_FORMAT_PROMPT)),
        ChatMessage::user(text),
    ]
}

/// Formats raw text through the configured provider's chat endpoint.
///
/// # Errors
/// - `MissingApiKey` before any network call (Ollama excepted; it takes no key)
/// - `Network` if the request cannot complete
/// - `Api` for a non-2xx response, carrying the provider error body
pub async fn format(
    text: &str,
    config: &ProviderConfig,
    custom_prompt: Option<&str>,
) -> Result<String, VoxError> {
    if config.api_key.is_empty() && config.provider != AiProvider::Ollama {
        return Err(VoxError::MissingApiKey(config.provider.name().to_string()));
    }

    tracing::info!(
        "Formatting {} chars with {} ({})",
        text.chars().count(),
        config.provider.name(),
        config.model
    );

    let formatted = match config.provider {
        AiProvider::OpenAi | AiProvider::DeepSeek | AiProvider::Zhipu | AiProvider::Moonshot => {
            openai::format(text, config, custom_prompt).await
        }
        AiProvider::Azure => azure::format(text, config, custom_prompt).await,
        AiProvider::Anthropic => anthropic::format(text, config, custom_prompt).await,
        AiProvider::Ollama => ollama::format(text, config, custom_prompt).await,
    }?;

    Ok(formatted.trim().to_string())
}
