//! Text-formatting client.
//!
//! Turns a raw speech transcript into clean, punctuated, Markdown-structured
//! text through the configured provider's chat endpoint. A fixed system
//! prompt drives the rewrite unless the caller supplies its own; temperature
//! and output length are pinned so the rewrite stays deterministic rather
//! than creative. Single attempt, no retries.

pub mod api;

pub use api::format;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::VoxError;

/// Default system instruction for the cleanup exchange.
pub const DEFAULT_FORMAT_PROMPT: &str = "You are a transcription formatter. \
Rewrite the user's raw speech transcript into clean, correctly punctuated \
text in the same language as the input. Fix obvious speech recognition \
errors, remove filler words, and structure the result with Markdown \
(headings, lists, code blocks) where it helps readability. Preserve the \
meaning exactly and do not add new content.";

pub(crate) const FORMAT_TEMPERATURE: f32 = 0.3;
pub(crate) const FORMAT_MAX_TOKENS: u32 = 1000;

/// Seam for the pipeline's formatting stage.
#[async_trait]
pub trait TextFormatter: Send + Sync {
    async fn format(
        &self,
        text: &str,
        config: &ProviderConfig,
        custom_prompt: Option<&str>,
    ) -> Result<String, VoxError>;
}

/// Production formatter backed by the provider HTTP APIs.
pub struct ApiFormatter;

#[async_trait]
impl TextFormatter for ApiFormatter {
    async fn format(
        &self,
        text: &str,
        config: &ProviderConfig,
        custom_prompt: Option<&str>,
    ) -> Result<String, VoxError> {
        api::format(text, config, custom_prompt).await
    }
}
