//! Configuration management for voxclip.
//!
//! Settings are persisted as a TOML file in the user's config directory, one
//! table per pipeline leg (speech recognition, text formatting) plus a global
//! hotkey string. Every edit is written back synchronously; absent keys fall
//! back to built-in defaults derived from the provider catalog.

pub mod file;

pub use file::{default_settings_path, Leg, LegSettings, SettingsFile, SettingsStore};

use crate::provider::AiProvider;

/// Runtime view of one leg's provider settings, resolved against the catalog.
///
/// Captured by value at the moment a pipeline stage issues its call, so
/// concurrent settings edits never affect an in-flight cycle.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: AiProvider,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Present only when the selected provider addresses models through
    /// versioned deployments. Other providers keep the underlying fields in
    /// storage but never see them here.
    pub azure: Option<AzureOptions>,
}

/// Deployment addressing used by the Azure OpenAI endpoints.
#[derive(Debug, Clone)]
pub struct AzureOptions {
    pub api_version: String,
    pub deployment: String,
}
