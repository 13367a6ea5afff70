//! Settings file persistence.
//!
//! Loading applies catalog defaults to any missing or empty field, so a
//! hand-edited or truncated file never produces an unusable configuration.
//! Each setter persists the whole file immediately; the provider setter
//! rewrites provider id, base URL, and model together in a single write.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{AzureOptions, ProviderConfig};
use crate::provider::AiProvider;

/// The two independently configured halves of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Audio transcription (speech-to-text).
    Speech,
    /// Transcript cleanup (chat completion).
    Text,
}

impl Leg {
    pub fn name(&self) -> &'static str {
        match self {
            Leg::Speech => "speech",
            Leg::Text => "text",
        }
    }

    fn default_model(&self, provider: AiProvider) -> &'static str {
        match self {
            Leg::Speech => provider.default_speech_model(),
            Leg::Text => provider.default_text_model(),
        }
    }

    fn default_deployment(&self) -> &'static str {
        match self {
            Leg::Speech => "whisper",
            Leg::Text => "gpt-4",
        }
    }
}

/// Persisted settings for one pipeline leg.
///
/// The `api_version` and `deployment` fields are always stored but only
/// consulted when the selected provider is Azure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegSettings {
    #[serde(default = "default_provider_id")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub deployment: String,
}

impl LegSettings {
    fn defaults_for(leg: Leg) -> Self {
        let provider = AiProvider::all()[0];
        LegSettings {
            provider: provider.id().to_string(),
            api_key: String::new(),
            base_url: provider.default_base_url().to_string(),
            model: leg.default_model(provider).to_string(),
            api_version: default_api_version(),
            deployment: leg.default_deployment().to_string(),
        }
    }

    /// Fills empty fields with the selected provider's defaults. Unknown
    /// provider ids degrade through the catalog fallback.
    fn normalize(&mut self, leg: Leg) {
        let provider = AiProvider::find(&self.provider);
        self.provider = provider.id().to_string();
        if self.base_url.is_empty() {
            self.base_url = provider.default_base_url().to_string();
        }
        if self.model.is_empty() {
            self.model = leg.default_model(provider).to_string();
        }
        if self.api_version.is_empty() {
            self.api_version = default_api_version();
        }
        if self.deployment.is_empty() {
            self.deployment = leg.default_deployment().to_string();
        }
    }
}

fn default_provider_id() -> String {
    AiProvider::all()[0].id().to_string()
}

fn default_api_version() -> String {
    "2024-02-01".to_string()
}

fn default_hotkey() -> String {
    "Ctrl+Alt+R".to_string()
}

fn default_speech_leg() -> LegSettings {
    LegSettings::defaults_for(Leg::Speech)
}

fn default_text_leg() -> LegSettings {
    LegSettings::defaults_for(Leg::Text)
}

/// Complete persisted settings. The hotkey comes first so it serializes
/// ahead of the leg tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsFile {
    /// Global toggle-recording hotkey, registered by the desktop shell.
    #[serde(default = "default_hotkey")]
    pub hotkey: String,
    #[serde(default = "default_speech_leg")]
    pub speech: LegSettings,
    #[serde(default = "default_text_leg")]
    pub text: LegSettings,
}

impl Default for SettingsFile {
    fn default() -> Self {
        SettingsFile {
            hotkey: default_hotkey(),
            speech: default_speech_leg(),
            text: default_text_leg(),
        }
    }
}

impl SettingsFile {
    fn normalize(&mut self) {
        self.speech.normalize(Leg::Speech);
        self.text.normalize(Leg::Text);
        if self.hotkey.is_empty() {
            self.hotkey = default_hotkey();
        }
    }
}

/// Durable key-value store backing the settings surface.
pub struct SettingsStore {
    path: PathBuf,
    file: SettingsFile,
}

impl SettingsStore {
    /// Opens the store at `path`, falling back to built-in defaults when the
    /// file does not exist yet.
    ///
    /// # Errors
    /// - If the file exists but cannot be read
    /// - If the TOML is malformed
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut file: SettingsFile = toml::from_str(&content)?;
            file.normalize();
            file
        } else {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            SettingsFile::default()
        };
        Ok(SettingsStore { path, file })
    }

    /// Opens the store at the default settings path.
    pub fn load() -> anyhow::Result<Self> {
        Self::open(default_settings_path()?)
    }

    /// Writes the whole settings file. Field setters call this after every
    /// mutation; it is public so a default file can be seeded before editing.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.file)?;
        fs::write(&self.path, content)?;
        tracing::debug!("Settings saved to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn leg(&self, leg: Leg) -> &LegSettings {
        match leg {
            Leg::Speech => &self.file.speech,
            Leg::Text => &self.file.text,
        }
    }

    fn leg_mut(&mut self, leg: Leg) -> &mut LegSettings {
        match leg {
            Leg::Speech => &mut self.file.speech,
            Leg::Text => &mut self.file.text,
        }
    }

    /// Resolves the typed runtime config for one leg. The Azure extension is
    /// materialized only when that provider is selected.
    pub fn provider_config(&self, leg: Leg) -> ProviderConfig {
        let settings = self.leg(leg);
        let provider = AiProvider::find(&settings.provider);
        ProviderConfig {
            provider,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            azure: (provider == AiProvider::Azure).then(|| AzureOptions {
                api_version: settings.api_version.clone(),
                deployment: settings.deployment.clone(),
            }),
        }
    }

    /// Switches a leg to a new provider. Base URL and model are rewritten to
    /// the new provider's defaults and all three fields are persisted in one
    /// write; the user can override URL and model individually afterwards.
    pub fn set_provider(&mut self, leg: Leg, id: &str) -> anyhow::Result<()> {
        let provider = AiProvider::find(id);
        let settings = self.leg_mut(leg);
        settings.provider = provider.id().to_string();
        settings.base_url = provider.default_base_url().to_string();
        settings.model = leg.default_model(provider).to_string();
        tracing::info!("{:?} leg switched to provider {}", leg, provider.id());
        self.save()
    }

    pub fn set_api_key(&mut self, leg: Leg, value: &str) -> anyhow::Result<()> {
        self.leg_mut(leg).api_key = value.to_string();
        self.save()
    }

    pub fn set_base_url(&mut self, leg: Leg, value: &str) -> anyhow::Result<()> {
        self.leg_mut(leg).base_url = value.to_string();
        self.save()
    }

    pub fn set_model(&mut self, leg: Leg, value: &str) -> anyhow::Result<()> {
        self.leg_mut(leg).model = value.to_string();
        self.save()
    }

    pub fn set_api_version(&mut self, leg: Leg, value: &str) -> anyhow::Result<()> {
        self.leg_mut(leg).api_version = value.to_string();
        self.save()
    }

    pub fn set_deployment(&mut self, leg: Leg, value: &str) -> anyhow::Result<()> {
        self.leg_mut(leg).deployment = value.to_string();
        self.save()
    }

    pub fn hotkey(&self) -> &str {
        &self.file.hotkey
    }

    pub fn set_hotkey(&mut self, value: &str) -> anyhow::Result<()> {
        self.file.hotkey = value.to_string();
        self.save()
    }
}

/// Retrieves the path to the settings file, creating the directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn default_settings_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("voxclip");
    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("voxclip.toml"))
}
