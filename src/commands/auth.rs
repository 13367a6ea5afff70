//! Provider credential and settings management.
//!
//! Non-interactive counterpart of a settings dialog: update any combination
//! of one leg's fields in a single invocation. A provider switch is applied
//! first and rewrites the base URL and model to the new provider's defaults,
//! so explicit `--base-url`/`--model` overrides in the same call win.

use crate::config::{Leg, SettingsStore};
use crate::provider::AiProvider;

/// Field updates for one leg. `None` leaves the stored value untouched.
#[derive(Debug, Default)]
pub struct AuthUpdate {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_version: Option<String>,
    pub deployment: Option<String>,
}

/// Applies the requested updates, persisting each field as it is set.
///
/// # Errors
/// - If the settings file cannot be loaded or written
/// - If `--provider` names an id not in the catalog
pub fn handle_auth(leg: Leg, update: AuthUpdate) -> anyhow::Result<()> {
    let mut store = SettingsStore::load()?;

    if let Some(id) = &update.provider {
        if AiProvider::from_id(id).is_none() {
            anyhow::bail!("Unknown provider '{id}'. Run 'voxclip providers' for valid ids.");
        }
        store.set_provider(leg, id)?;
    }
    if let Some(value) = &update.api_key {
        store.set_api_key(leg, value)?;
    }
    if let Some(value) = &update.base_url {
        store.set_base_url(leg, value)?;
    }
    if let Some(value) = &update.model {
        store.set_model(leg, value)?;
    }
    if let Some(value) = &update.api_version {
        store.set_api_version(leg, value)?;
    }
    if let Some(value) = &update.deployment {
        store.set_deployment(leg, value)?;
    }

    let settings = store.leg(leg);
    println!(
        "{} leg: provider={} model={} base_url={} api_key={}",
        leg.name(),
        settings.provider,
        settings.model,
        settings.base_url,
        if settings.api_key.is_empty() {
            "<unset>"
        } else {
            "<set>"
        },
    );
    if settings.provider == AiProvider::Azure.id() {
        println!(
            "           api_version={} deployment={}",
            settings.api_version, settings.deployment
        );
    }
    Ok(())
}

/// Persists the global hotkey string.
pub fn handle_hotkey(value: &str) -> anyhow::Result<()> {
    let mut store = SettingsStore::load()?;
    store.set_hotkey(value)?;
    println!("Hotkey set to {}", store.hotkey());
    Ok(())
}
