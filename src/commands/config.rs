//! Settings file editor command.
//!
//! Opens the voxclip settings file in the user's preferred editor, seeding
//! it with defaults first so the full key set is visible.

use std::process::Command;

use crate::config::SettingsStore;

/// Opens the settings file in `$EDITOR`, falling back to nano then vi.
///
/// # Errors
/// - If no editor can be found or executed
/// - If the editor exits with an error
pub fn handle_config() -> anyhow::Result<()> {
    let store = SettingsStore::load()?;
    if !store.path().exists() {
        store.save()?;
    }

    let editor = find_editor()?;
    tracing::info!("Opening {} with {editor}", store.path().display());

    let status = Command::new(&editor)
        .arg(store.path())
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to open editor '{editor}': {e}"))?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }
    Ok(())
}

/// Tries in order: $EDITOR, nano, vi.
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    for editor in &["nano", "vi"] {
        let available = Command::new("which")
            .arg(editor)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);
        if available {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}
