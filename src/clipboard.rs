//! Clipboard bridge.
//!
//! Writes text to the system clipboard via pbcopy (macOS), wl-copy (Wayland),
//! or xclip (X11), and can follow up with a simulated paste keystroke through
//! osascript, wtype, or xdotool. The backend is a trait so the pipeline can
//! be exercised without touching the real clipboard.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::error::VoxError;

/// Delay between writing the clipboard and sending the paste keystroke, long
/// enough for the OS clipboard state to propagate to the focused window.
pub const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// OS-level clipboard and keystroke collaborator.
pub trait ClipboardBackend: Send {
    fn write_text(&self, text: &str) -> Result<(), VoxError>;
    fn send_paste_keystroke(&self) -> Result<(), VoxError>;
}

/// Tracks the last successfully copied text on top of a backend.
pub struct ClipboardBridge<B: ClipboardBackend> {
    backend: B,
    last_copied: Option<String>,
}

impl<B: ClipboardBackend> ClipboardBridge<B> {
    pub fn new(backend: B) -> Self {
        ClipboardBridge {
            backend,
            last_copied: None,
        }
    }

    /// Writes `text` to the clipboard and records it on success.
    pub fn copy(&mut self, text: &str) -> Result<(), VoxError> {
        self.backend.write_text(text)?;
        self.last_copied = Some(text.to_string());
        tracing::debug!("Copied {} chars to clipboard", text.chars().count());
        Ok(())
    }

    /// Sends the simulated paste keystroke.
    pub fn paste(&self) -> Result<(), VoxError> {
        self.backend.send_paste_keystroke()
    }

    /// Copies, waits for the clipboard to settle, then pastes.
    pub async fn copy_and_paste(&mut self, text: &str) -> Result<(), VoxError> {
        self.copy(text)?;
        tokio::time::sleep(CLIPBOARD_SETTLE_DELAY).await;
        self.paste()
    }

    /// The last text successfully written to the clipboard, if any.
    pub fn last_copied_text(&self) -> Option<&str> {
        self.last_copied.as_deref()
    }
}

/// System backend shelling out to the platform clipboard tools.
pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), VoxError> {
        #[cfg(target_os = "macos")]
        {
            if pipe_to_command("pbcopy", &[], text) {
                tracing::debug!("Text copied to clipboard via pbcopy");
                Ok(())
            } else {
                Err(VoxError::Clipboard(
                    "no working clipboard tool (pbcopy failed or not found)".to_string(),
                ))
            }
        }
        #[cfg(not(target_os = "macos"))]
        {
            if pipe_to_command("wl-copy", &["--type", "text/plain"], text) {
                tracing::debug!("Text copied to clipboard via wl-copy");
                return Ok(());
            }
            if pipe_to_command("xclip", &["-selection", "clipboard", "-in", "-quiet"], text) {
                tracing::debug!("Text copied to clipboard via xclip");
                return Ok(());
            }
            Err(VoxError::Clipboard(
                "no working clipboard tool (wl-copy or xclip failed or not found)".to_string(),
            ))
        }
    }

    fn send_paste_keystroke(&self) -> Result<(), VoxError> {
        #[cfg(target_os = "macos")]
        {
            let status = Command::new("osascript")
                .args([
                    "-e",
                    "tell application \"System Events\" to keystroke \"v\" using command down",
                ])
                .status()
                .map_err(|e| VoxError::Paste(format!("failed to run osascript: {e}")))?;
            if !status.success() {
                return Err(VoxError::Paste("osascript exited with an error".to_string()));
            }
            Ok(())
        }
        #[cfg(not(target_os = "macos"))]
        {
            for (tool, args) in [
                ("wtype", &["-M", "ctrl", "v", "-m", "ctrl"][..]),
                ("xdotool", &["key", "--clearmodifiers", "ctrl+v"][..]),
            ] {
                match Command::new(tool).args(args).status() {
                    Ok(status) if status.success() => {
                        tracing::debug!("Paste keystroke sent via {tool}");
                        return Ok(());
                    }
                    Ok(_) => tracing::warn!("{tool} exited with an error"),
                    Err(_) => tracing::debug!("{tool} not found or not executable"),
                }
            }
            Err(VoxError::Paste(
                "no keystroke tool available (wtype or xdotool not found)".to_string(),
            ))
        }
    }
}

/// Pipes `text` into a command's stdin. Returns false when the tool is
/// missing or failed, so callers can try the next one in the chain.
fn pipe_to_command(program: &str, args: &[&str], text: &str) -> bool {
    let mut child = match Command::new(program).args(args).stdin(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(_) => {
            tracing::debug!("{program} not found or not executable");
            return false;
        }
    };
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            tracing::warn!("Failed to write to {program} stdin: {e}");
            return false;
        }
    }
    match child.wait() {
        Ok(status) if status.success() => true,
        Ok(_) => {
            tracing::warn!("{program} exited with an error");
            false
        }
        Err(e) => {
            tracing::warn!("{program} did not exit cleanly: {e}");
            false
        }
    }
}
