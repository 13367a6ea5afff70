//! Structured logging using the tracing crate.
//!
//! Writes to daily-rotated files under the XDG state directory and never to
//! the terminal, keeping stdout free for pipeline output. Old log files are
//! cleaned up at startup, keeping the 7 most recent days.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Keeps the non-blocking appender alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

const MAX_LOG_FILES: usize = 7;

/// Initializes file-based logging. Level comes from `RUST_LOG`, defaulting
/// to "info".
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> Result<(), anyhow::Error> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;

    if let Err(e) = cleanup_old_logs(&dir) {
        eprintln!("Warning: failed to clean up old logs: {e}");
    }

    let file_appender = rolling::daily(&dir, "voxclip.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", dir.display());
    Ok(())
}

/// Log directory per the XDG Base Directory Specification: `XDG_STATE_HOME`
/// if set, otherwise `~/.local/state/voxclip`.
pub(crate) fn log_dir() -> Result<PathBuf, anyhow::Error> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg_state).join("voxclip"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local/state/voxclip"))
}

/// Removes rotated log files beyond the retention count, newest kept.
fn cleanup_old_logs(dir: &PathBuf) -> Result<(), anyhow::Error> {
    let mut log_files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_string_lossy().to_string();
            if !name.starts_with("voxclip.log.") {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {e}", path.display());
        }
    }
    Ok(())
}
