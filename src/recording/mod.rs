//! Audio capture collaborator.
//!
//! The pipeline only sees the `AudioCapture` seam: start capturing, stop and
//! get back the file path. The cpal-backed implementation lives in `audio`.

pub mod audio;

pub use audio::CpalCapture;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::VoxError;

/// Microphone capture as the pipeline sees it. Both calls may fail; starting
/// twice or stopping without a capture in flight is a capture error.
#[async_trait]
pub trait AudioCapture: Send {
    async fn start(&mut self) -> Result<(), VoxError>;

    /// Finalizes the capture and returns the recorded file's path.
    async fn stop(&mut self) -> Result<PathBuf, VoxError>;
}
