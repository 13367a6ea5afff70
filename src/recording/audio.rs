//! Microphone capture to a WAV file.
//!
//! The cpal stream is not `Send`, so it lives on a dedicated worker thread
//! that writes 16-bit PCM samples straight to disk. `start` returns once the
//! stream is playing; `stop` signals the worker, waits for the WAV header to
//! be finalized, and hands back the file path.

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::WavWriter;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use super::AudioCapture;
use crate::error::VoxError;

type SharedWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

/// Capture backend recording from the default input device.
pub struct CpalCapture {
    active: Option<ActiveCapture>,
}

struct ActiveCapture {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<Result<(), String>>,
    path: PathBuf,
}

impl CpalCapture {
    pub fn new() -> Self {
        CpalCapture { active: None }
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioCapture for CpalCapture {
    async fn start(&mut self) -> Result<(), VoxError> {
        if self.active.is_some() {
            return Err(VoxError::Capture("already recording".to_string()));
        }

        let path = recording_path(chrono::Local::now());
        let (ready_tx, ready_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel();

        let worker_path = path.clone();
        let handle = thread::spawn(move || capture_worker(worker_path, ready_tx, stop_rx));

        // The stream usually starts within milliseconds; recv off the runtime
        // anyway so a slow audio backend cannot stall other tasks.
        let ready = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| VoxError::Capture(format!("capture startup task failed: {e}")))?
            .map_err(|_| VoxError::Capture("capture thread exited before starting".to_string()))?;

        if let Err(message) = ready {
            let _ = handle.join();
            return Err(VoxError::Capture(message));
        }

        tracing::info!("Recording to {}", path.display());
        self.active = Some(ActiveCapture {
            stop_tx,
            handle,
            path,
        });
        Ok(())
    }

    async fn stop(&mut self) -> Result<PathBuf, VoxError> {
        let ActiveCapture {
            stop_tx,
            handle,
            path,
        } = self
            .active
            .take()
            .ok_or_else(|| VoxError::Capture("no recording in progress".to_string()))?;

        let _ = stop_tx.send(());
        let joined = tokio::task::spawn_blocking(move || handle.join())
            .await
            .map_err(|e| VoxError::Capture(format!("capture shutdown task failed: {e}")))?;

        match joined {
            Ok(Ok(())) => {
                tracing::info!("Recording saved to {}", path.display());
                Ok(path)
            }
            Ok(Err(message)) => Err(VoxError::Capture(message)),
            Err(_) => Err(VoxError::Capture("capture thread panicked".to_string())),
        }
    }
}

/// Runs on the worker thread: owns the stream, writes samples, finalizes the
/// WAV on stop. Startup failures are reported through `ready_tx`.
fn capture_worker(
    path: PathBuf,
    ready_tx: mpsc::Sender<Result<(), String>>,
    stop_rx: mpsc::Receiver<()>,
) -> Result<(), String> {
    let fail = |message: String, ready_tx: &mpsc::Sender<Result<(), String>>| {
        let _ = ready_tx.send(Err(message.clone()));
        Err(message)
    };

    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(device) => device,
        None => return fail("no input device available".to_string(), &ready_tx),
    };
    let supported = match device.default_input_config() {
        Ok(config) => config,
        Err(e) => return fail(format!("failed to query input config: {e}"), &ready_tx),
    };

    let spec = hound::WavSpec {
        channels: supported.channels(),
        sample_rate: supported.sample_rate().0,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let writer: SharedWriter = match WavWriter::create(&path, spec) {
        Ok(writer) => Arc::new(Mutex::new(Some(writer))),
        Err(e) => return fail(format!("failed to create {}: {e}", path.display()), &ready_tx),
    };

    let err_fn = |err| tracing::error!("Input stream error: {err}");
    let stream_config = supported.config();
    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let writer = writer.clone();
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut guard) = writer.lock() {
                        if let Some(writer) = guard.as_mut() {
                            for &sample in data {
                                let sample = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                                let _ = writer.write_sample(sample);
                            }
                        }
                    }
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let writer = writer.clone();
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut guard) = writer.lock() {
                        if let Some(writer) = guard.as_mut() {
                            for &sample in data {
                                let _ = writer.write_sample(sample);
                            }
                        }
                    }
                },
                err_fn,
                None,
            )
        }
        other => return fail(format!("unsupported sample format: {other:?}"), &ready_tx),
    };

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => return fail(format!("failed to open input stream: {e}"), &ready_tx),
    };
    if let Err(e) = stream.play() {
        return fail(format!("failed to start input stream: {e}"), &ready_tx);
    }

    let _ = ready_tx.send(Ok(()));

    // Blocks until stop() sends or the sender is dropped.
    let _ = stop_rx.recv();
    drop(stream);

    let writer = writer
        .lock()
        .map_err(|_| "sample writer lock poisoned".to_string())?
        .take();
    match writer {
        Some(writer) => writer
            .finalize()
            .map_err(|e| format!("failed to finalize {}: {e}", path.display())),
        None => Err("sample writer already finalized".to_string()),
    }
}

/// Timestamped recording path in the system temp directory.
fn recording_path(now: chrono::DateTime<chrono::Local>) -> PathBuf {
    std::env::temp_dir().join(format!(
        "voxclip-recording-{}.wav",
        now.format("%Y%m%d-%H%M%S")
    ))
}
