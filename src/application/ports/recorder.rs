//! Clip capture port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone access has been denied")]
    PermissionDenied,

    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("No audio input device available")]
    NoAudioDevice,

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Failed to encode clip: {0}")]
    EncodeFailed(String),
}

/// Port for microphone capture.
///
/// One capture at a time: `start` while recording is an error, `stop`
/// without a capture in flight returns `None` rather than failing.
#[async_trait]
pub trait ClipRecorder: Send + Sync {
    /// Whether microphone permission has been granted.
    /// Queried from the host at construction.
    fn has_permission(&self) -> bool;

    /// Ask for microphone permission. Resolves once and caches the result.
    async fn request_permission(&self) -> bool;

    /// Begin capturing. Fails with `PermissionDenied` if permission was not
    /// previously granted.
    async fn start(&self) -> Result<(), CaptureError>;

    /// Finalize the capture into a temporary clip file and return its path,
    /// or `None` when no capture was in progress. The caller owns the file.
    async fn stop(&self) -> Result<Option<PathBuf>, CaptureError>;

    /// Abandon the capture, discarding partial data
    async fn cancel(&self);

    /// Whether a capture is currently in flight
    fn is_recording(&self) -> bool;
}
