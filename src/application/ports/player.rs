//! Clip playback port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("No audio output device available: {0}")]
    DeviceNotAvailable(String),

    #[error("Failed to open clip: {0}")]
    OpenFailed(String),

    #[error("Failed to decode clip: {0}")]
    DecodeFailed(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Port for clip playback.
///
/// Only one playback may be active at a time: starting a new one implicitly
/// stops the previous one. Completion, successful or not, publishes `false`
/// on the `playing` channel and releases the output device.
#[async_trait]
pub trait ClipPlayer: Send + Sync {
    /// Start playing the file at `path`, stopping any prior playback first.
    /// Returns once playback has begun.
    async fn play(&self, path: &Path) -> Result<(), PlaybackError>;

    /// Stop the current playback, if any
    async fn stop(&self);

    /// Subscribe to the playback-active flag
    fn playing(&self) -> watch::Receiver<bool>;
}
