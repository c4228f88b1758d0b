//! Drop store port interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::drop::AudioDrop;
use crate::domain::geo::Coordinate;

/// Store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Failed to prepare store directory: {0}")]
    Prepare(String),

    #[error("Failed to copy clip into store: {0}")]
    CopyFailed(String),

    #[error("Failed to read drop metadata: {0}")]
    ReadFailed(String),

    #[error("Failed to parse drop metadata: {0}")]
    ParseFailed(String),

    #[error("Failed to write drop metadata: {0}")]
    WriteFailed(String),
}

/// Port for persistent drop storage.
///
/// The store owns a private directory holding one metadata file and one
/// audio file per drop. Durability invariant: the clip's audio is copied
/// into place before the metadata record is persisted, so metadata never
/// references a missing file. The reverse (an orphaned audio file after a
/// crash) is an accepted, non-corrupting failure mode.
#[async_trait]
pub trait DropStore: Send + Sync {
    /// Reload the metadata file from disk. A missing file is an empty
    /// collection; read or parse failures leave the prior in-memory state
    /// unchanged.
    async fn refresh(&self);

    /// Current collection, sorted by creation time, newest first
    async fn drops(&self) -> Vec<AudioDrop>;

    /// Create a new drop from a recorded clip. Copies `source` into the
    /// store under a name derived from a fresh identifier, then rewrites
    /// the metadata file atomically. If the copy fails, no record is
    /// created and the error propagates.
    async fn add_drop(
        &self,
        source: &Path,
        coordinate: Coordinate,
        owner: &str,
        notes: &str,
    ) -> Result<AudioDrop, StoreError>;

    /// Path of a drop's audio file inside the store. Pure computation,
    /// never touches the filesystem.
    fn clip_path(&self, drop: &AudioDrop) -> PathBuf;
}
