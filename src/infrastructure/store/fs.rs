//! Filesystem drop store adapter
//!
//! One private directory holding `drops.json` plus one audio file per drop,
//! named by the drop's identifier. The metadata file is rewritten whole on
//! every mutation, via a temp file and rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::ports::{DropStore, StoreError};
use crate::domain::drop::AudioDrop;
use crate::domain::geo::Coordinate;

/// Metadata file name inside the store directory
const METADATA_FILE: &str = "drops.json";

/// File extension for stored clips
const CLIP_EXTENSION: &str = "flac";

/// Drop store backed by a local directory
pub struct FsDropStore {
    dir: PathBuf,
    metadata_path: PathBuf,
    drops: Mutex<Vec<AudioDrop>>,
}

impl FsDropStore {
    /// Open (creating if needed) the store at `dir` and load its metadata.
    /// A missing or unreadable metadata file yields an empty collection.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Prepare(e.to_string()))?;

        let store = Self {
            metadata_path: dir.join(METADATA_FILE),
            dir,
            drops: Mutex::new(Vec::new()),
        };

        match store.load().await {
            Ok(drops) => *store.drops.lock().await = drops,
            Err(e) => tracing::warn!("drop store failed to load metadata: {}", e),
        }

        Ok(store)
    }

    /// Default store directory under the platform data dir
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("geodrop")
            .join("drops")
    }

    /// Read and parse the metadata file, sorting newest first.
    /// A missing file is an empty collection, not an error.
    async fn load(&self) -> Result<Vec<AudioDrop>, StoreError> {
        let raw = match fs::read_to_string(&self.metadata_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::ReadFailed(e.to_string())),
        };

        let mut drops: Vec<AudioDrop> =
            serde_json::from_str(&raw).map_err(|e| StoreError::ParseFailed(e.to_string()))?;
        drops.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(drops)
    }

    /// Rewrite the metadata file atomically: write to a temp file in the
    /// same directory, then rename over the target.
    async fn persist(&self, drops: &[AudioDrop]) -> Result<(), StoreError> {
        let rendered = serde_json::to_string_pretty(drops)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        let tmp = self.dir.join(format!(".{}.tmp", METADATA_FILE));
        fs::write(&tmp, rendered)
            .await
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        fs::rename(&tmp, &self.metadata_path)
            .await
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(())
    }

    fn filename_for(id: Uuid) -> String {
        format!("{}.{}", id, CLIP_EXTENSION)
    }
}

#[async_trait]
impl DropStore for FsDropStore {
    async fn refresh(&self) {
        match self.load().await {
            Ok(drops) => *self.drops.lock().await = drops,
            // Stale but consistent beats absent: keep the prior collection
            Err(e) => tracing::warn!("drop store refresh failed: {}", e),
        }
    }

    async fn drops(&self) -> Vec<AudioDrop> {
        self.drops.lock().await.clone()
    }

    async fn add_drop(
        &self,
        source: &Path,
        coordinate: Coordinate,
        owner: &str,
        notes: &str,
    ) -> Result<AudioDrop, StoreError> {
        let id = Uuid::new_v4();
        let filename = Self::filename_for(id);
        let destination = self.dir.join(&filename);

        // Defensive: a stale file under the fresh name must not survive
        if fs::try_exists(&destination).await.unwrap_or(false) {
            fs::remove_file(&destination)
                .await
                .map_err(|e| StoreError::CopyFailed(e.to_string()))?;
        }

        // Audio lands before metadata; a failure here creates no record
        fs::copy(source, &destination)
            .await
            .map_err(|e| StoreError::CopyFailed(e.to_string()))?;

        let drop = AudioDrop {
            id,
            coordinate,
            audio_filename: filename,
            owner: owner.to_string(),
            created_at: Utc::now(),
            notes: notes.to_string(),
        };

        let mut drops = self.drops.lock().await;
        drops.insert(0, drop.clone());
        self.persist(&drops).await?;

        Ok(drop)
    }

    fn clip_path(&self, drop: &AudioDrop) -> PathBuf {
        self.dir.join(&drop.audio_filename)
    }
}
