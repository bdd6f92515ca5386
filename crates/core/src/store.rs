//! Snapshot Persistence
//! 
//! The file collection and active file id are saved after every change
//! and loaded once at startup.

use std::path::PathBuf;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::files::{FileCollection, FileId, SourceFile};

/// Serializable image of a file collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub files: Vec<SourceFile>,
    pub active_file_id: Option<FileId>,
    /// Key entered in settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl From<&FileCollection> for Snapshot {
    fn from(files: &FileCollection) -> Self {
        Self {
            files: files.files().to_vec(),
            active_file_id: Some(files.active_id().clone()),
            api_key: None,
        }
    }
}

impl Snapshot {
    /// Restore the collection; falls back to the default set if the snapshot is empty
    pub fn into_collection(self) -> FileCollection {
        FileCollection::from_parts(self.files, self.active_file_id).unwrap_or_default()
    }
}

/// Persistence collaborator for the file collection
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, if any
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// Persist a snapshot
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// JSON file on disk
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            info!("No snapshot at {:?}, starting fresh", self.path);
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        debug!("Loaded {} files from {:?}", snapshot.files.len(), self.path);
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(snapshot)?;
        tokio::fs::write(&self.path, contents).await?;
        debug!("Snapshot saved to {:?}", self.path);
        Ok(())
    }
}

/// In-memory store, used when no data directory is available
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<Snapshot>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    /// Most recently saved snapshot
    pub fn current(&self) -> Option<Snapshot> {
        self.snapshot.lock().clone()
    }

    /// Number of saves performed
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.snapshot.lock().clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.lock() = Some(snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::Language;

    #[tokio::test]
    async fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("workspace.json"));
        assert!(store.load().await.unwrap().is_none());

        let mut files = FileCollection::default();
        files.create("style.css", Language::Css).unwrap();
        store.save(&Snapshot::from(&files)).await.unwrap();

        let restored = store.load().await.unwrap().unwrap().into_collection();
        assert_eq!(restored, files);
        assert_eq!(restored.active().name, "style.css");
    }

    #[test]
    fn test_empty_snapshot_restores_default() {
        let snapshot = Snapshot { files: Vec::new(), active_file_id: None, api_key: None };
        let files = snapshot.into_collection();
        assert_eq!(files.len(), 1);
        assert_eq!(files.active().name, "main.py");
    }

    #[tokio::test]
    async fn test_memory_store_counts_saves() {
        let store = MemoryStore::new();
        let files = FileCollection::default();
        store.save(&Snapshot::from(&files)).await.unwrap();
        store.save(&Snapshot::from(&files)).await.unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.current().unwrap().files.len(), 1);
    }
}
