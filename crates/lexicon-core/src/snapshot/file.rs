use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CacheConfig;

use super::error::SnapshotError;
use super::{Snapshot, SnapshotStore};

/// File-based snapshot slot.
///
/// ```text
/// .lexicon/
///   lexicon-graph-v1.json      # { terms, edges, loaded, saved_at }
/// ```
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store with default config.
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default())
    }

    /// Creates a store at the path the cache config names.
    pub fn with_config(config: &CacheConfig) -> Self {
        Self {
            path: config.snapshot_path(),
        }
    }

    /// Creates a store backed by an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SnapshotError::io(parent, e))?;
            }
        }
        Ok(())
    }
}

impl Default for FileSnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).map_err(|e| SnapshotError::io(&self.path, e))?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;

        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        self.ensure_parent_dir()?;

        // Write beside the target and rename so readers never see a torn file.
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string(snapshot)?;
        fs::write(&tmp, json).map_err(|e| SnapshotError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| SnapshotError::io(&self.path, e))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| SnapshotError::io(&self.path, e))?;
        }
        Ok(())
    }
}
