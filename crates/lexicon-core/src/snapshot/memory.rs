use parking_lot::Mutex;

use super::error::SnapshotError;
use super::{Snapshot, SnapshotStore};

/// In-process snapshot slot.
///
/// Holds the serialized JSON rather than the value so the slot goes through
/// the same encoding as the on-disk store.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `snapshot` already saved.
    pub fn with_snapshot(snapshot: &Snapshot) -> Result<Self, SnapshotError> {
        let store = Self::new();
        store.save(snapshot)?;
        Ok(store)
    }

    /// Starts with raw slot contents, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        match self.slot.lock().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(snapshot)?;
        *self.slot.lock() = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
