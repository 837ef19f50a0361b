//! Local persisted copy of the graph, read once at startup for instant first paint.

mod error;
mod file;
mod memory;

pub use error::SnapshotError;
pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Edge, Graph, GraphPayload, Term};

/// The serialized graph plus its loaded flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub terms: Vec<Term>,
    pub edges: Vec<Edge>,
    pub loaded: bool,
    pub saved_at: DateTime<Utc>,
}

impl Snapshot {
    /// Captures `graph` as a loaded snapshot stamped now.
    pub fn from_graph(graph: &Graph) -> Self {
        let GraphPayload { terms, edges } = graph.to_payload();
        Self {
            terms,
            edges,
            loaded: true,
            saved_at: Utc::now(),
        }
    }

    /// A snapshot is only worth applying if it was loaded and holds terms.
    pub fn is_usable(&self) -> bool {
        self.loaded && !self.terms.is_empty()
    }
}

/// Trait for snapshot slot backends.
///
/// A backend owns exactly one slot; the key is fixed at construction.
pub trait SnapshotStore: Send + Sync {
    /// Reads the slot. A missing slot is `Ok(None)`.
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError>;

    /// Overwrites the slot.
    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError>;

    /// Deletes the slot. Clearing an empty slot is not an error.
    fn clear(&self) -> Result<(), SnapshotError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        (**self).save(snapshot)
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        (**self).clear()
    }
}
