//! Cache-first population of the [`GraphStore`].
//!
//! `ensure_loaded` applies the persisted snapshot first (possibly stale, but
//! instant), then always refreshes from the remote source and overwrites both
//! the store and the snapshot. Failures go to the log, never to the caller.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ROOT_LABEL;
use crate::model::{Graph, GraphPayload};
use crate::remote::GraphSource;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::store::GraphStore;

/// What one `ensure_loaded` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// The call ran the load sequence (false when already loaded this session).
    pub attempted: bool,
    /// A persisted snapshot was applied before the network call.
    pub from_snapshot: bool,
    /// The remote refresh succeeded.
    pub refreshed: bool,
}

#[derive(Debug, Default)]
struct Session {
    /// The store was populated during this generation.
    loaded: bool,
    /// Bumped by `invalidate`; results of older sequences are discarded.
    generation: u64,
}

pub struct CacheLoader {
    store: Arc<GraphStore>,
    source: Arc<dyn GraphSource>,
    snapshots: Box<dyn SnapshotStore>,
    initial_label: Option<String>,
    session: Mutex<Session>,
    /// Held while a load sequence runs, including its network fetch.
    flight: tokio::sync::Mutex<()>,
}

impl CacheLoader {
    pub fn new(
        store: Arc<GraphStore>,
        source: Arc<dyn GraphSource>,
        snapshots: Box<dyn SnapshotStore>,
    ) -> Self {
        Self {
            store,
            source,
            snapshots,
            initial_label: None,
            session: Mutex::new(Session::default()),
            flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Label to select on first load, before falling back to the root.
    pub fn with_initial_label(mut self, label: impl Into<String>) -> Self {
        self.initial_label = Some(label.into());
        self
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn source(&self) -> &Arc<dyn GraphSource> {
        &self.source
    }

    /// Makes the store usable, then brings it up to date with the remote.
    ///
    /// Returns immediately once the store has been populated this session,
    /// even while the remote refresh is still running. Callers that find the
    /// store unusable wait for the sequence in flight instead of starting a
    /// second one.
    pub async fn ensure_loaded(&self) -> LoadReport {
        if self.is_session_loaded() {
            return LoadReport::default();
        }
        let _flight = self.flight.lock().await;
        if self.is_session_loaded() {
            return LoadReport::default();
        }

        let generation = self.session.lock().generation;
        let mut report = LoadReport {
            attempted: true,
            ..LoadReport::default()
        };

        report.from_snapshot = self.apply_snapshot(generation);

        match self.source.fetch_graph().await {
            Ok(payload) => {
                report.refreshed = self.apply_remote(payload, generation);
            }
            Err(e) => {
                tracing::warn!(error = %e, from_snapshot = report.from_snapshot, "graph refresh failed");
            }
        }

        tracing::info!(
            terms = self.store.graph().len(),
            from_snapshot = report.from_snapshot,
            refreshed = report.refreshed,
            "taxonomy loaded"
        );
        report
    }

    /// Clears the store, the selection and the persisted snapshot.
    ///
    /// Does not wait for a refresh in flight; its result is discarded.
    pub async fn invalidate(&self) {
        let mut session = self.session.lock();
        session.generation += 1;
        session.loaded = false;

        self.store.clear();
        if let Err(e) = self.snapshots.clear() {
            tracing::warn!(error = %e, "failed to clear graph snapshot");
        }
    }

    /// `invalidate` followed by a full `ensure_loaded`.
    pub async fn reload(&self) -> LoadReport {
        self.invalidate().await;
        self.ensure_loaded().await
    }

    fn is_session_loaded(&self) -> bool {
        self.session.lock().loaded && self.store.is_loaded()
    }

    fn apply_snapshot(&self, generation: u64) -> bool {
        let snapshot = match self.snapshots.load() {
            Ok(Some(snapshot)) if snapshot.is_usable() => snapshot,
            Ok(_) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable graph snapshot");
                return false;
            }
        };

        let graph = match Graph::from_parts(snapshot.terms, snapshot.edges) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed graph snapshot");
                return false;
            }
        };

        let mut session = self.session.lock();
        if session.generation != generation {
            return false;
        }
        let version = self.store.install(graph);
        self.ensure_selection();
        session.loaded = true;
        drop(session);

        tracing::debug!(version, saved_at = %snapshot.saved_at, "applied graph snapshot");
        true
    }

    fn apply_remote(&self, payload: GraphPayload, generation: u64) -> bool {
        let graph = match Graph::try_from(payload) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!(error = %e, "remote graph rejected");
                return false;
            }
        };

        // Checked and installed under the session lock so an `invalidate`
        // cannot land between the two.
        let mut session = self.session.lock();
        if session.generation != generation {
            tracing::debug!("discarding graph fetched before invalidation");
            return false;
        }

        let snapshot = Snapshot::from_graph(&graph);
        self.store.install(graph);
        self.ensure_selection();
        session.loaded = true;

        if let Err(e) = self.snapshots.save(&snapshot) {
            tracing::warn!(error = %e, "failed to persist graph snapshot");
        }
        drop(session);
        true
    }

    /// Picks a selection when none exists or the selected term disappeared:
    /// the initial label, then `KNOWLEDGE`, then any term.
    fn ensure_selection(&self) {
        let graph = self.store.graph();
        if let Some(id) = self.store.selected() {
            if graph.contains(&id) {
                return;
            }
        }

        let fallback = self
            .initial_label
            .as_deref()
            .and_then(|label| graph.find_by_label(label))
            .or_else(|| graph.find_by_label(ROOT_LABEL))
            .or_else(|| graph.terms().first());

        if let Some(term) = fallback {
            self.store.set_selected(&term.id);
        }
    }
}
