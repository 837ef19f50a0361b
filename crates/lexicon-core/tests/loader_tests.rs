mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use common::{labels, loader_with, CatalogSource};
use lexicon_core::remote::AddTermResponse;
use lexicon_core::{
    CacheLoader, Catalog, Edge, FileSnapshotStore, GraphPayload, GraphSource, GraphStore,
    MemorySnapshotStore, RemoteError, Snapshot, SnapshotStore, StoreEvent, Term, View,
};
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio::time::timeout;

/// Remote whose graph fetches block until the test opens the gate.
struct GatedSource {
    payload: GraphPayload,
    gate: Semaphore,
    fetches: AtomicUsize,
}

impl GatedSource {
    fn closed(catalog: &Catalog) -> Arc<Self> {
        Arc::new(Self {
            payload: catalog.graph().to_payload(),
            gate: Semaphore::new(0),
            fetches: AtomicUsize::new(0),
        })
    }

    fn open_once(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl GraphSource for GatedSource {
    async fn fetch_graph(&self) -> Result<GraphPayload, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.gate
            .acquire()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?
            .forget();
        Ok(self.payload.clone())
    }

    async fn lookup(&self, label: &str) -> Result<View, RemoteError> {
        Err(RemoteError::NotFound(label.to_string()))
    }

    async fn add_term(&self, label: &str) -> Result<AddTermResponse, RemoteError> {
        Err(RemoteError::Conflict(label.to_string()))
    }

    async fn delete_term(&self, id: &str) -> Result<(), RemoteError> {
        Err(RemoteError::NotFound(id.to_string()))
    }
}

async fn wait_until_loaded(store: &GraphStore) {
    timeout(Duration::from_secs(1), async {
        while !store.is_loaded() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}

fn root_only() -> Catalog {
    Catalog::from_parts(vec![Term::new("1", "KNOWLEDGE")], vec![]).unwrap()
}

fn with_math() -> Catalog {
    Catalog::from_parts(
        vec![Term::new("1", "KNOWLEDGE"), Term::new("2", "MATH")],
        vec![Edge::new("1", "2", 0)],
    )
    .unwrap()
}

fn snapshot_of(catalog: &Catalog) -> Snapshot {
    Snapshot::from_graph(catalog.graph())
}

#[tokio::test]
async fn test_cold_cache_selects_root() {
    let source = CatalogSource::new(root_only());
    let loader = loader_with(source, Box::new(MemorySnapshotStore::new()));

    let report = loader.ensure_loaded().await;
    assert!(report.attempted);
    assert!(!report.from_snapshot);
    assert!(report.refreshed);

    let store = loader.store();
    assert_eq!(store.selected().as_deref(), Some("1"));

    let view = store.view().unwrap();
    assert_eq!(view.selected, Term::new("1", "KNOWLEDGE"));
    assert_eq!(view.parent, None);
    assert_eq!(view.siblings, vec![Term::new("1", "KNOWLEDGE")]);
    assert!(view.children.is_empty());
}

#[tokio::test]
async fn test_snapshot_applied_before_refresh() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.json");
    FileSnapshotStore::at(&path)
        .save(&snapshot_of(&root_only()))
        .unwrap();

    let source = CatalogSource::new(with_math());
    let loader = loader_with(source, Box::new(FileSnapshotStore::at(&path)));

    let sizes = Arc::new(Mutex::new(Vec::new()));
    let seen = sizes.clone();
    let observed = loader.store().clone();
    let _sub = loader.store().subscribe(move |event| {
        if let StoreEvent::GraphReplaced { .. } = event {
            seen.lock().unwrap().push(observed.graph().len());
        }
    });

    let report = loader.ensure_loaded().await;
    assert!(report.from_snapshot);
    assert!(report.refreshed);

    // Stale snapshot first, fresh remote second.
    assert_eq!(*sizes.lock().unwrap(), vec![1, 2]);
    assert!(loader.store().find_by_label("math").is_some());

    let persisted = FileSnapshotStore::at(&path).load().unwrap().unwrap();
    assert_eq!(persisted.terms.len(), 2);
}

#[tokio::test]
async fn test_offline_keeps_snapshot() {
    let snapshots = MemorySnapshotStore::with_snapshot(&snapshot_of(&with_math())).unwrap();
    let source = CatalogSource::new(root_only());
    source.set_offline(true);
    let loader = loader_with(source.clone(), Box::new(snapshots));

    let report = loader.ensure_loaded().await;
    assert!(report.from_snapshot);
    assert!(!report.refreshed);
    assert_eq!(source.fetches(), 1);

    let store = loader.store();
    assert!(store.is_loaded());
    assert_eq!(store.graph().len(), 2);
    assert_eq!(store.selected().as_deref(), Some("1"));
}

#[tokio::test]
async fn test_offline_cold_cache_leaves_store_empty() {
    let source = CatalogSource::new(root_only());
    source.set_offline(true);
    let loader = loader_with(source.clone(), Box::new(MemorySnapshotStore::new()));

    let report = loader.ensure_loaded().await;
    assert!(!report.from_snapshot && !report.refreshed);
    assert!(loader.store().is_empty());
    assert!(loader.store().view().is_none());

    // Coming back online, the next call retries.
    source.set_offline(false);
    let report = loader.ensure_loaded().await;
    assert!(report.refreshed);
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_ensure_loaded_is_idempotent() {
    let source = CatalogSource::new(with_math());
    let loader = loader_with(source.clone(), Box::new(MemorySnapshotStore::new()));

    loader.ensure_loaded().await;
    let graph = loader.store().graph();
    let version = loader.store().version();

    let second = loader.ensure_loaded().await;
    assert!(!second.attempted);
    assert_eq!(source.fetches(), 1);
    assert_eq!(*loader.store().graph(), *graph);
    assert_eq!(loader.store().version(), version);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_fetch() {
    let source = CatalogSource::new(with_math());
    let loader = loader_with(source.clone(), Box::new(MemorySnapshotStore::new()));

    let (a, b) = tokio::join!(loader.ensure_loaded(), loader.ensure_loaded());
    assert!(a.attempted != b.attempted);
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_invalidate_clears_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.json");
    let source = CatalogSource::new(with_math());
    let loader = loader_with(source.clone(), Box::new(FileSnapshotStore::at(&path)));

    loader.ensure_loaded().await;
    assert!(path.exists());

    loader.invalidate().await;
    assert!(!path.exists());
    assert!(!loader.store().is_loaded());
    assert!(loader.store().selected().is_none());

    let report = loader.ensure_loaded().await;
    assert!(report.attempted && !report.from_snapshot && report.refreshed);
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_vanished_selection_falls_back_to_root() {
    let snapshots = MemorySnapshotStore::with_snapshot(&snapshot_of(&with_math())).unwrap();
    let source = CatalogSource::new(root_only());
    let store = Arc::new(GraphStore::new());
    let loader = CacheLoader::new(store.clone(), source, Box::new(snapshots))
        .with_initial_label("math");

    loader.ensure_loaded().await;

    let view = store.view().unwrap();
    assert_eq!(labels(&view).0, "KNOWLEDGE");
}

#[tokio::test]
async fn test_initial_label_selects_nested_term() {
    let source = CatalogSource::new(common::sample_catalog());
    let algebra = source.id_of("ALGEBRA");
    let loader = Arc::new(
        CacheLoader::new(
            Arc::new(GraphStore::new()),
            source,
            Box::new(MemorySnapshotStore::new()),
        )
        .with_initial_label("Algebra"),
    );

    loader.ensure_loaded().await;

    assert_eq!(loader.store().selected(), Some(algebra));
    let (selected, parent, siblings, children) = labels(&loader.store().view().unwrap());
    assert_eq!(selected, "ALGEBRA");
    assert_eq!(parent.as_deref(), Some("MATH"));
    assert_eq!(siblings, vec!["ALGEBRA", "GEOMETRY"]);
    assert!(children.is_empty());
}

#[tokio::test]
async fn test_snapshot_load_does_not_wait_for_hung_refresh() {
    let snapshots = MemorySnapshotStore::with_snapshot(&snapshot_of(&with_math())).unwrap();
    let source = GatedSource::closed(&with_math());
    let loader = Arc::new(CacheLoader::new(
        Arc::new(GraphStore::new()),
        source.clone(),
        Box::new(snapshots),
    ));

    let first = tokio::spawn({
        let loader = loader.clone();
        async move { loader.ensure_loaded().await }
    });
    wait_until_loaded(loader.store()).await;
    assert_eq!(loader.store().selected().as_deref(), Some("1"));

    let second = timeout(Duration::from_secs(1), loader.ensure_loaded())
        .await
        .unwrap();
    assert!(!second.attempted);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

    source.open_once();
    let report = first.await.unwrap();
    assert!(report.from_snapshot && report.refreshed);
}

#[tokio::test]
async fn test_invalidate_during_refresh_discards_its_result() {
    let snapshots = MemorySnapshotStore::with_snapshot(&snapshot_of(&root_only())).unwrap();
    let source = GatedSource::closed(&with_math());
    let loader = Arc::new(CacheLoader::new(
        Arc::new(GraphStore::new()),
        source.clone(),
        Box::new(snapshots),
    ));

    let first = tokio::spawn({
        let loader = loader.clone();
        async move { loader.ensure_loaded().await }
    });
    wait_until_loaded(loader.store()).await;

    timeout(Duration::from_secs(1), loader.invalidate())
        .await
        .unwrap();
    assert!(!loader.store().is_loaded());

    source.open_once();
    let report = first.await.unwrap();
    assert!(!report.refreshed);
    assert!(!loader.store().is_loaded());

    // The next call starts a fresh sequence.
    source.open_once();
    let report = loader.ensure_loaded().await;
    assert!(report.attempted && !report.from_snapshot && report.refreshed);
    assert_eq!(loader.store().graph().len(), 2);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_corrupt_snapshot_slot_is_ignored() {
    let snapshots = MemorySnapshotStore::with_raw("{\"terms\": [");
    let source = CatalogSource::new(with_math());
    let loader = loader_with(source, Box::new(snapshots));

    let report = loader.ensure_loaded().await;
    assert!(!report.from_snapshot);
    assert!(report.refreshed);
    assert_eq!(loader.store().graph().len(), 2);
}
