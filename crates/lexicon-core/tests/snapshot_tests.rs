use lexicon_core::config::{CacheConfig, DEFAULT_SNAPSHOT_KEY};
use lexicon_core::{
    Edge, FileSnapshotStore, GraphStore, MemorySnapshotStore, Snapshot, SnapshotError,
    SnapshotStore, Term,
};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> FileSnapshotStore {
    FileSnapshotStore::with_config(&CacheConfig {
        data_dir: dir.path().join("cache").to_string_lossy().into_owned(),
        snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
    })
}

fn terms() -> Vec<Term> {
    vec![
        Term::new("1", "KNOWLEDGE"),
        Term::new("2", "MATH"),
        Term::new("3", "ART"),
    ]
}

fn edges() -> Vec<Edge> {
    vec![Edge::new("1", "2", 0), Edge::new("1", "3", 1)]
}

#[test]
fn test_round_trip_reproduces_graph() {
    let dir = TempDir::new().unwrap();
    let snapshots = store_in(&dir);

    let store = GraphStore::new();
    store.replace_graph(terms(), edges()).unwrap();
    snapshots.save(&Snapshot::from_graph(&store.graph())).unwrap();

    let loaded = snapshots.load().unwrap().unwrap();
    assert!(loaded.loaded);
    assert_eq!(loaded.terms, terms());
    assert_eq!(loaded.edges, edges());

    let reloaded = GraphStore::new();
    reloaded.replace_graph(loaded.terms, loaded.edges).unwrap();
    assert_eq!(*reloaded.graph(), *store.graph());
}

#[test]
fn test_path_uses_fixed_key() {
    let dir = TempDir::new().unwrap();
    let snapshots = store_in(&dir);
    assert_eq!(
        snapshots.path(),
        dir.path().join("cache").join("lexicon-graph-v1.json")
    );
}

#[test]
fn test_missing_file_is_none() {
    let dir = TempDir::new().unwrap();
    assert!(store_in(&dir).load().unwrap().is_none());
}

#[test]
fn test_save_overwrites_and_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let snapshots = store_in(&dir);
    let store = GraphStore::new();

    store.replace_graph(terms(), edges()).unwrap();
    snapshots.save(&Snapshot::from_graph(&store.graph())).unwrap();
    store
        .replace_graph(vec![Term::new("1", "KNOWLEDGE")], vec![])
        .unwrap();
    snapshots.save(&Snapshot::from_graph(&store.graph())).unwrap();

    assert_eq!(snapshots.load().unwrap().unwrap().terms.len(), 1);
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("cache"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_clear_removes_slot() {
    let dir = TempDir::new().unwrap();
    let snapshots = store_in(&dir);
    let store = GraphStore::new();
    store.replace_graph(terms(), edges()).unwrap();
    snapshots.save(&Snapshot::from_graph(&store.graph())).unwrap();

    snapshots.clear().unwrap();
    assert!(!snapshots.path().exists());
    assert!(snapshots.load().unwrap().is_none());

    // Clearing an empty slot is fine.
    snapshots.clear().unwrap();
}

#[test]
fn test_corrupt_file_is_json_error() {
    let dir = TempDir::new().unwrap();
    let snapshots = FileSnapshotStore::at(dir.path().join("broken.json"));
    std::fs::write(snapshots.path(), "{ not json").unwrap();

    assert!(matches!(snapshots.load(), Err(SnapshotError::Json(_))));
}

#[test]
fn test_memory_store_uses_same_format() {
    let store = GraphStore::new();
    store.replace_graph(terms(), edges()).unwrap();
    let snapshot = Snapshot::from_graph(&store.graph());

    let memory = MemorySnapshotStore::with_snapshot(&snapshot).unwrap();
    assert_eq!(memory.load().unwrap(), Some(snapshot));

    memory.clear().unwrap();
    assert!(memory.is_empty());
}

#[test]
fn test_unloaded_or_empty_snapshot_is_not_usable() {
    let store = GraphStore::new();
    let mut snapshot = Snapshot::from_graph(&store.graph());
    assert!(!snapshot.is_usable());

    store.replace_graph(terms(), edges()).unwrap();
    snapshot = Snapshot::from_graph(&store.graph());
    assert!(snapshot.is_usable());

    snapshot.loaded = false;
    assert!(!snapshot.is_usable());
}
