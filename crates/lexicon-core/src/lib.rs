pub mod admin;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod llm;
pub mod loader;
pub mod model;
pub mod navigation;
pub mod projector;
pub mod remote;
pub mod snapshot;
pub mod store;

pub use admin::{AdminError, TermAdmin};
pub use catalog::{Catalog, CatalogError};
pub use classify::{
    place_term, propose_parent, resolve_placement, Classifier, LlmClassifier, Placement, RootOnly,
};
pub use config::Config;
pub use loader::{CacheLoader, LoadReport};
pub use model::{normalize_label, Edge, Graph, GraphError, GraphPayload, Term, View};
pub use navigation::{NavOutcome, NavPhase, NavigationController, TrackCarousel};
pub use projector::compute_view;
pub use remote::{GraphSource, HttpGraphSource, Provenance, RemoteError};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, Snapshot, SnapshotError, SnapshotStore};
pub use store::{GraphStore, StoreEvent, Subscription};
