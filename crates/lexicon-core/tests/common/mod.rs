//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lexicon_core::config::ROOT_LABEL;
use lexicon_core::remote::{AddTermResponse, Provenance};
use lexicon_core::{
    Catalog, CatalogError, GraphPayload, GraphSource, GraphStore, RemoteError, SnapshotStore,
    CacheLoader, View,
};

/// In-process remote backed by a [`Catalog`].
pub struct CatalogSource {
    catalog: Mutex<Catalog>,
    offline: AtomicBool,
    pub fetches: AtomicUsize,
    pub mutations: AtomicUsize,
}

impl CatalogSource {
    pub fn new(catalog: Catalog) -> Arc<Self> {
        Arc::new(Self {
            catalog: Mutex::new(catalog),
            offline: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        })
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn insert(&self, label: &str, parent: &str) {
        self.catalog.lock().unwrap().insert(label, parent).unwrap();
    }

    pub fn id_of(&self, label: &str) -> String {
        self.catalog
            .lock()
            .unwrap()
            .graph()
            .find_by_label(label)
            .map(|t| t.id.clone())
            .unwrap()
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RemoteError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GraphSource for CatalogSource {
    async fn fetch_graph(&self) -> Result<GraphPayload, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.catalog.lock().unwrap().graph().to_payload())
    }

    async fn lookup(&self, label: &str) -> Result<View, RemoteError> {
        self.check_online()?;
        self.catalog
            .lock()
            .unwrap()
            .view(label)
            .ok_or_else(|| RemoteError::NotFound(label.to_string()))
    }

    async fn add_term(&self, label: &str) -> Result<AddTermResponse, RemoteError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let mut catalog = self.catalog.lock().unwrap();
        match catalog.insert(label, ROOT_LABEL) {
            Ok((term, parent)) => Ok(AddTermResponse {
                term,
                parent,
                provenance: Provenance::Default,
            }),
            Err(CatalogError::Conflict(label)) => Err(RemoteError::Conflict(label)),
            Err(e) => Err(RemoteError::Api {
                status: 500,
                message: e.to_string(),
            }),
        }
    }

    async fn delete_term(&self, id: &str) -> Result<(), RemoteError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        match self.catalog.lock().unwrap().remove(id) {
            Ok(_) => Ok(()),
            Err(CatalogError::NotFound(id)) => Err(RemoteError::NotFound(id)),
            Err(e) => Err(RemoteError::Api {
                status: 403,
                message: e.to_string(),
            }),
        }
    }
}

/// KNOWLEDGE > {MATH > {ALGEBRA, GEOMETRY}, PHYSICS}
pub fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::in_memory();
    catalog.insert("MATH", ROOT_LABEL).unwrap();
    catalog.insert("PHYSICS", ROOT_LABEL).unwrap();
    catalog.insert("ALGEBRA", "MATH").unwrap();
    catalog.insert("GEOMETRY", "MATH").unwrap();
    catalog
}

pub fn loader_with(
    source: Arc<CatalogSource>,
    snapshots: Box<dyn SnapshotStore>,
) -> Arc<CacheLoader> {
    Arc::new(CacheLoader::new(Arc::new(GraphStore::new()), source, snapshots))
}

pub fn labels(view: &View) -> (String, Option<String>, Vec<String>, Vec<String>) {
    (
        view.selected.label.clone(),
        view.parent.as_ref().map(|p| p.label.clone()),
        view.siblings.iter().map(|t| t.label.clone()).collect(),
        view.children.iter().map(|t| t.label.clone()).collect(),
    )
}
