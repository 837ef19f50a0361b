//! Term add/delete against the remote store, followed by a cache reload.

use std::sync::Arc;

use thiserror::Error;

use crate::loader::CacheLoader;
use crate::model::normalize_label;
use crate::remote::{AddTermResponse, RemoteError};

/// Errors surfaced to the caller of an admin operation.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Label is empty")]
    InvalidLabel,

    #[error("\"{0}\" already exists")]
    Conflict(String),

    #[error("The root term cannot be deleted")]
    RootProtected,

    #[error("Unknown term: {0}")]
    UnknownTerm(String),

    #[error("Remote error: {0}")]
    Remote(#[source] RemoteError),
}

impl From<RemoteError> for AdminError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Conflict(label) => AdminError::Conflict(label),
            RemoteError::NotFound(subject) => AdminError::UnknownTerm(subject),
            other => AdminError::Remote(other),
        }
    }
}

/// Mutates the remote taxonomy and keeps the local cache consistent.
///
/// A failed mutation leaves local state untouched. A successful one
/// invalidates the cache and reloads it so navigation sees the change.
pub struct TermAdmin {
    loader: Arc<CacheLoader>,
}

impl TermAdmin {
    pub fn new(loader: Arc<CacheLoader>) -> Self {
        Self { loader }
    }

    /// Adds `label`; the remote side picks its parent.
    pub async fn add(&self, label: &str) -> Result<AddTermResponse, AdminError> {
        let label = normalize_label(label);
        if label.is_empty() {
            return Err(AdminError::InvalidLabel);
        }

        let response = self
            .loader
            .source()
            .add_term(&label)
            .await
            .map_err(|e| log_failure("add", &label, e))?;

        tracing::info!(
            label = %response.term.label,
            parent = %response.parent,
            provenance = ?response.provenance,
            "term added"
        );
        self.loader.reload().await;
        Ok(response)
    }

    /// Deletes the term with `id` and, remotely, its subtree.
    ///
    /// The root is refused before any network call.
    pub async fn delete(&self, id: &str) -> Result<(), AdminError> {
        let store = self.loader.store();
        let graph = store.graph();
        let Some(term) = graph.term(id) else {
            return Err(AdminError::UnknownTerm(id.to_string()));
        };
        if graph.is_root(&term.id) {
            return Err(AdminError::RootProtected);
        }

        self.loader
            .source()
            .delete_term(id)
            .await
            .map_err(|e| log_failure("delete", id, e))?;

        tracing::info!(id, label = %term.label, "term deleted");
        self.loader.reload().await;
        Ok(())
    }

    /// Deletes the term labeled `label` (case-insensitive).
    pub async fn delete_label(&self, label: &str) -> Result<(), AdminError> {
        let term = self
            .loader
            .store()
            .find_by_label(label)
            .ok_or_else(|| AdminError::UnknownTerm(normalize_label(label)))?;
        self.delete(&term.id).await
    }
}

fn log_failure(op: &str, subject: &str, err: RemoteError) -> AdminError {
    match &err {
        RemoteError::Conflict(_) => tracing::info!(op, subject, "term already exists"),
        _ => tracing::warn!(op, subject, error = %err, "term mutation failed"),
    }
    err.into()
}
