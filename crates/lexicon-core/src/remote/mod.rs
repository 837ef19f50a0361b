//! Client side of the remote taxonomy service (the source of truth).

mod error;
mod http;

pub use error::RemoteError;
pub use http::HttpGraphSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{GraphPayload, Term, View};

/// How the parent of a newly added term was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The classification service picked the parent.
    Llm,
    /// Fell back to the root.
    Default,
}

/// Request body for adding a term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTermRequest {
    pub label: String,
}

/// Successful add: the new term, its parent label and how it was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTermResponse {
    pub term: Term,
    pub parent: String,
    pub provenance: Provenance,
}

/// Successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTermResponse {
    pub success: bool,
}

/// Trait for the remote graph store.
///
/// Abstracts over the transport so the loader and admin operations can be
/// driven by an HTTP client in production and by in-process fakes in tests.
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Fetches every term and edge.
    async fn fetch_graph(&self) -> Result<GraphPayload, RemoteError>;

    /// Resolves the view around one label on the remote side.
    async fn lookup(&self, label: &str) -> Result<View, RemoteError>;

    /// Inserts a term; the remote side chooses its parent.
    async fn add_term(&self, label: &str) -> Result<AddTermResponse, RemoteError>;

    /// Deletes a term and, by cascade, its subtree.
    async fn delete_term(&self, id: &str) -> Result<(), RemoteError>;
}
