//! Authoritative taxonomy behind the reference server.
//!
//! Holds one `{ terms, edges }` JSON document. Every mutation is written
//! back atomically before it is acknowledged.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config::ROOT_LABEL;
use crate::model::{normalize_label, Edge, Graph, GraphError, GraphPayload, Term, View};
use crate::projector::compute_view;

/// Errors that can occur in catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Term already exists: {0}")]
    Conflict(String),

    #[error("Term not found: {0}")]
    NotFound(String),

    #[error("The root term cannot be deleted")]
    RootProtected,

    #[error("Label is empty")]
    InvalidLabel,

    #[error("Catalog document is malformed: {0}")]
    Malformed(#[from] GraphError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }
}

pub struct Catalog {
    graph: Graph,
    path: Option<PathBuf>,
}

impl Catalog {
    /// A catalog that lives only in memory, seeded with the root term.
    pub fn in_memory() -> Self {
        Self {
            graph: seed(),
            path: None,
        }
    }

    /// Loads the catalog at `path`, seeding and writing the root term if
    /// the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();

        if !path.exists() {
            let catalog = Self {
                graph: seed(),
                path: Some(path),
            };
            catalog.persist()?;
            return Ok(catalog);
        }

        let json = fs::read_to_string(&path).map_err(|e| CatalogError::io(&path, e))?;
        let payload: GraphPayload = serde_json::from_str(&json)?;
        let graph = Graph::try_from(payload)?;

        let mut catalog = Self {
            graph,
            path: Some(path),
        };
        if catalog.graph.find_by_label(ROOT_LABEL).is_none() {
            tracing::warn!("catalog has no root term, adding one");
            let mut payload = catalog.graph.to_payload();
            payload.terms.push(Term::new(new_id(), ROOT_LABEL));
            catalog.graph = Graph::try_from(payload)?;
            catalog.persist()?;
        }
        Ok(catalog)
    }

    /// Builds a catalog from existing parts, without a backing file.
    pub fn from_parts(terms: Vec<Term>, edges: Vec<Edge>) -> Result<Self, CatalogError> {
        Ok(Self {
            graph: Graph::from_parts(terms, edges)?,
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn root(&self) -> Option<&Term> {
        self.graph.root()
    }

    /// The view around `label` (case-insensitive).
    pub fn view(&self, label: &str) -> Option<View> {
        let term = self.graph.find_by_label(label)?;
        compute_view(&self.graph, &term.id)
    }

    /// Indented outline of the taxonomy, one label per line, siblings in
    /// `sort_order`. Handed to the classifier.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.graph.root() {
            let mut visited = HashSet::new();
            self.describe_into(&root.id, 0, &mut visited, &mut out);
        }
        out
    }

    fn describe_into(&self, id: &str, depth: usize, visited: &mut HashSet<String>, out: &mut String) {
        if !visited.insert(id.to_string()) {
            return;
        }
        if let Some(term) = self.graph.term(id) {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&term.label);
            out.push('\n');
        }
        let children: Vec<String> = self
            .graph
            .child_edges(id)
            .map(|e| e.child_id.clone())
            .collect();
        for child in children {
            self.describe_into(&child, depth + 1, visited, out);
        }
    }

    /// Inserts `label` under `parent_label`, or under the root when the
    /// parent is unknown. Returns the new term and the parent label used.
    pub fn insert(&mut self, label: &str, parent_label: &str) -> Result<(Term, String), CatalogError> {
        let label = normalize_label(label);
        if label.is_empty() {
            return Err(CatalogError::InvalidLabel);
        }
        if self.graph.find_by_label(&label).is_some() {
            return Err(CatalogError::Conflict(label));
        }

        let parent = self
            .graph
            .find_by_label(parent_label)
            .or_else(|| self.graph.root())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(ROOT_LABEL.to_string()))?;

        let sort_order = self
            .graph
            .child_edges(&parent.id)
            .map(|e| e.sort_order)
            .max()
            .map_or(0, |max| max + 1);

        let term = Term::new(new_id(), &label);
        let mut payload = self.graph.to_payload();
        payload.terms.push(term.clone());
        payload.edges.push(Edge::new(&parent.id, &term.id, sort_order));

        self.commit(payload)?;
        tracing::info!(label = %term.label, parent = %parent.label, sort_order, "catalog insert");
        Ok((term, parent.label))
    }

    /// Removes the term with `id`, its edges and every descendant.
    /// Returns the number of terms removed.
    pub fn remove(&mut self, id: &str) -> Result<usize, CatalogError> {
        if !self.graph.contains(id) {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        if self.graph.is_root(id) {
            return Err(CatalogError::RootProtected);
        }

        let doomed = self.subtree(id);
        let mut payload = self.graph.to_payload();
        payload.terms.retain(|t| !doomed.contains(&t.id));
        payload
            .edges
            .retain(|e| !doomed.contains(&e.child_id) && !doomed.contains(&e.parent_id));

        self.commit(payload)?;
        tracing::info!(id, removed = doomed.len(), "catalog remove");
        Ok(doomed.len())
    }

    fn subtree(&self, id: &str) -> HashSet<String> {
        let mut doomed = HashSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if !doomed.insert(current.clone()) {
                continue;
            }
            stack.extend(self.graph.child_edges(&current).map(|e| e.child_id.clone()));
        }
        doomed
    }

    /// Validates and persists `payload`, then swaps it in. On error the
    /// catalog keeps its previous state.
    fn commit(&mut self, payload: GraphPayload) -> Result<(), CatalogError> {
        let previous = std::mem::replace(&mut self.graph, Graph::try_from(payload)?);
        if let Err(e) = self.persist() {
            self.graph = previous;
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), CatalogError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&self.graph)?;
        fs::write(&tmp, json).map_err(|e| CatalogError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| CatalogError::io(path, e))?;
        Ok(())
    }
}

fn seed() -> Graph {
    Graph::from_parts(vec![Term::new(new_id(), ROOT_LABEL)], vec![]).unwrap_or_default()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
