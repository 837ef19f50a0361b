//! Taxonomy data model: terms, edges, the graph aggregate and derived views.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ROOT_LABEL;

/// A single taxonomy node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    /// Normalized (uppercase) label, unique within the taxonomy.
    pub label: String,
}

impl Term {
    pub fn new(id: impl Into<String>, label: impl AsRef<str>) -> Self {
        Self {
            id: id.into(),
            label: normalize_label(label.as_ref()),
        }
    }
}

/// "`child_id` is a direct child of `parent_id`", ordered among siblings by `sort_order`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub parent_id: String,
    pub child_id: String,
    pub sort_order: i64,
}

impl Edge {
    pub fn new(parent_id: impl Into<String>, child_id: impl Into<String>, sort_order: i64) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            sort_order,
        }
    }
}

/// Localized projection around one selected term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub selected: Term,
    pub parent: Option<Term>,
    pub siblings: Vec<Term>,
    pub children: Vec<Term>,
}

impl View {
    /// Position of the selected term within its sibling row.
    pub fn selected_index(&self) -> usize {
        self.siblings
            .iter()
            .position(|t| t.id == self.selected.id)
            .unwrap_or(0)
    }
}

/// Normalizes a user-supplied label: trimmed, inner whitespace collapsed, uppercase.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Errors raised when a graph payload violates the tree invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Duplicate term id: {0}")]
    DuplicateTerm(String),

    #[error("Term {0} has more than one parent edge")]
    MultipleParents(String),
}

/// Wire shape of a graph: `{ terms, edges }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// The full taxonomy: every term and edge, with lookup indexes.
///
/// Serializes as [`GraphPayload`]; the indexes are rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphPayload", into = "GraphPayload")]
pub struct Graph {
    terms: Vec<Term>,
    edges: Vec<Edge>,
    term_index: HashMap<String, usize>,
    parent_edge: HashMap<String, usize>,
    /// Edge indexes per parent, stably sorted by `sort_order`.
    child_edges: HashMap<String, Vec<usize>>,
}

impl Graph {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a graph, rejecting duplicate term ids and multi-parent children.
    ///
    /// Edges that reference unknown terms are kept; projection drops them.
    pub fn from_parts(terms: Vec<Term>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut term_index = HashMap::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            if term_index.insert(term.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateTerm(term.id.clone()));
            }
        }

        let mut parent_edge = HashMap::with_capacity(edges.len());
        let mut child_edges: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            if parent_edge.insert(edge.child_id.clone(), i).is_some() {
                return Err(GraphError::MultipleParents(edge.child_id.clone()));
            }
            child_edges.entry(edge.parent_id.clone()).or_default().push(i);
        }
        for list in child_edges.values_mut() {
            list.sort_by_key(|&i| edges[i].sort_order);
        }

        Ok(Self {
            terms,
            edges,
            term_index,
            parent_edge,
            child_edges,
        })
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn term(&self, id: &str) -> Option<&Term> {
        self.term_index.get(id).map(|&i| &self.terms[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.term_index.contains_key(id)
    }

    /// Case-insensitive label lookup.
    pub fn find_by_label(&self, label: &str) -> Option<&Term> {
        let wanted = normalize_label(label);
        self.terms.iter().find(|t| t.label == wanted)
    }

    /// The edge connecting `child_id` to its parent, if any.
    pub fn parent_edge(&self, child_id: &str) -> Option<&Edge> {
        self.parent_edge.get(child_id).map(|&i| &self.edges[i])
    }

    /// Edges leaving `parent_id`, ascending by `sort_order`.
    pub fn child_edges(&self, parent_id: &str) -> impl Iterator<Item = &Edge> + '_ {
        self.child_edges
            .get(parent_id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// The term labeled `KNOWLEDGE`, else the first term without a parent.
    pub fn root(&self) -> Option<&Term> {
        self.find_by_label(ROOT_LABEL).or_else(|| {
            self.terms
                .iter()
                .find(|t| !self.parent_edge.contains_key(&t.id))
        })
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.root().is_some_and(|r| r.id == id)
    }

    /// Copies the graph back into its wire shape.
    pub fn to_payload(&self) -> GraphPayload {
        GraphPayload {
            terms: self.terms.clone(),
            edges: self.edges.clone(),
        }
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms && self.edges == other.edges
    }
}

impl Eq for Graph {}

impl TryFrom<GraphPayload> for Graph {
    type Error = GraphError;

    fn try_from(payload: GraphPayload) -> Result<Self, Self::Error> {
        Graph::from_parts(payload.terms, payload.edges)
    }
}

impl From<Graph> for GraphPayload {
    fn from(graph: Graph) -> Self {
        GraphPayload {
            terms: graph.terms,
            edges: graph.edges,
        }
    }
}
