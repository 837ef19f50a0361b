use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use super::bus::{SelectionBus, StoreEvent, Subscription};
use crate::model::{Edge, Graph, GraphError, Term, View};
use crate::projector::compute_view;

#[derive(Default)]
struct StoreState {
    graph: Arc<Graph>,
    loaded: bool,
    selected: Option<String>,
    version: u64,
}

/// In-memory holder of the taxonomy and the current selection.
///
/// Construct one per session and share it as `Arc<GraphStore>`. Reads never
/// block on I/O. Each mutation commits under the state lock, releases it, and
/// then notifies listeners, so listeners observe the new state and may call
/// back into the store.
pub struct GraphStore {
    state: RwLock<StoreState>,
    bus: SelectionBus,
    /// Serializes mutate-then-notify rounds across threads. Reentrant so a
    /// listener can mutate from inside its callback.
    round: ReentrantMutex<()>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            bus: SelectionBus::new(),
            round: ReentrantMutex::new(()),
        }
    }

    /// Atomically installs a new graph and marks the store loaded.
    ///
    /// On malformed input the previous graph is kept and nothing is notified.
    /// If the selected term disappeared, the selection is left for the caller
    /// to repair.
    pub fn replace_graph(&self, terms: Vec<Term>, edges: Vec<Edge>) -> Result<u64, GraphError> {
        let graph = Graph::from_parts(terms, edges)?;
        Ok(self.install(graph))
    }

    /// Installs an already validated graph.
    pub fn install(&self, graph: Graph) -> u64 {
        let _round = self.round.lock();
        let version = {
            let mut state = self.state.write();
            state.graph = Arc::new(graph);
            state.loaded = true;
            state.version += 1;
            state.version
        };
        tracing::debug!(version, "graph replaced");
        self.bus.notify(&StoreEvent::GraphReplaced { version });
        version
    }

    /// Moves the selection to `id`.
    ///
    /// Returns `false` without notifying when `id` is already selected or is
    /// not a known term.
    pub fn set_selected(&self, id: &str) -> bool {
        let _round = self.round.lock();
        {
            let mut state = self.state.write();
            if state.selected.as_deref() == Some(id) || !state.graph.contains(id) {
                return false;
            }
            state.selected = Some(id.to_string());
            state.version += 1;
        }
        self.bus.notify(&StoreEvent::SelectionChanged { id: id.to_string() });
        true
    }

    /// Drops the graph, the selection and the loaded flag.
    pub fn clear(&self) {
        let _round = self.round.lock();
        {
            let mut state = self.state.write();
            state.graph = Arc::new(Graph::empty());
            state.loaded = false;
            state.selected = None;
            state.version += 1;
        }
        self.bus.notify(&StoreEvent::Cleared);
    }

    /// Case-insensitive label lookup.
    pub fn find_by_label(&self, label: &str) -> Option<Term> {
        self.state.read().graph.find_by_label(label).cloned()
    }

    pub fn term(&self, id: &str) -> Option<Term> {
        self.state.read().graph.term(id).cloned()
    }

    pub fn selected(&self) -> Option<String> {
        self.state.read().selected.clone()
    }

    pub fn selected_term(&self) -> Option<Term> {
        let state = self.state.read();
        state
            .selected
            .as_deref()
            .and_then(|id| state.graph.term(id).cloned())
    }

    /// Shared handle to the current graph.
    pub fn graph(&self) -> Arc<Graph> {
        Arc::clone(&self.state.read().graph)
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().graph.is_empty()
    }

    /// Incremented by every committed mutation.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// View around the current selection.
    pub fn view(&self) -> Option<View> {
        let state = self.state.read();
        let selected = state.selected.as_deref()?;
        compute_view(&state.graph, selected)
    }

    /// View around an arbitrary term.
    pub fn view_of(&self, id: &str) -> Option<View> {
        compute_view(&self.state.read().graph, id)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(listener)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn seeded() -> GraphStore {
        let store = GraphStore::new();
        store
            .replace_graph(
                vec![
                    Term::new("1", "KNOWLEDGE"),
                    Term::new("2", "MATH"),
                    Term::new("3", "ART"),
                ],
                vec![Edge::new("1", "2", 0), Edge::new("1", "3", 1)],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_replace_marks_loaded() {
        let store = GraphStore::new();
        assert!(!store.is_loaded());

        let store = seeded();
        assert!(store.is_loaded());
        assert_eq!(store.graph().len(), 3);
    }

    #[test]
    fn test_replace_fails_closed() {
        let store = seeded();
        let before = store.version();

        let result = store.replace_graph(
            vec![Term::new("x", "X"), Term::new("x", "Y")],
            vec![],
        );
        assert!(result.is_err());
        assert_eq!(store.version(), before);
        assert_eq!(store.graph().len(), 3);
    }

    #[test]
    fn test_set_selected_notifies_once() {
        let store = seeded();
        let events = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let events = Arc::clone(&events);
            store.subscribe(move |e| events.lock().push(e.clone()))
        };

        assert!(store.set_selected("2"));
        assert!(!store.set_selected("2"));
        assert!(!store.set_selected("404"));

        assert_eq!(
            *events.lock(),
            vec![StoreEvent::SelectionChanged { id: "2".to_string() }]
        );
        assert_eq!(store.selected().as_deref(), Some("2"));
    }

    #[test]
    fn test_listener_sees_committed_state() {
        let store = Arc::new(seeded());
        let observed = Arc::new(Mutex::new(None));
        let _sub = {
            let weak = Arc::downgrade(&store);
            let observed = Arc::clone(&observed);
            store.subscribe(move |_| {
                if let Some(store) = weak.upgrade() {
                    *observed.lock() = store.selected();
                }
            })
        };

        store.set_selected("3");
        assert_eq!(observed.lock().as_deref(), Some("3"));
    }

    #[test]
    fn test_replace_notifies_without_selection_change() {
        let store = seeded();
        store.set_selected("2");

        let events = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let events = Arc::clone(&events);
            store.subscribe(move |e| events.lock().push(e.clone()))
        };

        let version = store
            .replace_graph(vec![Term::new("1", "KNOWLEDGE"), Term::new("2", "MATH")], vec![
                Edge::new("1", "2", 0),
            ])
            .unwrap();

        assert_eq!(*events.lock(), vec![StoreEvent::GraphReplaced { version }]);
        assert_eq!(store.selected().as_deref(), Some("2"));
    }

    #[test]
    fn test_listener_may_reenter() {
        let store = Arc::new(seeded());
        let _sub = {
            let weak = Arc::downgrade(&store);
            store.subscribe(move |event| {
                if let (StoreEvent::SelectionChanged { id }, Some(store)) = (event, weak.upgrade()) {
                    if id == "2" {
                        store.set_selected("3");
                    }
                }
            })
        };

        store.set_selected("2");
        assert_eq!(store.selected().as_deref(), Some("3"));
    }

    #[test]
    fn test_clear() {
        let store = seeded();
        store.set_selected("1");
        store.clear();

        assert!(!store.is_loaded());
        assert!(store.selected().is_none());
        assert!(store.view().is_none());
    }

    #[test]
    fn test_view_follows_selection() {
        let store = seeded();
        assert!(store.view().is_none());

        store.set_selected("2");
        let view = store.view().unwrap();
        assert_eq!(view.parent.map(|t| t.label), Some("KNOWLEDGE".to_string()));
        assert_eq!(view.siblings.len(), 2);
    }
}
