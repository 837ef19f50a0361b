use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// What changed in the store. Delivered after the change is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The selection moved to `id`.
    SelectionChanged { id: String },
    /// A new graph was installed; derived views may differ.
    GraphReplaced { version: u64 },
    /// Graph, selection and loaded flag were dropped.
    Cleared,
}

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Listener registry for store changes.
///
/// Listeners run synchronously in registration order. Each round iterates a
/// snapshot of the registry, so a listener may subscribe or unsubscribe from
/// inside its callback.
pub struct SelectionBus {
    registry: Arc<Mutex<Registry>>,
}

impl SelectionBus {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Registers `listener`; it stays registered until the returned handle
    /// is unsubscribed or dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Invokes every listener once with `event`.
    ///
    /// A panicking listener is logged and skipped; the rest still run.
    pub fn notify(&self, event: &StoreEvent) {
        let snapshot: Vec<Listener> = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::error!(?event, "store listener panicked");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

impl Default for SelectionBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`SelectionBus::subscribe`].
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
