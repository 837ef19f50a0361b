//! In-memory taxonomy store and its change notifications.

mod bus;
mod graph_store;

pub use bus::{SelectionBus, StoreEvent, Subscription};
pub use graph_store::GraphStore;
