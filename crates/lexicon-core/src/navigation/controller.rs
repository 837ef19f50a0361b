use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::carousel::{Carousel, Row, SlideDirection};
use crate::config::NavigationConfig;
use crate::model::{Term, View};
use crate::store::{GraphStore, Subscription};

/// Where the controller is within one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavPhase {
    #[default]
    Idle,
    /// Horizontal centering is running.
    Aligning,
    /// The pending view is exposed and the vertical slide is running.
    Committing,
}

/// The kind of move a user requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Parent,
    Sibling,
    Child,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The selection moved and the view was committed.
    Moved,
    /// The target was unknown, already selected, or not in the named row.
    Ignored,
    /// Another navigation was in flight; the request was discarded.
    Dropped,
}

/// A computed view waiting for the vertical slide to finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingView {
    pub view: View,
    pub direction: SlideDirection,
}

#[derive(Debug, Default)]
struct NavState {
    phase: NavPhase,
    displayed: Option<View>,
    pending: Option<PendingView>,
    /// The store changed while a navigation was in flight.
    stale: bool,
}

/// Serializes user moves through the taxonomy and sequences their animations.
///
/// At most one navigation runs at a time; requests arriving meanwhile are
/// dropped rather than queued. Sibling moves select immediately and only
/// center the sibling row. Parent and child moves first center the clicked
/// term in its row, then select it, expose the new view as pending, run the
/// vertical slide, and only then commit it as displayed.
pub struct NavigationController<C: Carousel> {
    store: Arc<GraphStore>,
    carousel: Arc<C>,
    timing: NavigationConfig,
    busy: AtomicBool,
    state: Mutex<NavState>,
}

impl<C: Carousel> NavigationController<C> {
    pub fn new(store: Arc<GraphStore>, carousel: Arc<C>, timing: NavigationConfig) -> Self {
        let displayed = store.view();
        Self {
            store,
            carousel,
            timing,
            busy: AtomicBool::new(false),
            state: Mutex::new(NavState {
                displayed,
                ..NavState::default()
            }),
        }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn carousel(&self) -> &Arc<C> {
        &self.carousel
    }

    pub fn phase(&self) -> NavPhase {
        self.state.lock().phase
    }

    pub fn is_idle(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    /// The view the UI should currently show.
    pub fn displayed(&self) -> Option<View> {
        self.state.lock().displayed.clone()
    }

    /// The view the UI is sliding towards, during `Committing` only.
    pub fn pending(&self) -> Option<PendingView> {
        self.state.lock().pending.clone()
    }

    /// Re-derives the displayed view from the store and returns `true`.
    ///
    /// While a navigation is in flight the view is left alone and `false` is
    /// returned; the change is applied when that navigation finishes.
    pub fn refresh(&self) -> bool {
        let mut state = self.state.lock();
        if self.busy.load(Ordering::Acquire) {
            state.stale = true;
            return false;
        }
        state.displayed = self.store.view();
        state.stale = false;
        true
    }

    pub async fn select_parent(&self, label: &str) -> NavOutcome {
        self.navigate(Move::Parent, label).await
    }

    pub async fn select_sibling(&self, label: &str) -> NavOutcome {
        self.navigate(Move::Sibling, label).await
    }

    pub async fn select_child(&self, label: &str) -> NavOutcome {
        self.navigate(Move::Child, label).await
    }

    pub async fn navigate(&self, mv: Move, label: &str) -> NavOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(?mv, label, "navigation dropped, another is in flight");
            return NavOutcome::Dropped;
        }
        let _flight = FlightGuard { controller: self };

        let Some(target) = self.resolve_target(mv, label) else {
            tracing::debug!(?mv, label, "navigation target ignored");
            return NavOutcome::Ignored;
        };

        tracing::debug!(?mv, label = %target.label, "navigating");
        match mv {
            Move::Sibling => self.move_sideways(&target).await,
            Move::Parent => self.change_depth(&target, Row::Parent, SlideDirection::Down).await,
            Move::Child => self.change_depth(&target, Row::Children, SlideDirection::Up).await,
        }
    }

    /// Resolves `label` to a term in the row `mv` names, other than the
    /// current selection.
    fn resolve_target(&self, mv: Move, label: &str) -> Option<Term> {
        let view = self.store.view()?;
        let target = self.store.find_by_label(label)?;
        if target.id == view.selected.id {
            return None;
        }

        let in_row = match mv {
            Move::Parent => view.parent.as_ref().is_some_and(|p| p.id == target.id),
            Move::Sibling => view.siblings.iter().any(|t| t.id == target.id),
            Move::Child => view.children.iter().any(|t| t.id == target.id),
        };
        in_row.then_some(target)
    }

    async fn move_sideways(&self, target: &Term) -> NavOutcome {
        self.state.lock().phase = NavPhase::Aligning;

        self.store.set_selected(&target.id);
        let view = self.store.view();
        self.state.lock().displayed = view;

        self.carousel
            .center(Row::Siblings, &target.id, self.timing.sibling_scroll())
            .await;

        NavOutcome::Moved
    }

    async fn change_depth(&self, target: &Term, source: Row, direction: SlideDirection) -> NavOutcome {
        self.state.lock().phase = NavPhase::Aligning;

        self.carousel
            .center(source, &target.id, self.timing.focus_scroll())
            .await;

        // The graph may have been refreshed while centering.
        self.store.set_selected(&target.id);
        let Some(view) = self.store.view_of(&target.id) else {
            return NavOutcome::Ignored;
        };

        {
            let mut state = self.state.lock();
            state.phase = NavPhase::Committing;
            state.pending = Some(PendingView { view, direction });
        }

        self.carousel.slide(direction, self.timing.slide()).await;

        let mut state = self.state.lock();
        if let Some(pending) = state.pending.take() {
            state.displayed = Some(pending.view);
        }
        NavOutcome::Moved
    }
}

impl<C: Carousel + 'static> NavigationController<C> {
    /// Refreshes the displayed view whenever the store changes while idle.
    pub fn attach(self: &Arc<Self>) -> Subscription {
        let controller = Arc::downgrade(self);
        self.store.subscribe(move |_| {
            if let Some(controller) = controller.upgrade() {
                controller.refresh();
            }
        })
    }
}

/// Returns the controller to `Idle` however the navigation ends, including
/// when its future is dropped mid-animation.
struct FlightGuard<'a, C: Carousel> {
    controller: &'a NavigationController<C>,
}

impl<C: Carousel> Drop for FlightGuard<'_, C> {
    fn drop(&mut self) {
        let controller = self.controller;
        let mut state = controller.state.lock();
        if let Some(pending) = state.pending.take() {
            state.displayed = Some(pending.view);
        }
        if state.stale {
            state.displayed = controller.store.view();
            state.stale = false;
        }
        state.phase = NavPhase::Idle;
        // Cleared under the state lock so a concurrent `refresh` either
        // marks the view stale before this point or refreshes it after.
        controller.busy.store(false, Ordering::Release);
    }
}
