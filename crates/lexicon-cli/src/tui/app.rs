//! Application state and main event loop.

use std::io::Stdout;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use lexicon_core::config::NavigationConfig;
use lexicon_core::navigation::{Move, Row};
use lexicon_core::{
    CacheLoader, LoadReport, NavOutcome, NavigationController, Subscription, Term, TrackCarousel,
    View,
};

use super::event::{Event, EventHandler};
use super::ui;

/// Blank columns between two labels in a row.
pub const ITEM_GAP: usize = 4;

/// Main application state.
pub struct App {
    /// Sequences moves and owns the animated carousel
    pub nav: Arc<NavigationController<TrackCarousel>>,
    /// Populates the store on startup
    loader: Arc<CacheLoader>,
    /// Keeps the displayed view in step with store changes
    _subscription: Subscription,
    /// Index into the displayed children that `Down` will open
    pub child_cursor: usize,
    /// Selected id the rows were last snapped to
    centered: Option<String>,
    /// Whether the first load is still running
    pub loading: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Whether the app should quit
    pub should_quit: bool,
    timing: NavigationConfig,
}

impl App {
    /// Create a new app instance.
    pub fn new(loader: Arc<CacheLoader>, timing: NavigationConfig) -> Self {
        let carousel = Arc::new(TrackCarousel::new(timing.frame_interval()));
        let nav = Arc::new(NavigationController::new(
            loader.store().clone(),
            carousel,
            timing.clone(),
        ));
        let subscription = nav.attach();

        Self {
            nav,
            loader,
            _subscription: subscription,
            child_cursor: 0,
            centered: None,
            loading: true,
            status_message: Some("Loading taxonomy...".to_string()),
            should_quit: false,
            timing,
        }
    }

    /// Run the main event loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut events = EventHandler::new(self.timing.frame_interval());

        let loader = self.loader.clone();
        let tx = events.sender();
        tokio::spawn(async move {
            let report = loader.ensure_loaded().await;
            let _ = tx.send(Event::Loaded(report));
        });

        loop {
            let width = terminal.size()?.width;
            self.sync_layout(width);
            terminal.draw(|frame| ui::render(self, frame))?;

            if let Some(event) = events.next().await {
                match event {
                    Event::Key(key) => self.handle_key_event(key, events.sender()),
                    Event::Tick => {}
                    Event::Loaded(report) => self.handle_loaded(report),
                    Event::Navigated(outcome) => self.handle_navigated(outcome),
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// The view on screen.
    pub fn view(&self) -> Option<View> {
        self.nav.displayed()
    }

    fn handle_loaded(&mut self, report: LoadReport) {
        self.loading = false;
        self.nav.refresh();
        self.status_message = match (report.refreshed, report.from_snapshot) {
            (true, _) => None,
            (false, true) => Some("Offline: showing cached taxonomy".to_string()),
            (false, false) => Some("Taxonomy unavailable".to_string()),
        };
    }

    fn handle_navigated(&mut self, outcome: NavOutcome) {
        if outcome == NavOutcome::Moved {
            self.status_message = None;
        }
    }

    /// Handle a key press.
    fn handle_key_event(&mut self, key: KeyEvent, event_tx: mpsc::UnboundedSender<Event>) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Left => self.step_sibling(-1, event_tx),
            KeyCode::Right => self.step_sibling(1, event_tx),
            KeyCode::Up => {
                if let Some(parent) = self.view().and_then(|v| v.parent) {
                    self.spawn_navigation(Move::Parent, parent, event_tx);
                }
            }
            KeyCode::Down => {
                let child = self
                    .view()
                    .and_then(|v| v.children.get(self.child_cursor).cloned());
                if let Some(child) = child {
                    self.spawn_navigation(Move::Child, child, event_tx);
                }
            }
            KeyCode::Char('[') => self.move_cursor(-1),
            KeyCode::Char(']') => self.move_cursor(1),
            _ => {}
        }
    }

    fn step_sibling(&mut self, delta: isize, event_tx: mpsc::UnboundedSender<Event>) {
        let Some(view) = self.view() else {
            return;
        };
        let index = view.selected_index() as isize + delta;
        if index < 0 {
            return;
        }
        if let Some(target) = view.siblings.get(index as usize).cloned() {
            self.spawn_navigation(Move::Sibling, target, event_tx);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        if !self.nav.is_idle() {
            return;
        }
        let Some(view) = self.view() else {
            return;
        };
        let last = view.children.len().saturating_sub(1) as isize;
        let cursor = (self.child_cursor as isize + delta).clamp(0, last) as usize;
        if let Some(child) = view.children.get(cursor) {
            self.child_cursor = cursor;
            self.nav.carousel().snap_to(Row::Children, &child.id);
        }
    }

    /// Runs the move in the background; the controller drops it if another
    /// is still animating.
    fn spawn_navigation(&self, mv: Move, target: Term, event_tx: mpsc::UnboundedSender<Event>) {
        let nav = self.nav.clone();
        tokio::spawn(async move {
            let outcome = nav.navigate(mv, &target.label).await;
            let _ = event_tx.send(Event::Navigated(outcome));
        });
    }

    /// Lays the displayed rows out for a terminal `width` columns wide and
    /// re-centers them once a new selection has settled.
    fn sync_layout(&mut self, width: u16) {
        let Some(view) = self.view() else {
            return;
        };
        let viewport = f64::from(width.saturating_sub(2));
        let carousel = self.nav.carousel();

        let parent: Vec<Term> = view.parent.iter().cloned().collect();
        carousel.layout_row(Row::Parent, item_centers(&parent, viewport), viewport);
        carousel.layout_row(Row::Siblings, item_centers(&view.siblings, viewport), viewport);
        carousel.layout_row(Row::Children, item_centers(&view.children, viewport), viewport);

        if !self.nav.is_idle() || self.centered.as_deref() == Some(view.selected.id.as_str()) {
            return;
        }

        carousel.snap_to(Row::Siblings, &view.selected.id);
        if let Some(parent) = &view.parent {
            carousel.snap_to(Row::Parent, &parent.id);
        }
        self.child_cursor = 0;
        if let Some(child) = view.children.first() {
            carousel.snap_to(Row::Children, &child.id);
        }
        self.centered = Some(view.selected.id.clone());
    }
}

/// Left padding of a row, so the first item can sit in the middle.
pub fn row_padding(viewport: f64) -> usize {
    (viewport / 2.0).max(0.0) as usize
}

/// Center column of each term when a row is drawn as padding followed by
/// labels separated by [`ITEM_GAP`].
pub fn item_centers(terms: &[Term], viewport: f64) -> Vec<(String, f64)> {
    let mut x = row_padding(viewport);
    terms
        .iter()
        .map(|term| {
            let width = term.label.chars().count();
            let center = x as f64 + width as f64 / 2.0;
            x += width + ITEM_GAP;
            (term.id.clone(), center)
        })
        .collect()
}

/// Offset that centers `id` in a row without animation.
pub fn centered_offset(terms: &[Term], id: &str, viewport: f64) -> f64 {
    item_centers(terms, viewport)
        .into_iter()
        .find(|(term_id, _)| term_id == id)
        .map_or(0.0, |(_, center)| center - viewport / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> Vec<Term> {
        vec![Term::new("1", "MATH"), Term::new("2", "ART")]
    }

    #[test]
    fn test_item_centers() {
        let centers = item_centers(&terms(), 20.0);
        assert_eq!(centers[0], ("1".to_string(), 12.0));
        // 10 padding + 4 "MATH" + 4 gap + 1.5
        assert_eq!(centers[1], ("2".to_string(), 19.5));
    }

    #[test]
    fn test_first_item_centers_at_its_own_midpoint() {
        assert_eq!(centered_offset(&terms(), "1", 20.0), 2.0);
        assert_eq!(centered_offset(&terms(), "missing", 20.0), 0.0);
    }
}
