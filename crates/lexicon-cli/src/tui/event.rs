//! Event handling for the TUI.

use crossterm::event::{KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

use lexicon_core::{LoadReport, NavOutcome};

/// Events that can occur in the application.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed
    Key(KeyEvent),
    /// A frame tick (drives redraws while animations run)
    Tick,
    /// The initial cache load finished
    Loaded(LoadReport),
    /// A navigation task finished
    Navigated(NavOutcome),
}

/// Handles events from various sources.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler ticking every `tick_rate`.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut interval = tokio::time::interval(tick_rate);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                let crossterm_event = reader.next().fuse();
                let tick = interval.tick();

                tokio::select! {
                    maybe_event = crossterm_event => {
                        match maybe_event {
                            Some(Ok(crossterm::event::Event::Key(key))) => {
                                // Only handle key press events, not release
                                if key.kind == KeyEventKind::Press
                                    && event_tx.send(Event::Key(key)).is_err()
                                {
                                    break;
                                }
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => tracing::warn!(error = %e, "terminal event error"),
                            None => break,
                        }
                    }
                    _ = tick => {
                        if event_tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, tx }
    }

    /// Get the next event.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Get the sender for events produced by background tasks.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }
}
