//! Terminal taxonomy browser.
//!
//! Shows the parent, sibling and child rows around the selected term and
//! animates moves through the navigation controller:
//! - Horizontal centering on sibling moves
//! - Centering then a vertical slide on parent/child moves

mod app;
mod event;
mod ui;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;

use app::App;
use lexicon_core::config::NavigationConfig;
use lexicon_core::CacheLoader;

/// Run the TUI application.
pub async fn run(
    loader: Arc<CacheLoader>,
    timing: NavigationConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(loader, timing);

    // Run the main loop
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
