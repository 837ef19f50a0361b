//! UI rendering for the TUI.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use lexicon_core::navigation::{Row, SlideDirection};
use lexicon_core::{Term, View};

use super::app::{centered_offset, row_padding, App, ITEM_GAP};

/// Height of one bordered carousel row.
const ROW_HEIGHT: u16 = 3;
/// Height of the parent/siblings/children block.
const BLOCK_HEIGHT: u16 = ROW_HEIGHT * 3;

/// Render the entire UI.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(BLOCK_HEIGHT),
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_title(app, frame, chunks[0]);
    render_carousel(app, frame, chunks[1]);
    render_status_bar(app, frame, chunks[2]);
}

fn render_title(app: &App, frame: &mut Frame, area: Rect) {
    let path = app
        .view()
        .map(|v| match v.parent {
            Some(parent) => format!("{} › {}", parent.label, v.selected.label),
            None => v.selected.label,
        })
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" Lexicon ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(path, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

/// Draws the displayed block and, while a slide runs, the pending block
/// sliding in after it.
fn render_carousel(app: &App, frame: &mut Frame, area: Rect) {
    let Some(view) = app.view() else {
        let message = if app.loading {
            "Loading..."
        } else {
            "No terms to show"
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            area,
        );
        return;
    };

    let carousel = app.nav.carousel();
    let top = i32::from(area.y) + (i32::from(area.height) - i32::from(BLOCK_HEIGHT)).max(0) / 2;
    let height = i32::from(BLOCK_HEIGHT);

    let displayed_offsets = [
        carousel.offset(Row::Parent),
        carousel.offset(Row::Siblings),
        carousel.offset(Row::Children),
    ];

    match (app.nav.pending(), carousel.slide_state()) {
        (Some(pending), Some(slide)) => {
            let shift = (slide.progress * f64::from(BLOCK_HEIGHT)).round() as i32;
            let (old_top, new_top) = match slide.direction {
                SlideDirection::Up => (top - shift, top + height - shift),
                SlideDirection::Down => (top + shift, top - height + shift),
            };
            let viewport = f64::from(area.width.saturating_sub(2));
            let pending_offsets = resting_offsets(&pending.view, viewport);

            render_block(app, frame, area, old_top, &view, displayed_offsets);
            render_block(app, frame, area, new_top, &pending.view, pending_offsets);
        }
        _ => render_block(app, frame, area, top, &view, displayed_offsets),
    }
}

/// Offsets of a block that is not being animated.
fn resting_offsets(view: &View, viewport: f64) -> [f64; 3] {
    let parent: Vec<Term> = view.parent.iter().cloned().collect();
    [
        view.parent
            .as_ref()
            .map_or(0.0, |p| centered_offset(&parent, &p.id, viewport)),
        centered_offset(&view.siblings, &view.selected.id, viewport),
        view.children
            .first()
            .map_or(0.0, |c| centered_offset(&view.children, &c.id, viewport)),
    ]
}

fn render_block(app: &App, frame: &mut Frame, area: Rect, top: i32, view: &View, offsets: [f64; 3]) {
    let parent: Vec<Term> = view.parent.iter().cloned().collect();
    let cursor = view.children.get(app.child_cursor).map(|t| t.id.as_str());

    let rows: [(&str, &[Term], Option<&str>); 3] = [
        (" Parent ", &parent, view.parent.as_ref().map(|p| p.id.as_str())),
        (" Siblings ", &view.siblings, Some(view.selected.id.as_str())),
        (" Children ", &view.children, cursor),
    ];

    for (i, ((title, terms, focus), offset)) in rows.into_iter().zip(offsets).enumerate() {
        let y = top + i as i32 * i32::from(ROW_HEIGHT);
        if let Some(rect) = row_rect(area, y) {
            render_row(frame, rect, title, terms, focus, offset);
        }
    }
}

/// The rect for a row starting at `y`, if it fits entirely inside `area`.
fn row_rect(area: Rect, y: i32) -> Option<Rect> {
    let bottom = i32::from(area.y) + i32::from(area.height);
    if y < i32::from(area.y) || y + i32::from(ROW_HEIGHT) > bottom {
        return None;
    }
    Some(Rect::new(area.x, y as u16, area.width, ROW_HEIGHT))
}

fn render_row(frame: &mut Frame, area: Rect, title: &str, terms: &[Term], focus: Option<&str>, offset: f64) {
    let viewport = f64::from(area.width.saturating_sub(2));
    let gap = " ".repeat(ITEM_GAP);

    let mut spans = vec![Span::raw(" ".repeat(row_padding(viewport)))];
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(gap.clone()));
        }
        let style = if Some(term.id.as_str()) == focus {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(term.label.clone(), style));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .scroll((0, offset.max(0.0).round() as u16));

    frame.render_widget(paragraph, area);
}

/// Render the status bar.
fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let keys = "[←/→] Sibling  [↑] Parent  [↓] Child  [ [ / ] ] Pick child  [q] Quit";
    let status = match &app.status_message {
        Some(message) => format!("{keys}  |  {message}"),
        None => keys.to_string(),
    };

    let status_bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
