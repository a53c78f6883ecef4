//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state.

use crate::app::{App, BackendStatus, ConfirmAction, RatingsState, View};
use crate::format::totals_line;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::loop_runner::SPINNER_FRAMES;
use super::{detail, filters, help, lists, movies, picker, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

const SPINNER: [&str; SPINNER_FRAMES] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Height of the filter panel, borders included.
const FILTER_PANEL_HEIGHT: u16 = 5;

/// Main render dispatch function.
///
/// Handles terminal size validation, then draws header, current view, error
/// line and status bar, with help and confirmation overlays on top.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let error_height = u16::from(app.state().movies.error.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(error_height),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);

    match app.view {
        View::Movies => render_movies_view(f, app, chunks[1]),
        View::Detail => detail::render(f, app, chunks[1]),
        View::Genres => picker::render_genres(f, app, chunks[1]),
        View::Years => picker::render_years(f, app, chunks[1]),
        View::Favorites | View::Watchlist => lists::render(f, app, chunks[1]),
    }

    if let Some(error) = &app.state().movies.error {
        let line = Line::from(vec![
            Span::styled(format!(" ✗ {}", error), app.style("error")),
            Span::styled("  (Esc to dismiss)", app.style("detail_metadata")),
        ]);
        f.render_widget(Paragraph::new(line), chunks[2]);
    }

    status::render(f, app, chunks[3]);

    if app.show_help {
        help::render(f, app);
    }

    if let Some(confirm) = app.pending_confirm {
        render_confirm_overlay(f, app, confirm);
    }
}

/// Title, catalog totals, backend state and the loading spinner.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let state = app.state();
    let totals = totals_line(
        state.movies.pagination.total,
        state.lists.favorites.len(),
        state.lists.watchlist.len(),
    );

    let backend = match &app.backend {
        BackendStatus::Unknown => Span::styled("○ connecting", app.style("detail_metadata")),
        BackendStatus::Online => Span::styled("● online", app.style("rating_high")),
        BackendStatus::Offline(_) => Span::styled("● offline", app.style("error")),
    };

    let mut spans = vec![
        Span::styled(" Marquee ", app.style("header")),
        Span::raw("  "),
        Span::raw(totals),
        Span::raw("  "),
        backend,
    ];

    let ratings_loading = matches!(app.ratings, RatingsState::Loading { .. });
    if state.movies.loading() || ratings_loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            SPINNER[app.spinner_frame % SPINNER_FRAMES],
            app.style("filter_active"),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Movie list, with the filter panel above it when open.
fn render_movies_view(f: &mut Frame, app: &App, area: Rect) {
    if !app.state().ui.filter_panel_open {
        movies::render(f, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(FILTER_PANEL_HEIGHT), Constraint::Min(0)])
        .split(area);
    filters::render(f, app, chunks[0]);
    movies::render(f, app, chunks[1]);
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, confirm: ConfirmAction) {
    let area = f.area();

    let count = match confirm {
        ConfirmAction::ClearFavorites => app.state().lists.favorites.len(),
        ConfirmAction::ClearWatchlist => app.state().lists.watchlist.len(),
    };
    let text = format!(
        "{}\n\nThis cannot be undone.\n\n(y) Confirm  (n/Esc) Cancel",
        confirm.prompt(count)
    );

    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 8u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(app.style("detail_body"));

    f.render_widget(paragraph, overlay);
}
