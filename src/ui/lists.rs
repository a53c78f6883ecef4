use crate::app::{App, View};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the favorites or watchlist view.
///
/// Only IDs are stored, so an entry shows its title when the movie was seen
/// in a listing this session and the bare ID otherwise.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let (name, empty_hint) = match app.view {
        View::Watchlist => ("Watchlist", "Watchlist is empty. Press w on a movie to add it."),
        _ => ("Favorites", "No favorites yet. Press f on a movie to add it."),
    };
    let ids = app.saved_ids();
    let lists = &app.state().lists;
    let title_width = (area.width as usize).saturating_sub(20);

    let items: Vec<ListItem> = if ids.is_empty() {
        vec![ListItem::new(Span::styled(
            empty_hint,
            app.style("detail_metadata"),
        ))]
    } else {
        ids.iter()
            .map(|id| {
                let mut spans = Vec::with_capacity(4);
                // Mark membership in the other list
                let other = match app.view {
                    View::Watchlist if lists.is_favorite(id) => {
                        Some(Span::styled("♥ ", app.style("movie_favorite")))
                    }
                    View::Favorites if lists.in_watchlist(id) => {
                        Some(Span::styled("+ ", app.style("movie_watchlist")))
                    }
                    _ => None,
                };
                spans.push(other.unwrap_or_else(|| Span::raw("  ")));

                match app.saved_title(id) {
                    Some(title) => {
                        let title = strip_control_chars(title);
                        spans.push(Span::styled(
                            truncate_to_width(&title, title_width).into_owned(),
                            app.style("movie_normal"),
                        ));
                        spans.push(Span::styled(format!("  {}", id), app.style("movie_year")));
                    }
                    None => spans.push(Span::styled(id.clone(), app.style("movie_normal"))),
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(format!(" {} ({}) ", name, ids.len())),
        )
        .highlight_style(app.style("movie_selected"));

    let selected = (!ids.is_empty()).then_some(app.selected_saved);
    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);
}
