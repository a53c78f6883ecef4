//! Genre and year pickers. Selecting an entry switches the movie list to it.

use crate::app::{App, ListSource};
use crate::store::FetchSlot;
use crate::util::strip_control_chars;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render_genres(f: &mut Frame, app: &App, area: Rect) {
    let movies = &app.state().movies;
    let entries: Vec<(String, bool)> = movies
        .genres
        .iter()
        .map(|g| {
            let active = app.list_source == ListSource::Genre(g.name.clone());
            (strip_control_chars(&g.name).into_owned(), active)
        })
        .collect();
    let loading = movies.is_loading(FetchSlot::Genres);
    render_picker(f, app, area, " Genres ", entries, app.selected_genre, loading);
}

pub fn render_years(f: &mut Frame, app: &App, area: Rect) {
    let movies = &app.state().movies;
    let entries: Vec<(String, bool)> = movies
        .available_years
        .iter()
        .map(|y| (y.to_string(), app.list_source == ListSource::Year(*y)))
        .collect();
    let loading = movies.is_loading(FetchSlot::Years);
    render_picker(f, app, area, " Years ", entries, app.selected_year, loading);
}

fn render_picker(
    f: &mut Frame,
    app: &App,
    area: Rect,
    title: &'static str,
    entries: Vec<(String, bool)>,
    selected: usize,
    loading: bool,
) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let empty = entries.is_empty();
    let items: Vec<ListItem> = if empty {
        let msg = if loading { "Loading..." } else { "Nothing to show" };
        vec![ListItem::new(Span::styled(msg, app.style("detail_metadata")))]
    } else {
        entries
            .into_iter()
            .map(|(label, active)| {
                let marker = if active { "• " } else { "  " };
                let style = if active {
                    app.style("filter_active")
                } else {
                    app.style("movie_normal")
                };
                ListItem::new(Line::from(vec![Span::raw(marker), Span::styled(label, style)]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title)
                .title_bottom(Line::from(Span::styled(
                    " Enter browse · Esc back ",
                    app.style("detail_metadata"),
                ))),
        )
        .highlight_style(app.style("movie_selected"));

    let mut state = ListState::default().with_selected((!empty).then_some(selected));
    f.render_stateful_widget(list, area, &mut state);
}
