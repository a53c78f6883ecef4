//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on current view and mode. Overlays (help, confirmation,
//! search prompt) capture all keys while they are open.

use crate::app::{App, AppEvent, ConfirmAction, FetchRequest, FilterRow, ListSource, View};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::store::{Action as StoreAction, FetchSlot, FiltersPatch};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{spawn_fetch, spawn_ratings};
use super::Action;

/// Lines moved by PageDown/PageUp on the detail view.
const DETAIL_PAGE_LINES: usize = 10;

/// Map the current view to a keybinding context.
pub(super) fn view_context(app: &App) -> KbContext {
    match app.view {
        View::Movies if app.filters_focused => KbContext::Filters,
        View::Movies => KbContext::MovieList,
        View::Detail => KbContext::Detail,
        View::Genres | View::Years => KbContext::Picker,
        View::Favorites | View::Watchlist => KbContext::SavedList,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if app.show_help {
        return handle_help_input(app, code);
    }

    if let Some(confirm) = app.pending_confirm {
        return handle_confirm_input(app, confirm, code);
    }

    if app.search_mode {
        return handle_search_input(app, code, modifiers, event_tx);
    }

    let context = view_context(app);
    match app.keybindings.action_for_key(code, modifiers, context) {
        Some(action) => handle_action(app, action, event_tx),
        None => Action::Continue,
    }
}

/// Handle input when help overlay is visible.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_confirm_input(app: &mut App, confirm: ConfirmAction, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.pending_confirm = None;
            app.confirm(confirm);
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input while the search prompt is open.
fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Search)
    {
        Some(KbAction::ExitSearch) => {
            app.search_mode = false;
            app.search_input.clear();
        }
        Some(KbAction::CommitSearch) => commit_search(app, event_tx),
        _ => match code {
            KeyCode::Backspace => {
                app.search_input.pop();
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                if app.search_input.len() + c.len_utf8() > MAX_SEARCH_QUERY_LENGTH {
                    app.set_status(format!(
                        "Search query too long (max {} chars)",
                        MAX_SEARCH_QUERY_LENGTH
                    ));
                } else {
                    app.search_input.push(c);
                }
            }
            _ => {}
        },
    }
    Action::Continue
}

/// Run the typed query. An empty query drops the search filter instead.
fn commit_search(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.search_mode = false;
    let query = std::mem::take(&mut app.search_input).trim().to_string();

    if query.is_empty() {
        app.dispatch(StoreAction::SetFilters(FiltersPatch::new().search(None)));
        let request = app.show_source(ListSource::All);
        spawn_fetch(app, request, event_tx);
        app.set_status("Search cleared");
        return;
    }

    tracing::debug!(query = %query, "Committing search");
    app.dispatch(StoreAction::SetFilters(
        FiltersPatch::new().search(Some(query.clone())),
    ));
    app.set_status(format!("Searching for \"{}\"...", query));
    let request = app.show_source(ListSource::Search(query));
    spawn_fetch(app, request, event_tx);
}

fn handle_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::ScrollDown => app.scroll_down(1),
        KbAction::ScrollUp => app.scroll_up(1),
        KbAction::PageDown => app.scroll_down(DETAIL_PAGE_LINES),
        KbAction::PageUp => app.scroll_up(DETAIL_PAGE_LINES),
        KbAction::Back => handle_back(app, event_tx),
        KbAction::Select => handle_select(app, event_tx),
        KbAction::NextPage => change_page(app, true, event_tx),
        KbAction::PrevPage => change_page(app, false, event_tx),
        KbAction::Refresh => refresh(app, event_tx),
        KbAction::ToggleFavorite => {
            if let Some(id) = app.target_movie_id() {
                let msg = app.toggle_favorite(id);
                app.set_status(msg);
            }
        }
        KbAction::ToggleWatchlist => {
            if let Some(id) = app.target_movie_id() {
                let msg = app.toggle_watchlist(id);
                app.set_status(msg);
            }
        }
        KbAction::EnterSearch => {
            app.search_mode = true;
            app.search_input = app
                .state()
                .movies
                .filters
                .search
                .clone()
                .unwrap_or_default();
        }
        KbAction::ToggleFilterPanel => {
            if app.view == View::Movies {
                app.toggle_filter_panel();
            }
        }
        KbAction::FilterPrev => change_filter(app, false, event_tx),
        KbAction::FilterNext => change_filter(app, true, event_tx),
        KbAction::ClearFilters => {
            if app.state().movies.filters.is_empty() && app.list_source == ListSource::All {
                app.set_status("No filters active");
            } else {
                app.clear_filters();
                let request = app.listing_request(1);
                spawn_fetch(app, request, event_tx);
                app.set_status("Filters cleared");
            }
        }
        KbAction::ToggleSort => toggle_sort(app, event_tx),
        KbAction::ShowMovies => app.switch_view(View::Movies),
        KbAction::ShowFavorites => app.switch_view(View::Favorites),
        KbAction::ShowWatchlist => app.switch_view(View::Watchlist),
        KbAction::ShowGenres => show_picker(app, View::Genres, event_tx),
        KbAction::ShowYears => show_picker(app, View::Years, event_tx),
        KbAction::ClearList => {
            let confirm = match app.view {
                View::Favorites => Some(ConfirmAction::ClearFavorites),
                View::Watchlist => Some(ConfirmAction::ClearWatchlist),
                _ => None,
            };
            if let Some(confirm) = confirm {
                if app.saved_ids().is_empty() {
                    app.set_status("List is already empty");
                } else {
                    app.pending_confirm = Some(confirm);
                }
            }
        }
        KbAction::LoadRatings => {
            let current = app.state().movies.current_movie.as_ref();
            if let Some(id) = current.map(|m| m.imdb_id.clone()) {
                spawn_ratings(app, id, event_tx);
            }
        }
        KbAction::ToggleViewMode => {
            let name = app.toggle_view_mode();
            app.set_status(format!("View: {}", name));
        }
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        KbAction::ExitSearch | KbAction::CommitSearch => {}
    }
    Action::Continue
}

/// Esc: dismiss the error first, then unwind one level of navigation.
fn handle_back(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.state().movies.error.is_some() {
        app.dispatch(StoreAction::ClearError);
        return;
    }

    match app.view {
        View::Detail => app.close_detail(),
        View::Movies if app.state().ui.filter_panel_open => app.toggle_filter_panel(),
        View::Movies if app.list_source != ListSource::All => {
            if matches!(app.list_source, ListSource::Search(_)) {
                app.dispatch(StoreAction::SetFilters(FiltersPatch::new().search(None)));
            }
            let request = app.show_source(ListSource::All);
            spawn_fetch(app, request, event_tx);
        }
        View::Movies => {}
        View::Genres | View::Years | View::Favorites | View::Watchlist => {
            app.switch_view(View::Movies)
        }
    }
}

fn handle_select(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let request = match app.view {
        View::Movies if app.filters_focused => {
            change_filter(app, true, event_tx);
            return;
        }
        View::Movies => {
            let Some(id) = app.selected_movie().map(|m| m.imdb_id.clone()) else {
                return;
            };
            app.open_detail(id)
        }
        View::Favorites | View::Watchlist => {
            let Some(id) = app.selected_saved_id().map(str::to_string) else {
                return;
            };
            app.open_detail(id)
        }
        View::Genres => {
            let genres = &app.state().movies.genres;
            let Some(name) = genres.get(app.selected_genre).map(|g| g.name.clone()) else {
                return;
            };
            app.show_source(ListSource::Genre(name))
        }
        View::Years => {
            let years = &app.state().movies.available_years;
            let Some(year) = years.get(app.selected_year).copied() else {
                return;
            };
            app.show_source(ListSource::Year(year))
        }
        View::Detail => return,
    };
    spawn_fetch(app, request, event_tx);
}

fn change_page(app: &mut App, forward: bool, event_tx: &mpsc::Sender<AppEvent>) {
    if app.view != View::Movies {
        return;
    }
    match app.page_request(forward) {
        Some(request) => spawn_fetch(app, request, event_tx),
        None if forward => app.set_status("Already on the last page"),
        None => app.set_status("Already on the first page"),
    }
}

fn change_filter(app: &mut App, forward: bool, event_tx: &mpsc::Sender<AppEvent>) {
    if app.filter_row == FilterRow::Sort {
        toggle_sort(app, event_tx);
    } else if app.cycle_filter(forward) {
        let request = app.listing_request(1);
        spawn_fetch(app, request, event_tx);
    }
}

fn toggle_sort(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(request) = app.toggle_sort() {
        spawn_fetch(app, request, event_tx);
    }
}

fn refresh(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let request = match app.view {
        View::Movies => {
            let page = app.state().movies.pagination.page;
            app.listing_request(page)
        }
        View::Detail => {
            let current = app.state().movies.current_movie.as_ref();
            let Some(id) = current.map(|m| m.imdb_id.clone()) else {
                return;
            };
            FetchRequest::Movie(id)
        }
        View::Genres => FetchRequest::Genres,
        View::Years => FetchRequest::Years,
        View::Favorites | View::Watchlist => return,
    };
    app.set_status("Refreshing...");
    spawn_fetch(app, request, event_tx);
}

/// Open the genre or year picker, loading its options on first use.
fn show_picker(app: &mut App, view: View, event_tx: &mpsc::Sender<AppEvent>) {
    app.switch_view(view);
    let movies = &app.state().movies;
    let (empty, slot, request) = match view {
        View::Genres => (movies.genres.is_empty(), FetchSlot::Genres, FetchRequest::Genres),
        _ => (
            movies.available_years.is_empty(),
            FetchSlot::Years,
            FetchRequest::Years,
        ),
    };
    if empty && !movies.is_loading(slot) {
        spawn_fetch(app, request, event_tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Genre, Movie, MovieApi, MoviesResponse, Pagination, SortOrder};
    use crate::persistence::InMemoryLists;
    use crate::store::{FetchKind, FetchPayload, Store};
    use std::time::Duration;

    fn test_app() -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        let (store, _) = Store::load(Box::new(InMemoryLists::new())).unwrap();
        let api = MovieApi::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let (tx, rx) = mpsc::channel(32);
        (App::new(store, api), tx, rx)
    }

    fn key(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx)
    }

    fn type_text(app: &mut App, text: &str, tx: &mpsc::Sender<AppEvent>) {
        for c in text.chars() {
            key(app, KeyCode::Char(c), tx);
        }
    }

    fn load_movie_list(app: &mut App, ids: &[&str]) {
        let movies = ids
            .iter()
            .map(|id| Movie {
                imdb_id: id.to_string(),
                title: format!("Title {}", id),
                genres: Vec::new(),
                release_date: String::new(),
                budget: None,
                description: None,
                runtime: None,
                average_rating: None,
                original_language: None,
                production_companies: Vec::new(),
                ratings: Vec::new(),
            })
            .collect();
        let generation = app.begin_fetch(FetchKind::Movies);
        app.complete_fetch(
            FetchKind::Movies,
            generation,
            Ok(FetchPayload::Movies(MoviesResponse {
                movies,
                pagination: Pagination::default(),
            })),
        );
    }

    #[tokio::test]
    async fn test_quit() {
        let (mut app, tx, _rx) = test_app();
        assert!(matches!(key(&mut app, KeyCode::Char('q'), &tx), Action::Quit));
    }

    #[tokio::test]
    async fn test_help_overlay_captures_keys() {
        let (mut app, tx, _rx) = test_app();
        key(&mut app, KeyCode::Char('?'), &tx);
        assert!(app.show_help);
        // 'q' closes help instead of quitting
        assert!(matches!(
            key(&mut app, KeyCode::Char('q'), &tx),
            Action::Continue
        ));
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_search_commit_sets_filter_and_source() {
        let (mut app, tx, _rx) = test_app();
        key(&mut app, KeyCode::Char('/'), &tx);
        assert!(app.search_mode);
        type_text(&mut app, "  alien ", &tx);
        key(&mut app, KeyCode::Enter, &tx);

        assert!(!app.search_mode);
        assert_eq!(app.list_source, ListSource::Search("alien".into()));
        assert_eq!(app.state().movies.filters.search.as_deref(), Some("alien"));
        assert!(app.state().movies.is_loading(FetchSlot::MovieList));
    }

    #[tokio::test]
    async fn test_search_escape_discards_input() {
        let (mut app, tx, _rx) = test_app();
        key(&mut app, KeyCode::Char('/'), &tx);
        type_text(&mut app, "jaws", &tx);
        key(&mut app, KeyCode::Backspace, &tx);
        assert_eq!(app.search_input, "jaw");
        key(&mut app, KeyCode::Esc, &tx);
        assert!(!app.search_mode);
        assert!(app.search_input.is_empty());
        assert!(app.state().movies.filters.search.is_none());
    }

    #[tokio::test]
    async fn test_search_input_length_capped() {
        let (mut app, tx, _rx) = test_app();
        key(&mut app, KeyCode::Char('/'), &tx);
        app.search_input = "x".repeat(MAX_SEARCH_QUERY_LENGTH);
        key(&mut app, KeyCode::Char('y'), &tx);
        assert_eq!(app.search_input.len(), MAX_SEARCH_QUERY_LENGTH);
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_back_clears_error_before_navigating() {
        let (mut app, tx, _rx) = test_app();
        app.switch_view(View::Favorites);
        let generation = app.begin_fetch(FetchKind::Genres);
        app.complete_fetch(FetchKind::Genres, generation, Err("boom".into()));

        key(&mut app, KeyCode::Esc, &tx);
        assert!(app.state().movies.error.is_none());
        assert_eq!(app.view, View::Favorites);

        key(&mut app, KeyCode::Esc, &tx);
        assert_eq!(app.view, View::Movies);
    }

    #[tokio::test]
    async fn test_select_movie_opens_detail_and_back_returns() {
        let (mut app, tx, _rx) = test_app();
        load_movie_list(&mut app, &["tt1", "tt2"]);
        key(&mut app, KeyCode::Char('j'), &tx);
        key(&mut app, KeyCode::Enter, &tx);

        assert_eq!(app.view, View::Detail);
        assert!(app.state().movies.is_loading(FetchSlot::CurrentMovie));

        key(&mut app, KeyCode::Char('b'), &tx);
        assert_eq!(app.view, View::Movies);
        assert_eq!(app.selected_movie, 1);
    }

    #[tokio::test]
    async fn test_favorite_key_toggles_selected_movie() {
        let (mut app, tx, _rx) = test_app();
        load_movie_list(&mut app, &["tt0111161"]);
        key(&mut app, KeyCode::Char('f'), &tx);
        assert!(app.state().lists.is_favorite("tt0111161"));
        key(&mut app, KeyCode::Char('w'), &tx);
        assert!(app.state().lists.in_watchlist("tt0111161"));
        key(&mut app, KeyCode::Char('f'), &tx);
        assert!(!app.state().lists.is_favorite("tt0111161"));
    }

    #[tokio::test]
    async fn test_clear_list_requires_confirmation() {
        let (mut app, tx, _rx) = test_app();
        app.toggle_favorite("tt1".into());
        key(&mut app, KeyCode::Char('2'), &tx);
        assert_eq!(app.view, View::Favorites);

        handle_input(&mut app, KeyCode::Char('D'), KeyModifiers::SHIFT, &tx);
        assert_eq!(app.pending_confirm, Some(ConfirmAction::ClearFavorites));
        key(&mut app, KeyCode::Char('n'), &tx);
        assert_eq!(app.state().lists.favorites.len(), 1);

        key(&mut app, KeyCode::Char('D'), &tx);
        key(&mut app, KeyCode::Char('y'), &tx);
        assert!(app.state().lists.favorites.is_empty());
        assert!(app.pending_confirm.is_none());
    }

    #[tokio::test]
    async fn test_genre_pick_switches_source() {
        let (mut app, tx, _rx) = test_app();
        let generation = app.begin_fetch(FetchKind::Genres);
        app.complete_fetch(
            FetchKind::Genres,
            generation,
            Ok(FetchPayload::Genres(vec![Genre {
                id: 18,
                name: "Drama".into(),
            }])),
        );
        key(&mut app, KeyCode::Char('g'), &tx);
        assert_eq!(app.view, View::Genres);
        assert!(!app.state().movies.is_loading(FetchSlot::Genres));

        key(&mut app, KeyCode::Enter, &tx);
        assert_eq!(app.view, View::Movies);
        assert_eq!(app.list_source, ListSource::Genre("Drama".into()));

        key(&mut app, KeyCode::Esc, &tx);
        assert_eq!(app.list_source, ListSource::All);
    }

    #[tokio::test]
    async fn test_years_picker_loads_when_empty() {
        let (mut app, tx, _rx) = test_app();
        key(&mut app, KeyCode::Char('y'), &tx);
        assert_eq!(app.view, View::Years);
        assert!(app.state().movies.is_loading(FetchSlot::Years));
    }

    #[tokio::test]
    async fn test_sort_refetches_only_year_listing() {
        let (mut app, tx, _rx) = test_app();
        key(&mut app, KeyCode::Char('s'), &tx);
        assert_eq!(app.state().movies.filters.sort, SortOrder::Desc);
        assert!(!app.state().movies.loading());

        app.list_source = ListSource::Year(1994);
        key(&mut app, KeyCode::Char('s'), &tx);
        assert_eq!(app.state().movies.filters.sort, SortOrder::Asc);
        assert!(app.state().movies.is_loading(FetchSlot::MovieList));
    }

    #[tokio::test]
    async fn test_filter_panel_sort_row_keeps_year_listing() {
        let (mut app, tx, _rx) = test_app();
        app.list_source = ListSource::Year(1994);
        handle_input(&mut app, KeyCode::Char('F'), KeyModifiers::SHIFT, &tx);
        key(&mut app, KeyCode::Char('j'), &tx);
        key(&mut app, KeyCode::Char('j'), &tx);
        assert_eq!(app.filter_row, FilterRow::Sort);

        key(&mut app, KeyCode::Char('l'), &tx);
        assert_eq!(app.list_source, ListSource::Year(1994));
        assert_eq!(app.state().movies.filters.sort, SortOrder::Desc);
        assert!(app.state().movies.is_loading(FetchSlot::MovieList));
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Sort: desc");
    }

    #[tokio::test]
    async fn test_page_keys_respect_bounds() {
        let (mut app, tx, _rx) = test_app();
        load_movie_list(&mut app, &["tt1"]);
        key(&mut app, KeyCode::Char('p'), &tx);
        assert_eq!(app.state().movies.pagination.page, 1);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Already on the first page");
    }

    #[tokio::test]
    async fn test_filter_panel_keys() {
        let (mut app, tx, _rx) = test_app();
        let generation = app.begin_fetch(FetchKind::AvailableYears);
        app.complete_fetch(
            FetchKind::AvailableYears,
            generation,
            Ok(FetchPayload::Years(vec![1994])),
        );
        handle_input(&mut app, KeyCode::Char('F'), KeyModifiers::SHIFT, &tx);
        assert!(app.filters_focused);
        assert_eq!(view_context(&app), KbContext::Filters);

        key(&mut app, KeyCode::Char('l'), &tx);
        assert_eq!(app.state().movies.filters.year, Some(1994));
        assert!(app.state().movies.is_loading(FetchSlot::MovieList));

        key(&mut app, KeyCode::Char('c'), &tx);
        assert!(app.state().movies.filters.is_empty());

        key(&mut app, KeyCode::Esc, &tx);
        assert!(!app.state().ui.filter_panel_open);
        assert!(!app.filters_focused);
    }

    #[tokio::test]
    async fn test_theme_and_view_mode_keys() {
        let (mut app, tx, _rx) = test_app();
        handle_input(&mut app, KeyCode::Char('T'), KeyModifiers::SHIFT, &tx);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Theme: Light");
        key(&mut app, KeyCode::Char('v'), &tx);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "View: Detailed");
    }
}
