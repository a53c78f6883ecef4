//! Pure state transitions.
//!
//! `reduce` consumes the previous state and returns the next one. It performs
//! no I/O; persisting list changes is the `Store`'s job.

use std::sync::Arc;

use super::action::{Action, FetchKind, FetchPayload, FiltersPatch};
use super::state::{AppState, Filters, MoviesState};

pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SetFilters(patch) => apply_patch(&mut state.movies.filters, patch),
        Action::ClearFilters => state.movies.filters = Filters::default(),
        Action::SetPage(page) => state.movies.pagination.page = page.max(1),
        Action::ClearError => state.movies.error = None,

        Action::FetchPending { kind, generation } => {
            state.movies.in_flight.insert(kind.slot(), generation);
            state.movies.error = None;
        }
        Action::FetchFulfilled {
            kind,
            generation,
            payload,
        } => {
            if settle(&mut state.movies, kind, generation) {
                fulfil(&mut state.movies, kind, payload);
            }
        }
        Action::FetchRejected {
            kind,
            generation,
            message,
        } => {
            if settle(&mut state.movies, kind, generation) {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| kind.default_error().to_string());
                state.movies.error = Some(message);
            }
        }

        Action::ToggleFavorite(id) => toggle(&mut state.lists.favorites, id),
        Action::AddFavorite(id) => add(&mut state.lists.favorites, id),
        Action::RemoveFavorite(id) => state.lists.favorites.retain(|x| *x != id),
        Action::ClearFavorites => state.lists.favorites.clear(),
        Action::ToggleWatchlist(id) => toggle(&mut state.lists.watchlist, id),
        Action::AddToWatchlist(id) => add(&mut state.lists.watchlist, id),
        Action::RemoveFromWatchlist(id) => state.lists.watchlist.retain(|x| *x != id),
        Action::ClearWatchlist => state.lists.watchlist.clear(),

        Action::SetTheme(theme) => state.ui.theme = theme,
        Action::ToggleFilterPanel => state.ui.filter_panel_open = !state.ui.filter_panel_open,
        Action::SetViewMode(mode) => state.ui.view_mode = mode,
    }
    state
}

fn apply_patch(filters: &mut Filters, patch: FiltersPatch) {
    if let Some(year) = patch.year {
        filters.year = year;
    }
    if let Some(genre) = patch.genre {
        filters.genre = non_blank(genre);
    }
    if let Some(search) = patch.search {
        filters.search = non_blank(search);
    }
    if let Some(sort) = patch.sort {
        filters.sort = sort;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Clear the in-flight marker if `generation` is the latest for its slot.
/// Returns false for a superseded result, which must not touch state.
fn settle(movies: &mut MoviesState, kind: FetchKind, generation: u64) -> bool {
    let slot = kind.slot();
    if movies.in_flight.get(&slot) != Some(&generation) {
        tracing::debug!(
            kind = kind.name(),
            generation,
            latest = ?movies.in_flight.get(&slot),
            "Discarding superseded fetch result"
        );
        return false;
    }
    movies.in_flight.remove(&slot);
    true
}

fn fulfil(movies: &mut MoviesState, kind: FetchKind, payload: FetchPayload) {
    if !payload.fits(kind) {
        tracing::warn!(kind = kind.name(), "Fetch result does not match its kind");
        movies.error = Some(kind.default_error().to_string());
        return;
    }
    match payload {
        FetchPayload::Movies(resp) => {
            movies.movies = Arc::new(resp.movies);
            movies.pagination = resp.pagination;
        }
        FetchPayload::Movie(movie) => movies.current_movie = Some(Arc::new(movie)),
        FetchPayload::Genres(genres) => movies.genres = Arc::new(genres),
        FetchPayload::Years(years) => movies.available_years = Arc::new(years),
    }
}

fn toggle(list: &mut Vec<String>, id: String) {
    if id.is_empty() {
        return;
    }
    match list.iter().position(|x| *x == id) {
        Some(pos) => {
            list.remove(pos);
        }
        None => list.push(id),
    }
}

fn add(list: &mut Vec<String>, id: String) {
    if !id.is_empty() && !list.contains(&id) {
        list.push(id);
    }
}
