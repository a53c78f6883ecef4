use crate::api::{ApiError, Movie, MovieApi, MovieQuery, RatingEntry, SortOrder};
use crate::keybindings::KeybindingRegistry;
use crate::store::{
    Action, AppState, FetchKind, FetchPayload, FetchSlot, FiltersPatch, Store, ViewMode,
};
use crate::theme::{StyleMap, ThemeVariant};
use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::HashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Upper bound for the detail scroll offset (ratatui scroll is u16).
pub const MAX_SCROLL: usize = u16::MAX as usize;

/// Status messages disappear after this many seconds.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// View and Focus Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Movies,
    Detail,
    Genres,
    Years,
    Favorites,
    Watchlist,
}

/// What the movie list is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    All,
    Year(i32),
    Genre(String),
    Search(String),
}

impl ListSource {
    pub fn describe(&self) -> String {
        match self {
            Self::All => "All movies".to_string(),
            Self::Year(year) => format!("Movies from {}", year),
            Self::Genre(genre) => format!("Genre: {}", genre),
            Self::Search(query) => format!("Search: \"{}\"", query),
        }
    }
}

/// Row of the filter panel that has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRow {
    Year,
    Genre,
    Sort,
}

impl FilterRow {
    pub const ALL: [FilterRow; 3] = [FilterRow::Year, FilterRow::Genre, FilterRow::Sort];

    pub fn label(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Genre => "Genre",
            Self::Sort => "Sort",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Year => 0,
            Self::Genre => 1,
            Self::Sort => 2,
        }
    }

    fn up(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    fn down(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }
}

/// Destructive action awaiting a y/n answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearFavorites,
    ClearWatchlist,
}

impl ConfirmAction {
    pub fn prompt(self, count: usize) -> String {
        let list = match self {
            Self::ClearFavorites => "favorites",
            Self::ClearWatchlist => "watchlist",
        };
        format!("Remove all {} entries from {}? (y/n)", count, list)
    }
}

/// Result of the startup heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online,
    Offline(String),
}

/// External ratings panel on the detail view.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingsState {
    Idle,
    Loading { imdb_id: String },
    Loaded { imdb_id: String, ratings: Vec<RatingEntry> },
    Failed { imdb_id: String, error: String },
}

// ============================================================================
// Fetch Requests
// ============================================================================

/// A backend read that feeds the store, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Movies(MovieQuery),
    Movie(String),
    MoviesByYear { year: i32, page: u32, sort: SortOrder },
    MoviesByGenre { genre: String, page: u32 },
    Search { query: String, page: u32 },
    Genres,
    Years,
}

impl FetchRequest {
    pub fn kind(&self) -> FetchKind {
        match self {
            Self::Movies(_) => FetchKind::Movies,
            Self::Movie(_) => FetchKind::MovieById,
            Self::MoviesByYear { .. } => FetchKind::MoviesByYear,
            Self::MoviesByGenre { .. } => FetchKind::MoviesByGenre,
            Self::Search { .. } => FetchKind::Search,
            Self::Genres => FetchKind::Genres,
            Self::Years => FetchKind::AvailableYears,
        }
    }

    pub async fn execute(self, api: &MovieApi) -> Result<FetchPayload, ApiError> {
        let payload = match self {
            Self::Movies(query) => FetchPayload::Movies(api.list_movies(&query).await?),
            Self::Movie(id) => FetchPayload::Movie(api.movie(&id).await?),
            Self::MoviesByYear { year, page, sort } => {
                FetchPayload::Movies(api.movies_by_year(year, page, sort).await?)
            }
            Self::MoviesByGenre { genre, page } => {
                FetchPayload::Movies(api.movies_by_genre(&genre, page).await?)
            }
            Self::Search { query, page } => FetchPayload::Movies(api.search(&query, page).await?),
            Self::Genres => FetchPayload::Genres(api.genres().await?),
            Self::Years => FetchPayload::Years(api.years().await?),
        };
        Ok(payload)
    }
}

/// Events from background tasks
pub enum AppEvent {
    /// A store fetch settled. Errors are already rendered to a message.
    FetchCompleted {
        kind: FetchKind,
        generation: u64,
        result: Result<FetchPayload, String>,
    },
    RatingsLoaded {
        imdb_id: String,
        generation: u64,
        result: Result<Vec<RatingEntry>, String>,
    },
    HeartbeatChecked(Result<String, String>),
    /// A background task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub store: Store,
    pub api: MovieApi,

    pub theme: StyleMap,
    pub keybindings: KeybindingRegistry,

    pub view: View,
    /// Where Back from the detail view returns to.
    pub return_view: View,
    pub list_source: ListSource,

    pub selected_movie: usize,
    pub selected_genre: usize,
    pub selected_year: usize,
    pub selected_saved: usize,

    pub filters_focused: bool,
    pub filter_row: FilterRow,

    pub search_mode: bool,
    pub search_input: String,

    pub detail_scroll: usize,
    pub ratings: RatingsState,
    pub backend: BackendStatus,

    /// Titles seen this session, so saved lists can show names for loaded IDs.
    pub title_cache: HashMap<String, String>,

    /// Status message with the instant it was set
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub pending_confirm: Option<ConfirmAction>,
    pub spinner_frame: usize,

    /// Monotonic counter tagging every store fetch.
    pub fetch_generation: u64,
    /// In-flight fetch task per slot; replaced (and aborted) by newer fetches.
    pub fetch_handles: HashMap<FetchSlot, JoinHandle<()>>,
    pub ratings_generation: u64,
    pub ratings_handle: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(store: Store, api: MovieApi) -> Self {
        let theme = store.state().ui.theme;
        Self {
            store,
            api,
            theme: StyleMap::from_palette(&theme.palette()),
            keybindings: KeybindingRegistry::new(),
            view: View::Movies,
            return_view: View::Movies,
            list_source: ListSource::All,
            selected_movie: 0,
            selected_genre: 0,
            selected_year: 0,
            selected_saved: 0,
            filters_focused: false,
            filter_row: FilterRow::Year,
            search_mode: false,
            search_input: String::new(),
            detail_scroll: 0,
            ratings: RatingsState::Idle,
            backend: BackendStatus::Unknown,
            title_cache: HashMap::new(),
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            pending_confirm: None,
            spinner_frame: 0,
            fetch_generation: 0,
            fetch_handles: HashMap::new(),
            ratings_generation: 0,
            ratings_handle: None,
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Apply an action to the store. Persistence failures become a status
    /// message; the state change itself always sticks.
    pub fn dispatch(&mut self, action: Action) {
        if let Err(e) = self.store.dispatch(action) {
            self.set_status(format!("Failed to save list: {}", e));
        }
        self.needs_redraw = true;
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.dispatch(Action::SetTheme(variant));
        self.theme = StyleMap::from_palette(&variant.palette());
    }

    /// Cycle to the next theme variant. Returns its name for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.state().ui.theme.next();
        self.set_theme(next);
        next.name()
    }

    pub fn toggle_view_mode(&mut self) -> &'static str {
        let next = self.state().ui.view_mode.next();
        self.dispatch(Action::SetViewMode(next));
        next.name()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state().ui.view_mode
    }

    // ------------------------------------------------------------------------
    // Fetch bookkeeping
    // ------------------------------------------------------------------------

    /// Register a new fetch of `kind`: bump the generation, abort whatever was
    /// in flight for the same slot and mark the slot pending.
    pub fn begin_fetch(&mut self, kind: FetchKind) -> u64 {
        self.fetch_generation = self.fetch_generation.wrapping_add(1);
        let generation = self.fetch_generation;
        if let Some(handle) = self.fetch_handles.remove(&kind.slot()) {
            handle.abort();
            tracing::debug!(kind = kind.name(), "Aborted superseded fetch");
        }
        self.dispatch(Action::FetchPending { kind, generation });
        generation
    }

    /// Feed a settled fetch into the store.
    pub fn complete_fetch(
        &mut self,
        kind: FetchKind,
        generation: u64,
        result: Result<FetchPayload, String>,
    ) {
        let slot = kind.slot();
        let current = self.state().movies.pending_generation(slot) == Some(generation);
        if current {
            self.fetch_handles.remove(&slot);
            match &result {
                Ok(FetchPayload::Movies(resp)) => self.remember_titles(&resp.movies),
                Ok(FetchPayload::Movie(movie)) => self.remember_titles(std::slice::from_ref(movie)),
                Err(message) => {
                    tracing::warn!(kind = kind.name(), generation, error = %message, "Fetch failed")
                }
                _ => {}
            }
        }

        let action = match result {
            Ok(payload) => Action::FetchFulfilled {
                kind,
                generation,
                payload,
            },
            Err(message) => Action::FetchRejected {
                kind,
                generation,
                message: Some(message),
            },
        };
        self.dispatch(action);

        if current && slot == FetchSlot::MovieList {
            self.selected_movie = 0;
        }
        self.clamp_selections();
    }

    fn remember_titles(&mut self, movies: &[Movie]) {
        for movie in movies {
            self.title_cache
                .insert(movie.imdb_id.clone(), movie.title.clone());
        }
    }

    /// Query for `/movies/all` built from the active filters.
    pub fn filter_query(&self, page: u32) -> MovieQuery {
        let filters = &self.state().movies.filters;
        MovieQuery {
            page: Some(page),
            year: filters.year,
            genre: filters.genre.clone(),
            search: filters.search.clone(),
        }
    }

    /// The request that loads `page` of the current list source.
    pub fn listing_request(&self, page: u32) -> FetchRequest {
        let page = page.max(1);
        match &self.list_source {
            ListSource::All => FetchRequest::Movies(self.filter_query(page)),
            ListSource::Year(year) => FetchRequest::MoviesByYear {
                year: *year,
                page,
                sort: self.state().movies.filters.sort,
            },
            ListSource::Genre(genre) => FetchRequest::MoviesByGenre {
                genre: genre.clone(),
                page,
            },
            ListSource::Search(query) => FetchRequest::Search {
                query: query.clone(),
                page,
            },
        }
    }

    /// Switch the list source and return the request for its first page.
    pub fn show_source(&mut self, source: ListSource) -> FetchRequest {
        self.list_source = source;
        self.view = View::Movies;
        self.selected_movie = 0;
        self.dispatch(Action::SetPage(1));
        self.listing_request(1)
    }

    /// Request for an adjacent page, if there is one.
    pub fn page_request(&mut self, forward: bool) -> Option<FetchRequest> {
        let pagination = &self.state().movies.pagination;
        let page = pagination.page;
        let target = if forward {
            pagination.has_next().then(|| page + 1)?
        } else {
            pagination.has_prev().then(|| page - 1)?
        };
        self.dispatch(Action::SetPage(target));
        Some(self.listing_request(target))
    }

    // ------------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------------

    /// Step the value on the focused Year or Genre row. Returns true if it
    /// changed; the caller then refetches page 1 of the filtered listing.
    /// The Sort row goes through [`App::toggle_sort`] instead.
    pub fn cycle_filter(&mut self, forward: bool) -> bool {
        let movies = &self.state().movies;
        let patch = match self.filter_row {
            FilterRow::Year => {
                let options: Vec<Option<i32>> = std::iter::once(None)
                    .chain(movies.available_years.iter().copied().map(Some))
                    .collect();
                let next = step(&options, &movies.filters.year, forward);
                FiltersPatch::new().year(next)
            }
            FilterRow::Genre => {
                let options: Vec<Option<String>> = std::iter::once(None)
                    .chain(movies.genres.iter().map(|g| Some(g.name.clone())))
                    .collect();
                let next = step(&options, &movies.filters.genre, forward);
                FiltersPatch::new().genre(next)
            }
            FilterRow::Sort => return false,
        };

        let before = movies.filters.clone();
        self.dispatch(Action::SetFilters(patch));
        let changed = self.state().movies.filters != before;
        if changed {
            self.list_source = ListSource::All;
            self.selected_movie = 0;
            self.dispatch(Action::SetPage(1));
        }
        changed
    }

    /// Flip the sort order, keeping the current listing source. Only the
    /// by-year listing honours sort, so only it yields a page 1 refetch.
    pub fn toggle_sort(&mut self) -> Option<FetchRequest> {
        let sort = self.state().movies.filters.sort.toggled();
        self.dispatch(Action::SetFilters(FiltersPatch::new().sort(sort)));
        self.set_status(format!("Sort: {}", sort.as_str()));
        if !matches!(self.list_source, ListSource::Year(_)) {
            return None;
        }
        self.selected_movie = 0;
        self.dispatch(Action::SetPage(1));
        Some(self.listing_request(1))
    }

    pub fn clear_filters(&mut self) {
        self.dispatch(Action::ClearFilters);
        self.dispatch(Action::SetPage(1));
        self.list_source = ListSource::All;
        self.selected_movie = 0;
    }

    pub fn toggle_filter_panel(&mut self) {
        self.dispatch(Action::ToggleFilterPanel);
        self.filters_focused = self.state().ui.filter_panel_open;
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.state().movies.movies.get(self.selected_movie)
    }

    /// IDs shown by the current saved-list view (empty for other views).
    pub fn saved_ids(&self) -> &[String] {
        let lists = &self.state().lists;
        match self.view {
            View::Favorites => &lists.favorites,
            View::Watchlist => &lists.watchlist,
            _ => &[],
        }
    }

    pub fn selected_saved_id(&self) -> Option<&str> {
        self.saved_ids()
            .get(self.selected_saved)
            .map(String::as_str)
    }

    /// The movie a favorite/watchlist toggle applies to in the current view.
    pub fn target_movie_id(&self) -> Option<String> {
        match self.view {
            View::Movies => self.selected_movie().map(|m| m.imdb_id.clone()),
            View::Detail => self
                .state()
                .movies
                .current_movie
                .as_ref()
                .map(|m| m.imdb_id.clone()),
            View::Favorites | View::Watchlist => self.selected_saved_id().map(str::to_string),
            View::Genres | View::Years => None,
        }
    }

    fn list_len(&self) -> usize {
        let movies = &self.state().movies;
        match self.view {
            View::Movies => movies.movies.len(),
            View::Genres => movies.genres.len(),
            View::Years => movies.available_years.len(),
            View::Favorites | View::Watchlist => self.saved_ids().len(),
            View::Detail => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.view {
            View::Movies => Some(&mut self.selected_movie),
            View::Genres => Some(&mut self.selected_genre),
            View::Years => Some(&mut self.selected_year),
            View::Favorites | View::Watchlist => Some(&mut self.selected_saved),
            View::Detail => None,
        }
    }

    /// Navigate up in current list
    pub fn nav_up(&mut self) {
        if self.view == View::Detail {
            self.scroll_up(1);
        } else if self.filters_focused && self.view == View::Movies {
            self.filter_row = self.filter_row.up();
        } else if let Some(selected) = self.selection_mut() {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Navigate down in current list
    pub fn nav_down(&mut self) {
        if self.view == View::Detail {
            self.scroll_down(1);
            return;
        }
        if self.filters_focused && self.view == View::Movies {
            self.filter_row = self.filter_row.down();
            return;
        }
        let len = self.list_len();
        if let Some(selected) = self.selection_mut() {
            if len > 0 {
                *selected = selected.saturating_add(1).min(len - 1);
            }
        }
    }

    /// Clamp every selection index to its list.
    pub fn clamp_selections(&mut self) {
        let movies = &self.state().movies;
        let lists = &self.state().lists;
        let max_movie = movies.movies.len().saturating_sub(1);
        let max_genre = movies.genres.len().saturating_sub(1);
        let max_year = movies.available_years.len().saturating_sub(1);
        let max_saved = match self.view {
            View::Favorites => lists.favorites.len(),
            View::Watchlist => lists.watchlist.len(),
            _ => 0,
        }
        .saturating_sub(1);

        self.selected_movie = self.selected_movie.min(max_movie);
        self.selected_genre = self.selected_genre.min(max_genre);
        self.selected_year = self.selected_year.min(max_year);
        self.selected_saved = self.selected_saved.min(max_saved);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.detail_scroll = self.detail_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.detail_scroll = self.detail_scroll.saturating_add(lines).min(MAX_SCROLL);
    }

    /// Keep the detail scroll within the rendered content.
    pub fn clamp_scroll(&mut self, content_lines: usize, visible_lines: usize) {
        let max_scroll = content_lines.saturating_sub(visible_lines);
        self.detail_scroll = self.detail_scroll.min(max_scroll).min(MAX_SCROLL);
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn switch_view(&mut self, view: View) {
        if view != View::Detail {
            self.filters_focused = false;
        }
        self.view = view;
        if matches!(view, View::Favorites | View::Watchlist) {
            self.selected_saved = 0;
        }
        self.clamp_selections();
    }

    /// Enter the detail view for `imdb_id`. Returns the fetch to run.
    pub fn open_detail(&mut self, imdb_id: String) -> FetchRequest {
        if self.view != View::Detail {
            self.return_view = self.view;
        }
        self.view = View::Detail;
        self.filters_focused = false;
        self.detail_scroll = 0;
        let keep_ratings = matches!(
            &self.ratings,
            RatingsState::Loaded { imdb_id: id, .. } if *id == imdb_id
        );
        if !keep_ratings {
            self.reset_ratings();
        }
        FetchRequest::Movie(imdb_id)
    }

    pub fn close_detail(&mut self) {
        self.reset_ratings();
        self.view = self.return_view;
        self.detail_scroll = 0;
        self.clamp_selections();
    }

    fn reset_ratings(&mut self) {
        if let Some(handle) = self.ratings_handle.take() {
            handle.abort();
            tracing::debug!("Aborted ratings load");
        }
        self.ratings = RatingsState::Idle;
    }

    /// Start tracking a ratings load; returns its generation.
    pub fn begin_ratings(&mut self, imdb_id: String) -> u64 {
        self.reset_ratings();
        self.ratings_generation = self.ratings_generation.wrapping_add(1);
        self.ratings = RatingsState::Loading { imdb_id };
        self.ratings_generation
    }

    pub fn complete_ratings(
        &mut self,
        imdb_id: String,
        generation: u64,
        result: Result<Vec<RatingEntry>, String>,
    ) {
        let pending = matches!(
            &self.ratings,
            RatingsState::Loading { imdb_id: id } if *id == imdb_id
        );
        if generation != self.ratings_generation || !pending {
            tracing::debug!(imdb_id = %imdb_id, generation, "Ignoring stale ratings result");
            return;
        }
        self.ratings_handle = None;
        self.ratings = match result {
            Ok(ratings) => RatingsState::Loaded { imdb_id, ratings },
            Err(error) => RatingsState::Failed { imdb_id, error },
        };
    }

    // ------------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------------

    pub fn toggle_favorite(&mut self, imdb_id: String) -> &'static str {
        let was = self.state().lists.is_favorite(&imdb_id);
        self.dispatch(Action::ToggleFavorite(imdb_id));
        self.clamp_selections();
        if was {
            "Removed from favorites"
        } else {
            "Added to favorites"
        }
    }

    pub fn toggle_watchlist(&mut self, imdb_id: String) -> &'static str {
        let was = self.state().lists.in_watchlist(&imdb_id);
        self.dispatch(Action::ToggleWatchlist(imdb_id));
        self.clamp_selections();
        if was {
            "Removed from watchlist"
        } else {
            "Added to watchlist"
        }
    }

    /// Run a confirmed destructive action.
    pub fn confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::ClearFavorites => {
                self.dispatch(Action::ClearFavorites);
                self.set_status("Favorites cleared");
            }
            ConfirmAction::ClearWatchlist => {
                self.dispatch(Action::ClearWatchlist);
                self.set_status("Watchlist cleared");
            }
        }
        self.clamp_selections();
    }

    /// Display name for a saved ID: the title if seen this session.
    pub fn saved_title(&self, imdb_id: &str) -> Option<&str> {
        self.title_cache.get(imdb_id).map(String::as_str)
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort all in-flight background tasks when the App goes away.
impl Drop for App {
    fn drop(&mut self) {
        for (slot, handle) in self.fetch_handles.drain() {
            handle.abort();
            tracing::debug!(slot = ?slot, "Aborted fetch task on App drop");
        }
        if let Some(handle) = self.ratings_handle.take() {
            handle.abort();
        }
    }
}

/// Next (or previous) entry after `current` in `options`, wrapping around.
/// An unknown current value starts from the first entry.
fn step<T: Clone + PartialEq>(options: &[T], current: &T, forward: bool) -> T {
    let len = options.len();
    let pos = options.iter().position(|o| o == current);
    let next = match (pos, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, _) => 0,
    };
    options[next].clone()
}
