//! Actions accepted by the reducer.

use crate::api::{Genre, Movie, MoviesResponse, SortOrder};
use crate::theme::ThemeVariant;

use super::state::{FetchSlot, ViewMode};

/// The seven backend reads the store tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Movies,
    MovieById,
    MoviesByYear,
    MoviesByGenre,
    Search,
    Genres,
    AvailableYears,
}

impl FetchKind {
    pub fn slot(self) -> FetchSlot {
        match self {
            Self::Movies | Self::MoviesByYear | Self::MoviesByGenre | Self::Search => {
                FetchSlot::MovieList
            }
            Self::MovieById => FetchSlot::CurrentMovie,
            Self::Genres => FetchSlot::Genres,
            Self::AvailableYears => FetchSlot::Years,
        }
    }

    /// Error shown when a failure carries no message of its own.
    pub fn default_error(self) -> &'static str {
        match self {
            Self::Movies => "Failed to fetch movies",
            Self::MovieById => "Failed to fetch movie",
            Self::MoviesByYear => "Failed to fetch movies by year",
            Self::MoviesByGenre => "Failed to fetch movies by genre",
            Self::Search => "Failed to search movies",
            Self::Genres => "Failed to fetch genres",
            Self::AvailableYears => "Failed to fetch available years",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::MovieById => "movie",
            Self::MoviesByYear => "movies_by_year",
            Self::MoviesByGenre => "movies_by_genre",
            Self::Search => "search",
            Self::Genres => "genres",
            Self::AvailableYears => "years",
        }
    }
}

/// Successful result of a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPayload {
    Movies(MoviesResponse),
    Movie(Movie),
    Genres(Vec<Genre>),
    Years(Vec<i32>),
}

impl FetchPayload {
    /// Whether this payload is what `kind` produces.
    pub fn fits(&self, kind: FetchKind) -> bool {
        matches!(
            (self, kind.slot()),
            (Self::Movies(_), FetchSlot::MovieList)
                | (Self::Movie(_), FetchSlot::CurrentMovie)
                | (Self::Genres(_), FetchSlot::Genres)
                | (Self::Years(_), FetchSlot::Years)
        )
    }
}

/// Partial filter update. An outer `None` leaves the field alone; `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltersPatch {
    pub year: Option<Option<i32>>,
    pub genre: Option<Option<String>>,
    pub search: Option<Option<String>>,
    pub sort: Option<SortOrder>,
}

impl FiltersPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(mut self, year: Option<i32>) -> Self {
        self.year = Some(year);
        self
    }

    pub fn genre(mut self, genre: Option<String>) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn search(mut self, search: Option<String>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Filters and paging
    SetFilters(FiltersPatch),
    ClearFilters,
    SetPage(u32),
    ClearError,

    // Fetch lifecycle
    FetchPending {
        kind: FetchKind,
        generation: u64,
    },
    FetchFulfilled {
        kind: FetchKind,
        generation: u64,
        payload: FetchPayload,
    },
    FetchRejected {
        kind: FetchKind,
        generation: u64,
        message: Option<String>,
    },

    // Lists
    ToggleFavorite(String),
    AddFavorite(String),
    RemoveFavorite(String),
    ClearFavorites,
    ToggleWatchlist(String),
    AddToWatchlist(String),
    RemoveFromWatchlist(String),
    ClearWatchlist,

    // UI
    SetTheme(ThemeVariant),
    ToggleFilterPanel,
    SetViewMode(ViewMode),
}

impl Action {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetFilters(_) => "set_filters",
            Self::ClearFilters => "clear_filters",
            Self::SetPage(_) => "set_page",
            Self::ClearError => "clear_error",
            Self::FetchPending { .. } => "fetch_pending",
            Self::FetchFulfilled { .. } => "fetch_fulfilled",
            Self::FetchRejected { .. } => "fetch_rejected",
            Self::ToggleFavorite(_) => "toggle_favorite",
            Self::AddFavorite(_) => "add_favorite",
            Self::RemoveFavorite(_) => "remove_favorite",
            Self::ClearFavorites => "clear_favorites",
            Self::ToggleWatchlist(_) => "toggle_watchlist",
            Self::AddToWatchlist(_) => "add_to_watchlist",
            Self::RemoveFromWatchlist(_) => "remove_from_watchlist",
            Self::ClearWatchlist => "clear_watchlist",
            Self::SetTheme(_) => "set_theme",
            Self::ToggleFilterPanel => "toggle_filter_panel",
            Self::SetViewMode(_) => "set_view_mode",
        }
    }
}
