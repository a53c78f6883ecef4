//! Application state tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::{Genre, Movie, Pagination, SortOrder};
use crate::theme::ThemeVariant;

/// Root of the state tree owned by the `Store`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub movies: MoviesState,
    pub lists: ListsState,
    pub ui: UiState,
}

impl AppState {
    pub fn with_lists(favorites: Vec<String>, watchlist: Vec<String>) -> Self {
        Self {
            lists: ListsState {
                favorites,
                watchlist,
            },
            ..Self::default()
        }
    }
}

// ============================================================================
// Movies
// ============================================================================

/// Catalog data loaded from the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviesState {
    /// Current page of results. `Arc` so views can hold it across redraws.
    pub movies: Arc<Vec<Movie>>,
    pub current_movie: Option<Arc<Movie>>,
    pub genres: Arc<Vec<Genre>>,
    pub available_years: Arc<Vec<i32>>,
    pub pagination: Pagination,
    pub filters: Filters,
    pub error: Option<String>,
    /// Latest generation started per slot, removed when it settles.
    pub(crate) in_flight: BTreeMap<FetchSlot, u64>,
}

impl MoviesState {
    /// True while any fetch is in flight.
    pub fn loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_loading(&self, slot: FetchSlot) -> bool {
        self.in_flight.contains_key(&slot)
    }

    /// Generation of the pending fetch for `slot`, if any.
    pub fn pending_generation(&self, slot: FetchSlot) -> Option<u64> {
        self.in_flight.get(&slot).copied()
    }
}

/// Part of `MoviesState` written by a fetch. Fetches sharing a slot
/// supersede one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FetchSlot {
    MovieList,
    CurrentMovie,
    Genres,
    Years,
}

/// Active listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl Filters {
    /// True when no filter narrows the listing (sort is not a filter).
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.genre.is_none() && self.search.is_none()
    }

    /// One-line description for the list footer, e.g. `year=1994 genre=Drama`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(year) = self.year {
            parts.push(format!("year={}", year));
        }
        if let Some(genre) = &self.genre {
            parts.push(format!("genre={}", genre));
        }
        if let Some(search) = &self.search {
            parts.push(format!("search=\"{}\"", search));
        }
        parts.push(format!("sort={}", self.sort.as_str()));
        parts.join(" ")
    }
}

// ============================================================================
// Lists
// ============================================================================

/// Locally persisted ID lists. Ordered by insertion, never duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListsState {
    pub favorites: Vec<String>,
    pub watchlist: Vec<String>,
}

impl ListsState {
    pub fn is_favorite(&self, imdb_id: &str) -> bool {
        self.favorites.iter().any(|id| id == imdb_id)
    }

    pub fn in_watchlist(&self, imdb_id: &str) -> bool {
        self.watchlist.iter().any(|id| id == imdb_id)
    }
}

// ============================================================================
// UI
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub theme: ThemeVariant,
    pub filter_panel_open: bool,
    pub view_mode: ViewMode,
}

/// Movie list layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// One line per movie.
    #[default]
    Compact,
    /// Adds a second line with runtime and budget.
    Detailed,
}

impl ViewMode {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Compact => Self::Detailed,
            Self::Detailed => Self::Compact,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Compact => "Compact",
            Self::Detailed => "Detailed",
        }
    }
}
