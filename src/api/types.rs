//! Wire types for the movie backend.
//!
//! Field names follow the backend's camelCase JSON. Optional fields tolerate
//! both absence and `null`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A movie record as returned by `/movies/:id` and the list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes as a number, or preformatted text such as `"142 min"`.
    #[serde(default)]
    pub runtime: Option<NumberOrText>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(default)]
    pub ratings: Vec<RatingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompany {
    pub id: i64,
    pub name: String,
}

/// A rating from an external source (IMDb, Rotten Tomatoes, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub source: String,
    pub rating: NumberOrText,
}

/// A JSON scalar the backend sends either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl fmt::Display for NumberOrText {
    /// Numbers render with one decimal place, text verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{:.1}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Paging metadata attached to every list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    /// Echo of the year filter, when the backend applied one.
    pub year: Option<NumberOrText>,
    pub genre: Option<String>,
    pub sort: Option<String>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 50,
            total: 0,
            year: None,
            genre: None,
            sort: None,
        }
    }
}

impl Pagination {
    /// Number of pages needed to show `total` items, never less than one.
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 || self.total == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.limit));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Body of the paged list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviesResponse {
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Body of `/years/all`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct YearsResponse {
    #[serde(default)]
    pub years: Vec<i32>,
}

/// `/ratings/:id` has been seen returning both a bare array and a wrapped one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RatingsResponse {
    List(Vec<RatingEntry>),
    Wrapped { ratings: Vec<RatingEntry> },
}

impl RatingsResponse {
    pub(crate) fn into_vec(self) -> Vec<RatingEntry> {
        match self {
            Self::List(v) | Self::Wrapped { ratings: v } => v,
        }
    }
}

/// Sort direction for the by-year listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Query for `/movies/all`. Unset fields are left off the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieQuery {
    pub page: Option<u32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub search: Option<String>,
}

impl MovieQuery {
    /// Query pairs for the parameters that carry a value.
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(year) = self.year {
            pairs.push(("year", year.to_string()));
        }
        if let Some(genre) = self.genre.as_deref().filter(|g| !g.is_empty()) {
            pairs.push(("genre", genre.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHAWSHANK: &str = r#"{
        "imdbId": "tt0111161",
        "title": "The Shawshank Redemption",
        "genres": [{"id": 18, "name": "Drama"}, {"id": 80, "name": "Crime"}],
        "releaseDate": "1994-09-23",
        "budget": "$25,000,000.00",
        "description": "Two imprisoned men bond over a number of years.",
        "runtime": 142,
        "averageRating": 8.7,
        "originalLanguage": "en",
        "productionCompanies": [{"id": 97, "name": "Castle Rock Entertainment"}],
        "ratings": [
            {"source": "Internet Movie Database", "rating": "9.3/10"},
            {"source": "Metacritic", "rating": 82}
        ]
    }"#;

    #[test]
    fn test_movie_full_record() {
        let movie: Movie = serde_json::from_str(SHAWSHANK).unwrap();
        assert_eq!(movie.imdb_id, "tt0111161");
        assert_eq!(movie.genres.len(), 2);
        assert_eq!(movie.runtime, Some(NumberOrText::Number(142.0)));
        assert_eq!(movie.average_rating, Some(8.7));
        assert_eq!(movie.production_companies[0].name, "Castle Rock Entertainment");
        assert_eq!(
            movie.ratings[0].rating,
            NumberOrText::Text("9.3/10".to_string())
        );
        assert_eq!(movie.ratings[1].rating, NumberOrText::Number(82.0));
    }

    #[test]
    fn test_movie_minimal_record() {
        let movie: Movie =
            serde_json::from_str(r#"{"imdbId": "tt1", "title": "Short", "budget": null}"#).unwrap();
        assert!(movie.genres.is_empty());
        assert_eq!(movie.release_date, "");
        assert!(movie.budget.is_none());
        assert!(movie.average_rating.is_none());
        assert!(movie.ratings.is_empty());
    }

    #[test]
    fn test_movies_response_accepts_text_runtime() {
        let resp: MoviesResponse = serde_json::from_str(
            r#"{
                "movies": [
                    {"imdbId": "tt0111161", "title": "The Shawshank Redemption", "runtime": "142 min"},
                    {"imdbId": "tt0068646", "title": "The Godfather", "runtime": 175},
                    {"imdbId": "tt0000001", "title": "Unknown", "runtime": null}
                ],
                "pagination": {"page": 1, "limit": 50, "total": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(resp.movies.len(), 3);
        assert_eq!(
            resp.movies[0].runtime,
            Some(NumberOrText::Text("142 min".to_string()))
        );
        assert_eq!(resp.movies[1].runtime, Some(NumberOrText::Number(175.0)));
        assert_eq!(resp.movies[2].runtime, None);
    }

    #[test]
    fn test_rating_value_display() {
        assert_eq!(NumberOrText::Number(7.26).to_string(), "7.3");
        assert_eq!(NumberOrText::Number(82.0).to_string(), "82.0");
        assert_eq!(NumberOrText::Text("94%".into()).to_string(), "94%");
    }

    #[test]
    fn test_movies_response_missing_pagination_uses_defaults() {
        let resp: MoviesResponse = serde_json::from_str(r#"{"movies": []}"#).unwrap();
        assert_eq!(resp.pagination, Pagination::default());
    }

    #[test]
    fn test_pagination_echo_fields() {
        let p: Pagination = serde_json::from_str(
            r#"{"page": 2, "limit": 50, "total": 120, "year": "1994", "sort": "desc"}"#,
        )
        .unwrap();
        assert_eq!(p.year, Some(NumberOrText::Text("1994".into())));
        assert_eq!(p.sort.as_deref(), Some("desc"));
        assert!(p.genre.is_none());
    }

    #[test]
    fn test_total_pages() {
        let mut p = Pagination::default();
        assert_eq!(p.total_pages(), 1);
        p.total = 50;
        assert_eq!(p.total_pages(), 1);
        p.total = 51;
        assert_eq!(p.total_pages(), 2);
        p.limit = 0;
        assert_eq!(p.total_pages(), 1);
    }

    #[test]
    fn test_has_next_prev() {
        let p = Pagination {
            page: 2,
            total: 120,
            ..Pagination::default()
        };
        assert!(p.has_prev());
        assert!(p.has_next());

        let last = Pagination { page: 3, ..p };
        assert!(!last.has_next());
    }

    #[test]
    fn test_ratings_response_shapes() {
        let bare: RatingsResponse =
            serde_json::from_str(r#"[{"source": "IMDb", "rating": 9.3}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: RatingsResponse =
            serde_json::from_str(r#"{"ratings": [{"source": "IMDb", "rating": "9.3"}]}"#).unwrap();
        assert_eq!(wrapped.into_vec()[0].source, "IMDb");
    }

    #[test]
    fn test_movie_query_skips_empty_values() {
        let query = MovieQuery {
            page: Some(1),
            year: None,
            genre: Some(String::new()),
            search: Some("alien".into()),
        };
        assert_eq!(
            query.to_pairs(),
            vec![("page", "1".to_string()), ("search", "alien".to_string())]
        );
        assert!(MovieQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn test_sort_order_serde() {
        assert_eq!(serde_json::to_string(&SortOrder::Desc).unwrap(), "\"desc\"");
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
        assert_eq!(SortOrder::default().as_str(), "asc");
    }
}
