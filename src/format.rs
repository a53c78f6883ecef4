//! Display helpers for movie fields.
//!
//! Pure string formatting shared by the list, detail and header views. None of
//! these touch terminal styling; colors are chosen by the caller from
//! `RatingTier` via the theme.

use chrono::NaiveDate;

use crate::api::{Genre, NumberOrText};

/// Shown wherever a field has no value.
pub const NOT_AVAILABLE: &str = "N/A";

/// How many genre names are shown before collapsing the rest into `+N`.
const GENRE_CHIP_LIMIT: usize = 2;

/// The leading four-digit year of a release date, if there is one.
pub fn release_year(release_date: &str) -> Option<&str> {
    let year = release_date.get(..4)?;
    year.bytes().all(|b| b.is_ascii_digit()).then_some(year)
}

/// `1994-09-23` → `September 23, 1994`.
///
/// Accepts a bare date or a timestamp with a date prefix. Anything else is
/// returned unchanged; an empty date is `N/A`.
pub fn long_date(release_date: &str) -> String {
    let trimmed = release_date.trim();
    if trimmed.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// A rating of zero is treated as no rating at all.
fn present(rating: Option<f64>) -> Option<f64> {
    rating.filter(|r| r.is_finite() && *r > 0.0)
}

/// `8.7/10`, or `N/A` when the movie has no rating.
pub fn rating_label(rating: Option<f64>) -> String {
    match present(rating) {
        Some(r) => format!("{:.1}/10", r),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Short form for list rows: `8.7`, or `-`.
pub fn rating_short(rating: Option<f64>) -> String {
    match present(rating) {
        Some(r) => format!("{:.1}", r),
        None => "-".to_string(),
    }
}

/// Color band for an average rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTier {
    None,
    High,
    Mid,
    Low,
}

impl RatingTier {
    pub fn of(rating: Option<f64>) -> Self {
        match present(rating) {
            None => Self::None,
            Some(r) if r >= 8.0 => Self::High,
            Some(r) if r >= 6.0 => Self::Mid,
            Some(_) => Self::Low,
        }
    }
}

/// The budget string, unless it is missing, blank or the backend's `N/A`.
pub fn budget_label(budget: Option<&str>) -> Option<&str> {
    budget
        .map(str::trim)
        .filter(|b| !b.is_empty() && *b != NOT_AVAILABLE)
}

/// First two genre names, then `+N` for the rest.
///
/// `[Drama, Crime, Thriller, Mystery]` → `Drama, Crime +2`
pub fn genre_chips(genres: &[Genre]) -> String {
    let mut out = genres
        .iter()
        .take(GENRE_CHIP_LIMIT)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if genres.len() > GENRE_CHIP_LIMIT {
        out.push_str(&format!(" +{}", genres.len() - GENRE_CHIP_LIMIT));
    }
    out
}

/// `142` → `142 min`; text from the backend is shown as sent.
pub fn runtime_label(runtime: Option<&NumberOrText>) -> String {
    match runtime {
        Some(NumberOrText::Number(minutes)) if minutes.is_finite() && *minutes > 0.0 => {
            format!("{} min", minutes.round() as u64)
        }
        Some(NumberOrText::Text(text)) if !text.trim().is_empty() => text.trim().to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn language_label(language: Option<&str>) -> &str {
    language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

/// Header line: catalog total plus local list sizes.
pub fn totals_line(total_movies: u64, favorites: usize, watchlist: usize) -> String {
    format!(
        "{} movies | {} favorites | {} watchlist",
        total_movies, favorites, watchlist
    )
}
