//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

use crate::format::RatingTier;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Movie list --
    pub movie_normal: Style,
    pub movie_selected: Style,
    pub movie_year: Style,
    pub movie_genres: Style,
    pub movie_favorite: Style,
    pub movie_watchlist: Style,

    // -- Ratings --
    pub rating_high: Style,
    pub rating_mid: Style,
    pub rating_low: Style,
    pub rating_none: Style,

    // -- Detail --
    pub detail_title: Style,
    pub detail_label: Style,
    pub detail_body: Style,
    pub detail_metadata: Style,

    // -- Filters --
    pub filter_label: Style,
    pub filter_value: Style,
    pub filter_active: Style,

    // -- Chrome --
    pub header: Style,
    pub status_bar: Style,
    pub error: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            // Movie list
            movie_normal: Style::default(),
            movie_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            movie_year: Style::default().fg(Color::DarkGray),
            movie_genres: Style::default().fg(Color::Cyan),
            movie_favorite: Style::default().fg(Color::Red),
            movie_watchlist: Style::default().fg(Color::Yellow),

            // Ratings
            rating_high: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            rating_mid: Style::default().fg(Color::Yellow),
            rating_low: Style::default().fg(Color::Red),
            rating_none: Style::default().fg(Color::DarkGray),

            // Detail
            detail_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            detail_label: Style::default().add_modifier(Modifier::BOLD),
            detail_body: Style::default(),
            detail_metadata: Style::default().fg(Color::DarkGray),

            // Filters
            filter_label: Style::default().fg(Color::Gray),
            filter_value: Style::default(),
            filter_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),

            // Chrome
            header: Style::default().add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            error: Style::default().fg(Color::Red),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
        }
    }

    /// Light palette, adapted for light terminal backgrounds.
    fn light() -> Self {
        Self {
            // Movie list
            movie_normal: Style::default().fg(Color::Black),
            movie_selected: Style::default().bg(Color::Blue).fg(Color::White),
            movie_year: Style::default().fg(Color::DarkGray),
            movie_genres: Style::default().fg(Color::Blue),
            movie_favorite: Style::default().fg(Color::Red),
            movie_watchlist: Style::default().fg(Color::Magenta),

            // Ratings
            rating_high: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            rating_mid: Style::default().fg(Color::Magenta),
            rating_low: Style::default().fg(Color::Red),
            rating_none: Style::default().fg(Color::DarkGray),

            // Detail
            detail_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            detail_label: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default().fg(Color::Black),
            detail_metadata: Style::default().fg(Color::DarkGray),

            // Filters
            filter_label: Style::default().fg(Color::DarkGray),
            filter_value: Style::default().fg(Color::Black),
            filter_active: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),

            // Chrome
            header: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            error: Style::default().fg(Color::Red),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup.
///
/// Built from a `ColorPalette`, this allows resolving role names (e.g.
/// `"rating_high"`) to their concrete `Style` at runtime.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 22] = [
    "movie_normal",
    "movie_selected",
    "movie_year",
    "movie_genres",
    "movie_favorite",
    "movie_watchlist",
    "rating_high",
    "rating_mid",
    "rating_low",
    "rating_none",
    "detail_title",
    "detail_label",
    "detail_body",
    "detail_metadata",
    "filter_label",
    "filter_value",
    "filter_active",
    "header",
    "status_bar",
    "error",
    "panel_border",
    "panel_border_focused",
];

impl StyleMap {
    /// Build a `StyleMap` from a `ColorPalette`.
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 22] = [
            p.movie_normal,
            p.movie_selected,
            p.movie_year,
            p.movie_genres,
            p.movie_favorite,
            p.movie_watchlist,
            p.rating_high,
            p.rating_mid,
            p.rating_low,
            p.rating_none,
            p.detail_title,
            p.detail_label,
            p.detail_body,
            p.detail_metadata,
            p.filter_label,
            p.filter_value,
            p.filter_active,
            p.header,
            p.status_bar,
            p.error,
            p.panel_border,
            p.panel_border_focused,
        ];

        let mut map = HashMap::with_capacity(ROLE_NAMES.len());
        for (name, style) in ROLE_NAMES.iter().zip(styles.iter()) {
            map.insert(*name, *style);
        }

        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

/// Role name used to color a rating of the given tier.
pub fn rating_role(tier: RatingTier) -> &'static str {
    match tier {
        RatingTier::High => "rating_high",
        RatingTier::Mid => "rating_mid",
        RatingTier::Low => "rating_low",
        RatingTier::None => "rating_none",
    }
}

// ============================================================================
// Tests
// ============================================================================
