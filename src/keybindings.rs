//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data, keyed by (context, key). A context-specific binding wins
//! over a Global one, so the same key can mean different things per view.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    Back,
    Select,
    NextPage,
    PrevPage,
    Refresh,
    ToggleFavorite,
    ToggleWatchlist,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    ToggleFilterPanel,
    FilterPrev,
    FilterNext,
    ClearFilters,
    ToggleSort,
    ShowMovies,
    ShowFavorites,
    ShowWatchlist,
    ShowGenres,
    ShowYears,
    ClearList,
    LoadRatings,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    ToggleViewMode,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::Back => "Go back / dismiss",
            Self::Select => "Open selected item",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::Refresh => "Reload current listing",
            Self::ToggleFavorite => "Toggle favorite",
            Self::ToggleWatchlist => "Toggle watchlist",
            Self::EnterSearch => "Search movies",
            Self::ExitSearch => "Cancel search",
            Self::CommitSearch => "Run search",
            Self::ToggleFilterPanel => "Toggle filter panel",
            Self::FilterPrev => "Previous filter value",
            Self::FilterNext => "Next filter value",
            Self::ClearFilters => "Clear filters",
            Self::ToggleSort => "Toggle sort order",
            Self::ShowMovies => "Show all movies",
            Self::ShowFavorites => "Show favorites",
            Self::ShowWatchlist => "Show watchlist",
            Self::ShowGenres => "Browse by genre",
            Self::ShowYears => "Browse by year",
            Self::ClearList => "Clear this list",
            Self::LoadRatings => "Load external ratings",
            Self::ScrollDown => "Scroll down one line",
            Self::ScrollUp => "Scroll up one line",
            Self::PageDown => "Scroll down one page",
            Self::PageUp => "Scroll up one page",
            Self::ToggleViewMode => "Toggle compact/detailed rows",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    MovieList,
    Filters,
    Detail,
    Picker,
    SavedList,
    Search,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right",
///   "Backspace", "Delete", "PageUp", "PageDown", "Space"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| KeySpec::ctrl(c));
    }

    // Named keys (case-insensitive)
    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    // Function keys
    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| KeySpec::char(c))
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action::*;
        use Context::*;

        // === Global ===
        self.bind(Global, KeySpec::char('q'), Quit);
        self.bind(Global, KeySpec::char('j'), NavDown);
        self.bind(Global, KeySpec::plain(KeyCode::Down), NavDown);
        self.bind(Global, KeySpec::char('k'), NavUp);
        self.bind(Global, KeySpec::plain(KeyCode::Up), NavUp);
        self.bind(Global, KeySpec::plain(KeyCode::Esc), Back);
        self.bind(Global, KeySpec::plain(KeyCode::Enter), Select);
        self.bind(Global, KeySpec::char('f'), ToggleFavorite);
        self.bind(Global, KeySpec::char('w'), ToggleWatchlist);
        self.bind(Global, KeySpec::char('/'), EnterSearch);
        self.bind(Global, KeySpec::char('1'), ShowMovies);
        self.bind(Global, KeySpec::char('2'), ShowFavorites);
        self.bind(Global, KeySpec::char('3'), ShowWatchlist);
        self.bind(Global, KeySpec::char('g'), ShowGenres);
        self.bind(Global, KeySpec::char('y'), ShowYears);
        self.bind(Global, KeySpec::char('v'), ToggleViewMode);
        self.bind(Global, KeySpec::char('T'), CycleTheme);
        self.bind(Global, KeySpec::char('?'), ShowHelp);

        // === Movie list ===
        self.bind(MovieList, KeySpec::char('n'), NextPage);
        self.bind(MovieList, KeySpec::plain(KeyCode::PageDown), NextPage);
        self.bind(MovieList, KeySpec::char('p'), PrevPage);
        self.bind(MovieList, KeySpec::plain(KeyCode::PageUp), PrevPage);
        self.bind(MovieList, KeySpec::char('r'), Refresh);
        self.bind(MovieList, KeySpec::char('F'), ToggleFilterPanel);
        self.bind(MovieList, KeySpec::char('c'), ClearFilters);
        self.bind(MovieList, KeySpec::char('s'), ToggleSort);

        // === Filter panel ===
        self.bind(Filters, KeySpec::char('h'), FilterPrev);
        self.bind(Filters, KeySpec::plain(KeyCode::Left), FilterPrev);
        self.bind(Filters, KeySpec::char('l'), FilterNext);
        self.bind(Filters, KeySpec::plain(KeyCode::Right), FilterNext);
        self.bind(Filters, KeySpec::char('c'), ClearFilters);
        self.bind(Filters, KeySpec::char('F'), ToggleFilterPanel);
        self.bind(Filters, KeySpec::plain(KeyCode::Tab), ToggleFilterPanel);

        // === Detail ===
        self.bind(Detail, KeySpec::char('j'), ScrollDown);
        self.bind(Detail, KeySpec::plain(KeyCode::Down), ScrollDown);
        self.bind(Detail, KeySpec::char('k'), ScrollUp);
        self.bind(Detail, KeySpec::plain(KeyCode::Up), ScrollUp);
        self.bind(Detail, KeySpec::ctrl('d'), PageDown);
        self.bind(Detail, KeySpec::ctrl('u'), PageUp);
        self.bind(Detail, KeySpec::char('b'), Back);
        self.bind(Detail, KeySpec::char('R'), LoadRatings);
        self.bind(Detail, KeySpec::char('r'), Refresh);

        // === Genre / year pickers ===
        self.bind(Picker, KeySpec::char('r'), Refresh);

        // === Favorites / watchlist ===
        self.bind(SavedList, KeySpec::char('D'), ClearList);

        // === Search input ===
        self.bind(Search, KeySpec::plain(KeyCode::Esc), ExitSearch);
        self.bind(Search, KeySpec::plain(KeyCode::Enter), CommitSearch);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "nav_down").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // Sorted so repeated runs produce the same warnings and bindings
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            // Re-bind in every context the action had, with the new key
            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global. Search
    /// never falls back: every other key there is text input.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Shifted characters already carry their case
        let modifiers = match code {
            KeyCode::Char(_) => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global && context != Context::Search {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// First key bound to `action` in `context` (or Global), for hint text.
    pub fn key_hint(&self, action: Action, context: Context) -> Option<String> {
        self.bindings
            .iter()
            .find(|(c, _, a)| *a == action && *c == context)
            .or_else(|| {
                self.bindings
                    .iter()
                    .find(|(c, _, a)| *a == action && *c == Context::Global)
            })
            .map(|(_, key, _)| format_key(key))
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    let action = match name.to_lowercase().replace('-', "_").as_str() {
        "quit" => Action::Quit,
        "nav_down" | "down" => Action::NavDown,
        "nav_up" | "up" => Action::NavUp,
        "back" => Action::Back,
        "select" | "open" => Action::Select,
        "next_page" => Action::NextPage,
        "prev_page" | "previous_page" => Action::PrevPage,
        "refresh" | "reload" => Action::Refresh,
        "toggle_favorite" | "favorite" => Action::ToggleFavorite,
        "toggle_watchlist" | "watchlist" => Action::ToggleWatchlist,
        "enter_search" | "search" => Action::EnterSearch,
        "exit_search" => Action::ExitSearch,
        "commit_search" => Action::CommitSearch,
        "toggle_filter_panel" | "filters" => Action::ToggleFilterPanel,
        "filter_prev" => Action::FilterPrev,
        "filter_next" => Action::FilterNext,
        "clear_filters" => Action::ClearFilters,
        "toggle_sort" | "sort" => Action::ToggleSort,
        "show_movies" | "movies" => Action::ShowMovies,
        "show_favorites" | "favorites" => Action::ShowFavorites,
        "show_watchlist" => Action::ShowWatchlist,
        "show_genres" | "genres" => Action::ShowGenres,
        "show_years" | "years" => Action::ShowYears,
        "clear_list" => Action::ClearList,
        "load_ratings" | "ratings" => Action::LoadRatings,
        "scroll_down" => Action::ScrollDown,
        "scroll_up" => Action::ScrollUp,
        "page_down" => Action::PageDown,
        "page_up" => Action::PageUp,
        "toggle_view_mode" | "view_mode" => Action::ToggleViewMode,
        "cycle_theme" | "theme" => Action::CycleTheme,
        "show_help" | "help" => Action::ShowHelp,
        _ => return None,
    };
    Some(action)
}

// ============================================================================
// Tests
// ============================================================================
