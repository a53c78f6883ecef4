//! Terminal movie catalog browser.
//!
//! - `api` - HTTP client for the movie backend
//! - `store` - state tree, actions and reducer behind an injected `Store`
//! - `persistence` - favorites/watchlist storage
//! - `app` / `ui` - the TUI

pub mod api;
pub mod app;
pub mod config;
pub mod format;
pub mod keybindings;
pub mod persistence;
pub mod store;
pub mod theme;
pub mod ui;
pub mod util;
