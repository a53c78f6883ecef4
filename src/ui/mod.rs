//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `helpers` - Background fetch spawning and panic capture
//! - `render` - View rendering dispatch, header and overlays
//! - `movies` - Movie list widget
//! - `filters` - Filter panel widget
//! - `detail` - Movie detail widget
//! - `picker` - Genre and year pickers
//! - `lists` - Favorites and watchlist widget
//! - `status` - Status bar widget
//! - `help` - Keybinding help overlay

mod detail;
mod events;
mod filters;
mod help;
mod helpers;
mod input;
mod lists;
mod loop_runner;
mod movies;
mod picker;
mod render;
mod status;

pub use loop_runner::{run, Action};
