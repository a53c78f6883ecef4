//! Utility functions for common operations.
//!
//! - **Text processing**: Unicode-aware width calculation, truncation and
//!   stripping of terminal control sequences from backend-provided text
//!
//! # Examples
//!
//! ```
//! use marquee::util::{display_width, strip_control_chars, truncate_to_width};
//!
//! let title = strip_control_chars("Blade Runner\x1b[0m");
//! assert_eq!(display_width(&title), 12);
//! assert_eq!(truncate_to_width(&title, 8), "Blade...");
//! ```

mod text;

pub use text::{display_width, strip_control_chars, truncate_to_width};

/// Maximum allowed search query length in bytes
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
