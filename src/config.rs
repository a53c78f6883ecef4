//! Configuration file parser for ~/.config/marquee/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Backend address used when neither config nor CLI provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the movie backend, without a trailing path.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Movie list layout ("compact" or "detailed").
    pub view_mode: String,

    /// Directory holding the favorites/watchlist entries and the log file.
    /// Defaults to the config directory.
    pub data_dir: Option<PathBuf>,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
            theme: "dark".to_string(),
            view_mode: "compact".to_string(),
            data_dir: None,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "base_url",
        "request_timeout_secs",
        "theme",
        "view_mode",
        "data_dir",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            base_url = %config.base_url,
            theme = %config.theme,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Request timeout as a `Duration`. A zero value falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        if self.request_timeout_secs == 0 {
            Duration::from_secs(Self::default().request_timeout_secs)
        } else {
            Duration::from_secs(self.request_timeout_secs)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(test_name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("marquee_config_test_{}", test_name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.theme, "dark");
        assert_eq!(config.view_mode, "compact");
        assert!(config.data_dir.is_none());
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/marquee_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let (dir, path) = write_config("empty", "");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 10);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "base_url = \"http://movies.lan:8080\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "http://movies.lan:8080");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.theme, "dark");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
base_url = "https://api.example.com"
request_timeout_secs = 3
theme = "light"
view_mode = "detailed"
data_dir = "/var/lib/marquee"

[keybindings]
quit = "Ctrl+q"
toggle_favorite = "F2"
"#;
        let (dir, path) = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.theme, "light");
        assert_eq!(config.view_mode, "detailed");
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/marquee")));
        assert_eq!(
            config.keybindings.get("quit").map(String::as_str),
            Some("Ctrl+q")
        );
        assert_eq!(
            config.keybindings.get("toggle_favorite").map(String::as_str),
            Some("F2")
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
theme = "dark"
poster_cache = true
"#;
        let (dir, path) = write_config("unknown", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "request_timeout_secs = \"soon\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_timeout_falls_back() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(10));

        let config = Config {
            request_timeout_secs: 4,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(4));
    }
}
