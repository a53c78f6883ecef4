use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

use marquee::api::MovieApi;
use marquee::app::{App, AppEvent};
use marquee::config::Config;
use marquee::persistence::{JsonListStore, ListKey};
use marquee::store::{Action, Store, ViewMode};
use marquee::theme::ThemeVariant;
use marquee::ui;

/// Get the config directory path (~/.config/marquee/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("marquee");
    Ok(config_dir)
}

/// Create `dir` if needed and restrict it to the current user.
fn ensure_private_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory '{}'", dir.display()))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(dir, perms) {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %e,
                        "Failed to set directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %dir.display(),
                    error = %e,
                    "Failed to read directory metadata"
                );
            }
        }
    }
    Ok(())
}

/// Send tracing output to `<data_dir>/marquee.log`; the terminal belongs to
/// the TUI. Filtering follows `RUST_LOG`, `info` when unset.
fn init_logging(data_dir: &Path) -> Result<()> {
    let log_path = data_dir.join("marquee.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "marquee", version, about = "Terminal movie catalog browser")]
struct Args {
    /// Config file (default: ~/.config/marquee/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Directory for favorites, watchlist and the log file
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Remove all favorites before starting
    #[arg(long)]
    clear_favorites: bool,

    /// Remove all watchlist entries before starting
    #[arg(long)]
    clear_watchlist: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    ensure_private_dir(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| config_dir.clone());
    ensure_private_dir(&data_dir)?;
    init_logging(&data_dir)?;
    tracing::info!(data_dir = %data_dir.display(), "Starting marquee");

    // Lists
    let lists = JsonListStore::open(&data_dir).context("Failed to open list storage")?;
    let (mut store, recovered) =
        Store::load(Box::new(lists)).context("Failed to read stored lists")?;

    if args.clear_favorites {
        store
            .dispatch(Action::ClearFavorites)
            .context("Failed to clear favorites")?;
        println!("Favorites cleared.");
    }
    if args.clear_watchlist {
        store
            .dispatch(Action::ClearWatchlist)
            .context("Failed to clear watchlist")?;
        println!("Watchlist cleared.");
    }

    // Backend
    let base_url = args.base_url.as_deref().unwrap_or(&config.base_url);
    let api = MovieApi::new(base_url, config.request_timeout())
        .with_context(|| format!("Invalid backend URL '{}'", base_url))?;

    let mut app = App::new(store, api);

    match ThemeVariant::from_str_name(&config.theme) {
        Some(variant) => app.set_theme(variant),
        None => tracing::warn!(theme = %config.theme, "Unknown theme in config, using dark"),
    }
    match ViewMode::from_str_name(&config.view_mode) {
        Some(mode) => app.dispatch(Action::SetViewMode(mode)),
        None => tracing::warn!(view_mode = %config.view_mode, "Unknown view mode in config"),
    }

    let warnings = app.keybindings.apply_overrides(&config.keybindings);
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Keybinding override skipped");
    }
    if !warnings.is_empty() {
        app.set_status(format!(
            "{} keybinding override(s) ignored, see marquee.log",
            warnings.len()
        ));
    }

    if !recovered.is_empty() {
        let names: Vec<&str> = recovered.iter().map(|r| r.key.as_str()).collect();
        app.set_status(format!(
            "Stored {} malformed, started empty (old file kept as .corrupt)",
            names.join(" and ")
        ));
    }
    tracing::debug!(
        favorites = app.state().lists.favorites.len(),
        watchlist = app.state().lists.watchlist.len(),
        lists = ?ListKey::ALL.map(ListKey::as_str),
        "Lists ready"
    );

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
