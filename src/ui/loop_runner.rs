//! Main event loop for the TUI.
//!
//! This module contains the core event loop that multiplexes terminal input,
//! background fetch events, and periodic ticks.

use crate::app::{App, AppEvent, RatingsState};
use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::helpers::spawn_startup_fetches;
use super::input::handle_input;
use super::render::render;

/// Result of handling a key press event.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` to multiplex three event sources:
/// - **Terminal input**: Key presses from crossterm's async event stream
/// - **Background tasks**: Fetch results via the `AppEvent` channel
/// - **Periodic tick**: 250ms timer for status expiry and the loading spinner
///
/// The initial page, genres, years and heartbeat are requested before the
/// first frame is drawn.
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    // On non-Unix platforms these become pending futures that never complete
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    spawn_startup_fetches(app, &event_tx);

    loop {
        // Only render when state has changed
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain pending fetch results before handling more input
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                        app.needs_redraw = true;
                        if let Action::Quit = handle_input(app, key.code, key.modifiers, &event_tx) {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => {
                        tracing::info!("Terminal event stream closed");
                        break;
                    }
                    _ => {}
                }
            }

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event);
            }

            _ = tick_interval.tick() => {
                handle_tick(app);
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Number of frames in the loading spinner animation.
pub(super) const SPINNER_FRAMES: usize = 10;

/// Advance the spinner while anything is loading.
fn handle_tick(app: &mut App) {
    let ratings_loading = matches!(app.ratings, RatingsState::Loading { .. });
    if app.state().movies.loading() || ratings_loading {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
