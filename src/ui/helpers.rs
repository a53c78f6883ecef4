//! Helper functions for UI operations.
//!
//! Background task spawning lives here: every fetch runs on its own tokio
//! task, wrapped in `catch_task_panic`, and reports back over the
//! `AppEvent` channel.

use crate::app::{App, AppEvent, FetchRequest};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// A panicking background task would otherwise vanish inside the runtime and
/// leave its slot marked as loading forever.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}

/// Start `request` in the background.
///
/// Marks the slot pending (superseding and aborting any earlier fetch for the
/// same slot) and sends `AppEvent::FetchCompleted` when done. A panic is
/// reported as `TaskPanicked` followed by a failed completion without a
/// message, so the slot still settles with its default error.
pub(super) fn spawn_fetch(app: &mut App, request: FetchRequest, event_tx: &mpsc::Sender<AppEvent>) {
    let kind = request.kind();
    let generation = app.begin_fetch(kind);
    let api = app.api.clone();
    let tx = event_tx.clone();
    tracing::debug!(kind = kind.name(), generation, "Spawning fetch");

    let handle = tokio::spawn(async move {
        let result = match catch_task_panic(request.execute(&api)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(panic_msg) => {
                tracing::error!(task = kind.name(), error = %panic_msg, "Background task panicked");
                send_event(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: kind.name(),
                        error: panic_msg,
                    },
                    "TaskPanicked",
                )
                .await;
                Err(String::new())
            }
        };
        send_event(
            &tx,
            AppEvent::FetchCompleted {
                kind,
                generation,
                result,
            },
            "FetchCompleted",
        )
        .await;
    });
    app.fetch_handles.insert(kind.slot(), handle);
}

/// Load external ratings for the movie on the detail view.
pub(super) fn spawn_ratings(app: &mut App, imdb_id: String, event_tx: &mpsc::Sender<AppEvent>) {
    let generation = app.begin_ratings(imdb_id.clone());
    let api = app.api.clone();
    let tx = event_tx.clone();
    tracing::debug!(imdb_id = %imdb_id, generation, "Loading ratings");

    let handle = tokio::spawn(async move {
        let result = match catch_task_panic(api.ratings(&imdb_id)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(panic_msg) => {
                tracing::error!(task = "ratings", error = %panic_msg, "Background task panicked");
                send_event(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "ratings",
                        error: panic_msg.clone(),
                    },
                    "TaskPanicked",
                )
                .await;
                Err(panic_msg)
            }
        };
        send_event(
            &tx,
            AppEvent::RatingsLoaded {
                imdb_id,
                generation,
                result,
            },
            "RatingsLoaded",
        )
        .await;
    });
    app.ratings_handle = Some(handle);
}

/// Probe the backend once; the result drives the header indicator.
pub(super) fn spawn_heartbeat(app: &App, event_tx: &mpsc::Sender<AppEvent>) {
    let api = app.api.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let result = match catch_task_panic(api.heartbeat()).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(panic_msg) => Err(panic_msg),
        };
        send_event(&tx, AppEvent::HeartbeatChecked(result), "HeartbeatChecked").await;
    });
}

/// Kick off the initial loads: heartbeat, first page, genres and years.
pub(super) fn spawn_startup_fetches(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    spawn_heartbeat(app, event_tx);
    let first_page = app.listing_request(1);
    spawn_fetch(app, first_page, event_tx);
    spawn_fetch(app, FetchRequest::Genres, event_tx);
    spawn_fetch(app, FetchRequest::Years, event_tx);
}
