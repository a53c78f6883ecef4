//! Background task event processing.
//!
//! Applies `AppEvent`s sent by spawned fetch tasks to the application state.

use crate::app::{App, AppEvent, BackendStatus};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::FetchCompleted {
            kind,
            generation,
            result,
        } => {
            app.complete_fetch(kind, generation, result);
        }
        AppEvent::RatingsLoaded {
            imdb_id,
            generation,
            result,
        } => {
            app.complete_ratings(imdb_id, generation, result);
        }
        AppEvent::HeartbeatChecked(Ok(reply)) => {
            tracing::info!(reply = %reply, "Backend reachable");
            app.backend = BackendStatus::Online;
        }
        AppEvent::HeartbeatChecked(Err(error)) => {
            tracing::warn!(error = %error, "Backend heartbeat failed");
            app.set_status(format!("Backend unreachable: {}", error));
            app.backend = BackendStatus::Offline(error);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}
