//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::SecondsFormat;

use crate::state::AppState;

/// Liveness: the process is serving requests.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: a catalog snapshot is loaded.
///
/// The body summarizes the last load: item count, sources that failed or
/// were served from cache, and when the snapshot was built.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.snapshot() {
        Ok(snapshot) => (
            StatusCode::OK,
            format!(
                "ready: {} items\nsources: {} ({} failed, {} cached)\nloaded: {}",
                snapshot.catalog.len(),
                snapshot.report.sources.len(),
                snapshot.report.failed(),
                snapshot.report.cached(),
                snapshot.loaded_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {e}")),
    }
}
