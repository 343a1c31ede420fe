// GET handlers: version, info, history, cached listings

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/info — static system identity (also the WS welcome payload).
pub(super) async fn api_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.system_info.as_ref().clone())
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    #[serde(default = "default_hours")]
    hours: u32,
}

fn default_hours() -> u32 {
    24
}

/// GET /api/metrics/history?hours=24 — stored snapshots, oldest first.
pub(super) async fn metrics_history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    match state.store.query_range(query.hours).await {
        Ok(snapshots) => axum::Json(snapshots).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "query_range", "history query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /api/docker/containers — last-good listing from the refresh cache.
/// Never shells out; `error` is set when the last refresh failed.
pub(super) async fn docker_containers_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.containers.get())
}

/// GET /api/services — last-good systemd listing from the refresh cache.
pub(super) async fn services_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.services.get())
}
