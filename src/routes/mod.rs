// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::cache::CachedQuery;
use crate::hub::Hub;
use crate::models::{ContainerInfo, ServiceUnit, SystemInfo};
use crate::store::RetentionStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) hub: Arc<Hub>,
    pub(crate) system_info: Arc<SystemInfo>,
    pub(crate) store: Arc<RetentionStore>,
    pub(crate) containers: Arc<CachedQuery<Vec<ContainerInfo>>>,
    pub(crate) services: Arc<CachedQuery<Vec<ServiceUnit>>>,
}

pub fn app(
    hub: Arc<Hub>,
    system_info: Arc<SystemInfo>,
    store: Arc<RetentionStore>,
    containers: Arc<CachedQuery<Vec<ContainerInfo>>>,
    services: Arc<CachedQuery<Vec<ServiceUnit>>>,
) -> Router {
    let state = AppState {
        hub,
        system_info,
        store,
        containers,
        services,
    };
    Router::new()
        .route("/", get(|| async { "GoPanel: hello from the Rust port!" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/info", get(http::api_info_handler)) // GET /api/info
        .route("/api/metrics/history", get(http::metrics_history_handler)) // GET /api/metrics/history?hours=
        .route("/api/docker/containers", get(http::docker_containers_handler)) // GET /api/docker/containers
        .route("/api/services", get(http::services_handler)) // GET /api/services
        .route("/ws/metrics", get(ws::ws_metrics)) // WS /ws/metrics
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
