use std::sync::Arc;

use anchorcast_core::anchors::AnchorRecord;
use anchorcast_core::catalog::ModelDescriptor;
use anchorcast_core::mapping::ObjectMapping;
use anchorcast_core::HubStatus;
use axum::{
    extract::{Path, State},
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    ws::websocket_handler,
};

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn readyz() -> &'static str {
    "ok"
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<HubStatus> {
    Json(state.hub.status())
}

async fn list_anchors(State(state): State<Arc<AppState>>) -> Json<Vec<AnchorRecord>> {
    Json(state.hub.anchors())
}

async fn get_anchor(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<String>,
) -> ApiResult<Json<AnchorRecord>> {
    state
        .hub
        .anchor(&node_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Anchor '{node_id}' not found")))
}

async fn list_catalog(State(state): State<Arc<AppState>>) -> Json<Vec<ModelDescriptor>> {
    Json(state.hub.catalog())
}

async fn list_mappings(State(state): State<Arc<AppState>>) -> Json<Vec<ObjectMapping>> {
    Json(state.hub.mappings())
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/status", get(get_status))
        .route("/anchors", get(list_anchors))
        .route("/anchors/{node_id}", get(get_anchor))
        .route("/catalog", get(list_catalog))
        .route("/mappings", get(list_mappings));

    Router::new()
        // AR clients and the visualiser connect to the bare host.
        .route("/", get(websocket_handler))
        .route("/ws", get(websocket_handler))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
