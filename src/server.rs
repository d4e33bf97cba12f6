//! HTTP server for the Gantt widget endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers::{data, settings, writeback};
use crate::settings::SettingsProvider;
use crate::store::HostStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Config,
    /// Host store access.
    pub store: Arc<dyn HostStore>,
    /// Cached settings access.
    pub settings: Arc<SettingsProvider>,
}

/// Build the HTTP router for the gantt-bridge service.
pub fn build_router(state: AppState) -> Router {
    let cors = state
        .config
        .allowed_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
        .map_or_else(CorsLayer::permissive, |origin| {
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any)
        });

    Router::new()
        // Widget read endpoints
        .route("/gantt/data", get(data::get_gantt_data))
        .route("/gantt/page-context", get(data::get_page_context))
        // Write-back endpoints driven by widget interaction
        .route(
            "/gantt/tasks/{task_id}/dates",
            post(writeback::update_task_dates),
        )
        .route(
            "/gantt/tasks/{task_id}/progress",
            post(writeback::update_task_progress),
        )
        .route("/gantt/dependencies", post(writeback::create_task_dependency))
        // Settings
        .route(
            "/gantt/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness check endpoint.
async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    if state.config.frappe_url.is_empty() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({ "status": "ready" })))
}
