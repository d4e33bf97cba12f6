//! Settings endpoints for the widget page.

use axum::extract::State;
use axum::response::Json;
use tracing::info;

use crate::error::GanttError;
use crate::handlers::WriteAck;
use crate::server::AppState;
use crate::settings::{GanttSettings, GanttSettingsRecord};

/// `GET /gantt/settings` — resolved settings, served from the cache.
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<GanttSettings>, GanttError> {
    Ok(Json(state.settings.get().await?))
}

/// `PUT /gantt/settings` — validate, persist, and invalidate the cache.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(record): Json<GanttSettingsRecord>,
) -> Result<Json<WriteAck>, GanttError> {
    state.settings.update(&record).await?;
    info!("gantt settings updated");
    Ok(Json(WriteAck::success("Settings updated successfully")))
}
