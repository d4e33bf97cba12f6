//! Write-back endpoints driven by user interaction in the widget.
//!
//! All three require write permission on the Task entity, checked before
//! any mutation; a failed request leaves no partial state behind.

use axum::extract::{Path, State};
use axum::response::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::GanttError;
use crate::handlers::WriteAck;
use crate::server::AppState;
use crate::store::{HostStore, TaskPermission};
use crate::transform::DEPENDENCY_FINISH_TO_START;

#[derive(Debug, Deserialize)]
pub struct UpdateTaskDatesRequest {
    pub start_date: String,
    pub end_date: String,
}

/// `POST /gantt/tasks/{task_id}/dates` — persist a date drag.
pub async fn update_task_dates(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskDatesRequest>,
) -> Result<Json<WriteAck>, GanttError> {
    ensure_write_permission(state.store.as_ref()).await?;

    let start = parse_date(&request.start_date)?;
    let end = parse_date(&request.end_date)?;
    state.store.update_task_dates(&task_id, start, end).await?;

    info!(task = %task_id, %start, %end, "task dates updated");
    Ok(Json(WriteAck::success("Task dates updated successfully")))
}

/// The widget posts progress as a number; some host forms post it as a
/// numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProgressValue {
    Number(f64),
    Text(String),
}

impl ProgressValue {
    fn to_f64(&self) -> Result<f64, GanttError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| GanttError::Validation(format!("Invalid progress value: {text}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskProgressRequest {
    pub progress: ProgressValue,
}

/// `POST /gantt/tasks/{task_id}/progress` — persist a progress edit.
pub async fn update_task_progress(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskProgressRequest>,
) -> Result<Json<WriteAck>, GanttError> {
    ensure_write_permission(state.store.as_ref()).await?;

    let progress = request.progress.to_f64()?;
    state.store.update_task_progress(&task_id, progress).await?;

    info!(task = %task_id, progress, "task progress updated");
    Ok(Json(WriteAck::success("Task progress updated successfully")))
}

fn default_dependency_type() -> u8 {
    DEPENDENCY_FINISH_TO_START
}

#[derive(Debug, Deserialize)]
pub struct CreateDependencyRequest {
    pub from_task: String,
    pub to_task: String,
    #[serde(default = "default_dependency_type")]
    pub dependency_type: u8,
}

/// `POST /gantt/dependencies` — persist a dependency drawn in the widget.
///
/// Idempotent: an edge that already exists is acknowledged with
/// `status = "exists"` and nothing is written.
pub async fn create_task_dependency(
    State(state): State<AppState>,
    Json(request): Json<CreateDependencyRequest>,
) -> Result<Json<WriteAck>, GanttError> {
    ensure_write_permission(state.store.as_ref()).await?;

    if request.dependency_type != DEPENDENCY_FINISH_TO_START {
        // The host only models finish-to-start; other types are stored the same way.
        debug!(
            dependency_type = request.dependency_type,
            "non finish-to-start dependency type requested"
        );
    }

    if state
        .store
        .dependency_exists(&request.to_task, &request.from_task)
        .await?
    {
        return Ok(Json(WriteAck::exists("Dependency already exists")));
    }

    state
        .store
        .append_dependency(&request.to_task, &request.from_task)
        .await?;

    info!(
        from = %request.from_task,
        to = %request.to_task,
        "task dependency created"
    );
    Ok(Json(WriteAck::success("Dependency created successfully")))
}

async fn ensure_write_permission(store: &dyn HostStore) -> Result<(), GanttError> {
    if store.has_task_permission(TaskPermission::Write).await? {
        Ok(())
    } else {
        Err(GanttError::PermissionDenied(
            "caller lacks write permission on tasks".to_string(),
        ))
    }
}

/// Accept the date shapes the widget sends: a bare date, an RFC 3339
/// datetime, or a `YYYY-MM-DD HH:MM:SS` datetime.
fn parse_date(value: &str) -> Result<NaiveDate, GanttError> {
    let value = value.trim();
    if let Ok(date) = value.parse::<NaiveDate>() {
        return Ok(date);
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime.date());
    }
    Err(GanttError::Validation(format!("Invalid date: {value}")))
}
