//! Read endpoints: the combined Gantt payload and the page context.

use axum::extract::{Query, State};
use axum::response::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GanttError;
use crate::gantt::{self, GanttData};
use crate::models::Project;
use crate::server::AppState;
use crate::store::{ProjectFilter, TaskPermission};

/// Projects shown in the page's filter dropdown.
const PAGE_CONTEXT_PROJECT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct GanttDataQuery {
    pub project: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// `GET /gantt/data` — the combined payload for one project and window.
pub async fn get_gantt_data(
    State(state): State<AppState>,
    Query(query): Query<GanttDataQuery>,
) -> Result<Json<GanttData>, GanttError> {
    let data = gantt::gantt_data(
        state.store.as_ref(),
        query.project.as_deref(),
        query.start_date,
        query.end_date,
    )
    .await?;

    info!(
        project = query.project.as_deref().unwrap_or("<all>"),
        tasks = data.tasks.len(),
        dependencies = data.dependencies.len(),
        resources = data.resources.len(),
        assignments = data.assignments.len(),
        "serving gantt payload"
    );
    Ok(Json(data))
}

/// Context consumed by the surrounding page renderer.
#[derive(Debug, Serialize, Deserialize)]
pub struct PageContext {
    pub projects: Vec<ProjectSummary>,
    pub can_write: bool,
    pub can_create: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub project_name: Option<String>,
    pub status: Option<String>,
}

impl From<Project> for ProjectSummary {
    fn from(project: Project) -> Self {
        Self {
            name: project.name,
            project_name: project.project_name,
            status: project.status,
        }
    }
}

/// `GET /gantt/page-context` — the last 100 non-cancelled projects (most
/// recently modified first) plus the caller's task permissions.
pub async fn get_page_context(
    State(state): State<AppState>,
) -> Result<Json<PageContext>, GanttError> {
    let projects = state
        .store
        .list_projects(&ProjectFilter {
            exclude_status: Some("Cancelled".to_string()),
            limit: Some(PAGE_CONTEXT_PROJECT_LIMIT),
            ..ProjectFilter::default()
        })
        .await?;

    let can_write = state
        .store
        .has_task_permission(TaskPermission::Write)
        .await?;
    let can_create = state
        .store
        .has_task_permission(TaskPermission::Create)
        .await?;

    Ok(Json(PageContext {
        projects: projects.into_iter().map(ProjectSummary::from).collect(),
        can_write,
        can_create,
    }))
}
