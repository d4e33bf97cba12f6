//! Read operations against the host store.
//!
//! Four independent fetchers, each a pure read with optional project and
//! date-window filters. Dependency and assignment rows are project-scoped
//! indirectly: the project's task ids are resolved first, then rows are
//! kept when their owning task is in that set.

use chrono::NaiveDate;

use crate::error::GanttError;
use crate::models::{Project, Task, TaskAssignment, TaskDependsOn, User};
use crate::store::{HostStore, ProjectFilter, TaskFilter};

/// Projects, optionally restricted to one id and/or an expected-start window.
pub async fn fetch_projects(
    store: &dyn HostStore,
    project: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<Project>, GanttError> {
    let filter = ProjectFilter {
        name: project.map(str::to_owned),
        starts_within: start.zip(end),
        ..ProjectFilter::default()
    };
    store.list_projects(&filter).await
}

/// Tasks, optionally restricted to one project and/or an expected-start
/// window.
pub async fn fetch_tasks(
    store: &dyn HostStore,
    project: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<Task>, GanttError> {
    let filter = TaskFilter {
        project: project.map(str::to_owned),
        starts_within: start.zip(end),
    };
    store.list_tasks(&filter).await
}

/// Dependency edges, scoped to a project's tasks when a project is given.
pub async fn fetch_dependencies(
    store: &dyn HostStore,
    project: Option<&str>,
) -> Result<Vec<TaskDependsOn>, GanttError> {
    match resolve_project_tasks(store, project).await? {
        Some(task_ids) => store.list_dependencies(Some(&task_ids)).await,
        None => store.list_dependencies(None).await,
    }
}

/// Assignment rows, scoped the same way as dependencies.
pub async fn fetch_assignments(
    store: &dyn HostStore,
    project: Option<&str>,
) -> Result<Vec<TaskAssignment>, GanttError> {
    match resolve_project_tasks(store, project).await? {
        Some(task_ids) => store.list_assignments(Some(&task_ids)).await,
        None => store.list_assignments(None).await,
    }
}

/// All enabled interactive users; resources are never project-scoped.
pub async fn fetch_resources(store: &dyn HostStore) -> Result<Vec<User>, GanttError> {
    store.list_resources().await
}

/// Task ids belonging to `project`, or `None` when no project filter applies.
async fn resolve_project_tasks(
    store: &dyn HostStore,
    project: Option<&str>,
) -> Result<Option<Vec<String>>, GanttError> {
    let Some(project) = project else {
        return Ok(None);
    };
    let tasks = store
        .list_tasks(&TaskFilter {
            project: Some(project.to_owned()),
            starts_within: None,
        })
        .await?;
    Ok(Some(tasks.into_iter().map(|t| t.name).collect()))
}
