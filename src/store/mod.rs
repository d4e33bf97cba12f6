//! Host store abstraction.
//!
//! The bridge never owns storage: every record lives in the host platform's
//! document store. [`HostStore`] is the generic query/save seam, with a REST
//! client implementation ([`frappe::FrappeStore`]) and an in-memory
//! implementation ([`memory::MemoryStore`]) for tests and local development.

pub mod frappe;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::GanttError;
use crate::models::{Project, Task, TaskAssignment, TaskDependsOn, User};
use crate::settings::GanttSettingsRecord;

/// Filter parameters for project list queries.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Exact project id.
    pub name: Option<String>,
    /// Keep projects whose expected start date falls within the inclusive
    /// range.
    pub starts_within: Option<(NaiveDate, NaiveDate)>,
    /// Drop projects with this status.
    pub exclude_status: Option<String>,
    /// Cap the result; when set, results are ordered most-recently-modified
    /// first instead of by id.
    pub limit: Option<usize>,
}

/// Filter parameters for task list queries.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Owning project id.
    pub project: Option<String>,
    /// Keep tasks whose expected start date falls within the inclusive range.
    pub starts_within: Option<(NaiveDate, NaiveDate)>,
}

/// Permission level checked against the host's Task entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPermission {
    Write,
    Create,
}

impl TaskPermission {
    /// Host-side name of the permission level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Create => "create",
        }
    }
}

/// Generic read/save access to the host platform's document store.
///
/// List methods return deterministically ordered rows (by id, unless a
/// filter requests otherwise) and never mutate state. Save methods act on a
/// single record; consistency under concurrent writes is the host's
/// per-record last-write-wins semantics.
#[async_trait]
pub trait HostStore: Send + Sync {
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, GanttError>;

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, GanttError>;

    /// Dependency rows, optionally restricted to edges whose owning task is
    /// in `owning_tasks`.
    async fn list_dependencies(
        &self,
        owning_tasks: Option<&[String]>,
    ) -> Result<Vec<TaskDependsOn>, GanttError>;

    /// Assignment rows, scoped the same way as dependencies.
    async fn list_assignments(
        &self,
        owning_tasks: Option<&[String]>,
    ) -> Result<Vec<TaskAssignment>, GanttError>;

    /// All enabled interactive user accounts.
    async fn list_resources(&self) -> Result<Vec<User>, GanttError>;

    /// Persist new expected start/end dates on a task.
    async fn update_task_dates(
        &self,
        task_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), GanttError>;

    /// Persist a new progress value on a task.
    async fn update_task_progress(&self, task_id: &str, progress: f64) -> Result<(), GanttError>;

    /// Whether `task_id` already depends on `depends_on`.
    async fn dependency_exists(&self, task_id: &str, depends_on: &str)
        -> Result<bool, GanttError>;

    /// Append a dependency row to `task_id`'s dependency table and persist.
    async fn append_dependency(&self, task_id: &str, depends_on: &str) -> Result<(), GanttError>;

    /// Load the singleton settings record. `Ok(None)` when the record does
    /// not exist yet; errors are reserved for store failures.
    async fn load_settings(&self) -> Result<Option<GanttSettingsRecord>, GanttError>;

    /// Persist the singleton settings record.
    async fn save_settings(&self, record: &GanttSettingsRecord) -> Result<(), GanttError>;

    /// Whether the calling session holds `permission` on the Task entity.
    async fn has_task_permission(&self, permission: TaskPermission) -> Result<bool, GanttError>;
}
