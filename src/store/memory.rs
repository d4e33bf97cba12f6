//! In-memory host store for tests and local development.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::GanttError;
use crate::models::{Project, Task, TaskAssignment, TaskDependsOn, User};
use crate::settings::GanttSettingsRecord;
use crate::store::{HostStore, ProjectFilter, TaskFilter, TaskPermission};

#[derive(Default)]
struct MemoryState {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    dependencies: Vec<TaskDependsOn>,
    assignments: Vec<TaskAssignment>,
    users: Vec<User>,
    settings: Option<GanttSettingsRecord>,
}

/// Host store held entirely in memory, honoring the same filter semantics
/// as the REST implementation.
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    can_write_tasks: AtomicBool,
    can_create_tasks: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with all task permissions granted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            can_write_tasks: AtomicBool::new(true),
            can_create_tasks: AtomicBool::new(true),
        }
    }

    pub async fn add_project(&self, project: Project) {
        self.state.write().await.projects.push(project);
    }

    pub async fn add_task(&self, task: Task) {
        self.state.write().await.tasks.push(task);
    }

    pub async fn add_user(&self, user: User) {
        self.state.write().await.users.push(user);
    }

    pub async fn add_assignment(&self, assignment: TaskAssignment) {
        self.state.write().await.assignments.push(assignment);
    }

    /// Simulate the calling session's Task permissions.
    pub fn set_task_permissions(&self, write: bool, create: bool) {
        self.can_write_tasks.store(write, Ordering::Relaxed);
        self.can_create_tasks.store(create, Ordering::Relaxed);
    }

    /// Snapshot of the dependency rows, for assertions.
    pub async fn dependencies(&self) -> Vec<TaskDependsOn> {
        self.state.read().await.dependencies.clone()
    }

    /// Look up a task by id, for assertions.
    pub async fn task(&self, task_id: &str) -> Option<Task> {
        self.state
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.name == task_id)
            .cloned()
    }
}

fn within(date: Option<NaiveDate>, range: Option<(NaiveDate, NaiveDate)>) -> bool {
    match range {
        None => true,
        Some((start, end)) => date.is_some_and(|d| d >= start && d <= end),
    }
}

#[async_trait]
impl HostStore for MemoryStore {
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, GanttError> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| filter.name.as_ref().is_none_or(|name| &p.name == name))
            .filter(|p| within(p.expected_start_date, filter.starts_within))
            .filter(|p| {
                filter
                    .exclude_status
                    .as_deref()
                    .is_none_or(|status| p.status.as_deref() != Some(status))
            })
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            // Most-recently-modified first; ISO timestamps sort lexicographically.
            projects.sort_by(|a, b| b.modified.cmp(&a.modified));
            projects.truncate(limit);
        } else {
            projects.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(projects)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, GanttError> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| {
                filter
                    .project
                    .as_deref()
                    .is_none_or(|project| t.project.as_deref() == Some(project))
            })
            .filter(|t| within(t.exp_start_date, filter.starts_within))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tasks)
    }

    async fn list_dependencies(
        &self,
        owning_tasks: Option<&[String]>,
    ) -> Result<Vec<TaskDependsOn>, GanttError> {
        let state = self.state.read().await;
        Ok(state
            .dependencies
            .iter()
            .filter(|d| owning_tasks.is_none_or(|tasks| tasks.contains(&d.parent)))
            .cloned()
            .collect())
    }

    async fn list_assignments(
        &self,
        owning_tasks: Option<&[String]>,
    ) -> Result<Vec<TaskAssignment>, GanttError> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .iter()
            .filter(|a| owning_tasks.is_none_or(|tasks| tasks.contains(&a.parent)))
            .cloned()
            .collect())
    }

    async fn list_resources(&self) -> Result<Vec<User>, GanttError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .iter()
            .filter(|u| u.enabled && u.user_type.as_deref() == Some("System User"))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn update_task_dates(
        &self,
        task_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), GanttError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.name == task_id)
            .ok_or_else(|| GanttError::NotFound {
                doctype: "Task",
                name: task_id.to_string(),
            })?;
        task.exp_start_date = Some(start);
        task.exp_end_date = Some(end);
        Ok(())
    }

    async fn update_task_progress(&self, task_id: &str, progress: f64) -> Result<(), GanttError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.name == task_id)
            .ok_or_else(|| GanttError::NotFound {
                doctype: "Task",
                name: task_id.to_string(),
            })?;
        task.progress = Some(progress);
        Ok(())
    }

    async fn dependency_exists(
        &self,
        task_id: &str,
        depends_on: &str,
    ) -> Result<bool, GanttError> {
        let state = self.state.read().await;
        Ok(state
            .dependencies
            .iter()
            .any(|d| d.parent == task_id && d.depends_on_task == depends_on))
    }

    async fn append_dependency(&self, task_id: &str, depends_on: &str) -> Result<(), GanttError> {
        let mut state = self.state.write().await;
        if !state.tasks.iter().any(|t| t.name == task_id) {
            return Err(GanttError::NotFound {
                doctype: "Task",
                name: task_id.to_string(),
            });
        }
        state.dependencies.push(TaskDependsOn {
            parent: task_id.to_string(),
            depends_on_task: depends_on.to_string(),
        });
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<GanttSettingsRecord>, GanttError> {
        Ok(self.state.read().await.settings.clone())
    }

    async fn save_settings(&self, record: &GanttSettingsRecord) -> Result<(), GanttError> {
        self.state.write().await.settings = Some(record.clone());
        Ok(())
    }

    async fn has_task_permission(&self, permission: TaskPermission) -> Result<bool, GanttError> {
        Ok(match permission {
            TaskPermission::Write => self.can_write_tasks.load(Ordering::Relaxed),
            TaskPermission::Create => self.can_create_tasks.load(Ordering::Relaxed),
        })
    }
}
