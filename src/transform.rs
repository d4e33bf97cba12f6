//! Pure transforms from host records to the widget's data schema.
//!
//! The widget consumes a flat task list (projects become synthetic parent
//! rows), a dependency list with composite ids, a resource list, and an
//! assignment list, all camelCase. These are total functions: missing
//! optional fields substitute defaults, never errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Project, Task, TaskAssignment, TaskDependsOn, User};

/// Prefix for synthetic project rows in the flattened task list.
pub const PROJECT_ROW_PREFIX: &str = "project_";
/// The one dependency type the widget receives: finish-to-start.
pub const DEPENDENCY_FINISH_TO_START: u8 = 2;

/// Row kind in the widget's task tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GanttTaskType {
    Project,
    Task,
    Milestone,
}

/// One row of the widget's flattened task tree. Projects and tasks share
/// the shape; fields not applicable to a row kind stay unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttTask {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub percent_done: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    pub leaf: bool,
    #[serde(rename = "type")]
    pub row_type: GanttTaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Widget dependency arrow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GanttDependency {
    pub id: String,
    pub from_task: String,
    pub to_task: String,
    #[serde(rename = "type")]
    pub dependency_type: u8,
    pub lag: i64,
}

/// Widget resource (a host user).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttResource {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Widget assignment linking a task row to a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttAssignment {
    pub id: String,
    pub task_id: String,
    pub resource_id: String,
    /// Allocation percent; partial allocation is not supported.
    pub units: u8,
}

/// Synthetic id of a project's parent row.
#[must_use]
pub fn project_row_id(project: &str) -> String {
    format!("{PROJECT_ROW_PREFIX}{project}")
}

/// Flatten projects and tasks into the widget's task tree: one expanded
/// non-leaf row per project, then one leaf row per task.
///
/// A task's `parent_id` resolves to its explicit parent task when present,
/// else the synthetic row of its owning project, else stays unset.
#[must_use]
pub fn transform_tasks(projects: &[Project], tasks: &[Task]) -> Vec<GanttTask> {
    let mut rows = Vec::with_capacity(projects.len() + tasks.len());

    for project in projects {
        rows.push(GanttTask {
            id: project_row_id(&project.name),
            name: project
                .project_name
                .clone()
                .unwrap_or_else(|| project.name.clone()),
            start_date: project.expected_start_date.or(project.actual_start_date),
            end_date: project.expected_end_date.or(project.actual_end_date),
            percent_done: project.percent_complete.unwrap_or(0.0),
            parent_id: None,
            expanded: Some(true),
            leaf: false,
            row_type: GanttTaskType::Project,
            status: project.status.clone(),
            priority: project.priority.clone(),
            project: None,
            expected_time: None,
            actual_time: None,
            weight: None,
            assigned_to: None,
            estimated_cost: project.estimated_costing,
            actual_cost: project.total_costing_amount,
            department: project.department.clone(),
            company: project.company.clone(),
            description: project.description.clone(),
        });
    }

    for task in tasks {
        let parent_id = task
            .parent_task
            .clone()
            .or_else(|| task.project.as_deref().map(project_row_id));

        rows.push(GanttTask {
            id: task.name.clone(),
            name: task.subject.clone().unwrap_or_else(|| task.name.clone()),
            start_date: task.exp_start_date.or(task.act_start_date),
            end_date: task.exp_end_date.or(task.act_end_date),
            percent_done: task.progress.unwrap_or(0.0),
            parent_id,
            expanded: None,
            leaf: true,
            row_type: if task.is_milestone {
                GanttTaskType::Milestone
            } else {
                GanttTaskType::Task
            },
            status: task.status.clone(),
            priority: task.priority.clone(),
            project: task.project.clone(),
            expected_time: task.expected_time,
            actual_time: task.actual_time,
            weight: task.task_weight,
            assigned_to: task.assigned_to.clone(),
            estimated_cost: None,
            actual_cost: None,
            department: task.department.clone(),
            company: task.company.clone(),
            description: task.description.clone(),
        });
    }

    rows
}

/// Rename dependency edges into widget arrows. The arrow points from the
/// predecessor (`depends_on_task`) to the dependent task (`parent`); no
/// cycle detection happens here.
#[must_use]
pub fn transform_dependencies(edges: &[TaskDependsOn]) -> Vec<GanttDependency> {
    edges
        .iter()
        .map(|edge| GanttDependency {
            id: format!("dep_{}_{}", edge.parent, edge.depends_on_task),
            from_task: edge.depends_on_task.clone(),
            to_task: edge.parent.clone(),
            dependency_type: DEPENDENCY_FINISH_TO_START,
            lag: 0,
        })
        .collect()
}

/// Map eligible users to widget resources.
#[must_use]
pub fn transform_resources(users: &[User]) -> Vec<GanttResource> {
    users
        .iter()
        .map(|user| GanttResource {
            id: user.name.clone(),
            name: user.full_name.clone().unwrap_or_else(|| user.name.clone()),
            email: user.email.clone(),
            image: user.user_image.clone(),
        })
        .collect()
}

/// Map assignment rows to widget assignments at full allocation.
#[must_use]
pub fn transform_assignments(rows: &[TaskAssignment]) -> Vec<GanttAssignment> {
    rows.iter()
        .map(|row| GanttAssignment {
            id: format!("{}_{}", row.parent, row.assigned_to),
            task_id: row.parent.clone(),
            resource_id: row.assigned_to.clone(),
            units: 100,
        })
        .collect()
}
