//! Host platform entity types.
//!
//! Field names mirror the host store's own snake_case document fields, so
//! these types deserialize straight out of the host's REST responses.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Project record as returned by the host store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier (document name).
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// Completion percent, 0-100. Treated as 0 when absent.
    #[serde(default)]
    pub percent_complete: Option<f64>,
    #[serde(default)]
    pub expected_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub expected_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_costing: Option<f64>,
    #[serde(default)]
    pub total_costing_amount: Option<f64>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Host modification timestamp. ISO format, so it sorts lexicographically.
    #[serde(default)]
    pub modified: Option<String>,
}

/// Task record as returned by the host store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (document name).
    pub name: String,
    /// Task title.
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// Progress percent, 0-100. Treated as 0 when absent.
    #[serde(default)]
    pub progress: Option<f64>,
    /// Owning project.
    #[serde(default)]
    pub project: Option<String>,
    /// Parent task. Absent means "parented directly under the project".
    #[serde(default)]
    pub parent_task: Option<String>,
    #[serde(default)]
    pub exp_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub exp_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub act_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub act_end_date: Option<NaiveDate>,
    /// Estimated duration in hours.
    #[serde(default)]
    pub expected_time: Option<f64>,
    /// Actual duration in hours.
    #[serde(default)]
    pub actual_time: Option<f64>,
    #[serde(default)]
    pub task_weight: Option<f64>,
    /// Host checkbox field, arrives as 0/1.
    #[serde(default, deserialize_with = "de_checkbox")]
    pub is_milestone: bool,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Dependency child row: `parent` cannot start until `depends_on_task`
/// finishes. Unique per `(parent, depends_on_task)` pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDependsOn {
    /// Owning task.
    pub parent: String,
    /// Predecessor task.
    pub depends_on_task: String,
}

/// Assignment child row linking a task to a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskAssignment {
    /// Owning task.
    pub parent: String,
    /// Assigned user.
    pub assigned_to: String,
}

/// Host user account, eligible as a Gantt resource when it is an enabled
/// interactive ("System User") account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (usually the email).
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_image: Option<String>,
    /// Host checkbox field, arrives as 0/1.
    #[serde(default, deserialize_with = "de_checkbox")]
    pub enabled: bool,
    #[serde(default)]
    pub user_type: Option<String>,
}

/// Host checkbox fields arrive as 0/1 integers, booleans, or null.
pub(crate) fn de_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Checkbox>::deserialize(deserializer)?
        .map(Checkbox::as_bool)
        .unwrap_or_default())
}

/// Like [`de_checkbox`] but keeps "absent" distinct from "unchecked".
pub(crate) fn de_checkbox_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Checkbox>::deserialize(deserializer)?.map(Checkbox::as_bool))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Checkbox {
    Bool(bool),
    Int(i64),
}

impl Checkbox {
    fn as_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(i) => i != 0,
        }
    }
}
