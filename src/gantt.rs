//! Combined Gantt payload for a project and date window.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GanttError;
use crate::fetch::{
    fetch_assignments, fetch_dependencies, fetch_projects, fetch_resources, fetch_tasks,
};
use crate::store::HostStore;
use crate::transform::{
    transform_assignments, transform_dependencies, transform_resources, transform_tasks,
    GanttAssignment, GanttDependency, GanttResource, GanttTask,
};

/// Days before today the default chart window starts.
pub const DEFAULT_WINDOW_START_OFFSET_DAYS: i64 = 30;
/// Days after today the default chart window ends.
pub const DEFAULT_WINDOW_END_OFFSET_DAYS: i64 = 90;

/// The combined payload the widget loads in one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GanttData {
    pub tasks: Vec<GanttTask>,
    pub dependencies: Vec<GanttDependency>,
    pub resources: Vec<GanttResource>,
    pub assignments: Vec<GanttAssignment>,
}

/// Default chart window around a reference day: 30 days back, 90 forward.
#[must_use]
pub fn default_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        today - Duration::days(DEFAULT_WINDOW_START_OFFSET_DAYS),
        today + Duration::days(DEFAULT_WINDOW_END_OFFSET_DAYS),
    )
}

/// Fetch and transform everything the widget needs for one project and
/// date window. Absent bounds each default per [`default_window`]. Any
/// fetch failure aborts the whole call; no partial payload is returned.
pub async fn gantt_data(
    store: &dyn HostStore,
    project: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<GanttData, GanttError> {
    let (default_start, default_end) = default_window(Utc::now().date_naive());
    let start = start.unwrap_or(default_start);
    let end = end.unwrap_or(default_end);

    let projects = fetch_projects(store, project, Some(start), Some(end)).await?;
    let tasks = fetch_tasks(store, project, Some(start), Some(end)).await?;
    let dependencies = fetch_dependencies(store, project).await?;
    let assignments = fetch_assignments(store, project).await?;
    let resources = fetch_resources(store).await?;

    Ok(GanttData {
        tasks: transform_tasks(&projects, &tasks),
        dependencies: transform_dependencies(&dependencies),
        resources: transform_resources(&resources),
        assignments: transform_assignments(&assignments),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_spans_minus_30_to_plus_90_days() {
        let today = "2024-03-15".parse::<NaiveDate>().unwrap();
        let (start, end) = default_window(today);
        assert_eq!(start, "2024-02-14".parse::<NaiveDate>().unwrap());
        assert_eq!(end, "2024-06-13".parse::<NaiveDate>().unwrap());
    }
}
