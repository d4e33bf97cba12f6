//! REST client implementation of [`HostStore`] against a Frappe/ERPNext
//! host.
//!
//! List reads go through the host's generic resource API
//! (`GET /api/resource/{doctype}` with `fields`/`filters` JSON query
//! params); writes are partial record updates
//! (`PUT /api/resource/{doctype}/{name}`), which keeps the host's
//! per-record save semantics. Authentication uses the token header scheme
//! (`Authorization: token key:secret`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::GanttError;
use crate::models::{de_checkbox, Project, Task, TaskAssignment, TaskDependsOn, User};
use crate::settings::GanttSettingsRecord;
use crate::store::{HostStore, ProjectFilter, TaskFilter, TaskPermission};

const SETTINGS_DOCTYPE: &str = "Gantt Chart Settings";

const PROJECT_FIELDS: &[&str] = &[
    "name",
    "project_name",
    "status",
    "priority",
    "percent_complete",
    "expected_start_date",
    "expected_end_date",
    "actual_start_date",
    "actual_end_date",
    "estimated_costing",
    "total_costing_amount",
    "department",
    "company",
    "description",
    "modified",
];

const TASK_FIELDS: &[&str] = &[
    "name",
    "subject",
    "status",
    "priority",
    "progress",
    "project",
    "parent_task",
    "exp_start_date",
    "exp_end_date",
    "act_start_date",
    "act_end_date",
    "expected_time",
    "actual_time",
    "task_weight",
    "is_milestone",
    "assigned_to",
    "department",
    "company",
    "description",
];

const USER_FIELDS: &[&str] = &[
    "name",
    "full_name",
    "email",
    "user_image",
    "enabled",
    "user_type",
];

/// List responses arrive as `{"data": [...]}`.
#[derive(Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

/// Single-document responses arrive as `{"data": {...}}`.
#[derive(Deserialize)]
struct DocResponse<T> {
    data: T,
}

#[derive(Deserialize)]
struct MethodResponse<T> {
    message: T,
}

#[derive(Deserialize)]
struct PermissionFlag {
    #[serde(default, deserialize_with = "de_checkbox")]
    has_permission: bool,
}

/// [`HostStore`] backed by the host platform's REST API.
pub struct FrappeStore {
    client: reqwest::Client,
    base_url: String,
    auth_header: Option<String>,
}

impl FrappeStore {
    /// Build a client from the service configuration.
    pub fn new(config: &Config) -> Result<Self, GanttError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let auth_header = match (&config.api_key, &config.api_secret) {
            (Some(key), Some(secret)) => Some(format!("token {key}:{secret}")),
            _ => None,
        };
        Ok(Self {
            client,
            base_url: config.frappe_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    fn resource_url(&self, doctype: &str) -> String {
        // Doctype names contain spaces ("Task Depends On").
        format!(
            "{}/api/resource/{}",
            self.base_url,
            doctype.replace(' ', "%20")
        )
    }

    fn doc_url(&self, doctype: &str, name: &str) -> String {
        format!(
            "{}/{}",
            self.resource_url(doctype),
            name.replace(' ', "%20")
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(auth) = &self.auth_header {
            req = req.header(AUTHORIZATION, auth);
        }
        req
    }

    async fn check(resp: Response, doctype: &'static str, name: &str) -> Result<Response, GanttError> {
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GanttError::NotFound {
                doctype,
                name: name.to_string(),
            });
        }
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            return Err(GanttError::PermissionDenied(format!(
                "host denied access to {doctype}"
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GanttError::Store(format!(
                "host returned {status} for {doctype}: {body}"
            )));
        }
        Ok(resp)
    }

    /// Generic list query over the host resource API.
    async fn list<T: DeserializeOwned>(
        &self,
        doctype: &'static str,
        fields: &[&str],
        filters: &Value,
        order_by: &str,
        limit: usize,
    ) -> Result<Vec<T>, GanttError> {
        debug!(doctype, %filters, "listing host records");
        let resp = self
            .request(Method::GET, self.resource_url(doctype))
            .query(&[
                ("fields", serde_json::to_string(fields)?),
                ("filters", filters.to_string()),
                ("order_by", order_by.to_string()),
                ("limit_page_length", limit.to_string()),
            ])
            .send()
            .await?;
        let resp = Self::check(resp, doctype, "").await?;
        let body: ListResponse<T> = resp.json().await?;
        Ok(body.data)
    }

    /// Partial record update; the host saves the touched fields only.
    async fn update_doc(
        &self,
        doctype: &'static str,
        name: &str,
        body: &Value,
    ) -> Result<(), GanttError> {
        let resp = self
            .request(Method::PUT, self.doc_url(doctype, name))
            .json(body)
            .send()
            .await?;
        Self::check(resp, doctype, name).await?;
        Ok(())
    }

    /// Filter expression for "owning task in set", shared by the dependency
    /// and assignment list reads.
    fn owning_task_filter(doctype: &str, owning_tasks: Option<&[String]>) -> Value {
        match owning_tasks {
            Some(tasks) => json!([[doctype, "parent", "in", tasks]]),
            None => json!([]),
        }
    }
}

#[async_trait]
impl HostStore for FrappeStore {
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, GanttError> {
        let mut filters = Vec::new();
        if let Some(name) = &filter.name {
            filters.push(json!(["Project", "name", "=", name]));
        }
        if let Some((start, end)) = filter.starts_within {
            filters.push(json!([
                "Project",
                "expected_start_date",
                "between",
                [start, end]
            ]));
        }
        if let Some(status) = &filter.exclude_status {
            filters.push(json!(["Project", "status", "!=", status]));
        }
        let order_by = if filter.limit.is_some() {
            "modified desc"
        } else {
            "name asc"
        };
        self.list(
            "Project",
            PROJECT_FIELDS,
            &Value::Array(filters),
            order_by,
            filter.limit.unwrap_or(0),
        )
        .await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, GanttError> {
        let mut filters = Vec::new();
        if let Some(project) = &filter.project {
            filters.push(json!(["Task", "project", "=", project]));
        }
        if let Some((start, end)) = filter.starts_within {
            filters.push(json!(["Task", "exp_start_date", "between", [start, end]]));
        }
        self.list("Task", TASK_FIELDS, &Value::Array(filters), "name asc", 0)
            .await
    }

    async fn list_dependencies(
        &self,
        owning_tasks: Option<&[String]>,
    ) -> Result<Vec<TaskDependsOn>, GanttError> {
        let filters = Self::owning_task_filter("Task Depends On", owning_tasks);
        self.list(
            "Task Depends On",
            &["parent", "depends_on_task"],
            &filters,
            "parent asc",
            0,
        )
        .await
    }

    async fn list_assignments(
        &self,
        owning_tasks: Option<&[String]>,
    ) -> Result<Vec<TaskAssignment>, GanttError> {
        let filters = Self::owning_task_filter("Task Assigned To", owning_tasks);
        self.list(
            "Task Assigned To",
            &["parent", "assigned_to"],
            &filters,
            "parent asc",
            0,
        )
        .await
    }

    async fn list_resources(&self) -> Result<Vec<User>, GanttError> {
        let filters = json!([
            ["User", "enabled", "=", 1],
            ["User", "user_type", "=", "System User"]
        ]);
        self.list("User", USER_FIELDS, &filters, "name asc", 0).await
    }

    async fn update_task_dates(
        &self,
        task_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), GanttError> {
        self.update_doc(
            "Task",
            task_id,
            &json!({ "exp_start_date": start, "exp_end_date": end }),
        )
        .await
    }

    async fn update_task_progress(&self, task_id: &str, progress: f64) -> Result<(), GanttError> {
        self.update_doc("Task", task_id, &json!({ "progress": progress }))
            .await
    }

    async fn dependency_exists(
        &self,
        task_id: &str,
        depends_on: &str,
    ) -> Result<bool, GanttError> {
        let filters = json!([
            ["Task Depends On", "parent", "=", task_id],
            ["Task Depends On", "depends_on_task", "=", depends_on]
        ]);
        let rows: Vec<TaskDependsOn> = self
            .list(
                "Task Depends On",
                &["parent", "depends_on_task"],
                &filters,
                "parent asc",
                1,
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn append_dependency(&self, task_id: &str, depends_on: &str) -> Result<(), GanttError> {
        // Child rows can only be written through their parent document.
        let resp = self
            .request(Method::GET, self.doc_url("Task", task_id))
            .send()
            .await?;
        let resp = Self::check(resp, "Task", task_id).await?;
        let doc: DocResponse<Value> = resp.json().await?;

        let mut rows = doc
            .data
            .get("depends_on")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        rows.push(json!({ "depends_on_task": depends_on }));

        self.update_doc("Task", task_id, &json!({ "depends_on": rows }))
            .await
    }

    async fn load_settings(&self) -> Result<Option<GanttSettingsRecord>, GanttError> {
        // Singleton: the document name equals the doctype name.
        let resp = self
            .request(Method::GET, self.doc_url(SETTINGS_DOCTYPE, SETTINGS_DOCTYPE))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp, "Gantt Chart Settings", SETTINGS_DOCTYPE).await?;
        let doc: DocResponse<GanttSettingsRecord> = resp.json().await?;
        Ok(Some(doc.data))
    }

    async fn save_settings(&self, record: &GanttSettingsRecord) -> Result<(), GanttError> {
        self.update_doc(
            "Gantt Chart Settings",
            SETTINGS_DOCTYPE,
            &serde_json::to_value(record)?,
        )
        .await
    }

    async fn has_task_permission(&self, permission: TaskPermission) -> Result<bool, GanttError> {
        let url = format!("{}/api/method/frappe.client.has_permission", self.base_url);
        let resp = self
            .request(Method::GET, url)
            .query(&[("doctype", "Task"), ("perm_type", permission.as_str())])
            .send()
            .await?;
        let resp = Self::check(resp, "Task", "").await?;
        let body: MethodResponse<PermissionFlag> = resp.json().await?;
        Ok(body.message.has_permission)
    }
}
