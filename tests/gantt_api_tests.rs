//! Integration tests for the gantt-bridge HTTP surface.
//!
//! These drive the real router over the in-memory host store, covering the
//! combined payload, the write-back endpoints, settings, and the page
//! context.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use gantt_bridge::models::{Project, Task, TaskAssignment, User};
use gantt_bridge::{build_router, AppState, Config, HostStore, MemoryStore, SettingsProvider};

// =============================================================================
// Test Harness
// =============================================================================

fn app(store: &Arc<MemoryStore>) -> Router {
    let store_dyn: Arc<dyn HostStore> = store.clone();
    let state = AppState {
        config: Config::default(),
        store: store_dyn.clone(),
        settings: Arc::new(SettingsProvider::new(store_dyn)),
    };
    build_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn project(name: &str, start: Option<NaiveDate>) -> Project {
    Project {
        name: name.to_string(),
        expected_start_date: start,
        ..Project::default()
    }
}

fn task(name: &str, project: &str, start: Option<NaiveDate>) -> Task {
    Task {
        name: name.to_string(),
        project: Some(project.to_string()),
        exp_start_date: start,
        ..Task::default()
    }
}

/// A store with one project, two linked tasks, one resource and one
/// assignment, all inside the default window.
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("PROJECT-001", Some(today()))).await;
    store
        .add_task(task("TASK-001", "PROJECT-001", Some(today())))
        .await;
    store
        .add_task(task("TASK-002", "PROJECT-001", Some(today() + Duration::days(7))))
        .await;
    store
        .append_dependency("TASK-002", "TASK-001")
        .await
        .unwrap();
    store
        .add_user(User {
            name: "jo@example.com".to_string(),
            full_name: Some("Jo Smith".to_string()),
            email: Some("jo@example.com".to_string()),
            enabled: true,
            user_type: Some("System User".to_string()),
            ..User::default()
        })
        .await;
    store
        .add_assignment(TaskAssignment {
            parent: "TASK-002".to_string(),
            assigned_to: "jo@example.com".to_string(),
        })
        .await;
    store
}

fn find_row<'a>(rows: &'a [Value], id: &str) -> &'a Value {
    rows.iter()
        .find(|row| row["id"] == id)
        .unwrap_or_else(|| panic!("no row with id {id}"))
}

// =============================================================================
// Combined payload
// =============================================================================

#[tokio::test]
async fn gantt_data_flattens_projects_and_tasks() {
    let store = seeded_store().await;
    let (status, body) = send(app(&store), get("/gantt/data")).await;
    assert_eq!(status, StatusCode::OK);

    let tasks = body["tasks"].as_array().unwrap();
    let project_row = find_row(tasks, "project_PROJECT-001");
    assert_eq!(project_row["type"], "project");
    assert_eq!(project_row["expanded"], true);
    assert_eq!(project_row["leaf"], false);

    let task_row = find_row(tasks, "TASK-002");
    assert_eq!(task_row["parentId"], "project_PROJECT-001");
    assert_eq!(task_row["leaf"], true);
    assert_eq!(task_row["type"], "task");
    assert_eq!(task_row["percentDone"], 0.0);
}

#[tokio::test]
async fn gantt_data_reshapes_dependencies_resources_and_assignments() {
    let store = seeded_store().await;
    let (status, body) = send(app(&store), get("/gantt/data")).await;
    assert_eq!(status, StatusCode::OK);

    let deps = body["dependencies"].as_array().unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0]["id"], "dep_TASK-002_TASK-001");
    assert_eq!(deps[0]["fromTask"], "TASK-001");
    assert_eq!(deps[0]["toTask"], "TASK-002");
    assert_eq!(deps[0]["type"], 2);
    assert_eq!(deps[0]["lag"], 0);

    let resources = body["resources"].as_array().unwrap();
    assert_eq!(resources[0]["id"], "jo@example.com");
    assert_eq!(resources[0]["name"], "Jo Smith");

    let assignments = body["assignments"].as_array().unwrap();
    assert_eq!(assignments[0]["id"], "TASK-002_jo@example.com");
    assert_eq!(assignments[0]["taskId"], "TASK-002");
    assert_eq!(assignments[0]["resourceId"], "jo@example.com");
    assert_eq!(assignments[0]["units"], 100);
}

#[tokio::test]
async fn default_window_spans_30_days_back_and_90_forward() {
    let store = Arc::new(MemoryStore::new());
    store
        .add_project(project("PROJECT-IN", Some(today() + Duration::days(60))))
        .await;
    store
        .add_project(project("PROJECT-PAST", Some(today() - Duration::days(40))))
        .await;
    store
        .add_project(project("PROJECT-FAR", Some(today() + Duration::days(120))))
        .await;

    let (status, body) = send(app(&store), get("/gantt/data")).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["project_PROJECT-IN"]);
}

#[tokio::test]
async fn explicit_window_and_project_filters_apply() {
    let store = seeded_store().await;
    store.add_project(project("PROJECT-002", Some(today()))).await;
    store
        .add_task(task("TASK-OTHER", "PROJECT-002", Some(today())))
        .await;

    let start = today() - Duration::days(1);
    let end = today() + Duration::days(1);
    let uri = format!("/gantt/data?project=PROJECT-001&start_date={start}&end_date={end}");
    let (status, body) = send(app(&store), get(&uri)).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    // TASK-002 starts outside the one-day window; PROJECT-002 is filtered out.
    assert_eq!(ids, vec!["project_PROJECT-001", "TASK-001"]);
}

// =============================================================================
// Write-back endpoints
// =============================================================================

#[tokio::test]
async fn update_task_dates_persists_expected_dates() {
    let store = seeded_store().await;
    let body = json!({ "start_date": "2024-04-01", "end_date": "2024-04-15" });
    let (status, ack) = send(app(&store), post_json("/gantt/tasks/TASK-001/dates", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "success");

    let task = store.task("TASK-001").await.unwrap();
    assert_eq!(task.exp_start_date, "2024-04-01".parse().ok());
    assert_eq!(task.exp_end_date, "2024-04-15".parse().ok());
}

#[tokio::test]
async fn update_task_dates_rejects_malformed_dates() {
    let store = seeded_store().await;
    let body = json!({ "start_date": "04/01/2024", "end_date": "2024-04-15" });
    let (status, ack) = send(app(&store), post_json("/gantt/tasks/TASK-001/dates", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ack["status"], "error");
}

#[tokio::test]
async fn update_task_dates_unknown_task_is_not_found() {
    let store = seeded_store().await;
    let body = json!({ "start_date": "2024-04-01", "end_date": "2024-04-15" });
    let (status, _) = send(app(&store), post_json("/gantt/tasks/TASK-404/dates", &body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn writes_require_task_write_permission() {
    let store = seeded_store().await;
    store.set_task_permissions(false, false);

    let body = json!({ "start_date": "2024-04-01", "end_date": "2024-04-15" });
    let (status, ack) = send(app(&store), post_json("/gantt/tasks/TASK-001/dates", &body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(ack["status"], "error");

    // Nothing was written.
    let task = store.task("TASK-001").await.unwrap();
    assert_eq!(task.exp_end_date, None);
}

#[tokio::test]
async fn update_task_progress_accepts_numbers_and_numeric_strings() {
    let store = seeded_store().await;

    let (status, ack) = send(
        app(&store),
        post_json("/gantt/tasks/TASK-001/progress", &json!({ "progress": 55.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "success");
    assert_eq!(store.task("TASK-001").await.unwrap().progress, Some(55.5));

    let (status, _) = send(
        app(&store),
        post_json("/gantt/tasks/TASK-001/progress", &json!({ "progress": "80" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.task("TASK-001").await.unwrap().progress, Some(80.0));
}

#[tokio::test]
async fn create_task_dependency_is_idempotent() {
    let store = seeded_store().await;
    store.add_task(task("TASK-003", "PROJECT-001", None)).await;
    let body = json!({ "from_task": "TASK-001", "to_task": "TASK-003" });

    let (status, ack) = send(app(&store), post_json("/gantt/dependencies", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "success");

    let (status, ack) = send(app(&store), post_json("/gantt/dependencies", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "exists");

    let edges = store.dependencies().await;
    let matching: Vec<_> = edges
        .iter()
        .filter(|e| e.parent == "TASK-003" && e.depends_on_task == "TASK-001")
        .collect();
    assert_eq!(matching.len(), 1);
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn settings_default_when_record_is_absent() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = send(app(&store), get("/gantt/settings")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default_view_preset"], "weekAndDayLetter");
    assert_eq!(body["default_start_date_offset"], 30);
    assert_eq!(body["default_end_date_offset"], 90);
    assert_eq!(body["show_dependencies"], true);
    assert_eq!(body["send_email_on_task_update"], false);
}

#[tokio::test]
async fn negative_offsets_are_rejected_and_never_persisted() {
    let store = Arc::new(MemoryStore::new());
    let body = json!({ "default_start_date_offset": -30 });
    let (status, ack) = send(app(&store), put_json("/gantt/settings", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ack["status"], "error");
    assert!(store.load_settings().await.unwrap().is_none());
}

#[tokio::test]
async fn settings_update_is_visible_immediately() {
    let store = seeded_store().await;
    let application = app(&store);

    // Prime the cache.
    let (status, body) = send(application.clone(), get("/gantt/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auto_refresh_interval"], 0);

    let update = json!({ "auto_refresh_interval": 120, "show_progress_line": 0 });
    let (status, ack) = send(application.clone(), put_json("/gantt/settings", &update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "success");

    // The update invalidated the cache slot.
    let (_, body) = send(application, get("/gantt/settings")).await;
    assert_eq!(body["auto_refresh_interval"], 120);
    assert_eq!(body["show_progress_line"], false);
}

// =============================================================================
// Page context
// =============================================================================

#[tokio::test]
async fn page_context_excludes_cancelled_and_orders_by_modified() {
    let store = Arc::new(MemoryStore::new());
    let mut older = project("PROJECT-OLD", None);
    older.modified = Some("2024-01-01 08:00:00".to_string());
    let mut newer = project("PROJECT-NEW", None);
    newer.modified = Some("2024-06-01 08:00:00".to_string());
    let mut cancelled = project("PROJECT-DEAD", None);
    cancelled.status = Some("Cancelled".to_string());
    cancelled.modified = Some("2024-07-01 08:00:00".to_string());
    store.add_project(older).await;
    store.add_project(newer).await;
    store.add_project(cancelled).await;

    let (status, body) = send(app(&store), get("/gantt/page-context")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_write"], true);
    assert_eq!(body["can_create"], true);

    let names: Vec<&str> = body["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["PROJECT-NEW", "PROJECT-OLD"]);
}

#[tokio::test]
async fn page_context_caps_the_project_list_at_100() {
    let store = Arc::new(MemoryStore::new());
    for i in 0..105 {
        let mut p = project(&format!("PROJECT-{i:03}"), None);
        p.modified = Some(format!("2024-01-01 00:00:{:02}", i % 60));
        store.add_project(p).await;
    }

    let (status, body) = send(app(&store), get("/gantt/page-context")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["projects"].as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn page_context_reports_missing_permissions() {
    let store = Arc::new(MemoryStore::new());
    store.set_task_permissions(false, true);

    let (_, body) = send(app(&store), get("/gantt/page-context")).await;
    assert_eq!(body["can_write"], false);
    assert_eq!(body["can_create"], true);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_and_ready_respond() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = send(app(&store), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(app(&store), get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}
