//! In-memory emulation of the Trainingset API used by integration tests.
//!
//! Mirrors the service's observable contract: `user_key` auth, 400 with a
//! flat `{"message"}` body for bad payloads, list wrappers with a `data`
//! array, delete replies carrying a `status` field, and plain-text 404s for
//! unknown routes.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "user_key";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// The creation payload exactly as the client sent it.
    pub params: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskPage {
    pub data: Vec<Task>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectPage {
    pub data: Vec<Project>,
}

#[derive(Default)]
pub struct Store {
    tasks: Vec<Task>,
    projects: Vec<Project>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error reply in the service's wire shape.
struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/task/by-custom-filter", get(list_tasks))
        .route("/task/annotation/{kind}", post(create_annotation_task))
        .route("/task/categorization/image", post(create_categorization_task))
        .route("/task/{id}", delete(delete_task))
        .route("/project", get(list_projects).post(create_project))
        .route("/project/{id}", delete(delete_project))
        .route_layer(middleware::from_fn(require_api_key))
        .fallback(not_found)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock trainingset api listening");
    }
    axum::serve(listener, app()).await
}

async fn require_api_key(req: Request, next: Next) -> Response {
    let has_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.is_empty());
    if !has_key {
        return ApiFailure {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized: missing user_key".to_string(),
        }
        .into_response();
    }
    next.run(req).await
}

async fn not_found(method: Method, uri: Uri) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Cannot {method} {}", uri.path()))
}

// --- tasks ---

fn annotation_type(kind: &str) -> Option<&'static str> {
    match kind {
        "box" => Some("annotation-box"),
        "line" => Some("annotation-line"),
        "polygon" => Some("annotation-polygon"),
        "point" => Some("annotation-point"),
        "pcd" => Some("annotation-pcd"),
        "segmentation" => Some("segmentation"),
        _ => None,
    }
}

async fn create_annotation_task(
    State(db): State<Db>,
    Path(kind): Path<String>,
    method: Method,
    uri: Uri,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Some(task_type) = annotation_type(&kind) else {
        return not_found(method, uri).await.into_response();
    };
    match store_task(&db, task_type, body).await {
        Ok(task) => Json(task).into_response(),
        Err(failure) => failure.into_response(),
    }
}

async fn create_categorization_task(
    State(db): State<Db>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Task>, ApiFailure> {
    store_task(&db, "categorization-image", body).await.map(Json)
}

async fn store_task(
    db: &Db,
    task_type: &str,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Task, ApiFailure> {
    let Json(params) = body.map_err(|e| ApiFailure::bad_request(e.body_text()))?;
    validate_task(task_type, &params)?;

    let task = Task {
        id: Uuid::new_v4().simple().to_string(),
        task_type: task_type.to_string(),
        status: "pending".to_string(),
        project: params
            .get("project")
            .and_then(Value::as_str)
            .map(str::to_string),
        params,
    };
    debug!(id = %task.id, task_type, "task created");
    db.write().await.tasks.push(task.clone());
    Ok(task)
}

fn validate_task(task_type: &str, params: &Value) -> Result<(), ApiFailure> {
    let Some(fields) = params.as_object() else {
        return Err(ApiFailure::bad_request("task must be a JSON object"));
    };
    for required in ["instructions", "attachment_url"] {
        let present = fields
            .get(required)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        if !present {
            return Err(ApiFailure::bad_request(format!("{required} is required")));
        }
    }
    if task_type == "categorization-image" {
        let has_categories = fields
            .get("categories")
            .and_then(Value::as_array)
            .is_some_and(|c| !c.is_empty());
        if !has_categories {
            return Err(ApiFailure::bad_request("categories is required"));
        }
    }
    Ok(())
}

fn parse_count(params: &HashMap<String, String>, name: &str) -> Result<Option<usize>, ApiFailure> {
    params
        .get(name)
        .map(|raw| {
            raw.parse::<usize>().map_err(|_| {
                ApiFailure::bad_request(format!("{name} must be a non-negative integer"))
            })
        })
        .transpose()
}

async fn list_tasks(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TaskPage>, ApiFailure> {
    let limit = parse_count(&params, "limit")?;
    let skip = parse_count(&params, "skip")?.unwrap_or(0);

    let store = db.read().await;
    let matching: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| params.get("status").is_none_or(|s| &t.status == s))
        .filter(|t| params.get("type").is_none_or(|s| &t.task_type == s))
        .filter(|t| params.get("id").is_none_or(|s| &t.id == s))
        .filter(|t| {
            params
                .get("project")
                .is_none_or(|s| t.project.as_ref() == Some(s))
        })
        .collect();

    let total = matching.len();
    let data = matching
        .into_iter()
        .skip(skip)
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    Ok(Json(TaskPage { data, total }))
}

fn delete_reply(found: bool, what: &str) -> (StatusCode, Json<Value>) {
    if found {
        (StatusCode::OK, Json(json!({ "status": "success" })))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "message": format!("{what} not found") })),
        )
    }
}

async fn delete_task(State(db): State<Db>, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    let mut store = db.write().await;
    let before = store.tasks.len();
    store.tasks.retain(|t| t.id != id);
    delete_reply(store.tasks.len() < before, "Task")
}

// --- projects ---

#[derive(Deserialize)]
pub struct CreateProject {
    #[serde(default)]
    pub name: Option<String>,
}

async fn create_project(
    State(db): State<Db>,
    body: Result<Json<CreateProject>, JsonRejection>,
) -> Result<Json<Project>, ApiFailure> {
    let Json(input) = body.map_err(|e| ApiFailure::bad_request(e.body_text()))?;
    let name = input
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiFailure::bad_request("name is required"))?;

    let project = Project {
        id: Uuid::new_v4().simple().to_string(),
        name,
    };
    db.write().await.projects.push(project.clone());
    Ok(Json(project))
}

async fn list_projects(State(db): State<Db>) -> Json<ProjectPage> {
    let store = db.read().await;
    Json(ProjectPage {
        data: store.projects.clone(),
    })
}

async fn delete_project(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut store = db.write().await;
    let before = store.projects.len();
    store.projects.retain(|p| p.id != id);
    delete_reply(store.projects.len() < before, "Project")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_with_wire_names() {
        let task = Task {
            id: "t1".to_string(),
            task_type: "annotation-box".to_string(),
            status: "pending".to_string(),
            project: None,
            params: json!({"instructions": "x"}),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["_id"], "t1");
        assert_eq!(value["type"], "annotation-box");
        assert!(value.get("project").is_none());
        assert_eq!(value["params"]["instructions"], "x");
    }

    #[test]
    fn annotation_kinds_map_to_task_types() {
        assert_eq!(annotation_type("pcd"), Some("annotation-pcd"));
        assert_eq!(annotation_type("segmentation"), Some("segmentation"));
        assert_eq!(annotation_type("cube"), None);
    }

    #[test]
    fn validate_task_requires_instructions_and_attachment() {
        let err = validate_task("annotation-box", &json!({"attachment_url": "u"})).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "instructions is required");

        let err = validate_task("annotation-box", &json!({"instructions": "i"})).unwrap_err();
        assert_eq!(err.message, "attachment_url is required");

        assert!(validate_task("annotation-box", &json!({"instructions": "i", "attachment_url": "u"})).is_ok());
    }

    #[test]
    fn validate_categorization_requires_categories() {
        let base = json!({"instructions": "i", "attachment_url": "u"});
        let err = validate_task("categorization-image", &base).unwrap_err();
        assert_eq!(err.message, "categories is required");

        let ok = json!({"instructions": "i", "attachment_url": "u", "categories": ["a"]});
        assert!(validate_task("categorization-image", &ok).is_ok());
    }

    #[test]
    fn validate_rejects_non_object() {
        let err = validate_task("annotation-box", &json!([1, 2])).unwrap_err();
        assert_eq!(err.message, "task must be a JSON object");
    }

    #[test]
    fn parse_count_rejects_negative() {
        let params = HashMap::from([("limit".to_string(), "-1".to_string())]);
        assert!(parse_count(&params, "limit").is_err());
        assert_eq!(parse_count(&params, "skip").ok(), Some(None));
    }

    #[test]
    fn create_project_name_is_optional_in_shape() {
        let input: CreateProject = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
    }
}
