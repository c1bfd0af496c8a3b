use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Project, ProjectPage, Task, TaskPage};
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "test-key";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("user_key", KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("user_key", KEY)
        .body(String::new())
        .unwrap()
}

const BOX_TASK: &str = r#"{"instructions":"Draw boxes","attachment_url":"http://placekitten.com/1920/1080"}"#;

// --- auth ---

#[tokio::test]
async fn missing_api_key_is_401_with_message() {
    let resp = app()
        .oneshot(Request::builder().uri("/project").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("user_key"));
}

#[tokio::test]
async fn unknown_route_is_plain_text_404() {
    let resp = app().oneshot(request("GET", "/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"Cannot GET /nope");
}

// --- tasks ---

#[tokio::test]
async fn list_tasks_empty() {
    let resp = app()
        .oneshot(request("GET", "/task/by-custom-filter"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: TaskPage = body_json(resp).await;
    assert!(page.data.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn create_box_task_echoes_params() {
    let resp = app()
        .oneshot(json_request("POST", "/task/annotation/box", BOX_TASK))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let task: Task = body_json(resp).await;
    assert_eq!(task.task_type, "annotation-box");
    assert_eq!(task.status, "pending");
    assert_eq!(task.params, serde_json::from_str::<Value>(BOX_TASK).unwrap());
}

#[tokio::test]
async fn create_task_missing_instructions_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/task/annotation/polygon",
            r#"{"attachment_url":"http://example.com/a.png"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"message": "instructions is required"}));
}

#[tokio::test]
async fn create_task_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/task/annotation/box", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn create_categorization_requires_categories() {
    let resp = app()
        .oneshot(json_request("POST", "/task/categorization/image", BOX_TASK))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_annotation_kind_is_404() {
    let resp = app()
        .oneshot(json_request("POST", "/task/annotation/cube", BOX_TASK))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_tasks_bad_limit_returns_400() {
    let resp = app()
        .oneshot(request("GET", "/task/by-custom-filter?limit=abc"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_task_not_found() {
    let resp = app()
        .oneshot(request("DELETE", "/task/does-not-exist"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "error");
}

// --- projects ---

#[tokio::test]
async fn create_project_without_name_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/project", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "name is required");
}

// --- full lifecycle ---

#[tokio::test]
async fn task_and_project_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create two tasks of different types
    for (uri, body) in [
        ("/task/annotation/box", BOX_TASK.to_string()),
        (
            "/task/categorization/image",
            r#"{"instructions":"Pick one","attachment_url":"http://x/y.png","categories":["a","b"]}"#
                .to_string(),
        ),
    ] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", uri, &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // filter by type
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/task/by-custom-filter?type=categorization-image"))
        .await
        .unwrap();
    let page: TaskPage = body_json(resp).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].task_type, "categorization-image");

    // limit
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/task/by-custom-filter?limit=1"))
        .await
        .unwrap();
    let page: TaskPage = body_json(resp).await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.total, 2);
    let id = page.data[0].id.clone();

    // delete, then delete again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/task/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"status": "success"}));

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/task/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // projects
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/project", r#"{"name":"pytest project"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let project: Project = body_json(resp).await;
    assert_eq!(project.name, "pytest project");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/project"))
        .await
        .unwrap();
    let page: ProjectPage = body_json(resp).await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, project.id);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/project/{}", project.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/project"))
        .await
        .unwrap();
    let page: ProjectPage = body_json(resp).await;
    assert!(page.data.is_empty());
}
