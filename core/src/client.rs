//! Stateless HTTP request builder and response parser for the Trainingset API.
//!
//! # Design
//! `TrainingsetClient` holds only its `ClientConfig` and carries no mutable
//! state between calls. Each endpoint is split into a `build_*` method that
//! produces an `HttpRequest` and a parse method that consumes the matching
//! `HttpResponse`. The caller executes the HTTP round-trip in between, which
//! keeps this module deterministic and free of I/O.
//!
//! Payloads are forwarded exactly as the caller supplied them. Nothing is
//! injected, renamed or stripped.

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::config::{ClientConfig, API_KEY_HEADER};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Params, TaskType};

pub const TASKS_FILTER_ENDPOINT: &str = "/task/by-custom-filter";
pub const TASK_ENDPOINT: &str = "/task";
pub const PROJECT_ENDPOINT: &str = "/project";

/// Synchronous, stateless client for the Trainingset API.
#[derive(Debug, Clone)]
pub struct TrainingsetClient {
    config: ClientConfig,
}

impl TrainingsetClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_config(ClientConfig::new(api_key))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Generic primitives
    // -----------------------------------------------------------------------

    /// `GET base_url + endpoint` with `params` encoded as the query string.
    pub fn build_get(&self, endpoint: &str, params: &Params) -> HttpRequest {
        let mut url = self.url(endpoint);
        let query = encode_query(params);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: self.auth_headers(),
            body: None,
        }
    }

    /// `POST base_url + endpoint` with `body` serialized as JSON.
    pub fn build_post<B>(&self, endpoint: &str, body: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut headers = self.auth_headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(endpoint),
            headers,
            body: Some(body),
        })
    }

    /// `DELETE base_url + endpoint + "/" + id`, with `id` percent-encoded as a
    /// single path segment.
    pub fn build_delete(&self, endpoint: &str, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}/{}", self.url(endpoint), urlencoding::encode(id)),
            headers: self.auth_headers(),
            body: None,
        }
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// List tasks. `params` passes filter, sort and pagination through as-is.
    pub fn build_get_tasks(&self, params: &Params) -> HttpRequest {
        self.build_get(TASKS_FILTER_ENDPOINT, params)
    }

    pub fn build_delete_task(&self, task_id: &str) -> HttpRequest {
        self.build_delete(TASK_ENDPOINT, task_id)
    }

    pub fn build_create_task<T>(&self, task_type: TaskType, task: &T) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.build_post(task_type.endpoint(), task)
    }

    pub fn build_create_box_annotation_task<T>(&self, task: &T) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.build_create_task(TaskType::Box, task)
    }

    pub fn build_create_line_annotation_task<T>(&self, task: &T) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.build_create_task(TaskType::Line, task)
    }

    pub fn build_create_polygon_annotation_task<T>(&self, task: &T) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.build_create_task(TaskType::Polygon, task)
    }

    pub fn build_create_point_annotation_task<T>(&self, task: &T) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.build_create_task(TaskType::Point, task)
    }

    pub fn build_create_point_cloud_annotation_task<T>(
        &self,
        task: &T,
    ) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.build_create_task(TaskType::PointCloud, task)
    }

    pub fn build_create_segmentation_task<T>(&self, task: &T) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.build_create_task(TaskType::Segmentation, task)
    }

    pub fn build_create_image_categorization_task<T>(
        &self,
        task: &T,
    ) -> Result<HttpRequest, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.build_create_task(TaskType::ImageCategorization, task)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn build_create_project(&self, name: &str) -> Result<HttpRequest, ApiError> {
        self.build_post(PROJECT_ENDPOINT, &serde_json::json!({ "name": name }))
    }

    pub fn build_get_projects(&self) -> HttpRequest {
        self.build_get(PROJECT_ENDPOINT, &Params::new())
    }

    pub fn build_delete_project(&self, project_id: &str) -> HttpRequest {
        self.build_delete(PROJECT_ENDPOINT, project_id)
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Parse the response to any get/post request.
    ///
    /// Only status 200 counts as success. 400 maps to a validation error and
    /// every other status to a general service error.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if response.status != 200 {
            return Err(ApiError::from_response(response.status, &response.body));
        }
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Parse the response to a delete request.
    ///
    /// Status codes are not translated into errors: the body is handed back
    /// and callers inspect its `status` field. A body that is not JSON is
    /// wrapped as `{"message": <text>}`; an empty body becomes `null`.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<Value, ApiError> {
        let text = response.body.trim();
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "message": text })))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url())
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![(API_KEY_HEADER.to_string(), self.config.api_key().to_string())]
    }
}

/// Render `params` as an `application/x-www-form-urlencoded` query.
///
/// Scalars become their text form and `null` is skipped. Arrays of scalars
/// repeat the key once per element; nested arrays and objects are sent as
/// compact JSON.
fn encode_query(params: &Params) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) if items.iter().all(is_scalar) => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    query.append_pair(key, &scalar_text(item));
                }
            }
            Value::Array(_) | Value::Object(_) => {
                query.append_pair(key, &value.to_string());
            }
            scalar => {
                query.append_pair(key, &scalar_text(scalar));
            }
        }
    }
    query.finish()
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
