//! Blocking client that performs the HTTP round-trips.
//!
//! # Design
//! `Session` pairs a `TrainingsetClient` with one pooled `ureq::Agent`. The
//! agent is configured to hand 4xx/5xx responses back as data so that
//! status interpretation stays in `TrainingsetClient::parse_*`. Nothing is
//! mutated after construction, so a `Session` can be cloned or shared
//! across threads; clones reuse the same connection pool.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::TrainingsetClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Params, TaskFilter, TaskType};

#[derive(Clone)]
pub struct Session {
    client: TrainingsetClient,
    agent: ureq::Agent,
}

impl Session {
    /// Create a session for `api_key` against the production API.
    ///
    /// No request is sent here; a bad key only shows up as an error on the
    /// first call.
    pub fn new(api_key: &str) -> Self {
        Self::with_config(ClientConfig::new(api_key))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            client: TrainingsetClient::with_config(config),
            agent,
        }
    }

    pub fn client(&self) -> &TrainingsetClient {
        &self.client
    }

    /// Execute a prepared request and return the raw response.
    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = req.method.as_str(), url = %req.url, "sending request");

        let result = match req.method {
            HttpMethod::Get => with_headers(self.agent.get(&req.url), &req.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&req.url), &req.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&req.url), &req.headers);
                match req.body.as_deref() {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| {
            warn!(url = %req.url, error = %e, "request failed");
            ApiError::Transport(e.to_string())
        })?;
        let status = response.status().as_u16();
        // No size cap: an unpaginated task listing can be arbitrarily large.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }

    // -----------------------------------------------------------------------
    // Generic primitives
    // -----------------------------------------------------------------------

    /// GET `endpoint` with `params` as the query string.
    pub fn get(&self, endpoint: &str, params: &Params) -> Result<Value, ApiError> {
        let req = self.client.build_get(endpoint, params);
        self.send(req)
    }

    /// POST `body` as JSON to `endpoint`.
    pub fn post<B>(&self, endpoint: &str, body: &B) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.client.build_post(endpoint, body)?;
        self.send(req)
    }

    /// DELETE `endpoint/id`. Only transport failures are errors; the service
    /// reply is returned whatever its status.
    pub fn delete(&self, endpoint: &str, id: &str) -> Result<Value, ApiError> {
        let req = self.client.build_delete(endpoint, id);
        let response = self.execute(req)?;
        if response.status != 200 {
            warn!(status = response.status, endpoint, id, "delete was not successful");
        }
        self.client.parse_delete(response)
    }

    fn send(&self, req: HttpRequest) -> Result<Value, ApiError> {
        let response = self.execute(req)?;
        self.client.parse_response(response).inspect_err(|e| {
            if let ApiError::Service { kind, code, message } = e {
                warn!(?kind, code, %message, "service rejected request");
            }
        })
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// List tasks matching `params` (`limit`, `skip`, `status`, `sort`, ...).
    pub fn get_tasks(&self, params: &Params) -> Result<Value, ApiError> {
        let req = self.client.build_get_tasks(params);
        self.send(req)
    }

    pub fn get_tasks_filtered(&self, filter: &TaskFilter) -> Result<Value, ApiError> {
        self.get_tasks(&filter.to_params()?)
    }

    pub fn delete_task(&self, task_id: &str) -> Result<Value, ApiError> {
        self.delete(crate::client::TASK_ENDPOINT, task_id)
    }

    pub fn create_task<T>(&self, task_type: TaskType, task: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let req = self.client.build_create_task(task_type, task)?;
        self.send(req)
    }

    pub fn create_box_annotation_task<T>(&self, task: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.create_task(TaskType::Box, task)
    }

    pub fn create_line_annotation_task<T>(&self, task: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.create_task(TaskType::Line, task)
    }

    pub fn create_polygon_annotation_task<T>(&self, task: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.create_task(TaskType::Polygon, task)
    }

    pub fn create_point_annotation_task<T>(&self, task: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.create_task(TaskType::Point, task)
    }

    pub fn create_point_cloud_annotation_task<T>(&self, task: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.create_task(TaskType::PointCloud, task)
    }

    pub fn create_segmentation_task<T>(&self, task: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.create_task(TaskType::Segmentation, task)
    }

    pub fn create_image_categorization_task<T>(&self, task: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        self.create_task(TaskType::ImageCategorization, task)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn create_project(&self, name: &str) -> Result<Value, ApiError> {
        let req = self.client.build_create_project(name)?;
        self.send(req)
    }

    pub fn get_projects(&self) -> Result<Value, ApiError> {
        let req = self.client.build_get_projects();
        self.send(req)
    }

    pub fn delete_project(&self, project_id: &str) -> Result<Value, ApiError> {
        self.delete(crate::client::PROJECT_ENDPOINT, project_id)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", self.client.config())
            .finish_non_exhaustive()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}
