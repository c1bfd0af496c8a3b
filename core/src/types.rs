//! Request-side vocabulary for the Trainingset API.
//!
//! # Design
//! Task and project payloads stay opaque JSON: the service owns their schema
//! and the client forwards them untouched. The types here only name the
//! closed sets the API documents (task types, statuses, sort order) and
//! offer a typed builder for the task filter endpoint.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Query parameters or request body as a JSON object.
pub type Params = Map<String, Value>;

/// Kinds of task the API can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "annotation-box")]
    Box,
    #[serde(rename = "annotation-line")]
    Line,
    #[serde(rename = "annotation-polygon")]
    Polygon,
    #[serde(rename = "annotation-point")]
    Point,
    #[serde(rename = "annotation-pcd")]
    PointCloud,
    #[serde(rename = "segmentation")]
    Segmentation,
    #[serde(rename = "categorization-image")]
    ImageCategorization,
}

impl TaskType {
    pub const ALL: [TaskType; 7] = [
        TaskType::Box,
        TaskType::Line,
        TaskType::Polygon,
        TaskType::Point,
        TaskType::PointCloud,
        TaskType::Segmentation,
        TaskType::ImageCategorization,
    ];

    /// Path of the creation endpoint, relative to the base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            TaskType::Box => "/task/annotation/box",
            TaskType::Line => "/task/annotation/line",
            TaskType::Polygon => "/task/annotation/polygon",
            TaskType::Point => "/task/annotation/point",
            TaskType::PointCloud => "/task/annotation/pcd",
            TaskType::Segmentation => "/task/annotation/segmentation",
            TaskType::ImageCategorization => "/task/categorization/image",
        }
    }

    /// Name used by the `type` filter and in stored tasks.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Box => "annotation-box",
            TaskType::Line => "annotation-line",
            TaskType::Polygon => "annotation-polygon",
            TaskType::Point => "annotation-point",
            TaskType::PointCloud => "annotation-pcd",
            TaskType::Segmentation => "segmentation",
            TaskType::ImageCategorization => "categorization-image",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
    Error,
    Ready,
    Working,
}

/// Review state of a finished task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QaStatus {
    Accepted,
    Pending,
    Rejected,
}

/// Direction of one sort key; encoded as `1` / `-1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum SortOrder {
    Ascending = 1,
    Descending = -1,
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(*self as i8)
    }
}

/// A label the annotator may apply, used in `objects_to_annotate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationObject {
    pub label: String,
    pub color: String,
}

impl AnnotationObject {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Typed parameters for `GET /task/by-custom-filter`.
///
/// Every field is optional; unset fields are left out of the query.
/// Dates use `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<(String, SortOrder)>,
    #[serde(rename = "rangeStart", skip_serializing_if = "Option::is_none")]
    pub range_start: Option<String>,
    #[serde(rename = "rangeEnd", skip_serializing_if = "Option::is_none")]
    pub range_end: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa_status: Option<QaStatus>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    pub fn range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.range_start = Some(start.into());
        self.range_end = Some(end.into());
        self
    }

    pub fn task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn qa_status(mut self, qa_status: QaStatus) -> Self {
        self.qa_status = Some(qa_status);
        self
    }

    /// Convert into the parameter map accepted by `get_tasks`.
    pub fn to_params(&self) -> Result<Params, ApiError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ApiError::SerializationError(format!(
                "task filter serialized to {other}, expected an object"
            ))),
            Err(e) => Err(ApiError::SerializationError(e.to_string())),
        }
    }
}
