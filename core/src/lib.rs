//! Client SDK for the Trainingset.ai annotation API.
//!
//! # Overview
//! Creates annotation and categorization tasks, lists and deletes tasks, and
//! manages projects. Payloads are opaque JSON forwarded exactly as given; the
//! service owns their schema.
//!
//! # Design
//! - `TrainingsetClient` is the sans-IO half: `build_*` produces an
//!   `HttpRequest`, `parse_response` / `parse_delete` consume an
//!   `HttpResponse`. It is deterministic and is what the FFI crate wraps.
//! - `Session` is the blocking half. It owns one pooled connection and
//!   exposes one method per endpoint on top of generic `get`, `post` and
//!   `delete` primitives.
//! - Any non-200 from get/post is an `ApiError::Service` tagged
//!   `Validation` (400) or `General`. Deletes never fail on status; callers
//!   inspect the returned body.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use client::TrainingsetClient;
pub use config::{ClientConfig, API_KEY_HEADER, DEFAULT_BASE_URL};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::Session;
pub use types::{AnnotationObject, Params, QaStatus, SortOrder, TaskFilter, TaskStatus, TaskType};
