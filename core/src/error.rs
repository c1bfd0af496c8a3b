//! Error types for the Trainingset client.
//!
//! # Design
//! The service reports failures as a non-200 status with a flat
//! `{"message": "..."}` body. Status 400 means the caller sent a bad request
//! and is tagged `ErrorKind::Validation`; every other non-200 is
//! `ErrorKind::General`. Both share one `Service` variant so callers match on
//! the kind instead of relying on catch ordering.

use thiserror::Error;

/// Category of a failure reported by the service itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// HTTP 400: the payload or parameters were rejected.
    Validation,
    /// Any other non-200 status (auth, not found, server error, ...).
    General,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        if status == 400 {
            ErrorKind::Validation
        } else {
            ErrorKind::General
        }
    }
}

/// Errors returned by `TrainingsetClient` parse methods and `Session` calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The service answered with a status other than 200.
    #[error("HTTP {code}: {message}")]
    Service {
        kind: ErrorKind,
        message: String,
        code: u16,
    },

    /// The HTTP round-trip did not complete.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A 200 response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// Build the service error for a non-200 response.
    pub fn from_response(status: u16, body: &str) -> Self {
        ApiError::Service {
            kind: ErrorKind::from_status(status),
            message: error_message(status, body),
            code: status,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Service { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::Service { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == Some(ErrorKind::Validation)
    }
}

/// Pull a human-readable message out of an error body.
///
/// Falls back to the raw text whenever the body is not the expected JSON
/// shape.
fn error_message(status: u16, body: &str) -> String {
    let text = body.trim();
    if text.is_empty() {
        return format!("HTTP {status}");
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => match map.get("message") {
            Some(serde_json::Value::String(message)) if !message.is_empty() => message.clone(),
            _ => text.to_string(),
        },
        Ok(serde_json::Value::String(message)) if !message.is_empty() => message,
        _ => text.to_string(),
    }
}
