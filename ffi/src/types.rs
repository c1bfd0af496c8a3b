//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Payloads are opaque JSON on both
//! sides, so results carry the parsed body re-encoded as a C string rather
//! than a tree of structs.

use std::ffi::CString;
use std::os::raw::c_char;

use trainingset_core::error::{ApiError, ErrorKind};
use trainingset_core::http::HttpMethod;
use trainingset_core::TaskType;

/// Opaque handle to a `TrainingsetClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: trainingset_core::TrainingsetClient,
}

/// Allocate a C string. Interior NULs cannot occur in JSON output; for other
/// text they collapse the string to empty rather than aborting.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// Task kinds accepted by `ts_build_create_task`, passed as `uint32_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTaskType {
    Box = 0,
    Line = 1,
    Polygon = 2,
    Point = 3,
    PointCloud = 4,
    Segmentation = 5,
    ImageCategorization = 6,
}

/// Map a raw discriminant from C to a core `TaskType`.
pub(crate) fn task_type_from_raw(raw: u32) -> Option<TaskType> {
    let task_type = match raw {
        x if x == FfiTaskType::Box as u32 => TaskType::Box,
        x if x == FfiTaskType::Line as u32 => TaskType::Line,
        x if x == FfiTaskType::Polygon as u32 => TaskType::Polygon,
        x if x == FfiTaskType::Point as u32 => TaskType::Point,
        x if x == FfiTaskType::PointCloud as u32 => TaskType::PointCloud,
        x if x == FfiTaskType::Segmentation as u32 => TaskType::Segmentation,
        x if x == FfiTaskType::ImageCategorization as u32 => TaskType::ImageCategorization,
        _ => return None,
    };
    Some(task_type)
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `ts_build_*` functions. The C caller executes the request and
/// passes the response back through `ts_parse_response` / `ts_parse_delete`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: trainingset_core::HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request and
/// passes a pointer to a parse function. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// Service answered 400.
    Validation = 1,
    /// Service answered any other non-200 status.
    Api = 2,
    Transport = 3,
    Deserialization = 4,
    Serialization = 5,
    InvalidArg = 6,
    NullArg = 7,
    Panic = 8,
}

/// Result envelope for parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// holds the response body as JSON text. On failure `error_code` describes
/// the category, `error_message` is a human-readable C string, `http_status`
/// is set for service errors, and `data` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data: *mut c_char,
}

impl FfiResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message,
            http_status,
            data,
        }))
    }

    /// Build a success result carrying `value` as JSON text.
    pub(crate) fn ok_json(value: &serde_json::Value) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            to_c_string(value.to_string()),
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let error_code = match &err {
            ApiError::Service {
                kind: ErrorKind::Validation,
                ..
            } => FfiErrorCode::Validation,
            ApiError::Service {
                kind: ErrorKind::General,
                ..
            } => FfiErrorCode::Api,
            ApiError::Transport(_) => FfiErrorCode::Transport,
            ApiError::DeserializationError(_) => FfiErrorCode::Deserialization,
            ApiError::SerializationError(_) => FfiErrorCode::Serialization,
        };
        let http_status = err.code().unwrap_or(0);
        Self::boxed(
            error_code,
            to_c_string(err.message()),
            http_status,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            to_c_string(format!("null argument: {name}")),
            0,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for an argument that is present but unusable.
    pub(crate) fn invalid_arg(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::InvalidArg,
            to_c_string(msg.to_string()),
            0,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            to_c_string(msg.to_string()),
            0,
            std::ptr::null_mut(),
        )
    }
}
