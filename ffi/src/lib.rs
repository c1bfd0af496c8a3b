//! C-ABI wrapper around `trainingset-core`.
//!
//! # Overview
//! Exposes request building and response parsing for every Trainingset
//! endpoint through `extern "C"` functions, so any language with a C FFI can
//! use the SDK while doing the HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Payloads cross as JSON text. Task bodies are validated as JSON and then
//!   forwarded byte-for-byte.
//! - Builders return null on bad input; parse functions always return an
//!   `FfiResult` envelope.
//! - The C caller owns all returned pointers and must call the matching
//!   `ts_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use serde_json::value::RawValue;
use trainingset_core::http::HttpResponse;
use trainingset_core::types::Params;
use trainingset_core::ClientConfig;

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client for `api_key`.
///
/// `base_url` may be null to use the production API.
/// Returns null if `api_key` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `ts_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn ts_client_new(
    api_key: *const c_char,
    base_url: *const c_char,
) -> *mut FfiClient {
    catch_unwind(|| {
        let Some(api_key) = read_str(api_key) else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::new(api_key);
        if let Some(url) = read_str(base_url) {
            config = config.with_base_url(url);
        }
        let client = trainingset_core::TrainingsetClient::with_config(config);
        Box::into_raw(Box::new(FfiClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `ts_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ts_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a request listing tasks.
///
/// `params_json` is a JSON object of filter, sort and pagination fields, or
/// null for none. Returns null if `client` is null or `params_json` is not a
/// JSON object.
#[unsafe(no_mangle)]
pub extern "C" fn ts_build_get_tasks(
    client: *const FfiClient,
    params_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let params: Params = if params_json.is_null() {
            Params::new()
        } else {
            match read_str(params_json).map(serde_json::from_str) {
                Some(Ok(params)) => params,
                _ => return std::ptr::null_mut(),
            }
        };
        FfiHttpRequest::from_core(client.inner.build_get_tasks(&params))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request creating a task of `task_type` (an `FfiTaskType` value).
///
/// `task_json` is sent exactly as given once it parses as JSON.
/// Returns null on a null argument, unknown task type or invalid JSON.
#[unsafe(no_mangle)]
pub extern "C" fn ts_build_create_task(
    client: *const FfiClient,
    task_type: u32,
    task_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(task_type) = task_type_from_raw(task_type) else {
            return std::ptr::null_mut();
        };
        let task: Box<RawValue> = match read_str(task_json).map(serde_json::from_str) {
            Some(Ok(task)) => task,
            _ => return std::ptr::null_mut(),
        };
        match client.inner.build_create_task(task_type, &task) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request creating a project called `name`.
#[unsafe(no_mangle)]
pub extern "C" fn ts_build_create_project(
    client: *const FfiClient,
    name: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(name) = read_str(name) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_create_project(name) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request listing projects. Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn ts_build_get_projects(client: *const FfiClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_get_projects())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request deleting the task `id`.
#[unsafe(no_mangle)]
pub extern "C" fn ts_build_delete_task(
    client: *const FfiClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_str(id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_delete_task(id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request deleting the project `id`.
#[unsafe(no_mangle)]
pub extern "C" fn ts_build_delete_project(
    client: *const FfiClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_str(id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_delete_project(id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`.
///
/// A null body is treated as empty; a body that is not UTF-8 is an invalid
/// argument.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Option<HttpResponse> {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        read_str(resp.body)?.to_string()
    };
    Some(HttpResponse {
        status: resp.status,
        body,
    })
}

/// Parse the response to any get/post request built by this library.
///
/// Only status 200 is success (`data` holds the JSON body). Status 400
/// yields `Validation`, any other status `Api`.
#[unsafe(no_mangle)]
pub extern "C" fn ts_parse_response(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let Some(core_resp) = ffi_response_to_core(unsafe { &*response }) else {
            return FfiResult::invalid_arg("response body is not valid UTF-8");
        };
        match client.inner.parse_response(core_resp) {
            Ok(value) => FfiResult::ok_json(&value),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ts_parse_response"))
}

/// Parse the response to a delete request.
///
/// Never fails on status: `data` holds the body (or `{"message": ...}` for
/// plain text, `null` for an empty body) and the caller inspects it.
#[unsafe(no_mangle)]
pub extern "C" fn ts_parse_delete(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let Some(core_resp) = ffi_response_to_core(unsafe { &*response }) else {
            return FfiResult::invalid_arg("response body is not valid UTF-8");
        };
        let status = core_resp.status;
        match client.inner.parse_delete(core_resp) {
            Ok(value) => {
                let result = FfiResult::ok_json(&value);
                unsafe { (*result).http_status = status };
                result
            }
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ts_parse_delete"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `ts_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ts_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiResult` returned by any `ts_parse_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ts_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data.is_null() {
            drop(unsafe { CString::from_raw(result.data) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ts_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
