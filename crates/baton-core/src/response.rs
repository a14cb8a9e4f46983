use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::dispatch::is_truthy;

/// Standard API response envelope.
///
/// Every Baton outcome is shaped into this format:
/// ```json
/// {
///   "http_code": 401,
///   "error": 1,
///   "status": "not_authenticated",
///   "status_code": 0,
///   "error_type": "access",
///   "payload": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub http_code: u16,
    pub error: u8,
    pub status: String,
    pub status_code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub payload: Map<String, Value>,
}

impl ApiResponse {
    /// Shape a payload into the envelope.
    ///
    /// `status_code`, `status` and `error_type` are lifted out of the
    /// payload when present and non-empty. `error_type` is only kept for
    /// error responses.
    pub fn build(http_code: u16, is_error: bool, mut payload: Map<String, Value>) -> Self {
        let status_code = take_non_empty(&mut payload, "status_code")
            .map(|v| as_i64(&v))
            .unwrap_or(0);
        let status = take_non_empty(&mut payload, "status")
            .map(|v| as_string(&v))
            .unwrap_or_else(|| "success".to_string());
        let error_type = take_non_empty(&mut payload, "error_type").map(|v| as_string(&v));

        ApiResponse {
            http_code,
            error: u8::from(is_error),
            status,
            status_code,
            error_type: if is_error { error_type } else { None },
            payload,
        }
    }

    pub fn success(payload: Map<String, Value>, http_code: u16) -> Self {
        Self::build(non_zero(http_code, 200), false, payload)
    }

    pub fn request_error(payload: Map<String, Value>, http_code: u16) -> Self {
        Self::error_kind(payload, non_zero(http_code, 400), "request", "request_error")
    }

    pub fn access_error(payload: Map<String, Value>, http_code: u16) -> Self {
        Self::error_kind(payload, non_zero(http_code, 401), "access", "access_error")
    }

    pub fn not_found_error(payload: Map<String, Value>, http_code: u16) -> Self {
        Self::error_kind(payload, non_zero(http_code, 404), "not_found", "not_found")
    }

    pub fn internal_error(payload: Map<String, Value>, http_code: u16) -> Self {
        Self::error_kind(payload, non_zero(http_code, 500), "internal", "internal_error")
    }

    /// Redirect envelope; `error` is set and `uri` defaults to `/`.
    pub fn redirect(mut payload: Map<String, Value>, http_code: u16) -> Self {
        let mut http_code = non_zero(http_code, 307);
        if !payload.get("status").is_some_and(is_truthy) {
            payload.insert("status".into(), json!("temporary_redirect"));
            http_code = 307;
        }
        if !payload.get("uri").is_some_and(is_truthy) {
            payload.insert("uri".into(), json!("/"));
        }
        Self::build(http_code, true, payload)
    }

    fn error_kind(
        mut payload: Map<String, Value>,
        http_code: u16,
        error_type: &str,
        default_status: &str,
    ) -> Self {
        payload.insert("error_type".into(), json!(error_type));
        if !payload.get("status").is_some_and(is_truthy) {
            payload.insert("status".into(), json!(default_status));
        }
        Self::build(http_code, true, payload)
    }

    pub fn is_error(&self) -> bool {
        self.error != 0
    }

    /// Recognise a value that is already a shaped envelope.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        if !(obj.contains_key("http_code") && obj.contains_key("status") && obj.contains_key("payload")) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(&self).unwrap_or_default()
    }

    /// Serialize the envelope; a serialization failure yields the `json_error` body.
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(body) => body,
            Err(e) => json!({
                "status_code": 500,
                "status": "json_error",
                "error": 1,
                "error_type": "internal",
                "error_msg": e.to_string(),
            })
            .to_string(),
        }
    }
}

/// Named response helpers.
pub struct Responses;

impl Responses {
    /// 200 - Success
    pub fn success(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::success(payload, 200)
    }

    /// 200 - No Data
    pub fn no_data(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::success(with_status(payload, "no_data"), 200)
    }

    /// 308 - Permanent Redirect
    pub fn permanent_redirect(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::redirect(with_status(payload, "permanent_redirect"), 308)
    }

    /// 307 - Temporary Redirect
    pub fn temporary_redirect(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::redirect(with_status(payload, "temporary_redirect"), 307)
    }

    /// 303 - See Other
    pub fn see_other(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::redirect(with_status(payload, "see_other"), 303)
    }

    /// 302 - Found
    pub fn found(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::redirect(with_status(payload, "found"), 302)
    }

    /// 301 - Moved Permanently
    pub fn moved_permanently(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::redirect(with_status(payload, "moved_permanently"), 301)
    }

    /// 400 - Bad Request (keeps a caller-supplied status)
    pub fn bad_request(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::request_error(with_default_status(payload, "bad_request"), 400)
    }

    /// 400 - Missing Parameters
    pub fn missing_parameters(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::request_error(with_status(payload, "missing_parameters"), 400)
    }

    /// 400 - Failed Validation
    pub fn failed_validation(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::request_error(with_status(payload, "failed_validation"), 400)
    }

    /// 401 - Failed Authentication
    pub fn failed_authentication(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::access_error(with_status(payload, "failed_authentication"), 401)
    }

    /// 401 - Not Authenticated
    pub fn not_authenticated(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::access_error(with_status(payload, "not_authenticated"), 401)
    }

    /// 403 - Forbidden (keeps a caller-supplied status)
    pub fn forbidden(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::access_error(with_default_status(payload, "forbidden"), 403)
    }

    /// 404 - Not Found (endpoint)
    pub fn not_found(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::access_error(with_status(payload, "not_found"), 404)
    }

    /// 404 - Data Not Found
    pub fn data_not_found(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::not_found_error(with_status(payload, "data_not_found"), 404)
    }

    /// 500 - Internal Error
    pub fn internal_error(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::internal_error(payload, 500)
    }

    /// 500 - Invalid Method Parameters
    pub fn invalid_method_parameters(payload: Map<String, Value>) -> ApiResponse {
        ApiResponse::internal_error(with_status(payload, "invalid_method_parameters"), 500)
    }
}

fn with_status(mut payload: Map<String, Value>, status: &str) -> Map<String, Value> {
    payload.insert("status".into(), json!(status));
    payload
}

fn with_default_status(mut payload: Map<String, Value>, status: &str) -> Map<String, Value> {
    payload.entry("status").or_insert_with(|| json!(status));
    payload
}

fn non_zero(code: u16, default: u16) -> u16 {
    if code == 0 { default } else { code }
}

fn take_non_empty(payload: &mut Map<String, Value>, key: &str) -> Option<Value> {
    if payload.get(key).is_some_and(is_truthy) {
        payload.remove(key)
    } else {
        None
    }
}

fn as_i64(v: &Value) -> i64 {
    match v {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn as_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
