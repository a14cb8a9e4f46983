use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::auth::TokenError;
use crate::dispatch::Phase;
use crate::response::{ApiResponse, Responses};

/// Standard error type for Baton.
///
/// Build-time variants (`DuplicateRouteName`, `InvalidRoute`,
/// `InvalidHandler`, `Config`) should abort startup. Everything else is
/// raised during dispatch and turned into an envelope at the `Router`
/// boundary.
#[derive(Debug, Error)]
pub enum BatonError {
    #[error("Can not redeclare route '{0}'")]
    DuplicateRouteName(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Invalid handler: {0}")]
    InvalidHandler(String),

    #[error("{phase} filter rejected the request")]
    FilterShortCircuit { phase: Phase, value: Value },

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type BatonResult<T> = Result<T, BatonError>;

impl BatonError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            BatonError::DuplicateRouteName(_) => 500,
            BatonError::InvalidRoute(_) => 500,
            BatonError::InvalidHandler(_) => 500,
            BatonError::FilterShortCircuit { value, .. } => ApiResponse::from_value(value)
                .map(|r| r.http_code)
                .unwrap_or(403),
            BatonError::Token(_) => 401,
            BatonError::NotFound(_) => 404,
            BatonError::Config(_) => 500,
            BatonError::Internal(_) => 500,
        }
    }

    /// Get the error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            BatonError::DuplicateRouteName(_) => "DUPLICATE_ROUTE_NAME",
            BatonError::InvalidRoute(_) => "INVALID_ROUTE",
            BatonError::InvalidHandler(_) => "INVALID_HANDLER",
            BatonError::FilterShortCircuit { .. } => "FILTER_REJECTED",
            BatonError::Token(_) => "NOT_AUTHENTICATED",
            BatonError::NotFound(_) => "NOT_FOUND",
            BatonError::Config(_) => "CONFIG_ERROR",
            BatonError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The value a filter vetoed with, if this is a short-circuit.
    pub fn veto_value(&self) -> Option<&Value> {
        match self {
            BatonError::FilterShortCircuit { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Translate into the response envelope.
    ///
    /// A veto that already carries an envelope (for example the `auth`
    /// filter's `not_authenticated`) is passed through untouched.
    pub fn into_response(self) -> ApiResponse {
        match self {
            BatonError::FilterShortCircuit { value, .. } => match ApiResponse::from_value(&value) {
                Some(envelope) => envelope,
                None => Responses::forbidden(payload(json!({ "message": value }))),
            },
            BatonError::Token(e) => Responses::not_authenticated(payload(json!({ "message": e.to_string() }))),
            BatonError::NotFound(message) => Responses::data_not_found(payload(json!({ "message": message }))),
            other => {
                let mut body = Map::new();
                body.insert("message".into(), Value::String(other.to_string()));
                body.insert("code".into(), Value::String(other.error_code().into()));
                Responses::internal_error(body)
            }
        }
    }
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
