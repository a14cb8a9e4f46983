//! Request dispatch: filter chains, controllers and the per-request context.

pub mod context;
pub mod controller;
pub mod filter;

use std::fmt;

use serde_json::{Map, Value, json};

use crate::error::BatonError;
use crate::response::{ApiResponse, Responses};

pub use context::Context;
pub use controller::{ActionFn, AsAny, Controller, ControllerBuilder, ControllerCache, ControllerRegistry};
pub use filter::{Filter, FilterChain, FilterFn};

/// Which side of the handler a filter runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one dispatch.
#[derive(Debug)]
pub enum Outcome {
    Responded(Value),
    NotFound,
    Failed(BatonError),
}

impl Outcome {
    pub fn is_responded(&self) -> bool {
        matches!(self, Outcome::Responded(_))
    }

    /// Translate into the response envelope.
    ///
    /// A handler value that is already an envelope passes through; other
    /// objects become the success payload and scalars land under `data`.
    pub fn into_response(self) -> ApiResponse {
        match self {
            Outcome::Responded(value) => {
                if let Some(envelope) = ApiResponse::from_value(&value) {
                    return envelope;
                }
                let payload = match value {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    other => match json!({ "data": other }) {
                        Value::Object(map) => map,
                        _ => Map::new(),
                    },
                };
                Responses::success(payload)
            }
            Outcome::NotFound => Responses::not_found(Map::new()),
            Outcome::Failed(err) => err.into_response(),
        }
    }
}

/// Whether a filter's return value counts as a veto.
///
/// `null`, `false`, `0`, `""`, `"0"`, `[]` and `{}` are empty; anything
/// else is not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
