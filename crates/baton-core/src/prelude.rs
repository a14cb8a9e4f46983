//! Baton prelude: import everything you need with one line.
//!
//! ```rust,ignore
//! use baton_core::prelude::*;
//! ```

// ── Core types ─────────────────────────────────────────────────
pub use crate::Api;
pub use crate::ApiResponse;
pub use crate::BatonError;
pub use crate::BatonResult;
pub use crate::Config;
pub use crate::Responses;

// ── Router & routing ───────────────────────────────────────────
pub use crate::routing::{Endpoint, HandlerResult, Params, RouteMatch, Routes, Scope, ScopedRoutes, Target};
pub use crate::{Router, RouterBuilder};

// ── Dispatch ───────────────────────────────────────────────────
pub use crate::dispatch::{Context, Controller, Filter, FilterFn, Outcome, Phase};

// ── Auth ───────────────────────────────────────────────────────
pub use crate::auth::{AuthHooks, JwtAuth, TokenClaims, TokenError, auth_filter, auth_filter_with_hooks};

// ── HTTP types ─────────────────────────────────────────────────
pub use crate::Method;
pub use crate::Request;

// ── Logging ────────────────────────────────────────────────────
pub use crate::logging::{init_logging, init_logging_json, init_logging_pretty, init_logging_with_level};

// ── Serde (almost every handler needs these) ───────────────────
pub use serde::{Deserialize, Serialize};
pub use serde_json::{Value, json};
