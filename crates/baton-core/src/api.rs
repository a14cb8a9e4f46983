//! Versioned API front door.
//!
//! Each `(version, resource)` pair gets its own [`Router`] whose base path is
//! `{base}/{version}/{resource}`, so the resource's routes are declared
//! relative to it:
//!
//! ```rust,ignore
//! let mut widgets = Router::builder();
//! widgets.get("/[i:id]", "Widgets@show")?;
//!
//! let mut api = Api::new("/api");
//! api.mount("v1", "widgets", widgets)?;
//! api.respond(&Request::new("GET", "/api/v1/widgets/42"));
//! ```

use serde_json::{Map, json};

use crate::error::BatonResult;
use crate::http::Request;
use crate::response::{ApiResponse, Responses};
use crate::router::{Router, RouterBuilder};
use crate::routing::join_path;

/// Request-error code for a URL with no version segment.
pub const INVALID_API_URL: i64 = 4;
/// Not-found code for a version/resource with no mounted router.
pub const UNKNOWN_RESOURCE: i64 = 5;

/// How a request path resolved against the mounted routers.
pub enum Resolution<'a> {
    Found {
        router: &'a Router,
        version: &'a str,
        resource: &'a str,
    },
    InvalidUrl,
    NotFound,
}

struct Mount {
    version: String,
    resource: String,
    router: Router,
}

pub struct Api {
    base: String,
    mounts: Vec<Mount>,
}

impl Api {
    pub fn new(base: impl Into<String>) -> Self {
        Api {
            base: base.into(),
            mounts: Vec::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Freeze `builder` as the router for `version`/`resource`.
    pub fn mount(&mut self, version: &str, resource: &str, mut builder: RouterBuilder) -> BatonResult<&mut Self> {
        let base_path = join_path(&join_path(&self.base, version), resource);
        builder.set_base_path(base_path.trim_end_matches('/'));
        let router = builder.build()?;
        tracing::debug!(version, resource, routes = router.routes().len(), "api resource mounted");
        self.mounts.push(Mount {
            version: version.to_string(),
            resource: resource.trim_matches('/').to_string(),
            router,
        });
        Ok(self)
    }

    /// Find the router for a request path.
    ///
    /// The first segment after the base is the version. The resource is
    /// the longest mounted prefix of the remaining segments, never
    /// including the last one when more than one remains.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        let relative = path.strip_prefix(self.base.as_str()).unwrap_or(path);
        let mut segments = relative.split('/').filter(|s| !s.is_empty());

        let Some(version) = segments.next() else {
            return Resolution::InvalidUrl;
        };
        let mut resource: Vec<&str> = segments.collect();
        if resource.len() > 1 {
            resource.pop();
        }

        loop {
            let candidate = resource.join("/");
            if let Some(mount) = self
                .mounts
                .iter()
                .find(|m| m.version == version && m.resource == candidate)
            {
                return Resolution::Found {
                    router: &mount.router,
                    version: &mount.version,
                    resource: &mount.resource,
                };
            }
            if resource.pop().is_none() {
                return Resolution::NotFound;
            }
        }
    }

    pub fn respond(&self, request: &Request) -> ApiResponse {
        match self.resolve(&request.path) {
            Resolution::Found { router, .. } => router.respond(request),
            Resolution::InvalidUrl => {
                tracing::info!(path = %request.path, "api url without version");
                ApiResponse::request_error(
                    payload(json!({ "message": "Invalid API URL.", "status_code": INVALID_API_URL })),
                    400,
                )
            }
            Resolution::NotFound => {
                tracing::info!(path = %request.path, "no api resource mounted");
                Responses::not_found(payload(json!({ "status_code": UNKNOWN_RESOURCE })))
            }
        }
    }
}

fn payload(value: serde_json::Value) -> Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap_or_default()
}
