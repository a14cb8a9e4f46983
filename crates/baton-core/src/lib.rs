pub mod api;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod logging;
pub mod prelude;
pub mod response;
pub mod router;
pub mod routing;

pub use api::Api;
pub use config::Config;
pub use dispatch::{Context, Controller, Outcome, Phase};
pub use error::{BatonError, BatonResult};
pub use http::{Method, Request};
pub use response::{ApiResponse, Responses};
pub use router::{Router, RouterBuilder};
pub use routing::{Endpoint, Params, RouteMatch, RouteTable, Routes, Scope, Target};
