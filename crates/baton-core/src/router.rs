//! Router construction and dispatch.
//!
//! Routes are declared on a [`RouterBuilder`], checked once by
//! [`RouterBuilder::build`], and served from the resulting immutable
//! [`Router`]:
//!
//! ```rust,ignore
//! let mut builder = Router::builder();
//! builder
//!     .controller("Widgets", |_m| Widgets::default())
//!     .action("show", |w: &mut Widgets, ctx| w.show(ctx));
//! builder.get("/v1/widgets/[i:id]", "Widgets@show")?;
//! let router = builder.build()?;
//!
//! let envelope = router.respond(&Request::new("GET", "/v1/widgets/42"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{JwtAuth, auth_filter};
use crate::config::Config;
use crate::dispatch::filter::FilterExecutor;
use crate::dispatch::{
    Context, Controller, ControllerBuilder, ControllerCache, ControllerRegistry, Filter, FilterFn, Outcome, Phase,
};
use crate::error::{BatonError, BatonResult};
use crate::http::{MethodSet, Request};
use crate::response::ApiResponse;
use crate::routing::scope::normalize_pattern;
use crate::routing::{
    Endpoint, HandlerResult, Params, Route, RouteMatch, RouteTable, Routes, Scope, ScopedRoutes, Target,
};

/// Mutable declaration surface. Nothing here is matched against requests
/// until [`build`](RouterBuilder::build) freezes it into a [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
    table: RouteTable,
    filters: HashMap<String, FilterFn>,
    controllers: ControllerRegistry,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with the base path from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new();
        builder.set_base_path(config.base_path.clone());
        builder
    }

    pub fn set_base_path(&mut self, base_path: impl Into<String>) -> &mut Self {
        self.table.set_base_path(base_path);
        self
    }

    pub fn add_match_types<K, V>(&mut self, types: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.table.add_match_types(types);
        self
    }

    /// Register a named filter.
    pub fn filter(&mut self, name: impl Into<String>, filter: FilterFn) -> &mut Self {
        self.filters.insert(name.into(), filter);
        self
    }

    /// Register the `auth` filter backed by `auth`.
    pub fn with_auth(&mut self, auth: Arc<JwtAuth>, expose_errors: bool) -> &mut Self {
        self.filter("auth", auth_filter(auth, expose_errors))
    }

    pub fn controllers(&mut self) -> &mut ControllerRegistry {
        &mut self.controllers
    }

    /// Shorthand for `controllers().register(name, factory)`.
    pub fn controller<C, F>(&mut self, name: impl Into<String>, factory: F) -> ControllerBuilder<'_, C>
    where
        C: Controller + 'static,
        F: Fn(&RouteMatch<'_>) -> C + Send + Sync + 'static,
    {
        self.controllers.register(name, factory)
    }

    /// Declare the routes in `body` under `scope`.
    pub fn scope<F>(&mut self, scope: Scope, body: F) -> BatonResult<&mut Self>
    where
        F: FnOnce(&mut ScopedRoutes<'_>) -> BatonResult<()>,
    {
        tracing::debug!(prefix = scope.prefix(), "entering route scope");
        let mut scoped = ScopedRoutes::new(&mut self.table, &scope);
        body(&mut scoped)?;
        Ok(self)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn match_route(&self, path: &str, method: &str) -> Option<RouteMatch<'_>> {
        self.table.match_route(path, method)
    }

    /// Resolve every controller, action and filter reference once, then
    /// freeze the table.
    pub fn build(self) -> BatonResult<Router> {
        for route in self.table.routes() {
            self.validate(route)?;
        }
        tracing::debug!(routes = self.table.len(), "router built");
        Ok(Router {
            table: self.table,
            filters: self.filters,
            controllers: self.controllers,
        })
    }

    fn validate(&self, route: &Route) -> BatonResult<()> {
        if let Target::Action(action) = route.target() {
            self.controllers.resolve(action)?;
        }
        for phase in [Phase::Before, Phase::After] {
            for filter in route.filters(phase).iter() {
                match filter {
                    Filter::Named(name) if !self.filters.contains_key(name) => {
                        return Err(BatonError::InvalidHandler(format!(
                            "Unknown filter '{name}' on route '{}'",
                            route.pattern()
                        )));
                    }
                    Filter::Action(action) => self.controllers.resolve(action)?,
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl Routes for RouterBuilder {
    fn declare(&mut self, methods: MethodSet, pattern: &str, endpoint: Endpoint) -> BatonResult<()> {
        self.table
            .add_route(Route::new(methods, normalize_pattern(pattern), endpoint))
    }
}

/// An immutable, validated route table plus the filters and controllers it
/// refers to. Safe to share across threads.
pub struct Router {
    table: RouteTable,
    filters: HashMap<String, FilterFn>,
    controllers: ControllerRegistry,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn routes(&self) -> &[Route] {
        self.table.routes()
    }

    pub fn match_route(&self, path: &str, method: &str) -> Option<RouteMatch<'_>> {
        self.table.match_route(path, method)
    }

    pub fn url_for(&self, name: &str, params: &Params) -> BatonResult<String> {
        self.table.url_for(name, params)
    }

    /// Match, run the before filters, call the target, run the after filters.
    pub fn dispatch(&self, request: &Request) -> Outcome {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dispatch",
            %request_id,
            method = %request.method,
            path = %request.path
        );
        let _enter = span.enter();

        let Some(matched) = self.table.match_route(&request.path, &request.method) else {
            tracing::info!("no route matched");
            return Outcome::NotFound;
        };
        tracing::debug!(
            index = matched.index(),
            pattern = matched.route().pattern(),
            target = %matched.target(),
            "route matched"
        );

        let mut cache = ControllerCache::new();
        let mut ctx = Context::new(request, matched);
        match self.execute(&mut ctx, &mut cache) {
            Ok(value) => Outcome::Responded(value),
            Err(err) => {
                match &err {
                    BatonError::FilterShortCircuit { phase, .. } => {
                        tracing::debug!(%phase, "request vetoed by filter");
                    }
                    other => tracing::warn!(error = %other, "dispatch failed"),
                }
                Outcome::Failed(err)
            }
        }
    }

    /// Dispatch and translate the outcome into a response envelope.
    pub fn respond(&self, request: &Request) -> ApiResponse {
        self.dispatch(request).into_response()
    }

    fn execute(&self, ctx: &mut Context<'_>, cache: &mut ControllerCache) -> HandlerResult {
        let filters = FilterExecutor::new(&self.filters, &self.controllers);

        filters.run(Phase::Before, ctx, cache)?;
        let value = match ctx.route().target() {
            Target::Handler(handler) => handler(ctx)?,
            Target::Action(action) => self.controllers.invoke(action, ctx, cache)?,
        };
        ctx.set_response(value);
        filters.run(Phase::After, ctx, cache)?;

        Ok(ctx.take_response().unwrap_or_default())
    }
}
