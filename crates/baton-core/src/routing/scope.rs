//! Route declaration surface: verb helpers, scopes and resources.
//!
//! A scope is an explicit value handed to [`ScopedRoutes`] for the duration
//! of a block. `ScopedRoutes` has no `scope` method, so scopes cannot nest.

use serde_json::{Map, Value};

use crate::dispatch::{Filter, FilterChain};
use crate::error::BatonResult;
use crate::http::{Method, MethodSet};
use crate::routing::route::{Endpoint, Route, Target};
use crate::routing::table::RouteTable;

/// Route declaration methods shared by the router builder and scope blocks.
pub trait Routes {
    /// Register one route. Implementors apply prefixes and scope defaults here.
    fn declare(&mut self, methods: MethodSet, pattern: &str, endpoint: Endpoint) -> BatonResult<()>;

    /// Register a route; an explicit `name` overrides the endpoint's own.
    fn map(
        &mut self,
        methods: impl Into<MethodSet>,
        pattern: &str,
        endpoint: impl Into<Endpoint>,
        name: Option<&str>,
    ) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        let mut endpoint = endpoint.into();
        if let Some(name) = name {
            endpoint.name = Some(name.to_string());
        }
        self.declare(methods.into(), pattern, endpoint)?;
        Ok(self)
    }

    /// Bulk registration of `(methods, pattern, endpoint, name)` tuples.
    fn add_routes<M, E, I>(&mut self, routes: I) -> BatonResult<&mut Self>
    where
        Self: Sized,
        M: Into<MethodSet>,
        E: Into<Endpoint>,
        I: IntoIterator<Item = (M, String, E, Option<String>)>,
    {
        for (methods, pattern, endpoint, name) in routes {
            self.map(methods, &pattern, endpoint, name.as_deref())?;
        }
        Ok(self)
    }

    fn get(&mut self, pattern: &str, endpoint: impl Into<Endpoint>) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        self.map(Method::Get, pattern, endpoint, None)
    }

    fn post(&mut self, pattern: &str, endpoint: impl Into<Endpoint>) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        self.map(Method::Post, pattern, endpoint, None)
    }

    fn put(&mut self, pattern: &str, endpoint: impl Into<Endpoint>) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        self.map(Method::Put, pattern, endpoint, None)
    }

    fn patch(&mut self, pattern: &str, endpoint: impl Into<Endpoint>) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        self.map(Method::Patch, pattern, endpoint, None)
    }

    fn delete(&mut self, pattern: &str, endpoint: impl Into<Endpoint>) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        self.map(Method::Delete, pattern, endpoint, None)
    }

    fn options(&mut self, pattern: &str, endpoint: impl Into<Endpoint>) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        self.map(Method::Options, pattern, endpoint, None)
    }

    /// All six routable verbs.
    fn any(&mut self, pattern: &str, endpoint: impl Into<Endpoint>) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        self.map(MethodSet::any(), pattern, endpoint, None)
    }

    /// Expand into the nine conventional CRUD routes for `controller`.
    ///
    /// | verb    | path              | action    |
    /// |---------|-------------------|-----------|
    /// | GET     | `base`            | `index`   |
    /// | GET     | `base/create`     | `create`  |
    /// | POST    | `base`            | `store`   |
    /// | GET     | `base/[i:id]`     | `show`    |
    /// | GET     | `base/[i:id]/edit`| `edit`    |
    /// | PUT     | `base/[i:id]`     | `update`  |
    /// | PATCH   | `base/[i:id]`     | `update`  |
    /// | DELETE  | `base/[i:id]`     | `destroy` |
    /// | OPTIONS | `base`            | `options` |
    fn resource(&mut self, base_path: &str, controller: &str) -> BatonResult<&mut Self>
    where
        Self: Sized,
    {
        const ACTIONS: [(Method, &str, &str); 9] = [
            (Method::Get, "", "index"),
            (Method::Get, "/create", "create"),
            (Method::Post, "", "store"),
            (Method::Get, "/[i:id]", "show"),
            (Method::Get, "/[i:id]/edit", "edit"),
            (Method::Put, "/[i:id]", "update"),
            (Method::Patch, "/[i:id]", "update"),
            (Method::Delete, "/[i:id]", "destroy"),
            (Method::Options, "", "options"),
        ];

        let base = join_path("/", base_path);
        for (method, suffix, action) in ACTIONS {
            let pattern = join_path(&base, suffix);
            self.declare(method.into(), &pattern, Endpoint::new(Target::action(controller, action)))?;
        }
        Ok(self)
    }
}

/// Attributes applied to every route declared inside a scope block.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    prefix: String,
    controller: Option<String>,
    before: FilterChain,
    after: FilterChain,
    attrs: Map<String, Value>,
}

impl Scope {
    pub fn new(prefix: impl Into<String>) -> Self {
        Scope {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Default controller for `method`-only targets.
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn before(mut self, filter: impl Into<Filter>) -> Self {
        self.before.push(filter);
        self
    }

    pub fn after(mut self, filter: impl Into<Filter>) -> Self {
        self.after.push(filter);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Merge the scope into a route declared within it.
    ///
    /// The prefix is joined to the pattern, the controller fills an action
    /// target or `@method` filter that has none, scope filters run ahead
    /// of route filters in both phases, and attributes are copied when the
    /// route lacks the key.
    pub(crate) fn apply(&self, pattern: &str, mut endpoint: Endpoint) -> (String, Endpoint) {
        let pattern = if is_positional(pattern) {
            pattern.to_string()
        } else {
            join_path(&self.prefix, pattern)
        };

        if let (Target::Action(action), Some(controller)) = (&mut endpoint.target, &self.controller) {
            if action.controller.is_none() {
                action.controller = Some(controller.clone());
            }
        }

        endpoint.before.prepend(&self.before);
        endpoint.after.prepend(&self.after);
        if let Some(controller) = &self.controller {
            endpoint.before.fill_controller(controller);
            endpoint.after.fill_controller(controller);
        }

        for (key, value) in &self.attrs {
            endpoint
                .attrs
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        (pattern, endpoint)
    }
}

/// Declaration handle passed to a scope block.
pub struct ScopedRoutes<'a> {
    table: &'a mut RouteTable,
    scope: &'a Scope,
}

impl<'a> ScopedRoutes<'a> {
    pub(crate) fn new(table: &'a mut RouteTable, scope: &'a Scope) -> Self {
        ScopedRoutes { table, scope }
    }

    pub fn scope(&self) -> &Scope {
        self.scope
    }
}

impl Routes for ScopedRoutes<'_> {
    fn declare(&mut self, methods: MethodSet, pattern: &str, endpoint: Endpoint) -> BatonResult<()> {
        let (pattern, endpoint) = self.scope.apply(pattern, endpoint);
        self.table.add_route(Route::new(methods, pattern, endpoint))
    }
}

/// `*` and `@regex` patterns are not path-shaped and are never prefixed or
/// normalised.
fn is_positional(pattern: &str) -> bool {
    pattern == "*" || pattern.starts_with('@')
}

/// Normalise a declared pattern: leading slash, single slashes, no
/// trailing slash except on the root.
pub(crate) fn normalize_pattern(pattern: &str) -> String {
    if is_positional(pattern) {
        pattern.to_string()
    } else {
        join_path("", pattern)
    }
}

/// Join a prefix and a path with slashes collapsed.
pub fn join_path(prefix: &str, path: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + path.len() + 1);
    out.push('/');
    for c in prefix.chars().chain(std::iter::once('/')).chain(path.chars()) {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
