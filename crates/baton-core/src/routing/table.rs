use std::collections::HashMap;

use crate::error::{BatonError, BatonResult};
use crate::routing::matcher::{self, RouteMatch};
use crate::routing::params::Params;
use crate::routing::pattern::{self, MatchTypes};
use crate::routing::route::Route;

/// Ordered list of routes plus the name index, base path and match types.
///
/// Routes are matched in registration order; the first hit wins.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    named: HashMap<String, usize>,
    base_path: String,
    match_types: MatchTypes,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        let mut table = Self::new();
        table.set_base_path(base_path);
        table
    }

    /// Prefix stripped from request paths before matching and prepended by `url_for`.
    pub fn set_base_path(&mut self, base_path: impl Into<String>) {
        self.base_path = base_path.into();
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn match_types(&self) -> &MatchTypes {
        &self.match_types
    }

    /// Register extra placeholder types. Drops any compiled patterns so
    /// later matches see the new types.
    pub fn add_match_types<K, V>(&mut self, types: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.match_types.extend(types);
        for route in &mut self.routes {
            route.reset_compiled();
        }
    }

    pub fn add_route(&mut self, route: Route) -> BatonResult<()> {
        if let Some(name) = route.name() {
            if self.named.contains_key(name) {
                return Err(BatonError::DuplicateRouteName(name.to_string()));
            }
            self.named.insert(name.to_string(), self.routes.len());
        }
        tracing::debug!(
            methods = %route.methods(),
            pattern = route.pattern(),
            target = %route.target(),
            "route registered"
        );
        self.routes.push(route);
        Ok(())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn named(&self, name: &str) -> Option<&Route> {
        self.named.get(name).map(|&i| &self.routes[i])
    }

    /// Reverse-route a named route, base path included.
    pub fn url_for(&self, name: &str, params: &Params) -> BatonResult<String> {
        let route = self
            .named(name)
            .ok_or_else(|| BatonError::InvalidRoute(format!("Route '{name}' does not exist")))?;
        let path = pattern::fill(route.pattern(), params)?;
        Ok(format!("{}{}", self.base_path.trim_end_matches('/'), path))
    }

    /// Find the first route accepting `method` and the canonical form of `path`.
    pub fn match_route(&self, path: &str, method: &str) -> Option<RouteMatch<'_>> {
        let path = canonicalize(path, &self.base_path);
        matcher::find(&self.routes, &self.match_types, &path, method)
    }
}

/// Canonical request path: query string dropped, base path stripped,
/// leading slash added, runs of slashes collapsed and the trailing slash
/// removed (root excepted).
pub fn canonicalize(path: &str, base_path: &str) -> String {
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    let path = if base_path.is_empty() {
        path
    } else {
        path.strip_prefix(base_path).unwrap_or(path)
    };

    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    for c in path.chars() {
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
