use std::ptr;

use serde_json::{Value, json};

use crate::routing::params::Params;
use crate::routing::pattern::MatchTypes;
use crate::routing::route::{Route, Target};

/// The route that won for a request, with its captured parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    route: &'a Route,
    index: usize,
    params: Params,
}

impl<'a> RouteMatch<'a> {
    pub fn route(&self) -> &'a Route {
        self.route
    }

    /// Registration index of the matched route.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn target(&self) -> &'a Target {
        self.route.target()
    }

    pub fn name(&self) -> Option<&'a str> {
        self.route.name()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "target": self.route.target().to_string(),
            "params": self.params.to_json(),
            "name": self.route.name(),
            "methods": self.route.methods().as_str(),
            "pattern": self.route.pattern(),
        })
    }
}

impl PartialEq for RouteMatch<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.route, other.route) && self.index == other.index && self.params == other.params
    }
}

/// First route, in registration order, whose methods accept `method` and
/// whose pattern accepts the canonical `path`.
pub(crate) fn find<'a>(
    routes: &'a [Route],
    types: &MatchTypes,
    path: &str,
    method: &str,
) -> Option<RouteMatch<'a>> {
    routes.iter().enumerate().find_map(|(index, route)| {
        if !route.methods().contains(method) {
            return None;
        }
        let params = route.compiled(types).matches(path)?;
        Some(RouteMatch {
            route,
            index,
            params,
        })
    })
}
