use serde_json::{Map, Value};

use crate::http::Request;
use crate::routing::{Params, Route, RouteMatch};

/// Everything a handler or filter sees for one request.
///
/// `locals` is scratch space shared along the chain; the `auth` filter
/// stores verified claims there.
#[derive(Debug)]
pub struct Context<'a> {
    request: &'a Request,
    matched: RouteMatch<'a>,
    response: Option<Value>,
    locals: Map<String, Value>,
}

impl<'a> Context<'a> {
    pub fn new(request: &'a Request, matched: RouteMatch<'a>) -> Self {
        Context {
            request,
            matched,
            response: None,
            locals: Map::new(),
        }
    }

    pub fn request(&self) -> &'a Request {
        self.request
    }

    pub fn matched(&self) -> &RouteMatch<'a> {
        &self.matched
    }

    pub fn route(&self) -> &'a Route {
        self.matched.route()
    }

    pub fn route_name(&self) -> Option<&'a str> {
        self.matched.name()
    }

    pub fn params(&self) -> &Params {
        self.matched.params()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.matched.param(name)
    }

    /// Extra attribute declared on the route or its scope.
    pub fn attr(&self, key: &str) -> Option<&'a Value> {
        self.route().attrs().get(key)
    }

    /// The handler's result; set once the handler has run, so only after
    /// filters see it.
    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    pub(crate) fn set_response(&mut self, value: Value) {
        self.response = Some(value);
    }

    pub(crate) fn take_response(&mut self) -> Option<Value> {
        self.response.take()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.locals.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.locals.get(key)
    }
}
