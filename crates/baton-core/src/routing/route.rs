use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};

use crate::dispatch::{Context, Filter, FilterChain, Phase};
use crate::error::BatonError;
use crate::http::MethodSet;
use crate::routing::pattern::{CompiledPattern, MatchTypes};

pub type HandlerResult = Result<Value, BatonError>;

/// A plain function handler.
pub type HandlerFn = Arc<dyn Fn(&mut Context<'_>) -> HandlerResult + Send + Sync>;

/// A `Controller@method` reference. `controller` may be left empty and
/// filled in by the enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRef {
    pub controller: Option<String>,
    pub method: String,
}

impl ActionRef {
    /// Parse `Controller@method`; a bare `method` leaves the controller unset.
    pub fn parse(s: &str) -> Self {
        match s.split_once('@') {
            Some((controller, method)) => ActionRef {
                controller: (!controller.is_empty()).then(|| controller.to_string()),
                method: method.to_string(),
            },
            None => ActionRef {
                controller: None,
                method: s.to_string(),
            },
        }
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.controller {
            Some(c) => write!(f, "{}@{}", c, self.method),
            None => write!(f, "@{}", self.method),
        }
    }
}

/// What a route resolves to.
#[derive(Clone)]
pub enum Target {
    Handler(HandlerFn),
    Action(ActionRef),
}

impl Target {
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Target::Handler(Arc::new(f))
    }

    pub fn action(controller: impl Into<String>, method: impl Into<String>) -> Self {
        Target::Action(ActionRef {
            controller: Some(controller.into()),
            method: method.into(),
        })
    }

    pub fn as_action(&self) -> Option<&ActionRef> {
        match self {
            Target::Action(a) => Some(a),
            Target::Handler(_) => None,
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Handler(_) => f.write_str("Handler(..)"),
            Target::Action(a) => f.debug_tuple("Action").field(a).finish(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Handler(_) => f.write_str("<closure>"),
            Target::Action(a) => a.fmt(f),
        }
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target::Action(ActionRef::parse(s))
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Target::from(s.as_str())
    }
}

/// A target plus everything that travels with it: name, filters, attributes.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub target: Target,
    pub name: Option<String>,
    pub before: FilterChain,
    pub after: FilterChain,
    pub attrs: Map<String, Value>,
}

impl Endpoint {
    pub fn new(target: impl Into<Target>) -> Self {
        Endpoint {
            target: target.into(),
            name: None,
            before: FilterChain::default(),
            after: FilterChain::default(),
            attrs: Map::new(),
        }
    }

    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Endpoint::new(Target::handler(f))
    }

    /// Set the controller of an action target. No effect on function handlers.
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        if let Target::Action(action) = &mut self.target {
            action.controller = Some(controller.into());
        }
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
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
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        Endpoint::new(s)
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Self {
        Endpoint::new(s)
    }
}

impl From<Target> for Endpoint {
    fn from(t: Target) -> Self {
        Endpoint::new(t)
    }
}

/// A registered route. Immutable once it is in a table.
#[derive(Debug)]
pub struct Route {
    methods: MethodSet,
    pattern: String,
    endpoint: Endpoint,
    compiled: OnceLock<CompiledPattern>,
}

impl Route {
    pub fn new(methods: impl Into<MethodSet>, pattern: impl Into<String>, endpoint: impl Into<Endpoint>) -> Self {
        Route {
            methods: methods.into(),
            pattern: pattern.into(),
            endpoint: endpoint.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn target(&self) -> &Target {
        &self.endpoint.target
    }

    pub fn name(&self) -> Option<&str> {
        self.endpoint.name.as_deref()
    }

    pub fn filters(&self, phase: Phase) -> &FilterChain {
        match phase {
            Phase::Before => &self.endpoint.before,
            Phase::After => &self.endpoint.after,
        }
    }

    pub fn attrs(&self) -> &Map<String, Value> {
        &self.endpoint.attrs
    }

    /// The compiled matcher, built on first use.
    pub(crate) fn compiled(&self, types: &MatchTypes) -> &CompiledPattern {
        self.compiled
            .get_or_init(|| CompiledPattern::compile(&self.pattern, types))
    }

    pub(crate) fn reset_compiled(&mut self) {
        self.compiled.take();
    }
}
