use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::controller::{ControllerCache, ControllerRegistry};
use crate::dispatch::{Context, Phase, is_truthy};
use crate::error::{BatonError, BatonResult};
use crate::routing::{ActionRef, Target};

/// An inline filter. Returning a non-empty value vetoes the request.
pub type FilterFn = Arc<dyn Fn(&mut Context<'_>) -> Option<Value> + Send + Sync>;

#[derive(Clone)]
pub enum Filter {
    /// Looked up by name in the router's filter registry.
    Named(String),
    Inline(FilterFn),
    /// A controller action used as a filter.
    Action(ActionRef),
}

impl Filter {
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Option<Value> + Send + Sync + 'static,
    {
        Filter::Inline(Arc::new(f))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Filter::Inline(_) => f.write_str("Inline(..)"),
            Filter::Action(a) => f.debug_tuple("Action").field(a).finish(),
        }
    }
}

/// `"auth"` names a registered filter; `"Ctrl@method"` names a controller action.
impl From<&str> for Filter {
    fn from(s: &str) -> Self {
        if s.contains('@') {
            Filter::Action(ActionRef::parse(s))
        } else {
            Filter::Named(s.to_string())
        }
    }
}

impl From<String> for Filter {
    fn from(s: String) -> Self {
        Filter::from(s.as_str())
    }
}

impl From<FilterFn> for Filter {
    fn from(f: FilterFn) -> Self {
        Filter::Inline(f)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterChain(Vec<Filter>);

impl FilterChain {
    pub fn push(&mut self, filter: impl Into<Filter>) {
        self.0.push(filter.into());
    }

    /// Put `head` in front of the existing filters.
    pub fn prepend(&mut self, head: &FilterChain) {
        if head.is_empty() {
            return;
        }
        let mut merged = head.0.clone();
        merged.append(&mut self.0);
        self.0 = merged;
    }

    /// Give `@method` action filters that name no controller this one.
    pub(crate) fn fill_controller(&mut self, controller: &str) {
        for filter in &mut self.0 {
            if let Filter::Action(action) = filter
                && action.controller.is_none()
            {
                action.controller = Some(controller.to_string());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<F: Into<Filter>> FromIterator<F> for FilterChain {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        FilterChain(iter.into_iter().map(Into::into).collect())
    }
}

/// Runs one phase of a route's filters.
pub(crate) struct FilterExecutor<'r> {
    filters: &'r HashMap<String, FilterFn>,
    controllers: &'r ControllerRegistry,
}

impl<'r> FilterExecutor<'r> {
    pub(crate) fn new(filters: &'r HashMap<String, FilterFn>, controllers: &'r ControllerRegistry) -> Self {
        FilterExecutor { filters, controllers }
    }

    /// Controller hooks first (`filter_before`/`filter_after`, then the
    /// generic `filter`), followed by the route's declared chain. The first
    /// non-empty return aborts with `FilterShortCircuit`.
    pub(crate) fn run(&self, phase: Phase, ctx: &mut Context<'_>, cache: &mut ControllerCache) -> BatonResult<()> {
        let route = ctx.route();

        if let Target::Action(ActionRef { controller: Some(name), .. }) = route.target() {
            let instance = cache.get_or_create(name, self.controllers, ctx.matched())?;
            let hook = match phase {
                Phase::Before => instance.filter_before(ctx),
                Phase::After => instance.filter_after(ctx),
            };
            veto(phase, hook)?;
            veto(phase, instance.filter(phase, ctx))?;
        }

        for filter in route.filters(phase).iter() {
            let result = match filter {
                Filter::Inline(f) => f(ctx),
                Filter::Named(name) => {
                    let f = self
                        .filters
                        .get(name)
                        .ok_or_else(|| BatonError::InvalidHandler(format!("Unknown filter '{name}'")))?;
                    f(ctx)
                }
                Filter::Action(action) => Some(self.controllers.invoke(action, ctx, cache)?),
            };
            veto(phase, result)?;
        }
        Ok(())
    }
}

fn veto(phase: Phase, result: Option<Value>) -> BatonResult<()> {
    match result {
        Some(value) if is_truthy(&value) => {
            tracing::debug!(%phase, "filter short-circuited");
            Err(BatonError::FilterShortCircuit { phase, value })
        }
        _ => Ok(()),
    }
}
