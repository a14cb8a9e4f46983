//! Controllers: typed objects whose actions are registered by name.
//!
//! ```rust,ignore
//! struct Widgets { seen: u32 }
//! impl Controller for Widgets {}
//!
//! builder
//!     .controller("Widgets", |_m| Widgets { seen: 0 })
//!     .action("show", |w: &mut Widgets, ctx| Ok(json!({ "id": ctx.param("id") })));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::{Context, Phase};
use crate::error::{BatonError, BatonResult};
use crate::routing::{ActionRef, HandlerResult, RouteMatch};

/// Upcast to `Any` so a `dyn Controller` can be downcast to its concrete type.
pub trait AsAny {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-phase hooks a controller may override. A non-empty return vetoes.
pub trait Controller: AsAny + Send {
    fn filter_before(&mut self, _ctx: &mut Context<'_>) -> Option<Value> {
        None
    }

    fn filter_after(&mut self, _ctx: &mut Context<'_>) -> Option<Value> {
        None
    }

    /// Catch-all hook, called after the phase-specific one.
    fn filter(&mut self, _phase: Phase, _ctx: &mut Context<'_>) -> Option<Value> {
        None
    }
}

type Factory = Box<dyn Fn(&RouteMatch<'_>) -> Box<dyn Controller> + Send + Sync>;

/// A type-erased controller action.
pub type ActionFn = Arc<dyn Fn(&mut dyn Controller, &mut Context<'_>) -> HandlerResult + Send + Sync>;

struct ControllerEntry {
    factory: Factory,
    actions: HashMap<String, ActionFn>,
}

/// Controllers by name, each with its factory and named actions.
#[derive(Default)]
pub struct ControllerRegistry {
    entries: HashMap<String, ControllerEntry>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) controller `name`. The factory runs at most
    /// once per dispatch, with the route match that triggered it.
    pub fn register<C, F>(&mut self, name: impl Into<String>, factory: F) -> ControllerBuilder<'_, C>
    where
        C: Controller + 'static,
        F: Fn(&RouteMatch<'_>) -> C + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: Factory = Box::new(move |m: &RouteMatch<'_>| -> Box<dyn Controller> { Box::new(factory(m)) });
        let entry = self
            .entries
            .entry(name.clone())
            .insert_entry(ControllerEntry {
                factory,
                actions: HashMap::new(),
            })
            .into_mut();
        ControllerBuilder {
            name,
            actions: &mut entry.actions,
            _marker: PhantomData,
        }
    }

    pub fn contains(&self, controller: &str) -> bool {
        self.entries.contains_key(controller)
    }

    pub fn has_action(&self, controller: &str, method: &str) -> bool {
        self.entries
            .get(controller)
            .is_some_and(|e| e.actions.contains_key(method))
    }

    /// Check that `action` names a registered controller and method.
    pub fn resolve(&self, action: &ActionRef) -> BatonResult<()> {
        self.lookup(action).map(|_| ())
    }

    fn lookup<'s, 'a>(&'s self, action: &'a ActionRef) -> BatonResult<(&'a str, &'s ActionFn)> {
        let controller = action
            .controller
            .as_deref()
            .ok_or_else(|| BatonError::InvalidRoute(format!("Invalid route controller for '@{}'", action.method)))?;
        let entry = self
            .entries
            .get(controller)
            .ok_or_else(|| BatonError::InvalidRoute(format!("Invalid route controller '{controller}'")))?;
        let f = entry
            .actions
            .get(&action.method)
            .ok_or_else(|| BatonError::InvalidHandler(format!("Invalid route method {action}")))?;
        Ok((controller, f))
    }

    /// Call a controller action, reusing the cached instance for this dispatch.
    pub(crate) fn invoke(
        &self,
        action: &ActionRef,
        ctx: &mut Context<'_>,
        cache: &mut ControllerCache,
    ) -> HandlerResult {
        let (controller, f) = self.lookup(action)?;
        let instance = cache.get_or_create(controller, self, ctx.matched())?;
        f(instance, ctx)
    }
}

/// Attaches actions to a freshly registered controller.
pub struct ControllerBuilder<'r, C> {
    name: String,
    actions: &'r mut HashMap<String, ActionFn>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Controller + 'static> ControllerBuilder<'_, C> {
    pub fn action<F>(self, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut C, &mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        let method = method.into();
        let label = format!("{}@{}", self.name, method);
        self.actions.insert(method, erase::<C, F>(label, f));
        self
    }
}

fn erase<C, F>(label: String, f: F) -> ActionFn
where
    C: Controller + 'static,
    F: Fn(&mut C, &mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(move |instance: &mut dyn Controller, ctx: &mut Context<'_>| -> HandlerResult {
        let concrete = AsAny::as_any_mut(instance)
            .downcast_mut::<C>()
            .ok_or_else(|| BatonError::Internal(format!("controller type mismatch for {label}")))?;
        f(concrete, ctx)
    })
}

/// Controller instances for a single dispatch, keyed by controller name.
#[derive(Default)]
pub struct ControllerCache {
    instances: HashMap<String, Box<dyn Controller>>,
}

impl ControllerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_or_create<'c>(
        &'c mut self,
        name: &str,
        registry: &ControllerRegistry,
        matched: &RouteMatch<'_>,
    ) -> BatonResult<&'c mut (dyn Controller + 'static)> {
        if !self.instances.contains_key(name) {
            let entry = registry
                .entries
                .get(name)
                .ok_or_else(|| BatonError::InvalidRoute(format!("Invalid route controller '{name}'")))?;
            tracing::debug!(controller = name, "instantiating controller");
            self.instances.insert(name.to_string(), (entry.factory)(matched));
        }
        self.instances
            .get_mut(name)
            .map(|c| c.as_mut())
            .ok_or_else(|| BatonError::Internal(format!("controller '{name}' vanished from cache")))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
