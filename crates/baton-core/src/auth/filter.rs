//! The conventional `auth` before-filter.
//!
//! ```rust,ignore
//! let auth = Arc::new(JwtAuth::from_config(&config)?);
//! builder.filter("auth", auth_filter(auth, config.expose_errors()));
//! builder.get("/me", Endpoint::new("Users@me").before("auth"))?;
//! ```
//!
//! Applications that audit logins attach [`AuthHooks`] through
//! [`auth_filter_with_hooks`].

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::auth::jwt::{AuthSource, JwtAuth, TokenClaims, TokenError};
use crate::dispatch::{Context, FilterFn};
use crate::response::Responses;

/// Context key the verified claims are stored under.
pub const AUTH_KEY: &str = "auth";

pub type AuthSuccessFn = Arc<dyn Fn(&mut Context<'_>, &TokenClaims, AuthSource) + Send + Sync>;
pub type AuthFailureFn = Arc<dyn Fn(&mut Context<'_>, AuthSource, &TokenError) + Send + Sync>;

/// Callbacks run around token verification. Their return values are
/// ignored; the filter's verdict does not change.
#[derive(Clone, Default)]
pub struct AuthHooks {
    on_success: Option<AuthSuccessFn>,
    on_failure: Option<AuthFailureFn>,
}

impl AuthHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the token verified, before the claims are stored.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, &TokenClaims, AuthSource) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Called when a token was present but failed verification.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, AuthSource, &TokenError) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(f));
        self
    }
}

/// Build the `auth` filter.
///
/// On success the claims land in the context under [`AUTH_KEY`]. On
/// failure the request is vetoed with a `not_authenticated` envelope; the
/// failure reason is only included when `expose_errors` is set.
pub fn auth_filter(auth: Arc<JwtAuth>, expose_errors: bool) -> FilterFn {
    auth_filter_with_hooks(auth, expose_errors, AuthHooks::default())
}

/// [`auth_filter`] plus success and failure callbacks.
pub fn auth_filter_with_hooks(auth: Arc<JwtAuth>, expose_errors: bool, hooks: AuthHooks) -> FilterFn {
    Arc::new(move |ctx: &mut Context<'_>| -> Option<Value> {
        let request = ctx.request();
        let Some((token, source)) = JwtAuth::locate(request) else {
            tracing::debug!("no token on request");
            return Some(Responses::not_authenticated(Map::new()).into_value());
        };

        match auth.verify(token) {
            Ok(claims) => {
                tracing::debug!(?source, "request authenticated");
                if let Some(hook) = &hooks.on_success {
                    hook(ctx, &claims, source);
                }
                match serde_json::to_value(&claims) {
                    Ok(value) => {
                        ctx.insert(AUTH_KEY, value);
                        None
                    }
                    Err(e) => Some(rejection(&e.to_string(), expose_errors)),
                }
            }
            Err(e) => {
                tracing::debug!(?source, error = %e, "authentication failed");
                if let Some(hook) = &hooks.on_failure {
                    hook(ctx, source, &e);
                }
                Some(rejection(&e.to_string(), expose_errors))
            }
        }
    })
}

fn rejection(message: &str, expose_errors: bool) -> Value {
    let mut payload = Map::new();
    if expose_errors {
        payload.insert("message".into(), json!(message));
    }
    Responses::not_authenticated(payload).into_value()
}

/// Claims stored by [`auth_filter`], if the request was authenticated.
pub fn claims(ctx: &Context<'_>) -> Option<TokenClaims> {
    ctx.get(AUTH_KEY)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}
