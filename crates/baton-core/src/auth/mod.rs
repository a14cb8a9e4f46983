pub mod filter;
pub mod jwt;

pub use filter::{AUTH_KEY, AuthFailureFn, AuthHooks, AuthSuccessFn, auth_filter, auth_filter_with_hooks, claims};
pub use jwt::{AuthSource, JwtAuth, TokenClaims, TokenError};
