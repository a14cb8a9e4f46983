//! Route declaration, compilation and matching.
//!
//! Routes live in a [`RouteTable`] in registration order. Matching
//! canonicalises the request path once, then walks the table and returns the
//! first route whose method set and pattern both accept the request.

pub mod matcher;
pub mod params;
pub mod pattern;
pub mod route;
pub mod scope;
pub mod table;

pub use matcher::RouteMatch;
pub use params::Params;
pub use pattern::{CompiledPattern, MatchTypes};
pub use route::{ActionRef, Endpoint, HandlerFn, HandlerResult, Route, Target};
pub use scope::{Routes, Scope, ScopedRoutes, join_path};
pub use table::{RouteTable, canonicalize};
