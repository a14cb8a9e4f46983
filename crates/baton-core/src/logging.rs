//! Logging and tracing initialization for Baton.
//!
//! The router emits `tracing` events: route registration and matching at
//! `debug`, unmatched requests at `info`, malformed patterns and failed
//! dispatches at `warn`. Each dispatch runs inside a `dispatch` span that
//! carries a request id. Nothing is printed until a subscriber is
//! installed with one of the functions below.
//!
//! ## Configuration
//!
//! The logging level can be controlled via the `RUST_LOG` environment variable:
//!
//! ```bash
//! # Show every matching decision
//! RUST_LOG=baton_core=debug my-api
//!
//! # Show only warnings and errors (production)
//! RUST_LOG=warn my-api
//! ```
//!
//! All initializers are safe to call more than once; only the first
//! subscriber is installed.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, LogFormat};

/// Initialize logging with sensible defaults (`info` unless `RUST_LOG` says otherwise).
pub fn init_logging() {
    init_logging_with_level("info");
}

/// Initialize logging with a specific log level.
///
/// `RUST_LOG` still takes precedence when set.
///
/// # Common Levels
///
/// - `"trace"` - Very verbose, shows everything
/// - `"debug"` - Route registration and match decisions
/// - `"info"` - General information (recommended for development)
/// - `"warn"` - Only warnings and errors
/// - `"error"` - Only errors
pub fn init_logging_with_level(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init();
}

/// Initialize pretty-formatted logging (recommended for development).
pub fn init_logging_pretty() {
    let _ = tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true),
        )
        .try_init();
}

/// Initialize JSON-formatted logging (recommended for production).
pub fn init_logging_json() {
    let _ = tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

/// Pick the initializer matching `LOG_FORMAT`.
pub fn init_from_config(config: &Config) {
    match config.log_format {
        LogFormat::Compact => init_logging(),
        LogFormat::Pretty => init_logging_pretty(),
        LogFormat::Json => init_logging_json(),
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
