use std::str::FromStr;

use serde::Deserialize;

use crate::auth::jwt::{ACCESS_TTL_SECS, DEFAULT_LEEWAY_SECS, REFRESH_TTL_SECS};
use crate::error::BatonResult;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Prefix stripped from request paths before matching (default: "")
    pub base_path: String,

    /// JWT signing secret; `JwtAuth::from_config` requires it
    pub jwt_secret: Option<String>,

    /// Access-token lifetime in seconds (default: 60)
    pub jwt_access_ttl_secs: u64,

    /// Refresh-token lifetime in seconds (default: 7 days)
    pub jwt_refresh_ttl_secs: u64,

    /// Clock skew tolerated on `exp` (default: 60)
    pub jwt_leeway_secs: u64,

    /// Environment: development, production, test
    pub environment: String,

    /// Error verbosity; above 2, auth failures carry their reason
    pub error_mode: u8,

    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_path: String::new(),
            jwt_secret: None,
            jwt_access_ttl_secs: ACCESS_TTL_SECS,
            jwt_refresh_ttl_secs: REFRESH_TTL_SECS,
            jwt_leeway_secs: DEFAULT_LEEWAY_SECS,
            environment: "development".to_string(),
            error_mode: 1,
            log_format: LogFormat::Compact,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> BatonResult<Self> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        let defaults = Config::default();
        Ok(Config {
            base_path: std::env::var("BATON_BASE_PATH").unwrap_or(defaults.base_path),
            jwt_secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            jwt_access_ttl_secs: parsed("JWT_ACCESS_TTL_SECS", defaults.jwt_access_ttl_secs),
            jwt_refresh_ttl_secs: parsed("JWT_REFRESH_TTL_SECS", defaults.jwt_refresh_ttl_secs),
            jwt_leeway_secs: parsed("JWT_LEEWAY_SECS", defaults.jwt_leeway_secs),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            error_mode: parsed("ERROR_MODE", defaults.error_mode),
            log_format: parsed("LOG_FORMAT", defaults.log_format),
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Whether failure reasons may be shown to clients.
    pub fn expose_errors(&self) -> bool {
        self.error_mode > 2
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
