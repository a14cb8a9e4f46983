use std::fmt;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::error::{BatonError, BatonResult};
use crate::http::Request;

pub const ISSUER: &str = "api-backend";
pub const AUDIENCE: &str = "api-frontend";

/// Default access-token lifetime, in seconds.
pub const ACCESS_TTL_SECS: u64 = 60;
/// Default refresh-token lifetime (7 days), in seconds.
pub const REFRESH_TTL_SECS: u64 = 86_400 * 7;
/// Clock skew tolerated when checking `exp`.
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("No token signing key provided.")]
    MissingKey,

    #[error("No token provided.")]
    MissingToken,

    #[error("Expired token")]
    Expired,

    #[error("Signature verification failed")]
    BadSignature,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Failed to create token: {0}")]
    Encode(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}

/// Where `authenticate` found the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Header,
    Cookie,
}

/// HS256 token issuer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    leeway: u64,
    access_ttl: u64,
    refresh_ttl: u64,
}

impl fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuth")
            .field("secret", &"<redacted>")
            .field("leeway", &self.leeway)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        JwtAuth {
            secret: secret.into(),
            leeway: DEFAULT_LEEWAY_SECS,
            access_ttl: ACCESS_TTL_SECS,
            refresh_ttl: REFRESH_TTL_SECS,
        }
    }

    pub fn from_config(config: &Config) -> BatonResult<Self> {
        let secret = config
            .jwt_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BatonError::Config("JWT_SECRET not defined in configuration.".into()))?;
        Ok(JwtAuth {
            secret,
            leeway: config.jwt_leeway_secs,
            access_ttl: config.jwt_access_ttl_secs,
            refresh_ttl: config.jwt_refresh_ttl_secs,
        })
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway = leeway_secs;
        self
    }

    /// Same settings, signing key extended with `suffix` (per-user keys).
    pub fn with_key_suffix(&self, suffix: &str) -> Self {
        let mut auth = self.clone();
        auth.secret.push_str(suffix);
        auth
    }

    /// Sign `data` into a token that expires `ttl_secs` from now.
    pub fn issue(&self, data: Value, ttl_secs: u64) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingKey);
        }
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            iss: ISSUER.to_string(),
            sub: String::new(),
            aud: AUDIENCE.to_string(),
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
            data,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Encode(e.to_string()))
    }

    pub fn access_token(&self, data: Value, ttl_secs: Option<u64>) -> Result<String, TokenError> {
        self.issue(data, ttl_secs.unwrap_or(self.access_ttl))
    }

    pub fn refresh_token(&self, data: Value, ttl_secs: Option<u64>) -> Result<String, TokenError> {
        self.issue(data, ttl_secs.unwrap_or(self.refresh_ttl))
    }

    /// Validate signature, issuer, audience and expiry.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingKey);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);

        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    /// Verify the request's token: `Authorization: Bearer` first, then the
    /// `jwt` cookie.
    pub fn authenticate(&self, request: &Request) -> Result<(TokenClaims, AuthSource), TokenError> {
        let (token, source) = Self::locate(request).ok_or(TokenError::MissingToken)?;
        Ok((self.verify(token)?, source))
    }

    /// The raw token carried by `request` and where it was found.
    pub fn locate(request: &Request) -> Option<(&str, AuthSource)> {
        match request.bearer_token() {
            Some(token) => Some((token, AuthSource::Header)),
            None => request
                .cookie("jwt")
                .filter(|t| !t.is_empty())
                .map(|token| (token, AuthSource::Cookie)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claims_shape() {
        let auth = JwtAuth::new("unit-secret");
        let token = auth.access_token(json!({"uid": 9}), None).unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.aud, AUDIENCE);
        assert_eq!(claims.sub, "");
        assert_eq!(claims.exp - claims.iat, ACCESS_TTL_SECS as i64);
        assert_eq!(claims.data, json!({"uid": 9}));
    }

    #[test]
    fn test_empty_secret_is_missing_key() {
        let auth = JwtAuth::new("");
        assert_eq!(auth.issue(json!({}), 10), Err(TokenError::MissingKey));
        assert_eq!(auth.verify("a.b.c"), Err(TokenError::MissingKey));
    }
}
