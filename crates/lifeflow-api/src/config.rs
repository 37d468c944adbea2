//! Server configuration
//!
//! All settings come from environment variables, optionally seeded from a
//! `.env` file. Every variable has a default except `JWT_SECRET`.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: SQLite path/URL or `postgres://` URL (default: sqlite://./data/lifeflow.db)
//! - `PORT`: HTTP port (default: 4000)
//! - `API_PREFIX`: Mount point of the authenticated routes (default: /api/v1)
//! - `JWT_SECRET`: HMAC secret, at least 32 bytes (required)
//! - `JWT_ISSUER`: Expected token issuer (default: lifeflow)
//! - `JWT_AUDIENCE`: Expected token audience (default: lifeflow-api)
//! - `JWT_EXPIRY_SECS`: Lifetime of tokens issued by this process (default: 900)
//! - `CORS_ORIGIN`: Allowed browser origin, `*` for any (default: http://localhost:5173)
//! - `STORE_TIMEOUT_MS`: Bound on every store call (default: 5000)
//! - `STATS_LOOKBACK_DAYS`: Days of logs read for statistics (default: 365)
//! - `DEFAULT_UTC_OFFSET_MINUTES`: Offset for requests without `utcOffsetMinutes` (default: 0)
//! - `SHUTDOWN_TIMEOUT_SECS`: Graceful shutdown budget (default: 30)

use chrono::FixedOffset;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::jwt::{JwtConfig, JwtError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

#[derive(Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub port: u16,
    pub api_prefix: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiry: Duration,
    pub cors_origin: String,
    pub store_timeout: Duration,
    pub stats_lookback_days: u32,
    pub default_utc_offset_minutes: i32,
    pub shutdown_timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("database_url", &self.database_url)
            .field("port", &self.port)
            .field("api_prefix", &self.api_prefix)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("jwt_expiry", &self.jwt_expiry)
            .field("cors_origin", &self.cors_origin)
            .field("store_timeout", &self.store_timeout)
            .field("stats_lookback_days", &self.stats_lookback_days)
            .field("default_utc_offset_minutes", &self.default_utc_offset_minutes)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Defaults for everything, with the given signing secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            database_url: "sqlite://./data/lifeflow.db".to_string(),
            port: 4000,
            api_prefix: "/api/v1".to_string(),
            jwt_secret: secret.into(),
            jwt_issuer: "lifeflow".to_string(),
            jwt_audience: "lifeflow-api".to_string(),
            jwt_expiry: Duration::from_secs(900),
            cors_origin: "http://localhost:5173".to_string(),
            store_timeout: Duration::from_millis(5000),
            stats_lookback_days: 365,
            default_utc_offset_minutes: 0,
            shutdown_timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Self::with_secret(secret);

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.port = port;
        }
        if let Some(prefix) = lookup("API_PREFIX") {
            config.api_prefix = prefix;
        }
        if let Some(issuer) = lookup("JWT_ISSUER") {
            config.jwt_issuer = issuer;
        }
        if let Some(audience) = lookup("JWT_AUDIENCE") {
            config.jwt_audience = audience;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "JWT_EXPIRY_SECS")? {
            config.jwt_expiry = Duration::from_secs(secs);
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            config.cors_origin = origin;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "STORE_TIMEOUT_MS")? {
            config.store_timeout = Duration::from_millis(ms);
        }
        if let Some(days) = parse_var(&lookup, "STATS_LOOKBACK_DAYS")? {
            config.stats_lookback_days = days;
        }
        if let Some(minutes) = parse_var(&lookup, "DEFAULT_UTC_OFFSET_MINUTES")? {
            config.default_utc_offset_minutes = minutes;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SHUTDOWN_TIMEOUT_SECS")? {
            config.shutdown_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_prefix.starts_with('/') || self.api_prefix.len() < 2 || self.api_prefix.ends_with('/') {
            return Err(invalid(
                "API_PREFIX",
                &self.api_prefix,
                "must start with '/', not end with '/' and not be the root",
            ));
        }
        if self.store_timeout.is_zero() {
            return Err(invalid("STORE_TIMEOUT_MS", "0", "must be positive"));
        }
        if self.stats_lookback_days == 0 {
            return Err(invalid("STATS_LOOKBACK_DAYS", "0", "must be positive"));
        }
        if self.utc_offset().is_none() {
            return Err(invalid(
                "DEFAULT_UTC_OFFSET_MINUTES",
                &self.default_utc_offset_minutes.to_string(),
                "must be within +/- 24 hours",
            ));
        }
        if self.cors_origin != "*"
            && self.cors_origin.parse::<axum::http::HeaderValue>().is_err()
        {
            return Err(invalid("CORS_ORIGIN", &self.cors_origin, "not a valid header value"));
        }
        self.jwt_config()?;
        Ok(())
    }

    pub fn jwt_config(&self) -> Result<JwtConfig, JwtError> {
        Ok(JwtConfig::from_secret(self.jwt_secret.as_bytes())?
            .with_issuer(&self.jwt_issuer)
            .with_audience(&self.jwt_audience)
            .with_expiry(self.jwt_expiry))
    }

    /// Offset that defines the server-side calendar day.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.default_utc_offset_minutes.checked_mul(60)?)
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(var, &raw, &e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-that-is-at-least-32-bytes";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.stats_lookback_days, 365);
        assert_eq!(config.utc_offset(), FixedOffset::east_opt(0));
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/lifeflow"),
            ("STORE_TIMEOUT_MS", "250"),
            ("DEFAULT_UTC_OFFSET_MINUTES", "-300"),
            ("CORS_ORIGIN", "*"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "postgres://localhost/lifeflow");
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.utc_offset(), FixedOffset::west_opt(5 * 3600));
    }

    #[test]
    fn test_missing_secret() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "short")])),
            Err(ConfigError::Jwt(_))
        ));
    }

    #[test]
    fn test_bad_numbers_name_the_variable() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().starts_with("PORT="));

        let err = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("DEFAULT_UTC_OFFSET_MINUTES", "5000"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "DEFAULT_UTC_OFFSET_MINUTES",
                ..
            }
        ));
    }

    #[test]
    fn test_root_prefix_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("API_PREFIX", "/")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "API_PREFIX", .. }));
    }
}
