//! Authentication configuration.
//!
//! Built once at startup and handed to [`AuthManager`](crate::auth::AuthManager);
//! there is no process-wide settings object.

use chrono::Duration;
use thiserror::Error;

use crate::auth::{DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_ATTEMPTS, LockoutPolicy};

/// Placeholder secret shipped in sample env files. Never accepted.
pub const PLACEHOLDER_SECRET: &str = "your-secret-key-change-in-production";

/// Default access token lifetime (24 hours)
pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 1440;

/// Default refresh token lifetime
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Longest accepted access token lifetime (one year)
pub const MAX_ACCESS_TTL_MINUTES: i64 = 525_600;

/// Longest accepted refresh token lifetime (five years)
pub const MAX_REFRESH_TTL_DAYS: i64 = 1_825;

/// Longest accepted lockout (one year)
pub const MAX_LOCKOUT_MINUTES: i64 = 525_600;

/// Authentication settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (required)
    pub secret_key: String,
    /// Access token lifetime in minutes
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_ttl_days: i64,
    /// Consecutive failures before lockout
    pub max_attempts: u32,
    /// Lockout duration in minutes
    pub lockout_minutes: i64,
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl AuthConfig {
    /// Config with the given secret and default lifetimes and limits
    pub fn with_secret(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            access_ttl_minutes: DEFAULT_ACCESS_TTL_MINUTES,
            refresh_ttl_days: DEFAULT_REFRESH_TTL_DAYS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_minutes: DEFAULT_LOCKOUT_MINUTES,
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `SECRET_KEY` (required)
    /// - `ACCESS_TOKEN_EXPIRE_MINUTES` (default: 1440)
    /// - `REFRESH_TOKEN_EXPIRE_DAYS` (default: 7)
    /// - `MAX_LOGIN_ATTEMPTS` (default: 5)
    /// - `LOCKOUT_MINUTES` (default: 15)
    ///
    /// # Errors
    ///
    /// Returns error if `SECRET_KEY` is missing or any value fails [`validate`](Self::validate)
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key = std::env::var("SECRET_KEY").map_err(|_| ConfigError::MissingRequired {
            var: "SECRET_KEY".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let config = Self {
            secret_key,
            access_ttl_minutes: parse_env_or("ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_ACCESS_TTL_MINUTES),
            refresh_ttl_days: parse_env_or("REFRESH_TOKEN_EXPIRE_DAYS", DEFAULT_REFRESH_TTL_DAYS),
            max_attempts: parse_env_or("MAX_LOGIN_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            lockout_minutes: parse_env_or("LOCKOUT_MINUTES", DEFAULT_LOCKOUT_MINUTES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "SECRET_KEY".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.secret_key == PLACEHOLDER_SECRET {
            return Err(ConfigError::Invalid {
                var: "SECRET_KEY".to_string(),
                reason: "Cannot be the placeholder default, set a real secret".to_string(),
            });
        }

        let bounded = [
            ("ACCESS_TOKEN_EXPIRE_MINUTES", self.access_ttl_minutes, MAX_ACCESS_TTL_MINUTES),
            ("REFRESH_TOKEN_EXPIRE_DAYS", self.refresh_ttl_days, MAX_REFRESH_TTL_DAYS),
            ("MAX_LOGIN_ATTEMPTS", self.max_attempts as i64, i64::from(u32::MAX)),
            ("LOCKOUT_MINUTES", self.lockout_minutes, MAX_LOCKOUT_MINUTES),
        ];
        for (var, value, max) in bounded {
            if value <= 0 {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if value > max {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: format!("Must be at most {max}"),
                });
            }
        }

        Ok(())
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_ttl_minutes)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_ttl_days)
    }

    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(self.max_attempts, Duration::minutes(self.lockout_minutes))
    }
}

/// Helper to parse environment variable with default fallback
pub fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
