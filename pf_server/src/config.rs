//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use portfolio::config::{AuthConfig, ConfigError, parse_env_or};
use portfolio::db::DatabaseConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default bind address when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000);

/// Default CORS origin
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Keep accounts in memory instead of PostgreSQL
    pub memory: bool,
    /// Token and lockout configuration
    pub auth: AuthConfig,
    /// Allowed CORS origin
    pub frontend_url: String,
    /// Per-client rate limits on the public auth endpoints
    pub rate_limits: RateLimitConfig,
    /// Administrator provisioned at startup when no admin exists
    pub admin: Option<AdminBootstrap>,
}

/// Requests per minute allowed per client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub login_per_minute: usize,
    pub register_per_minute: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_per_minute: 10,
            register_per_minute: 5,
        }
    }
}

/// Bootstrap administrator credentials
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `memory` - Use the in-memory credential store
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{value}' is not an IP:PORT address"),
                })?,
                Err(_) => DEFAULT_BIND,
            },
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let auth = AuthConfig::from_env()?;

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string());

        let defaults = RateLimitConfig::default();
        let rate_limits = RateLimitConfig {
            login_per_minute: parse_env_or("RATE_LIMIT_LOGIN_PER_MINUTE", defaults.login_per_minute),
            register_per_minute: parse_env_or(
                "RATE_LIMIT_REGISTER_PER_MINUTE",
                defaults.register_per_minute,
            ),
        };

        let admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminBootstrap {
                email,
                password,
                name: std::env::var("ADMIN_NAME").ok(),
            }),
            (Ok(_), Err(_)) => {
                return Err(ConfigError::MissingRequired {
                    var: "ADMIN_PASSWORD".to_string(),
                    hint: "Set together with ADMIN_EMAIL, or unset both".to_string(),
                });
            }
            (Err(_), Ok(_)) => {
                return Err(ConfigError::MissingRequired {
                    var: "ADMIN_EMAIL".to_string(),
                    hint: "Set together with ADMIN_PASSWORD, or unset both".to_string(),
                });
            }
            (Err(_), Err(_)) => None,
        };

        let config = ServerConfig {
            bind,
            database,
            memory,
            auth,
            frontend_url,
            rate_limits,
            admin,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;

        if !self.memory && self.database.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if !(self.frontend_url.starts_with("http://") || self.frontend_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid {
                var: "FRONTEND_URL".to_string(),
                reason: format!("'{}' must be an http(s) origin", self.frontend_url),
            });
        }

        if self.rate_limits.login_per_minute == 0 {
            return Err(ConfigError::Invalid {
                var: "RATE_LIMIT_LOGIN_PER_MINUTE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.rate_limits.register_per_minute == 0 {
            return Err(ConfigError::Invalid {
                var: "RATE_LIMIT_REGISTER_PER_MINUTE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if let Some(admin) = &self.admin
            && !admin.email.contains('@')
        {
            return Err(ConfigError::Invalid {
                var: "ADMIN_EMAIL".to_string(),
                reason: format!("'{}' is not an email address", admin.email),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            bind: DEFAULT_BIND,
            database: DatabaseConfig::development(),
            memory: false,
            auth: AuthConfig::with_secret("a".repeat(32)),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            rate_limits: RateLimitConfig::default(),
            admin: None,
        }
    }

    #[test]
    fn test_default_bind() {
        assert_eq!(DEFAULT_BIND.to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn test_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "SECRET_KEY".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SECRET_KEY"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_config_validation_placeholder_secret() {
        let mut config = test_config();
        config.auth.secret_key = portfolio::config::PLACEHOLDER_SECRET.to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_rate_limit() {
        let mut config = test_config();
        config.rate_limits.login_per_minute = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("RATE_LIMIT_LOGIN_PER_MINUTE"));
    }

    #[test]
    fn test_config_validation_frontend_url() {
        let mut config = test_config();
        config.frontend_url = "localhost:3000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_admin_email() {
        let mut config = test_config();
        config.admin = Some(AdminBootstrap {
            email: "admin".to_string(),
            password: "Abcdef1!".to_string(),
            name: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_database_url_allowed_in_memory_mode() {
        let mut config = test_config();
        config.database.database_url = String::new();
        assert!(config.validate().is_err());

        config.memory = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_admin_debug_redacts_password() {
        let admin = AdminBootstrap {
            email: "admin@x.com".to_string(),
            password: "Abcdef1!".to_string(),
            name: None,
        };
        let debug = format!("{admin:?}");
        assert!(!debug.contains("Abcdef1!"));
    }
}
