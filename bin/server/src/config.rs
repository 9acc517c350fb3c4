//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys use
//! a double underscore, e.g. `SESSION__DURATION_MINUTES=30`.

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Connection pool configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Password handling configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Connection pool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session duration in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

/// Password handling configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Secret prepended to every password before hashing.
    ///
    /// Changing it invalidates every stored password hash.
    #[serde(default)]
    pub password_pepper: Option<String>,
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_session_duration_minutes() -> i64 {
    60
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(
            config::Environment::default()
                .separator("__")
                .try_parsing(true),
        )
    }

    fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        config::Environment::default()
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.duration_minutes, 60);
        assert_eq!(config.cleanup_interval_seconds, 300);
        assert!(config.secure_cookies);
    }

    #[test]
    fn only_database_url_is_required() {
        let config =
            ServerConfig::from_source(env(&[("DATABASE_URL", "postgres://localhost/flock")]))
                .expect("config");

        assert_eq!(config.database_url, "postgres://localhost/flock");
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.database.max_connections, 5);
        assert!(config.auth.password_pepper.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(ServerConfig::from_source(env(&[])).is_err());
    }

    #[test]
    fn nested_keys_use_double_underscore() {
        let config = ServerConfig::from_source(env(&[
            ("DATABASE_URL", "postgres://localhost/flock"),
            ("SESSION__DURATION_MINUTES", "15"),
            ("SESSION__SECURE_COOKIES", "false"),
            ("DATABASE__MAX_CONNECTIONS", "20"),
            ("AUTH__PASSWORD_PEPPER", "s3cret"),
        ]))
        .expect("config");

        assert_eq!(config.session.duration_minutes, 15);
        assert!(!config.session.secure_cookies);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.auth.password_pepper.as_deref(), Some("s3cret"));
    }
}
