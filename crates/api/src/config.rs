//! Application configuration loaded from environment variables.

use thiserror::Error;

/// Secret used to sign tokens when running without a database.
pub const DEV_JWT_SECRET: &str = "dev-only-insecure-secret";

/// Seven days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 604_800;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when DATABASE_URL is configured")]
    MissingJwtSecret,

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: Postgres connection string; the in-memory store is used when unset
/// - `JWT_SECRET`: token signing secret, required alongside `DATABASE_URL`
/// - `TOKEN_TTL_SECS`: token lifetime in seconds (default: `604800`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value,
            })?,
            None => defaults.port,
        };

        let token_ttl_secs = match non_empty("TOKEN_TTL_SECS") {
            Some(value) => match value.parse::<i64>() {
                Ok(ttl) if ttl > 0 => ttl,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "TOKEN_TTL_SECS",
                        value,
                    });
                }
            },
            None => defaults.token_ttl_secs,
        };

        let database_url = non_empty("DATABASE_URL");
        let jwt_secret = match (non_empty("JWT_SECRET"), &database_url) {
            (Some(secret), _) => secret,
            (None, Some(_)) => return Err(ConfigError::MissingJwtSecret),
            (None, None) => defaults.jwt_secret,
        };

        Ok(Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port,
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            database_url,
            jwt_secret,
            token_ttl_secs,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.token_ttl_secs, 604_800);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("RUST_LOG", "debug"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8081");
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/shop")
        );
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_secs, 60);
    }

    #[test]
    fn test_database_requires_secret() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingJwtSecret);
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup(&[("PORT", "http")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let result = Config::from_lookup(lookup(&[("TOKEN_TTL_SECS", "0")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "TOKEN_TTL_SECS",
                ..
            })
        ));
    }
}
