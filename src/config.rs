// Process-wide configuration, read from the environment once at startup

use std::time::Duration;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/my_library";
const DEFAULT_JWT_SECRET: &str = "test";
const DEFAULT_JWT_EXPIRY: &str = "7d";

/// Configuration errors are fatal at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Immutable service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry: Duration,
    pub request_timeout: Duration,
    pub db_acquire_timeout: Duration,
    pub db_max_connections: u32,
    pub seed_demo_account: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiry: Duration::from_secs(7 * 24 * 60 * 60),
            request_timeout: Duration::from_secs(30),
            db_acquire_timeout: Duration::from_secs(3),
            db_max_connections: 5,
            seed_demo_account: true,
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// Missing variables fall back to their defaults; present but malformed
    /// ones are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => defaults.port,
        };

        let jwt_expiry = parse_duration(
            "JWT_EXPIRY",
            &lookup("JWT_EXPIRY").unwrap_or_else(|| DEFAULT_JWT_EXPIRY.to_string()),
        )?;

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_positive("REQUEST_TIMEOUT_SECS", &value)?),
            None => defaults.request_timeout,
        };

        let db_acquire_timeout = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_positive("DB_ACQUIRE_TIMEOUT_SECS", &value)?),
            None => defaults.db_acquire_timeout,
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(value) => {
                let count = parse_positive("DB_MAX_CONNECTIONS", &value)?;
                u32::try_from(count).map_err(|_| ConfigError::InvalidValue {
                    name: "DB_MAX_CONNECTIONS",
                    expected: "connection count",
                    value,
                })?
            }
            None => defaults.db_max_connections,
        };

        let seed_demo_account = match lookup("SEED_DEMO_ACCOUNT") {
            Some(value) => parse_bool("SEED_DEMO_ACCOUNT", &value)?,
            None => defaults.seed_demo_account,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiry,
            request_timeout,
            db_acquire_timeout,
            db_max_connections,
            seed_demo_account,
        })
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a duration such as `7d`, `12h`, `30m`, `45s`, `2w` or bare seconds
pub fn parse_duration(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name,
        expected: "duration",
        value: raw.to_string(),
    };

    let value = raw.trim();
    let (digits, unit_secs) = match value.char_indices().last() {
        Some((idx, unit)) if unit.is_ascii_alphabetic() => {
            let multiplier = match unit.to_ascii_lowercase() {
                's' => 1,
                'm' => 60,
                'h' => 60 * 60,
                'd' => 24 * 60 * 60,
                'w' => 7 * 24 * 60 * 60,
                _ => return Err(invalid()),
            };
            (&value[..idx], multiplier)
        }
        Some(_) => (value, 1),
        None => return Err(invalid()),
    };

    let amount: u64 = digits.trim().parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(ConfigError::ZeroDuration(name));
    }

    amount
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let value: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        expected: "positive integer",
        value: raw.to_string(),
    })?;
    if value == 0 {
        return Err(ConfigError::ZeroDuration(name));
    }
    Ok(value)
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            expected: "boolean",
            value: raw.to_string(),
        }),
    }
}
