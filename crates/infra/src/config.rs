//! Process configuration read from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `JWT_SECRET` | insecure dev secret (logged as a warning) |
//! | `DATABASE_URL` | unset: in-memory stores |
//! | `TOKEN_TTL_MINUTES` | `480` |
//! | `RESET_TOKEN_TTL_SECS` | `3600` |
//! | `PUBLIC_BASE_URL` | `http://localhost:8080` |

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub public_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = parse_var(
            "BIND_ADDR",
            var("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        )?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl_minutes: i64 = parse_var("TOKEN_TTL_MINUTES", var("TOKEN_TTL_MINUTES"), 480)?;
        let reset_ttl_secs: i64 = parse_var("RESET_TOKEN_TTL_SECS", var("RESET_TOKEN_TTL_SECS"), 3600)?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url: var("DATABASE_URL"),
            token_ttl: positive_duration("TOKEN_TTL_MINUTES", token_ttl_minutes, Duration::try_minutes)?,
            reset_token_ttl: positive_duration("RESET_TOKEN_TTL_SECS", reset_ttl_secs, Duration::try_seconds)?,
            public_base_url: var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_var<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn positive_duration(
    name: &'static str,
    amount: i64,
    unit: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name,
        value: amount.to_string(),
        reason: reason.to_string(),
    };
    if amount <= 0 {
        return Err(invalid("must be greater than zero"));
    }
    unit(amount).ok_or_else(|| invalid("out of range"))
}
