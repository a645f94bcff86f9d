//! Load settings from environment variables (a `.env` file is read by the binary via `dotenvy`).

use super::types::{Settings, StoreBackend};
use super::validator::validate;
use crate::error::ConfigError;
use std::str::FromStr;

fn parse<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_backend(raw: &str) -> Result<StoreBackend, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
        "memory" => Ok(StoreBackend::Memory),
        other => Err(ConfigError::Invalid {
            var: "STORE_BACKEND",
            reason: format!("unknown backend '{}' (expected postgres or memory)", other),
        }),
    }
}

impl Settings {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`; unset keys keep their defaults. The result is validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();
        s.database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if let Some(v) = lookup("BIND_ADDR") {
            s.bind_addr = parse("BIND_ADDR", &v)?;
        }
        if let Some(v) = lookup("DB_SCHEMA") {
            s.db_schema = v.trim().to_string();
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            s.max_connections = parse("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("API_PREFIX") {
            s.api_prefix = v.trim().to_string();
        }
        if let Some(v) = lookup("BODY_LIMIT_BYTES") {
            s.body_limit = parse("BODY_LIMIT_BYTES", &v)?;
        }
        if let Some(v) = lookup("STORE_BACKEND") {
            s.backend = parse_backend(&v)?;
        }
        validate(&s)?;
        Ok(s)
    }
}
