//! Validate settings before anything connects or binds.

use super::types::{Settings, StoreBackend};
use crate::error::ConfigError;
use regex::Regex;

const IDENT_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";
const PREFIX_PATTERN: &str = r"^(/[A-Za-z0-9_\-]+)*$";

pub fn validate(s: &Settings) -> Result<(), ConfigError> {
    let ident = Regex::new(IDENT_PATTERN).map_err(|e| ConfigError::Invalid {
        var: "DB_SCHEMA",
        reason: e.to_string(),
    })?;
    if !ident.is_match(&s.db_schema) {
        return Err(ConfigError::Invalid {
            var: "DB_SCHEMA",
            reason: format!("'{}' is not a plain SQL identifier", s.db_schema),
        });
    }
    let prefix = Regex::new(PREFIX_PATTERN).map_err(|e| ConfigError::Invalid {
        var: "API_PREFIX",
        reason: e.to_string(),
    })?;
    if !prefix.is_match(&s.api_prefix) {
        return Err(ConfigError::Invalid {
            var: "API_PREFIX",
            reason: "must be empty or start with '/' and have no trailing '/'".into(),
        });
    }
    if s.max_connections == 0 {
        return Err(ConfigError::Invalid {
            var: "DB_MAX_CONNECTIONS",
            reason: "must be at least 1".into(),
        });
    }
    if s.body_limit == 0 {
        return Err(ConfigError::Invalid {
            var: "BODY_LIMIT_BYTES",
            reason: "must be at least 1".into(),
        });
    }
    if s.backend == StoreBackend::Postgres && s.database_url.is_none() {
        return Err(ConfigError::Missing("DATABASE_URL"));
    }
    Ok(())
}
