//! Process configuration loaded from the environment.
//!
//! # Responsibility
//! - Read and validate startup settings exactly once.
//! - Report the offending key when a value is missing or malformed.
//!
//! # Invariants
//! - A `PokedexConfig` value is always fully validated.
//! - `default_limit` is strictly positive.

use crate::logging::{default_log_level, parse_log_dir, LogLevel, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_ENV: &str = "POKEDEX_DATABASE";
pub const DEFAULT_LIMIT_ENV: &str = "POKEDEX_DEFAULT_LIMIT";
pub const LOG_LEVEL_ENV: &str = "POKEDEX_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "POKEDEX_LOG_DIR";

/// Page size used when neither the caller nor the environment sets one.
pub const FALLBACK_DEFAULT_LIMIT: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid { key, value, reason } => {
                write!(f, "invalid value `{value}` for `{key}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Validated startup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokedexConfig {
    /// Store connection string (`:memory:`, `sqlite://<path>` or a path).
    pub database: String,
    /// Page size for list calls without an explicit limit.
    pub default_limit: u32,
    pub log_level: LogLevel,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl PokedexConfig {
    /// Loads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through `lookup`, which maps a key to its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database = read(DATABASE_ENV)
            .map(|value| value.trim().to_string())
            .ok_or(ConfigError::Missing(DATABASE_ENV))?;

        let default_limit = match read(DEFAULT_LIMIT_ENV) {
            Some(raw) => parse_default_limit(&raw)?,
            None => FALLBACK_DEFAULT_LIMIT,
        };

        let log_level = match read(LOG_LEVEL_ENV) {
            Some(raw) => raw.parse().map_err(|err: LoggingError| ConfigError::Invalid {
                key: LOG_LEVEL_ENV,
                value: raw.clone(),
                reason: err.to_string(),
            })?,
            None => default_log_level(),
        };

        let log_dir = match read(LOG_DIR_ENV) {
            Some(raw) => Some(parse_log_dir(&raw).map_err(|err| ConfigError::Invalid {
                key: LOG_DIR_ENV,
                value: raw.clone(),
                reason: err.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            database,
            default_limit,
            log_level,
            log_dir,
        })
    }
}

fn parse_default_limit(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key: DEFAULT_LIMIT_ENV,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let limit = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid("expected a positive integer"))?;
    if limit == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, PokedexConfig, DATABASE_ENV, DEFAULT_LIMIT_ENV, FALLBACK_DEFAULT_LIMIT,
        LOG_DIR_ENV, LOG_LEVEL_ENV,
    };
    use crate::logging::LogLevel;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<PokedexConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        PokedexConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn database_is_required() {
        assert_eq!(load(&[]), Err(ConfigError::Missing(DATABASE_ENV)));
        assert_eq!(
            load(&[(DATABASE_ENV, "   ")]),
            Err(ConfigError::Missing(DATABASE_ENV))
        );
    }

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let config = load(&[(DATABASE_ENV, ":memory:")]).unwrap();
        assert_eq!(config.database, ":memory:");
        assert_eq!(config.default_limit, FALLBACK_DEFAULT_LIMIT);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn explicit_values_are_normalized() {
        let config = load(&[
            (DATABASE_ENV, " sqlite://pokedex.db "),
            (DEFAULT_LIMIT_ENV, "20"),
            (LOG_LEVEL_ENV, "WARNING"),
        ])
        .unwrap();
        assert_eq!(config.database, "sqlite://pokedex.db");
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn default_limit_must_be_positive_integer() {
        for raw in ["0", "-3", "ten"] {
            let err = load(&[(DATABASE_ENV, ":memory:"), (DEFAULT_LIMIT_ENV, raw)]).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { key, .. } if key == DEFAULT_LIMIT_ENV
            ));
        }
    }

    #[test]
    fn log_dir_must_be_absolute() {
        let err = load(&[(DATABASE_ENV, ":memory:"), (LOG_DIR_ENV, "logs/dev")]).unwrap_err();
        assert!(err.to_string().contains(LOG_DIR_ENV));
    }
}
