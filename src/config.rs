//! Store configuration.
//!
//! Defaults are suitable for a local SQLite file; every field can be
//! overridden from the environment with the `REVIEW_ASSIGN_` prefix.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Prefix shared by all environment overrides.
const ENV_PREFIX: &str = "REVIEW_ASSIGN_";

/// Connection and pool settings for the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,

    /// Upper bound on pooled connections.
    pub max_connections: u32,

    /// Connections kept warm.
    pub min_connections: u32,

    /// How long to wait for a free pooled connection.
    pub acquire_timeout_secs: u64,

    /// How long a writer waits for the database lock before failing.
    pub busy_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("review-assign.db"),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 10,
            busy_timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    /// Defaults pointed at a specific database file.
    pub fn for_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// Load the defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(path) = lookup(&env_key("DB_PATH")) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(value) = parse_var(&lookup, "MAX_CONNECTIONS")? {
            config.max_connections = value;
        }
        if let Some(value) = parse_var(&lookup, "MIN_CONNECTIONS")? {
            config.min_connections = value;
        }
        if let Some(value) = parse_var(&lookup, "ACQUIRE_TIMEOUT_SECS")? {
            config.acquire_timeout_secs = value;
        }
        if let Some(value) = parse_var(&lookup, "BUSY_TIMEOUT_SECS")? {
            config.busy_timeout_secs = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pool cannot honour.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_connections == 0 {
            return Err(AppError::invalid_input_field(
                "must be at least 1",
                env_key("MAX_CONNECTIONS"),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(AppError::invalid_input_field(
                "must not exceed max_connections",
                env_key("MIN_CONNECTIONS"),
            ));
        }
        Ok(())
    }
}

fn env_key(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, name)
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, AppError> {
    let key = env_key(name);
    match lookup(&key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::invalid_input_field(format!("cannot parse '{}'", raw), key)),
        None => Ok(None),
    }
}
