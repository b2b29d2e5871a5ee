//! Runtime configuration and composition root.
//!
//! # Responsibility
//! - Read database and logging settings from the environment.
//! - Start logging and open the migrated connection in one place.

use crate::db::{open_db, DbError};
use crate::logging::{default_log_level, init_logging, LoggingError};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "OPTICS_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "OPTICS_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "OPTICS_LOG_DIR";
pub const DEFAULT_DB_PATH: &str = "optics.db";

/// Settings the core needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Failure while starting the core.
#[derive(Debug)]
pub enum BootstrapError {
    Logging(LoggingError),
    Db(DbError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "logging setup failed: {err}"),
            Self::Db(err) => write!(f, "database setup failed: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<LoggingError> for BootstrapError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for BootstrapError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl CoreConfig {
    /// Reads `OPTICS_DB_PATH`, `OPTICS_LOG_LEVEL` and `OPTICS_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            db_path: read(DB_PATH_VAR).map_or(defaults.db_path, PathBuf::from),
            log_level: read(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_VAR),
        }
    }

    /// Starts logging when a directory is configured, then opens the
    /// database with all migrations applied.
    pub fn open(&self) -> Result<Connection, BootstrapError> {
        if let Some(log_dir) = &self.log_dir {
            init_logging(&self.log_level, log_dir)?;
        }
        let conn = open_db(&self.db_path)?;
        info!(
            "event=core_open module=config status=ok db_path={}",
            self.db_path.display()
        );
        Ok(conn)
    }
}
