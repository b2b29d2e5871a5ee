//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Map records to and from rows; own every SQL statement shape.
//! - Reject storage-level bad arguments (non-positive ids, missing ids).
//!
//! # Invariants
//! - Repositories borrow an injected connection and never open or close it.
//! - Every mutating call is one autocommitted statement.
//! - Construction verifies that every column a repository binds exists.

use crate::db::DbError;
use crate::model::customer::CustomerId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod contact_lenses_repo;
pub mod customer_repo;
pub mod exam_repo;
pub mod glasses_repo;
pub mod refraction_repo;
mod schema;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Caller passed an argument the store cannot act on.
    InvalidArgument(String),
    /// Stored row cannot be decoded into a record.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Parses a customer id typed as text (search boxes, CLI arguments).
///
/// Blank and non-integer text are rejected the same way as non-positive ids.
pub fn parse_customer_id(text: &str) -> RepoResult<CustomerId> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidArgument(
            "customer_id must not be empty".to_string(),
        ));
    }
    let id = trimmed.parse::<CustomerId>().map_err(|_| {
        RepoError::InvalidArgument(format!("customer_id must be an integer, got `{trimmed}`"))
    })?;
    ensure_positive_id("customer_id", id)?;
    Ok(id)
}

pub(crate) fn ensure_positive_id(name: &str, id: i64) -> RepoResult<()> {
    if id <= 0 {
        return Err(RepoError::InvalidArgument(format!(
            "{name} must be a positive integer, got {id}"
        )));
    }
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_customer_id, RepoError};

    #[test]
    fn parse_customer_id_accepts_positive_integers() {
        assert_eq!(parse_customer_id("42").unwrap(), 42);
        assert_eq!(parse_customer_id(" 7 ").unwrap(), 7);
    }

    #[test]
    fn parse_customer_id_rejects_blank_text_and_non_positive_values() {
        for text in ["", "   ", "x", "1.5", "0", "-10"] {
            let err = parse_customer_id(text).unwrap_err();
            assert!(
                matches!(err, RepoError::InvalidArgument(_)),
                "unexpected error for `{text}`: {err}"
            );
        }
    }
}
