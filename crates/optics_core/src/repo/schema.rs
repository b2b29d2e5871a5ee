//! Connection readiness checks run when a repository is constructed.

use crate::db::migrations::{current_version, latest_version};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;
use std::collections::HashSet;

/// Verifies migrations are applied and `table` has every column in `columns`.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let existing = table_columns(conn, table)?;
    if existing.is_empty() {
        return Err(RepoError::MissingRequiredTable(table));
    }

    if let Some(column) = columns
        .iter()
        .find(|column| !existing.contains(&column.to_ascii_lowercase()))
    {
        return Err(RepoError::MissingRequiredColumn {
            table,
            column: *column,
        });
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .map(|name| name.map(|value| value.to_ascii_lowercase()))
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(names)
}
