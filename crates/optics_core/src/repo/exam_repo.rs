//! Generic exam repository over one exam table.
//!
//! # Responsibility
//! - Provide add/get/list/update/delete for any exam type implementing
//!   `ExamTable`.
//! - Serialize exam dates to canonical text on write and decode them
//!   best-effort on read.
//!
//! # Invariants
//! - History is ordered `exam_date DESC, id DESC`; canonical text makes that
//!   chronological.
//! - Writes reject dates that are not structured timestamps.
//! - Reads never fail on unparsable `exam_date` text; it comes back as
//!   `ExamDate::Raw`.

use crate::model::customer::CustomerId;
use crate::model::exam::{ExamId, ExamMeasurements, ExamRecord};
use crate::model::exam_date::{datetime_to_text, is_storable, ExamDate};
use crate::repo::schema::ensure_table_ready;
use crate::repo::{ensure_positive_id, RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::marker::PhantomData;

/// Columns every exam table starts with, after `id`.
const LEADING_COLUMNS: [&str; 3] = ["customer_id", "exam_date", "examiner"];
/// Column every exam table ends with.
const TRAILING_COLUMN: &str = "notes";

/// Row codec for one exam type's measurement block.
///
/// Implementations list every column explicitly; `columns()` and
/// `to_values()` must stay in the same order.
pub trait ExamTable: ExamMeasurements {
    const TABLE: &'static str;

    /// Measurement columns in bind order.
    fn columns() -> Vec<&'static str>;

    /// Measurement values in `columns()` order.
    fn to_values(&self) -> Vec<Value>;

    /// Decodes the measurement block from a row selected by column name.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Repository interface shared by all exam types.
pub trait ExamRepository<M: ExamMeasurements> {
    /// Inserts the record and returns the store-assigned id.
    fn add_test(&self, record: &ExamRecord<M>) -> RepoResult<ExamId>;
    fn get_test(&self, id: ExamId) -> RepoResult<Option<ExamRecord<M>>>;
    /// Returns the customer's exams, most recent first.
    fn list_tests_for_customer(&self, customer_id: CustomerId) -> RepoResult<Vec<ExamRecord<M>>>;
    /// Overwrites every column by id; returns whether a row changed.
    fn update_test(&self, record: &ExamRecord<M>) -> RepoResult<bool>;
    /// Returns whether a row was removed.
    fn delete_test(&self, id: ExamId) -> RepoResult<bool>;
}

/// SQLite-backed exam repository for measurement type `M`.
#[derive(Debug)]
pub struct SqliteExamRepository<'conn, M> {
    conn: &'conn Connection,
    _measurements: PhantomData<M>,
}

impl<M> Clone for SqliteExamRepository<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for SqliteExamRepository<'_, M> {}

impl<'conn, M: ExamTable> SqliteExamRepository<'conn, M> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, M::TABLE, &table_columns::<M>())?;
        Ok(Self {
            conn,
            _measurements: PhantomData,
        })
    }

    fn select_sql() -> String {
        format!(
            "SELECT id, {} FROM {}",
            table_columns::<M>().join(", "),
            M::TABLE
        )
    }
}

impl<M: ExamTable> ExamRepository<M> for SqliteExamRepository<'_, M> {
    fn add_test(&self, record: &ExamRecord<M>) -> RepoResult<ExamId> {
        let columns = table_columns::<M>();
        let values = record_values(record, &columns)?;
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");

        self.conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({placeholders});",
                M::TABLE,
                columns.join(", ")
            ),
            params_from_iter(values),
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "event=exam_insert module=repo status=ok kind={} exam_id={id} customer_id={}",
            M::KIND.as_str(),
            record.customer_id
        );
        Ok(id)
    }

    fn get_test(&self, id: ExamId) -> RepoResult<Option<ExamRecord<M>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1;", Self::select_sql()))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_exam_row(row)?));
        }
        Ok(None)
    }

    fn list_tests_for_customer(&self, customer_id: CustomerId) -> RepoResult<Vec<ExamRecord<M>>> {
        ensure_positive_id("customer_id", customer_id)?;

        let mut stmt = self.conn.prepare(&format!(
            "{}
             WHERE customer_id = ?1
             ORDER BY exam_date DESC, id DESC;",
            Self::select_sql()
        ))?;
        let mut rows = stmt.query([customer_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_exam_row(row)?);
        }
        Ok(records)
    }

    fn update_test(&self, record: &ExamRecord<M>) -> RepoResult<bool> {
        let id = record.id.ok_or_else(|| {
            RepoError::InvalidArgument(format!(
                "cannot update a {} exam without an id",
                M::KIND.as_str()
            ))
        })?;

        let columns = table_columns::<M>();
        let mut values = record_values(record, &columns)?;
        values.push(Value::Integer(id));
        let assignments = columns
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");

        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET {assignments} WHERE id = ?{};",
                M::TABLE,
                columns.len() + 1
            ),
            params_from_iter(values),
        )?;
        debug!(
            "event=exam_update module=repo status=ok kind={} exam_id={id} changed={changed}",
            M::KIND.as_str()
        );
        Ok(changed > 0)
    }

    fn delete_test(&self, id: ExamId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1;", M::TABLE), [id])?;
        debug!(
            "event=exam_delete module=repo status=ok kind={} exam_id={id} changed={changed}",
            M::KIND.as_str()
        );
        Ok(changed > 0)
    }
}

/// All writable columns of `M`'s table in bind order.
pub(crate) fn table_columns<M: ExamTable>() -> Vec<&'static str> {
    let mut columns = LEADING_COLUMNS.to_vec();
    columns.extend(M::columns());
    columns.push(TRAILING_COLUMN);
    columns
}

fn record_values<M: ExamTable>(
    record: &ExamRecord<M>,
    columns: &[&'static str],
) -> RepoResult<Vec<Value>> {
    let exam_date = match &record.exam_date {
        ExamDate::Timestamp(timestamp) if is_storable(timestamp) => datetime_to_text(timestamp),
        ExamDate::Timestamp(timestamp) => {
            return Err(RepoError::InvalidArgument(format!(
                "exam_date `{timestamp}` must have whole seconds and a year in 0..=9999"
            )));
        }
        ExamDate::Raw(text) => {
            return Err(RepoError::InvalidArgument(format!(
                "exam_date `{text}` is not a structured timestamp"
            )));
        }
    };

    let mut values = vec![
        Value::Integer(record.customer_id),
        Value::Text(exam_date),
        Value::from(record.examiner.clone()),
    ];
    values.extend(record.measurements.to_values());
    values.push(Value::from(record.notes.clone()));

    if values.len() != columns.len() {
        return Err(RepoError::InvalidData(format!(
            "{} binds {} values for {} columns",
            M::TABLE,
            values.len(),
            columns.len()
        )));
    }
    Ok(values)
}

fn parse_exam_row<M: ExamTable>(row: &Row<'_>) -> RepoResult<ExamRecord<M>> {
    let exam_date: String = row.get("exam_date")?;
    Ok(ExamRecord {
        id: Some(row.get("id")?),
        customer_id: row.get("customer_id")?,
        exam_date: ExamDate::from_stored(exam_date),
        examiner: row.get("examiner")?,
        measurements: M::from_row(row)?,
        notes: row.get(TRAILING_COLUMN)?,
    })
}
