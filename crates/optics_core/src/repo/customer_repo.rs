//! Customer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and name search over `customers`.
//!
//! # Invariants
//! - Lists are ordered by `id` ascending.
//! - Search is AND-of-tokens, OR-of-fields; a blank query matches nothing.
//! - Deleting a customer cascades to all of its exams.

use crate::model::customer::{Customer, CustomerId};
use crate::repo::schema::ensure_table_ready;
use crate::repo::{bool_to_int, RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

const CUSTOMERS_TABLE: &str = "customers";

/// Writable columns in bind order; `id` is store-assigned.
const CUSTOMER_COLUMNS: [&str; 19] = [
    "ssn",
    "fname",
    "lname",
    "birth_date",
    "sex",
    "tel_home",
    "tel_mobile",
    "address",
    "town",
    "postal_code",
    "status",
    "org",
    "occupation",
    "hobbies",
    "referer",
    "glasses_num",
    "lenses_num",
    "mailing",
    "notes",
];

const NAME_FIELDS: &[&str] = &["fname", "lname"];
const NAME_OR_SSN_FIELDS: &[&str] = &["fname", "lname", "ssn"];

/// Repository interface for customer cards.
pub trait CustomerRepository {
    /// Inserts the customer and returns it with the assigned id.
    fn add_customer(&self, customer: &Customer) -> RepoResult<Customer>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    fn get_customer_by_ssn(&self, ssn: &str) -> RepoResult<Option<Customer>>;
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
    /// Every whitespace token must occur in first or last name.
    fn search_by_name(&self, query: &str) -> RepoResult<Vec<Customer>>;
    /// Every whitespace token must occur in first name, last name or ssn.
    fn search_by_name_or_ssn(&self, query: &str) -> RepoResult<Vec<Customer>>;
    /// Overwrites all columns; returns whether a row changed.
    fn update_customer(&self, customer: &Customer) -> RepoResult<bool>;
    /// Returns whether a row was removed.
    fn delete_customer(&self, id: CustomerId) -> RepoResult<bool>;
}

/// SQLite-backed customer repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, CUSTOMERS_TABLE, &CUSTOMER_COLUMNS)?;
        Ok(Self { conn })
    }

    fn select_sql() -> String {
        format!(
            "SELECT id, {} FROM {CUSTOMERS_TABLE}",
            CUSTOMER_COLUMNS.join(", ")
        )
    }

    fn query_customers(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }
        Ok(customers)
    }

    fn search(&self, query: &str, fields: &[&str]) -> RepoResult<Vec<Customer>> {
        let tokens: Vec<&str> = query.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut clauses = Vec::with_capacity(tokens.len());
        let mut bind_values = Vec::with_capacity(tokens.len() * fields.len());
        for token in tokens {
            let pattern = format!("%{}%", escape_like(token));
            let alternatives = fields
                .iter()
                .map(|field| format!("{field} LIKE ? ESCAPE '\\'"))
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({alternatives})"));
            bind_values.extend(fields.iter().map(|_| Value::Text(pattern.clone())));
        }

        let sql = format!(
            "{} WHERE {} ORDER BY id ASC;",
            Self::select_sql(),
            clauses.join(" AND ")
        );
        self.query_customers(&sql, bind_values)
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn add_customer(&self, customer: &Customer) -> RepoResult<Customer> {
        let placeholders = (1..=CUSTOMER_COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute(
            &format!(
                "INSERT INTO {CUSTOMERS_TABLE} ({}) VALUES ({placeholders});",
                CUSTOMER_COLUMNS.join(", ")
            ),
            params_from_iter(customer_values(customer)),
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=customer_insert module=repo status=ok customer_id={id}");

        let mut created = customer.clone();
        created.id = Some(id);
        Ok(created)
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let sql = format!("{} WHERE id = ?1;", Self::select_sql());
        let mut found = self.query_customers(&sql, vec![Value::Integer(id)])?;
        Ok(found.pop())
    }

    fn get_customer_by_ssn(&self, ssn: &str) -> RepoResult<Option<Customer>> {
        let sql = format!("{} WHERE ssn = ?1;", Self::select_sql());
        let mut found = self.query_customers(&sql, vec![Value::Text(ssn.to_string())])?;
        Ok(found.pop())
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        let sql = format!("{} ORDER BY id ASC;", Self::select_sql());
        self.query_customers(&sql, Vec::new())
    }

    fn search_by_name(&self, query: &str) -> RepoResult<Vec<Customer>> {
        self.search(query, NAME_FIELDS)
    }

    fn search_by_name_or_ssn(&self, query: &str) -> RepoResult<Vec<Customer>> {
        self.search(query, NAME_OR_SSN_FIELDS)
    }

    fn update_customer(&self, customer: &Customer) -> RepoResult<bool> {
        let id = customer.id.ok_or_else(|| {
            RepoError::InvalidArgument("cannot update a customer without an id".to_string())
        })?;

        let assignments = CUSTOMER_COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let mut bind_values = Vec::from(customer_values(customer));
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(
            &format!(
                "UPDATE {CUSTOMERS_TABLE} SET {assignments} WHERE id = ?{};",
                CUSTOMER_COLUMNS.len() + 1
            ),
            params_from_iter(bind_values),
        )?;
        debug!("event=customer_update module=repo status=ok customer_id={id} changed={changed}");
        Ok(changed > 0)
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM customers WHERE id = ?1;", [id])?;
        debug!("event=customer_delete module=repo status=ok customer_id={id} changed={changed}");
        Ok(changed > 0)
    }
}

fn customer_values(customer: &Customer) -> [Value; 19] {
    [
        Value::from(customer.ssn.clone()),
        Value::from(customer.first_name.clone()),
        Value::from(customer.last_name.clone()),
        Value::from(customer.birth_date.clone()),
        Value::from(customer.sex.clone()),
        Value::from(customer.tel_home.clone()),
        Value::from(customer.tel_mobile.clone()),
        Value::from(customer.address.clone()),
        Value::from(customer.town.clone()),
        Value::from(customer.postal_code.clone()),
        Value::from(customer.status.clone()),
        Value::from(customer.org.clone()),
        Value::from(customer.occupation.clone()),
        Value::from(customer.hobbies.clone()),
        Value::from(customer.referer.clone()),
        Value::from(customer.glasses_num),
        Value::from(customer.lenses_num),
        Value::Integer(bool_to_int(customer.mailing)),
        Value::from(customer.notes.clone()),
    ]
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    let mailing = match row.get::<_, i64>("mailing")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid mailing value `{other}` in customers.mailing"
            )));
        }
    };

    Ok(Customer {
        id: Some(row.get("id")?),
        ssn: row.get("ssn")?,
        first_name: row.get("fname")?,
        last_name: row.get("lname")?,
        birth_date: row.get("birth_date")?,
        sex: row.get("sex")?,
        tel_home: row.get("tel_home")?,
        tel_mobile: row.get("tel_mobile")?,
        address: row.get("address")?,
        town: row.get("town")?,
        postal_code: row.get("postal_code")?,
        status: row.get("status")?,
        org: row.get("org")?,
        occupation: row.get("occupation")?,
        hobbies: row.get("hobbies")?,
        referer: row.get("referer")?,
        glasses_num: row.get("glasses_num")?,
        lenses_num: row.get("lenses_num")?,
        mailing,
        notes: row.get("notes")?,
    })
}

/// Escapes `LIKE` wildcards so tokens match literally.
fn escape_like(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for ch in token.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{customer_values, escape_like, CUSTOMER_COLUMNS};
    use crate::model::customer::Customer;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(escape_like("Ben"), "Ben");
    }

    #[test]
    fn customer_values_align_with_columns() {
        let values = customer_values(&Customer::new("123456789", "Dana", "Levi"));
        assert_eq!(values.len(), CUSTOMER_COLUMNS.len());
    }
}
