//! Customer domain model.
//!
//! # Responsibility
//! - Define the shop's customer card as stored in `customers`.
//!
//! # Invariants
//! - `ssn` is a 9-digit numeric string, unique across customers.
//! - `first_name` and `last_name` are non-blank.
//! - `id` is `None` until the store assigns one.

use serde::{Deserialize, Serialize};

/// Store-assigned customer identifier.
pub type CustomerId = i64;

/// Customer card with identity, contact and demographic fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<CustomerId>,
    /// National identifier, 9 digits.
    pub ssn: String,
    /// Stored as `fname`.
    pub first_name: String,
    /// Stored as `lname`.
    pub last_name: String,
    /// Free text as typed at intake.
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub tel_home: Option<String>,
    /// 10 digits when present.
    pub tel_mobile: Option<String>,
    pub address: Option<String>,
    pub town: Option<String>,
    pub postal_code: Option<String>,
    pub status: Option<String>,
    pub org: Option<String>,
    pub occupation: Option<String>,
    pub hobbies: Option<String>,
    /// Who referred the customer to the shop.
    pub referer: Option<String>,
    /// Number of glasses pairs bought.
    pub glasses_num: Option<i64>,
    /// Number of contact lens orders.
    pub lenses_num: Option<i64>,
    /// Opted in to mailing lists.
    pub mailing: bool,
    pub notes: Option<String>,
}

impl Customer {
    /// Creates an unsaved customer with only the required fields set.
    pub fn new(
        ssn: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            ssn: ssn.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// Returns `"<first> <last>"` with surrounding whitespace trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}
