//! Core records layer for the optics shop.
//! This crate is the single source of truth for customer and exam invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BootstrapError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::contact_lenses::{ContactLensesMeasurements, ContactLensesTest};
pub use model::customer::{Customer, CustomerId};
pub use model::exam::{ExamId, ExamInput, ExamKind, ExamRecord, Eye};
pub use model::exam_date::{DateParseError, ExamDate};
pub use model::glasses::{GlassesMeasurements, GlassesTest};
pub use model::refraction::{RefractionMeasurements, RefractionTest};
pub use repo::{parse_customer_id, RepoError, RepoResult};
pub use service::customer_service::{CustomerService, SqliteCustomerService};
pub use service::validation::ValidationError;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
