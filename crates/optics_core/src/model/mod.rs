//! Domain model for customers and their exam histories.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Keep one generic exam shape with a typed measurement block per exam type.
//!
//! # Invariants
//! - Records are plain data; validation lives in `service::validation`.
//! - Exam dates are structured timestamps on write paths.

pub mod contact_lenses;
pub mod customer;
pub mod exam;
pub mod exam_date;
pub mod glasses;
pub mod refraction;
