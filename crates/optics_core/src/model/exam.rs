//! Exam record shape shared by all exam types.
//!
//! # Responsibility
//! - Define the metadata every exam carries (owner, date, examiner, notes).
//! - Define the contract each exam type's measurement block implements.
//! - Define the typed boundary input used by service callers.
//!
//! # Invariants
//! - `ExamRecord::id` is `None` before insert and `Some` afterwards.
//! - Each exam type exposes exactly one cylinder/axis pair per eye.

use crate::model::customer::CustomerId;
use crate::model::exam_date::ExamDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Store-assigned exam identifier, unique within one exam table.
pub type ExamId = i64;

/// Exam variants, each persisted in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamKind {
    Refraction,
    Glasses,
    ContactLenses,
}

impl ExamKind {
    /// Stable lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Refraction => "refraction",
            Self::Glasses => "glasses",
            Self::ContactLenses => "contact_lenses",
        }
    }
}

/// Right (OD) or left (OS) eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eye {
    Right,
    Left,
}

impl Eye {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
        }
    }
}

/// Cylinder power and axis of one eye, as checked by validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderAxis {
    pub eye: Eye,
    pub cylinder: Option<f64>,
    pub axis: Option<i64>,
}

/// Contract for an exam type's measurement block.
pub trait ExamMeasurements: Clone + Debug + Default + PartialEq {
    /// Exam variant this block belongs to.
    const KIND: ExamKind;

    /// Cylinder/axis pairs for the right and left eye, in that order.
    fn cylinder_axis_pairs(&self) -> [CylinderAxis; 2];

    /// Real-valued fields by column name.
    fn numeric_fields(&self) -> Vec<(&'static str, Option<f64>)>;
}

/// One stored exam of measurement type `M`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord<M> {
    pub id: Option<ExamId>,
    /// Owning customer; exams are removed with their customer.
    pub customer_id: CustomerId,
    pub exam_date: ExamDate,
    pub examiner: Option<String>,
    pub measurements: M,
    pub notes: Option<String>,
}

impl<M: ExamMeasurements> ExamRecord<M> {
    /// Creates an unsaved exam record.
    pub fn new(customer_id: CustomerId, exam_date: impl Into<ExamDate>, measurements: M) -> Self {
        Self {
            id: None,
            customer_id,
            exam_date: exam_date.into(),
            examiner: None,
            measurements,
            notes: None,
        }
    }

    pub fn kind(&self) -> ExamKind {
        M::KIND
    }
}

/// Caller input for creating or overwriting an exam.
///
/// `exam_date` is day-first entry text (`DD/MM/YYYY`); it is validated and
/// converted before a record reaches the repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamInput<M> {
    pub exam_date: String,
    pub examiner: Option<String>,
    pub measurements: M,
    pub notes: Option<String>,
}

impl<M: ExamMeasurements> ExamInput<M> {
    pub fn new(exam_date: impl Into<String>, measurements: M) -> Self {
        Self {
            exam_date: exam_date.into(),
            examiner: None,
            measurements,
            notes: None,
        }
    }
}
