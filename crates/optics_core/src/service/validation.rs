//! Input validation for customers and exams.
//!
//! # Responsibility
//! - Check exam input before it is converted into a stored record.
//! - Check customer cards before insert and update.
//!
//! # Invariants
//! - Every rejection is a typed `ValidationError`; nothing here panics.
//! - An axis is set exactly when the same eye has a nonzero cylinder, and lies
//!   in `[0, 180]`.
//! - A `None` or `0.0` cylinder means no astigmatic correction.

use crate::model::customer::{Customer, CustomerId};
use crate::model::exam::{CylinderAxis, ExamInput, ExamMeasurements, Eye};
use crate::model::exam_date::{parse_entry_date, DateParseError};
use crate::repo::customer_repo::CustomerRepository;
use crate::service::{ServiceError, ServiceResult};
use chrono::NaiveDateTime;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest valid axis, degrees.
pub const MAX_AXIS_DEGREES: i64 = 180;

const NAME_MAX_CHARS: usize = 50;

static SSN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{9}$").expect("valid ssn regex"));
static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid mobile regex"));

/// Rejection reasons for customer and exam input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidCustomerId(CustomerId),
    CustomerNotFound(CustomerId),
    MissingExamDate,
    InvalidExamDate(DateParseError),
    NonFiniteNumber { field: &'static str },
    /// Axis given while the eye has no cylinder.
    AxisWithoutCylinder { eye: Eye, axis: i64 },
    /// Nonzero cylinder given without an axis.
    MissingAxis { eye: Eye },
    AxisOutOfRange { eye: Eye, axis: i64 },
    InvalidSsn(String),
    DuplicateSsn(String),
    MissingName { field: &'static str },
    InvalidMobilePhone(String),
    FieldTooLong { field: &'static str, max_chars: usize },
    NegativeCounter { field: &'static str, value: i64 },
}

impl ValidationError {
    /// Returns whether this is a cylinder/axis consistency failure.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::AxisWithoutCylinder { .. } | Self::MissingAxis { .. } | Self::AxisOutOfRange { .. }
        )
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidCustomerId(_) => "invalid_customer_id",
            Self::CustomerNotFound(_) => "customer_not_found",
            Self::MissingExamDate => "missing_exam_date",
            Self::InvalidExamDate(_) => "invalid_exam_date",
            Self::NonFiniteNumber { .. } => "non_finite_number",
            Self::AxisWithoutCylinder { .. } => "axis_without_cylinder",
            Self::MissingAxis { .. } => "missing_axis",
            Self::AxisOutOfRange { .. } => "axis_out_of_range",
            Self::InvalidSsn(_) => "invalid_ssn",
            Self::DuplicateSsn(_) => "duplicate_ssn",
            Self::MissingName { .. } => "missing_name",
            Self::InvalidMobilePhone(_) => "invalid_mobile_phone",
            Self::FieldTooLong { .. } => "field_too_long",
            Self::NegativeCounter { .. } => "negative_counter",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCustomerId(id) => {
                write!(f, "customer_id must be a positive integer, got {id}")
            }
            Self::CustomerNotFound(id) => write!(f, "customer {id} does not exist"),
            Self::MissingExamDate => write!(f, "exam_date is required"),
            Self::InvalidExamDate(err) => write!(f, "{err}"),
            Self::NonFiniteNumber { field } => write!(f, "{field} must be a finite number"),
            Self::AxisWithoutCylinder { eye, axis } => write!(
                f,
                "{} eye has axis {axis} but no cylinder",
                eye.as_str()
            ),
            Self::MissingAxis { eye } => {
                write!(f, "{} eye has a cylinder but no axis", eye.as_str())
            }
            Self::AxisOutOfRange { eye, axis } => write!(
                f,
                "{} eye axis {axis} is outside 0..={MAX_AXIS_DEGREES}",
                eye.as_str()
            ),
            Self::InvalidSsn(ssn) => write!(f, "ssn `{ssn}` must be exactly 9 digits"),
            Self::DuplicateSsn(ssn) => write!(f, "ssn `{ssn}` is already registered"),
            Self::MissingName { field } => write!(f, "{field} must not be blank"),
            Self::InvalidMobilePhone(phone) => {
                write!(f, "tel_mobile `{phone}` must be exactly 10 digits")
            }
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::NegativeCounter { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidExamDate(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DateParseError> for ValidationError {
    fn from(value: DateParseError) -> Self {
        Self::InvalidExamDate(value)
    }
}

/// Checks one eye's cylinder/axis pair.
pub fn check_cylinder_axis(pair: CylinderAxis) -> Result<(), ValidationError> {
    let has_cylinder = pair.cylinder.is_some_and(|cylinder| cylinder != 0.0);
    match (has_cylinder, pair.axis) {
        (false, None) => Ok(()),
        (false, Some(axis)) => Err(ValidationError::AxisWithoutCylinder {
            eye: pair.eye,
            axis,
        }),
        (true, None) => Err(ValidationError::MissingAxis { eye: pair.eye }),
        (true, Some(axis)) if !(0..=MAX_AXIS_DEGREES).contains(&axis) => {
            Err(ValidationError::AxisOutOfRange {
                eye: pair.eye,
                axis,
            })
        }
        (true, Some(_)) => Ok(()),
    }
}

/// Checks everything about exam input that does not need the store.
///
/// Returns the parsed exam date on success.
pub fn check_exam_fields<M: ExamMeasurements>(
    input: &ExamInput<M>,
) -> Result<NaiveDateTime, ValidationError> {
    if input.exam_date.trim().is_empty() {
        return Err(ValidationError::MissingExamDate);
    }
    let exam_date = parse_entry_date(&input.exam_date)?;

    for (field, value) in input.measurements.numeric_fields() {
        if value.is_some_and(|number| !number.is_finite()) {
            return Err(ValidationError::NonFiniteNumber { field });
        }
    }

    for pair in input.measurements.cylinder_axis_pairs() {
        check_cylinder_axis(pair)?;
    }
    Ok(exam_date)
}

/// Fails unless `customer_id` is positive and names a stored customer.
pub fn ensure_customer_exists<C: CustomerRepository>(
    customers: &C,
    customer_id: CustomerId,
) -> ServiceResult<()> {
    if customer_id <= 0 {
        return Err(ServiceError::Validation(rejected(
            ValidationError::InvalidCustomerId(customer_id),
            "customer_id",
        )));
    }
    if customers.get_customer(customer_id)?.is_none() {
        return Err(ServiceError::Validation(rejected(
            ValidationError::CustomerNotFound(customer_id),
            "customer_id",
        )));
    }
    Ok(())
}

/// Validates exam input for `customer_id` and returns the parsed exam date.
pub fn validate_exam<C: CustomerRepository, M: ExamMeasurements>(
    customers: &C,
    customer_id: CustomerId,
    input: &ExamInput<M>,
) -> ServiceResult<NaiveDateTime> {
    ensure_customer_exists(customers, customer_id)?;
    check_exam_fields(input)
        .map_err(|err| ServiceError::Validation(rejected(err, M::KIND.as_str())))
}

/// Validates the shape of a customer card.
pub fn validate_customer(customer: &Customer) -> Result<(), ValidationError> {
    if !SSN_RE.is_match(&customer.ssn) {
        return Err(ValidationError::InvalidSsn(customer.ssn.clone()));
    }

    for (field, value) in [
        ("first_name", &customer.first_name),
        ("last_name", &customer.last_name),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingName { field });
        }
        check_length(field, Some(value), NAME_MAX_CHARS)?;
    }

    let phone = customer.tel_mobile.as_deref().map(str::trim);
    if let Some(phone) = phone.filter(|phone| !phone.is_empty()) {
        if !MOBILE_RE.is_match(phone) {
            return Err(ValidationError::InvalidMobilePhone(phone.to_string()));
        }
    }

    let capped = [
        ("birth_date", &customer.birth_date, 50),
        ("sex", &customer.sex, 20),
        ("tel_home", &customer.tel_home, 15),
        ("address", &customer.address, 100),
        ("town", &customer.town, 50),
        ("postal_code", &customer.postal_code, 20),
        ("status", &customer.status, 50),
        ("org", &customer.org, 50),
        ("occupation", &customer.occupation, 50),
        ("hobbies", &customer.hobbies, 50),
        ("referer", &customer.referer, 50),
        ("notes", &customer.notes, 500),
    ];
    for (field, value, max_chars) in capped {
        check_length(field, value.as_ref(), max_chars)?;
    }

    for (field, value) in [
        ("glasses_num", customer.glasses_num),
        ("lenses_num", customer.lenses_num),
    ] {
        if let Some(value) = value.filter(|count| *count < 0) {
            return Err(ValidationError::NegativeCounter { field, value });
        }
    }
    Ok(())
}

/// Returns whether `ssn` has the stored identifier shape.
pub fn is_valid_ssn(ssn: &str) -> bool {
    SSN_RE.is_match(ssn)
}

/// Logs a rejection at `warn` and hands the error back.
pub(crate) fn rejected(err: ValidationError, subject: &str) -> ValidationError {
    warn!(
        "event=validate module=service status=rejected subject={subject} code={} detail=\"{err}\"",
        err.code()
    );
    err
}

fn check_length(
    field: &'static str,
    value: Option<&String>,
    max_chars: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(text) if text.chars().count() > max_chars => {
            Err(ValidationError::FieldTooLong { field, max_chars })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_cylinder_axis, check_exam_fields, validate_customer, ValidationError};
    use crate::model::customer::Customer;
    use crate::model::exam::{CylinderAxis, ExamInput, Eye};
    use crate::model::refraction::RefractionMeasurements;

    fn pair(eye: Eye, cylinder: Option<f64>, axis: Option<i64>) -> CylinderAxis {
        CylinderAxis {
            eye,
            cylinder,
            axis,
        }
    }

    #[test]
    fn axis_without_cylinder_is_rejected_for_either_eye() {
        for eye in [Eye::Right, Eye::Left] {
            let err = check_cylinder_axis(pair(eye, None, Some(45))).unwrap_err();
            assert_eq!(err, ValidationError::AxisWithoutCylinder { eye, axis: 45 });
            assert!(err.is_invariant_violation());

            let err = check_cylinder_axis(pair(eye, Some(0.0), Some(45))).unwrap_err();
            assert!(err.is_invariant_violation());
        }
    }

    #[test]
    fn cylinder_with_axis_in_range_is_accepted() {
        for eye in [Eye::Right, Eye::Left] {
            check_cylinder_axis(pair(eye, Some(-1.0), Some(90))).unwrap();
            check_cylinder_axis(pair(eye, Some(-0.25), Some(0))).unwrap();
            check_cylinder_axis(pair(eye, Some(0.75), Some(180))).unwrap();
        }
        check_cylinder_axis(pair(Eye::Right, None, None)).unwrap();
        check_cylinder_axis(pair(Eye::Right, Some(0.0), None)).unwrap();
    }

    #[test]
    fn axis_outside_range_is_rejected() {
        for (eye, axis) in [(Eye::Right, 200), (Eye::Left, 200), (Eye::Left, -1)] {
            let err = check_cylinder_axis(pair(eye, Some(-1.0), Some(axis))).unwrap_err();
            assert_eq!(err, ValidationError::AxisOutOfRange { eye, axis });
        }
    }

    #[test]
    fn cylinder_without_axis_is_rejected() {
        let err = check_cylinder_axis(pair(Eye::Left, Some(-1.5), None)).unwrap_err();
        assert_eq!(err, ValidationError::MissingAxis { eye: Eye::Left });
    }

    #[test]
    fn exam_fields_require_an_entry_date() {
        let blank = ExamInput::new("  ", RefractionMeasurements::default());
        assert_eq!(
            check_exam_fields(&blank).unwrap_err(),
            ValidationError::MissingExamDate
        );

        let iso = ExamInput::new("2025-01-27", RefractionMeasurements::default());
        assert!(matches!(
            check_exam_fields(&iso).unwrap_err(),
            ValidationError::InvalidExamDate(_)
        ));
    }

    #[test]
    fn exam_fields_reject_non_finite_numbers() {
        let mut measurements = RefractionMeasurements::default();
        measurements.left.sphere = Some(f64::NAN);
        let input = ExamInput::new("01/02/2025", measurements);
        assert_eq!(
            check_exam_fields(&input).unwrap_err(),
            ValidationError::NonFiniteNumber { field: "l_sphere" }
        );
    }

    #[test]
    fn exam_fields_return_midnight_of_entry_day() {
        let mut measurements = RefractionMeasurements::default();
        measurements.right.cylinder = Some(-1.0);
        measurements.right.axis = Some(90);
        let input = ExamInput::new("05/03/2025", measurements);
        let parsed = check_exam_fields(&input).unwrap();
        assert_eq!(parsed.to_string(), "2025-03-05 00:00:00");
    }

    #[test]
    fn customer_rules() {
        validate_customer(&Customer::new("123456789", "Dana", "Levi")).unwrap();

        for ssn in ["12345678", "1234567890", "12345678a", "١٢٣٤٥٦٧٨٩"] {
            assert!(matches!(
                validate_customer(&Customer::new(ssn, "Dana", "Levi")),
                Err(ValidationError::InvalidSsn(_))
            ));
        }

        assert_eq!(
            validate_customer(&Customer::new("123456789", " ", "Levi")).unwrap_err(),
            ValidationError::MissingName {
                field: "first_name"
            }
        );

        let mut customer = Customer::new("123456789", "Dana", "Levi");
        customer.tel_mobile = Some("05012345".to_string());
        assert!(matches!(
            validate_customer(&customer),
            Err(ValidationError::InvalidMobilePhone(_))
        ));

        for blank in ["", "   "] {
            customer.tel_mobile = Some(blank.to_string());
            assert_eq!(validate_customer(&customer), Ok(()));
        }

        customer.tel_mobile = Some("0501234567".to_string());
        customer.notes = Some("x".repeat(501));
        assert_eq!(
            validate_customer(&customer).unwrap_err(),
            ValidationError::FieldTooLong {
                field: "notes",
                max_chars: 500
            }
        );

        customer.notes = None;
        customer.glasses_num = Some(-1);
        assert_eq!(
            validate_customer(&customer).unwrap_err(),
            ValidationError::NegativeCounter {
                field: "glasses_num",
                value: -1
            }
        );
    }
}
