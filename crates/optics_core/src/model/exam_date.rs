//! Exam date normalization.
//!
//! # Responsibility
//! - Convert between structured timestamps and the canonical storage text.
//! - Parse day-first human entry text (`DD/MM/YYYY`) typed at the counter.
//! - Carry unparsable stored text through reads without failing.
//!
//! # Invariants
//! - Canonical text is `YYYY-MM-DDTHH:MM:SS`, zero-padded, so lexical order
//!   equals chronological order.
//! - Only timestamps with whole seconds in years `0..=9999` are storable, so
//!   canonical text always round-trips and keeps a fixed width.
//! - Entry text carries a four-digit year.
//! - Entry text and canonical text are never parsed with each other's format.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// `strftime` pattern of the canonical storage text.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// `strftime` pattern of human entry text.
pub const ENTRY_FORMAT: &str = "%d/%m/%Y";

const MAX_STORABLE_YEAR: i32 = 9999;

static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}$").expect("valid entry date regex")
});

/// Date text that does not match the expected format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    input: String,
    expected: &'static str,
}

impl DateParseError {
    fn new(input: &str, expected: &'static str) -> Self {
        Self {
            input: input.to_string(),
            expected,
        }
    }

    /// Returns the rejected input text.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid date `{}`: expected format {}",
            self.input, self.expected
        )
    }
}

impl Error for DateParseError {}

/// Formats a timestamp as canonical storage text.
pub fn datetime_to_text(value: &NaiveDateTime) -> String {
    value.format(CANONICAL_FORMAT).to_string()
}

/// Parses canonical storage text back into a timestamp.
pub fn text_to_datetime(text: &str) -> Result<NaiveDateTime, DateParseError> {
    NaiveDateTime::parse_from_str(text, CANONICAL_FORMAT)
        .map_err(|_| DateParseError::new(text, "YYYY-MM-DDTHH:MM:SS"))
}

/// Parses day-first entry text (`27/01/2025` or `27/1/2025`) as midnight of
/// that day.
pub fn parse_entry_date(text: &str) -> Result<NaiveDateTime, DateParseError> {
    let trimmed = text.trim();
    if !ENTRY_RE.is_match(trimmed) {
        return Err(DateParseError::new(text, "DD/MM/YYYY"));
    }
    let date = NaiveDate::parse_from_str(trimmed, ENTRY_FORMAT)
        .map_err(|_| DateParseError::new(text, "DD/MM/YYYY"))?;
    Ok(date.and_time(NaiveTime::MIN))
}

/// Returns whether `value` survives canonical text unchanged: whole seconds
/// and a four-digit, non-negative year.
pub fn is_storable(value: &NaiveDateTime) -> bool {
    value.nanosecond() == 0 && (0..=MAX_STORABLE_YEAR).contains(&value.year())
}

/// Formats a timestamp as day-first entry text for edit forms.
pub fn format_entry_date(value: &NaiveDateTime) -> String {
    value.format(ENTRY_FORMAT).to_string()
}

/// Exam date as read back from storage.
///
/// Rows written by this crate always decode to `Timestamp`. Legacy or
/// hand-edited rows whose text does not match the canonical format decode to
/// `Raw` so history listing keeps working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExamDate {
    Timestamp(NaiveDateTime),
    Raw(String),
}

impl ExamDate {
    /// Decodes stored text, keeping it verbatim when it is not canonical.
    pub fn from_stored(text: String) -> Self {
        match text_to_datetime(&text) {
            Ok(timestamp) => Self::Timestamp(timestamp),
            Err(_) => Self::Raw(text),
        }
    }

    /// Returns the parsed timestamp, if any.
    pub fn timestamp(&self) -> Option<&NaiveDateTime> {
        match self {
            Self::Timestamp(timestamp) => Some(timestamp),
            Self::Raw(_) => None,
        }
    }

    /// Returns canonical storage text, or `None` for raw legacy text.
    pub fn to_canonical_text(&self) -> Option<String> {
        self.timestamp().map(datetime_to_text)
    }
}

impl From<NaiveDateTime> for ExamDate {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl Display for ExamDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timestamp(timestamp) => write!(f, "{}", datetime_to_text(timestamp)),
            Self::Raw(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        datetime_to_text, format_entry_date, is_storable, parse_entry_date, text_to_datetime,
        ExamDate,
    };
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn canonical_text_is_zero_padded() {
        assert_eq!(datetime_to_text(&at(2025, 2, 5, 9, 3, 7)), "2025-02-05T09:03:07");
    }

    #[test]
    fn canonical_text_roundtrips() {
        for value in [
            at(2025, 1, 1, 0, 0, 0),
            at(1999, 12, 31, 23, 59, 59),
            at(2024, 2, 29, 12, 30, 0),
            at(1, 1, 1, 0, 0, 0),
        ] {
            assert_eq!(text_to_datetime(&datetime_to_text(&value)).unwrap(), value);
        }
    }

    #[test]
    fn canonical_text_sorts_chronologically() {
        let mut texts = vec![
            datetime_to_text(&at(2025, 10, 1, 0, 0, 0)),
            datetime_to_text(&at(2025, 9, 30, 23, 0, 0)),
            datetime_to_text(&at(2024, 12, 31, 0, 0, 0)),
        ];
        texts.sort();
        assert_eq!(
            texts,
            vec![
                "2024-12-31T00:00:00",
                "2025-09-30T23:00:00",
                "2025-10-01T00:00:00"
            ]
        );
    }

    #[test]
    fn entry_date_is_day_first() {
        assert_eq!(parse_entry_date("27/01/2025").unwrap(), at(2025, 1, 27, 0, 0, 0));
        assert_eq!(parse_entry_date(" 3/4/2024 ").unwrap(), at(2024, 4, 3, 0, 0, 0));
        assert_eq!(format_entry_date(&at(2024, 4, 3, 0, 0, 0)), "03/04/2024");
    }

    #[test]
    fn entry_date_rejects_malformed_text() {
        for text in [
            "",
            "2025-01-27",
            "31/02/2025",
            "13/13/2025",
            "27/01/2025x",
            "01/01/25",
            "1/1/5",
            "01/01/20250",
        ] {
            let err = parse_entry_date(text).unwrap_err();
            assert_eq!(err.input(), text);
        }
    }

    #[test]
    fn storable_requires_whole_seconds_and_four_digit_year() {
        let base = at(2025, 1, 1, 10, 0, 0);
        assert!(is_storable(&base));
        assert!(is_storable(&at(9999, 12, 31, 23, 59, 59)));
        assert!(!is_storable(&(base + chrono::Duration::milliseconds(500))));
        assert!(!is_storable(&at(10000, 1, 1, 0, 0, 0)));
        assert!(!is_storable(&at(-1, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn stored_text_falls_back_to_raw() {
        assert_eq!(
            ExamDate::from_stored("2025-05-01T00:00:00".to_string()),
            ExamDate::Timestamp(at(2025, 5, 1, 0, 0, 0))
        );
        let raw = ExamDate::from_stored("BAD_DATE_FORMAT".to_string());
        assert_eq!(raw, ExamDate::Raw("BAD_DATE_FORMAT".to_string()));
        assert!(raw.to_canonical_text().is_none());
        assert_eq!(raw.to_string(), "BAD_DATE_FORMAT");
    }
}
