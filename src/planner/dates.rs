use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::StudyError;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an exam date the way people type them into a form.
///
/// Datetimes are accepted and truncated to their calendar date (in the
/// timezone they were written in).
pub fn parse_exam_date(input: &str) -> Result<NaiveDate, StudyError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(StudyError::new("Exam date is empty", "date_parse"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Ok(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(dt.date());
        }
    }

    Err(StudyError::new(
        format!("Unrecognized exam date '{}'", text),
        "date_parse"
    ))
}

/// Inclusive calendar range `start..=end`. Empty when `end < start`.
pub fn day_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
