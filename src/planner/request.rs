use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dates::parse_exam_date;
use super::PlanInputs;

pub const DEFAULT_HOURS_PER_DAY: f64 = 2.0;
/// Upper bound on the daily budget; a day only has 24 hours.
pub const MAX_HOURS_PER_DAY: f64 = 24.0;
/// Smallest budget whose per-session duration still rounds to a positive
/// number of hundredths.
pub const MIN_HOURS_PER_DAY: f64 = 0.01;
/// How far past today an exam may be planned for.
pub const MAX_PLAN_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Please provide subjects and exam date.")]
    MissingSubjects,
    #[error("Please provide subjects and exam date.")]
    MissingExamDate,
    #[error("hours_per_day must be a number between 0.01 and 24, got '{0}'")]
    InvalidHours(String),
    #[error("Exam date '{0}' is more than 3650 days away")]
    ExamTooFar(String),
    #[error("Could not understand exam date '{0}'")]
    InvalidExamDate(String),
}

/// A number that may arrive as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberInput::Number(n) => Some(*n),
            NumberInput::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Integer value; fractional numbers truncate toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberInput::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            NumberInput::Number(_) => None,
            NumberInput::Text(s) => s.trim().parse().ok(),
        }
    }

    fn describe(&self) -> String {
        match self {
            NumberInput::Number(n) => n.to_string(),
            NumberInput::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub exam_date: Option<String>,
    #[serde(default)]
    pub hours_per_day: Option<NumberInput>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

impl GenerateRequest {
    /// Trim inputs, drop blanks, and check everything the allocator assumes.
    /// `today` bounds how far out the exam may be.
    pub fn normalize(&self, today: NaiveDate) -> Result<PlanInputs, RequestError> {
        let subjects = clean_list(&self.subjects);
        let weaknesses = clean_list(&self.weaknesses);

        let exam_date_raw = self
            .exam_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if subjects.is_empty() {
            return Err(RequestError::MissingSubjects);
        }
        let exam_date_raw = exam_date_raw.ok_or(RequestError::MissingExamDate)?;

        let hours_per_day = match &self.hours_per_day {
            None => DEFAULT_HOURS_PER_DAY,
            Some(input) => input
                .as_f64()
                .filter(|h| h.is_finite() && *h >= MIN_HOURS_PER_DAY && *h <= MAX_HOURS_PER_DAY)
                .ok_or_else(|| RequestError::InvalidHours(input.describe()))?,
        };

        let exam_date = parse_exam_date(&exam_date_raw)
            .map_err(|_| RequestError::InvalidExamDate(exam_date_raw.clone()))?;
        if exam_date > today + Duration::days(MAX_PLAN_DAYS) {
            return Err(RequestError::ExamTooFar(exam_date_raw));
        }

        Ok(PlanInputs {
            subjects,
            exam_date,
            exam_date_raw,
            hours_per_day,
            weaknesses,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub index: Option<NumberInput>,
}

impl CompleteRequest {
    /// Missing or unreadable indexes become -1, which matches no task.
    pub fn index(&self) -> i64 {
        self.index.as_ref().and_then(NumberInput::as_i64).unwrap_or(-1)
    }
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
