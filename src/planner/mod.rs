pub mod allocator;
pub mod dates;
pub mod request;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use allocator::{allocate, Allocation};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

/// One study session on one day.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    pub subject: String,
    pub duration_hours: f64,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn pending(subject: impl Into<String>, duration_hours: f64) -> Self {
        Task {
            subject: subject.into(),
            duration_hours,
            status: TaskStatus::Pending,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// All sessions scheduled for one calendar day.
///
/// `date` is kept as the ISO string that was written out, because completion
/// requests address days by that exact string.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlanDay {
    pub date: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl PlanDay {
    pub fn new(date: NaiveDate) -> Self {
        PlanDay {
            date: date.format("%Y-%m-%d").to_string(),
            tasks: Vec::new(),
        }
    }
}

/// Validated inputs for one allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    pub subjects: Vec<String>,
    pub exam_date: NaiveDate,
    /// The exam date as the caller wrote it, for the stored profile.
    pub exam_date_raw: String,
    pub hours_per_day: f64,
    pub weaknesses: Vec<String>,
}

impl PlanInputs {
    pub fn allocate(&self, today: NaiveDate) -> Vec<PlanDay> {
        allocate(&self.subjects, self.exam_date, self.hours_per_day, &self.weaknesses, today)
    }
}
