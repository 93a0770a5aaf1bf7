pub mod json;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StudyError;
use crate::planner::{PlanDay, PlanInputs, TaskStatus};

pub use json::JsonFileStore;
pub use memory::MemoryStore;

/// The learner's last planning request, as stored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<Vec<String>>,
}

impl From<&PlanInputs> for Profile {
    fn from(inputs: &PlanInputs) -> Self {
        Profile {
            subjects: Some(inputs.subjects.clone()),
            exam_date: Some(inputs.exam_date_raw.clone()),
            hours_per_day: Some(inputs.hours_per_day),
            weaknesses: Some(inputs.weaknesses.clone()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl Progress {
    pub fn fresh(total: usize) -> Self {
        Progress {
            done: Some(0),
            total: Some(total),
        }
    }
}

/// Everything that is persisted: `{profile, plan, progress}`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct StudyDocument {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub plan: Vec<PlanDay>,
    #[serde(default)]
    pub progress: Progress,
}

impl StudyDocument {
    /// The document a fresh or reset install starts from. Also what a
    /// corrupted file is read as.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Replace profile, plan, and progress with a newly generated plan.
    pub fn replace_plan(&mut self, inputs: &PlanInputs, plan: Vec<PlanDay>) {
        self.profile = Profile::from(inputs);
        self.plan = plan;
        self.progress = Progress::fresh(self.task_total());
    }

    pub fn task_total(&self) -> usize {
        self.plan.iter().map(|day| day.tasks.len()).sum()
    }

    /// Mark one task done. Returns true only when a pending task flipped.
    ///
    /// Only the first day whose date string equals `date` is looked at.
    /// Unknown dates, out-of-range indexes and already-done tasks are no-ops.
    pub fn mark_done(&mut self, date: &str, index: i64) -> bool {
        let Some(day) = self.plan.iter_mut().find(|day| day.date == date) else {
            return false;
        };
        let Ok(index) = usize::try_from(index) else {
            return false;
        };
        let Some(task) = day.tasks.get_mut(index) else {
            return false;
        };
        if task.is_done() {
            return false;
        }

        task.status = TaskStatus::Done;
        self.progress.done = Some(self.progress.done.unwrap_or(0) + 1);
        true
    }
}

/// How a load produced its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Nothing stored yet.
    Missing,
    /// Stored data was unreadable and was replaced by the empty document.
    Recovered,
}

/// Persistence for the study document.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn load(&self) -> Result<(StudyDocument, LoadOutcome), StudyError>;

    async fn save(&self, document: &StudyDocument) -> Result<(), StudyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Task;
    use serde_json::json;

    fn sample() -> StudyDocument {
        StudyDocument {
            profile: Profile::default(),
            plan: vec![
                PlanDay {
                    date: "2026-10-18".into(),
                    tasks: vec![Task::pending("Math", 1.0), Task::pending("Art", 1.0)],
                },
                PlanDay {
                    date: "2026-10-19".into(),
                    tasks: vec![Task::pending("Math", 1.0)],
                },
            ],
            progress: Progress::fresh(3),
        }
    }

    #[test]
    fn empty_document_shape() {
        let value = serde_json::to_value(StudyDocument::empty()).unwrap();
        assert_eq!(value, json!({ "profile": {}, "plan": [], "progress": {} }));
        assert!(StudyDocument::empty().is_empty());
    }

    #[test]
    fn missing_sections_default() {
        let doc: StudyDocument = serde_json::from_str(r#"{"plan": []}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn task_serializes_with_lowercase_status() {
        let value = serde_json::to_value(Task::pending("Math", 0.4)).unwrap();
        assert_eq!(
            value,
            json!({ "subject": "Math", "duration_hours": 0.4, "status": "pending" })
        );
    }

    #[test]
    fn mark_done_is_idempotent() {
        let mut doc = sample();
        assert!(doc.mark_done("2026-10-18", 1));
        assert!(!doc.mark_done("2026-10-18", 1));
        assert_eq!(doc.progress.done, Some(1));
        assert!(doc.plan[0].tasks[1].is_done());
        assert!(!doc.plan[0].tasks[0].is_done());
    }

    #[test]
    fn mark_done_ignores_bad_addresses() {
        let mut doc = sample();
        assert!(!doc.mark_done("2026-10-18", 2));
        assert!(!doc.mark_done("2026-10-18", -1));
        assert!(!doc.mark_done("2026-12-25", 0));
        assert_eq!(doc, sample());
    }

    #[test]
    fn mark_done_starts_count_when_progress_is_blank() {
        let mut doc = sample();
        doc.progress = Progress::default();
        assert!(doc.mark_done("2026-10-19", 0));
        assert_eq!(doc.progress.done, Some(1));
        assert_eq!(doc.progress.total, None);
    }
}
