use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{LoadOutcome, PlanStore, StudyDocument};
use crate::config::paths::default_document_path;
use crate::error::StudyError;

/// Stores the document as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(default_document_path())
    }
}

#[async_trait]
impl PlanStore for JsonFileStore {
    /// Missing file and malformed content both yield the empty document.
    /// Other read failures (permissions, ...) are returned as errors.
    async fn load(&self) -> Result<(StudyDocument, LoadOutcome), StudyError> {
        let path = &self.path;
        match tokio::fs::read_to_string(path).await {
            Ok(content) => match serde_json::from_str::<StudyDocument>(&content) {
                Ok(doc) => Ok((doc, LoadOutcome::Loaded)),
                Err(e) => {
                    tracing::warn!(
                        path = ?path,
                        error = %e,
                        "Failed to parse study document, starting from empty"
                    );
                    Ok((StudyDocument::empty(), LoadOutcome::Recovered))
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?path, "No study document yet");
                Ok((StudyDocument::empty(), LoadOutcome::Missing))
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(
                    path = ?path,
                    error = %e,
                    "Study document is not valid UTF-8, starting from empty"
                );
                Ok((StudyDocument::empty(), LoadOutcome::Recovered))
            }
            Err(e) => Err(StudyError::from(e).with_context(format!("path: {:?}", path))),
        }
    }

    /// Writes a sibling temp file and renames it over the document, so a
    /// failed write never leaves a truncated document behind.
    async fn save(&self, document: &StudyDocument) -> Result<(), StudyError> {
        let path = &self.path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StudyError::from(e).with_context(format!("path: {:?}", parent)))?;
        }

        let json = serde_json::to_string_pretty(document)?;

        let tmp = temp_path(path);
        if let Err(e) = tokio::fs::write(&tmp, json).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StudyError::from(e).with_context(format!("path: {:?}", tmp)));
        }
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StudyError::from(e).with_context(format!("path: {:?}", path)))?;

        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{PlanDay, Task};
    use crate::store::Progress;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("nested").join("studypath.json"))
    }

    #[tokio::test]
    async fn missing_file_is_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let (doc, outcome) = store_in(&dir).load().await.unwrap();
        assert!(doc.is_empty());
        assert_eq!(outcome, LoadOutcome::Missing);
    }

    #[tokio::test]
    async fn malformed_file_is_recovered_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studypath.json");
        for garbage in ["{not json", "[1, 2, 3]", r#"{"plan": "yesterday"}"#] {
            std::fs::write(&path, garbage).unwrap();
            let (doc, outcome) = JsonFileStore::new(&path).load().await.unwrap();
            assert!(doc.is_empty(), "{garbage}");
            assert_eq!(outcome, LoadOutcome::Recovered);
        }
    }

    #[tokio::test]
    async fn save_creates_directories_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let doc = StudyDocument {
            plan: vec![PlanDay {
                date: "2026-10-18".into(),
                tasks: vec![Task::pending("Math", 1.5)],
            }],
            progress: Progress::fresh(1),
            ..StudyDocument::default()
        };
        store.save(&doc).await.unwrap();
        assert!(store.path().exists());

        let (loaded, outcome) = store.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn save_replaces_document_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studypath.json");
        std::fs::write(&path, r#"{"plan": [], "progress": {"done": 7}}"#).unwrap();
        let store = JsonFileStore::new(&path);

        let doc = StudyDocument {
            progress: Progress::fresh(3),
            ..StudyDocument::default()
        };
        store.save(&doc).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("studypath.json")]);
        assert_eq!(temp_path(&path), dir.path().join("studypath.json.tmp"));

        let (loaded, outcome) = store.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studypath.json");
        let previous = r#"{"plan": [], "progress": {"done": 2, "total": 4}}"#;
        std::fs::write(&path, previous).unwrap();
        // A directory in the temp file's place makes the write fail.
        std::fs::create_dir(temp_path(&path)).unwrap();

        let err = JsonFileStore::new(&path)
            .save(&StudyDocument::empty())
            .await
            .unwrap_err();
        assert_eq!(err.stage, "io");
        assert!(err.context.is_some());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), previous);
    }
}
