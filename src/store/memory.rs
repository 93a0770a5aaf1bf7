use async_trait::async_trait;
use parking_lot::RwLock;

use super::{LoadOutcome, PlanStore, StudyDocument};
use crate::error::StudyError;

/// Keeps the document in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Option<StudyDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: StudyDocument) -> Self {
        MemoryStore {
            document: RwLock::new(Some(document)),
        }
    }

    /// Current stored document, if anything was saved.
    pub fn snapshot(&self) -> Option<StudyDocument> {
        self.document.read().clone()
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn load(&self) -> Result<(StudyDocument, LoadOutcome), StudyError> {
        Ok(match self.document.read().as_ref() {
            Some(doc) => (doc.clone(), LoadOutcome::Loaded),
            None => (StudyDocument::empty(), LoadOutcome::Missing),
        })
    }

    async fn save(&self, document: &StudyDocument) -> Result<(), StudyError> {
        *self.document.write() = Some(document.clone());
        Ok(())
    }
}
