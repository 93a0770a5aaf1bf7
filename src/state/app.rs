use std::sync::Arc;
use parking_lot::RwLock;
use chrono::NaiveDate;
use tokio::sync::{Mutex, MutexGuard};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::metrics::Metrics;
use crate::store::{JsonFileStore, PlanStore, StudyDocument};

/// Application-wide state container, handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn PlanStore>,
    clock: Arc<dyn Clock>,
    /// Last document loaded from or saved to the store
    document: Arc<RwLock<Option<StudyDocument>>>,
    /// Held across load-modify-save so concurrent writers cannot interleave
    write_lock: Arc<Mutex<()>>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        AppState {
            store,
            clock: Arc::new(SystemClock),
            document: Arc::new(RwLock::new(None)),
            write_lock: Arc::new(Mutex::new(())),
            metrics: Metrics::new(),
        }
    }

    /// State backed by the JSON file named in the config
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(JsonFileStore::new(config.data_path.clone())))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &dyn PlanStore {
        self.store.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn cached_document(&self) -> Option<StudyDocument> {
        self.document.read().clone()
    }

    pub fn set_document(&self, document: StudyDocument) {
        *self.document.write() = Some(document);
    }

    /// Drop the cached copy so the next read goes back to the store
    pub fn invalidate_document(&self) {
        *self.document.write() = None;
    }

    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}
