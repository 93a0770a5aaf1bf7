use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Service counters. All metrics are atomic counters for thread-safety.
#[derive(Clone, Default)]
pub struct Metrics {
    /// Plans produced by generate
    pub plans_generated: Arc<AtomicU64>,
    /// Tasks flipped from pending to done
    pub tasks_completed: Arc<AtomicU64>,
    /// Completion requests that changed nothing (already done, bad address)
    pub ignored_completions: Arc<AtomicU64>,
    /// Reset requests
    pub resets: Arc<AtomicU64>,
    /// Loads that replaced unreadable stored data with the empty document
    pub documents_recovered: Arc<AtomicU64>,
    /// Failed operations of any kind
    pub errors_total: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub plans_generated: u64,
    pub tasks_completed: u64,
    pub ignored_completions: u64,
    pub resets: u64,
    pub documents_recovered: u64,
    pub errors_total: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_plan_generated(&self) {
        self.plans_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completion(&self, changed: bool) {
        if changed {
            self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.ignored_completions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recovery(&self) {
        self.documents_recovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_generated: self.plans_generated.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            ignored_completions: self.ignored_completions.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            documents_recovered: self.documents_recovered.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
        }
    }
}
