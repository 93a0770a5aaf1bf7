//! The four things a client can do with its study plan: generate, fetch,
//! complete a task, and reset. Each runs against the injected store in
//! `AppState`; the allocator itself never touches storage.

use serde::Serialize;

use crate::error::StudyError;
use crate::planner::request::{CompleteRequest, GenerateRequest};
use crate::planner::PlanDay;
use crate::state::AppState;
use crate::store::{LoadOutcome, Progress, StudyDocument};

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlan {
    pub plan: Vec<PlanDay>,
    pub progress: Progress,
}

/// Current document, from the cache or else from the store.
pub async fn load_document(state: &AppState) -> Result<StudyDocument, StudyError> {
    if let Some(doc) = state.cached_document() {
        return Ok(doc);
    }

    let (doc, outcome) = state.store().load().await.inspect_err(|_| state.metrics.record_error())?;
    if outcome == LoadOutcome::Recovered {
        state.metrics.record_recovery();
    }
    state.set_document(doc.clone());
    Ok(doc)
}

async fn persist(state: &AppState, doc: StudyDocument) -> Result<StudyDocument, StudyError> {
    if let Err(e) = state.store().save(&doc).await {
        state.metrics.record_error();
        // The store may hold a partial write; re-read it next time.
        state.invalidate_document();
        return Err(e);
    }
    state.set_document(doc.clone());
    Ok(doc)
}

/// Allocate a new plan and replace whatever was stored.
pub async fn generate(state: &AppState, request: &GenerateRequest) -> Result<GeneratedPlan, StudyError> {
    let today = state.today();
    let inputs = request.normalize(today).map_err(|e| {
        tracing::info!(error = %e, "Rejected plan request");
        state.metrics.record_error();
        StudyError::from(e)
    })?;

    let _guard = state.lock_writes().await;
    let plan = inputs.allocate(today);

    let mut doc = StudyDocument::empty();
    doc.replace_plan(&inputs, plan);
    let doc = persist(state, doc).await?;

    state.metrics.record_plan_generated();
    tracing::info!(
        today = %today,
        exam_date = %inputs.exam_date,
        days = doc.plan.len(),
        tasks = doc.task_total(),
        subjects = inputs.subjects.len(),
        weaknesses = inputs.weaknesses.len(),
        "Generated study plan"
    );

    Ok(GeneratedPlan {
        plan: doc.plan,
        progress: doc.progress,
    })
}

pub async fn fetch(state: &AppState) -> Result<StudyDocument, StudyError> {
    load_document(state).await
}

/// Mark one task done. Unknown dates, bad indexes, and repeated completions
/// leave everything untouched and still succeed.
pub async fn complete(state: &AppState, request: &CompleteRequest) -> Result<Progress, StudyError> {
    let _guard = state.lock_writes().await;
    let mut doc = load_document(state).await?;

    let date = request.date.as_deref().unwrap_or_default();
    let index = request.index();
    let changed = doc.mark_done(date, index);
    state.metrics.record_completion(changed);

    if !changed {
        tracing::debug!(date = date, index = index, "Completion matched no pending task");
        return Ok(doc.progress);
    }

    let doc = persist(state, doc).await?;
    tracing::info!(
        date = date,
        index = index,
        done = doc.progress.done.unwrap_or(0),
        "Task completed"
    );
    Ok(doc.progress)
}

/// Throw away profile, plan, and progress.
pub async fn reset(state: &AppState) -> Result<(), StudyError> {
    let _guard = state.lock_writes().await;
    persist(state, StudyDocument::empty()).await?;
    state.metrics.record_reset();
    tracing::info!("Study data reset");
    Ok(())
}
