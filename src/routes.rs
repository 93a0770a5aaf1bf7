use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::StudyError;
use crate::planner::request::{CompleteRequest, GenerateRequest};
use crate::state::AppState;
use crate::study;

/// Error body returned to clients: `{"ok": false, "error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<StudyError> for ApiError {
    fn from(err: StudyError) -> Self {
        if err.is_client_error() {
            ApiError {
                status: StatusCode::BAD_REQUEST,
                message: err.message,
            }
        } else {
            tracing::error!(error = %err, "Request failed");
            ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Internal error while handling the study plan.".to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "ok": false, "error": self.message }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

/// Parse a JSON body whatever the content type says. An empty body reads as `{}`.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let bytes: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(bytes).map_err(|e| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: format!("Invalid JSON body: {}", e),
    })
}

/// Build the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/generate", post(generate_plan))
        .route("/api/plan", get(get_plan))
        .route("/api/complete", post(complete_task))
        .route("/api/reset", post(reset_all))
        .route("/api/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate_plan(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: GenerateRequest = parse_body(&body)?;
    let generated = study::generate(&state, &request).await?;
    Ok(Json(json!({
        "ok": true,
        "plan": generated.plan,
        "progress": generated.progress,
    })))
}

async fn get_plan(State(state): State<AppState>) -> ApiResult {
    let doc = study::fetch(&state).await?;
    Ok(Json(json!({
        "ok": true,
        "plan": doc.plan,
        "profile": doc.profile,
        "progress": doc.progress,
    })))
}

async fn complete_task(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: CompleteRequest = parse_body(&body)?;
    let progress = study::complete(&state, &request).await?;
    Ok(Json(json!({ "ok": true, "progress": progress })))
}

async fn reset_all(State(state): State<AppState>) -> ApiResult {
    study::reset(&state).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn get_metrics(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.metrics.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_bad_requests() {
        let api: ApiError = StudyError::new("Please provide subjects and exam date.", "validation").into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "Please provide subjects and exam date.");

        let api: ApiError = StudyError::new("disk full", "io").into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("disk"));
    }

    #[test]
    fn blank_body_reads_as_empty_object() {
        let req: CompleteRequest = parse_body(&Bytes::from_static(b"  \n")).unwrap();
        assert_eq!(req, CompleteRequest::default());

        let err = parse_body::<CompleteRequest>(&Bytes::from_static(b"{oops")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
