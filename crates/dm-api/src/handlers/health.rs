use std::sync::atomic::Ordering;

use axum::{extract::State, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::SharedState;

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once artifacts and model are loaded, until shutdown starts.
pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.readiness.load(Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    let resources = state.engine.resources();
    Ok(Json(json!({
        "status": "ok",
        "application": env!("CARGO_PKG_NAME"),
        "candidates": resources.candidates.len(),
        "vocabulary": resources.vectorizer.vocabulary_len(),
        "artifacts_built_at": resources.built_at,
        "classifier": state.engine.classifier().name(),
        "jobs": state.jobs.len(),
    })))
}
