use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use dm_common::matching::RankingResult;
use serde::{Deserialize, Serialize};

use super::pagination::validate_top_n;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct MatchQuery {
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub run_id: String,
    pub job_id: String,
    pub ranked_at: DateTime<Utc>,
    pub candidates_scored: usize,
    pub candidates: Vec<RankingResult>,
}

pub async fn list_matches(
    State(state): State<SharedState>,
    Path(job_id): Path<String>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchResponse>, ApiError> {
    let top_n = query.top_n.map(validate_top_n).transpose()?;
    let job = state
        .find_job(&job_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("job not found: {job_id}")))?;

    let engine = state.engine.clone();
    let response = tokio::task::spawn_blocking(move || {
        let run = engine.rank_job(&job, top_n)?;
        Ok::<_, ApiError>(MatchResponse {
            run_id: run.run_id,
            job_id: run.job_id,
            ranked_at: run.ranked_at,
            candidates_scored: run.candidates_scored,
            candidates: run.results,
        })
    })
    .await
    .map_err(|err| ApiError::Internal(format!("ranking task failed: {err}")))??;

    Ok(Json(response))
}
