use axum::{
    extract::{Path, Query, State},
    Json,
};
use dm_common::corrections::ProficiencyLevel;
use dm_common::matching::{JobFilter, SapFilter};
use dm_common::Job;
use serde::{Deserialize, Serialize};

use super::pagination::validate_pagination;
use crate::error::ApiError;
use crate::SharedState;

/// Job list filters. Multi-valued fields are comma separated.
#[derive(Debug, Deserialize, Default)]
pub struct JobsQuery {
    pub client: Option<String>,
    pub areas: Option<String>,
    pub divisions: Option<String>,
    pub skills: Option<String>,
    pub sap: Option<String>,
    pub min_english: Option<String>,
    pub min_spanish: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

const fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub total: usize,
    pub jobs: Vec<Job>,
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_level(name: &str, raw: Option<&str>) -> Result<ProficiencyLevel, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(ProficiencyLevel::None);
    };
    raw.parse::<u8>()
        .ok()
        .and_then(ProficiencyLevel::from_ordinal)
        .or_else(|| ProficiencyLevel::parse_label(raw))
        .ok_or_else(|| ApiError::BadRequest(format!("{name} must be a proficiency label or 0-5")))
}

impl JobsQuery {
    pub fn to_filter(&self) -> Result<JobFilter, ApiError> {
        let sap = match self.sap.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<SapFilter>()
                .map_err(|_| ApiError::BadRequest("sap must be Indiferente, Sim or Não".into()))?,
            None => SapFilter::Any,
        };

        Ok(JobFilter {
            client: self
                .client
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            areas: split_list(self.areas.as_deref()),
            divisions: split_list(self.divisions.as_deref()),
            skills: split_list(self.skills.as_deref()),
            sap,
            min_english: parse_level("min_english", self.min_english.as_deref())?,
            min_spanish: parse_level("min_spanish", self.min_spanish.as_deref())?,
        })
    }
}

pub async fn list_jobs(
    State(state): State<SharedState>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<JobListResponse>, ApiError> {
    let (limit, offset) = validate_pagination(query.limit, query.offset)?;
    let filter = query.to_filter()?;

    let matching = filter.apply(&state.jobs);
    let total = matching.len();
    let jobs = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    Ok(Json(JobListResponse { total, jobs }))
}

pub async fn get_job(
    State(state): State<SharedState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    state
        .find_job(&job_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("job not found: {job_id}")))
}
