use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ScoringConfig;
use crate::corrections::{ProficiencyLevel, SeniorityLevel};
use crate::error::DataError;
use crate::extraction::{extract_years, sap_mentioned, skill_set};
use crate::normalize::candidate_text;
use crate::skill_catalog::SkillMatchMode;
use crate::Candidate;

lazy_static! {
    static ref QUALIFICATION_RE: Regex = Regex::new(r"(?i)qualificaç(?:ão|ões)").unwrap();
}

pub const UNKNOWN_NAME: &str = "N/A";

/// Columns every stored candidate row must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "candidate_text",
    "skill_set",
    "years_experience",
    "seniority",
    "english_level",
    "spanish_level",
    "sap_mentioned",
];

/// Everything the ranking pipeline needs from a candidate, derived once at build time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFeatures {
    pub id: String,
    pub name: String,
    pub candidate_text: String,
    pub skill_set: BTreeSet<String>,
    pub years_experience: u32,
    pub seniority: SeniorityLevel,
    pub english_level: ProficiencyLevel,
    pub spanish_level: ProficiencyLevel,
    pub sap_mentioned: bool,
}

impl CandidateFeatures {
    pub fn precompute(candidate: &Candidate, mode: SkillMatchMode) -> Self {
        let text = candidate_text(candidate);

        Self {
            id: candidate.id.clone(),
            name: candidate
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(UNKNOWN_NAME)
                .to_string(),
            skill_set: skill_set(&text, mode),
            years_experience: extract_years(&text),
            seniority: SeniorityLevel::from_text(candidate.professional_level.as_deref()),
            english_level: ProficiencyLevel::from_label(candidate.english_level.as_deref()),
            spanish_level: ProficiencyLevel::from_label(candidate.spanish_level.as_deref()),
            sap_mentioned: sap_mentioned(&text),
            candidate_text: text,
        }
    }
}

/// Candidate rows in a fixed order. Row `i` lines up with row `i` of the TF-IDF matrix
/// built from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateTable {
    pub skill_match_mode: SkillMatchMode,
    rows: Vec<CandidateFeatures>,
}

impl CandidateTable {
    /// Derives features for every candidate. With the qualification filter on, candidates
    /// whose résumé never mentions "qualificação(ões)" are dropped first.
    pub fn precompute(candidates: &[Candidate], config: &ScoringConfig) -> Self {
        let rows: Vec<CandidateFeatures> = candidates
            .iter()
            .filter(|c| !config.qualification_filter || resume_mentions_qualifications(c))
            .map(|c| CandidateFeatures::precompute(c, config.skill_match_mode))
            .collect();

        tracing::info!(
            input = candidates.len(),
            kept = rows.len(),
            qualification_filter = config.qualification_filter,
            "precomputed candidate table"
        );

        Self {
            skill_match_mode: config.skill_match_mode,
            rows,
        }
    }

    pub fn from_rows(rows: Vec<CandidateFeatures>, skill_match_mode: SkillMatchMode) -> Self {
        Self {
            skill_match_mode,
            rows,
        }
    }

    /// Loads stored rows, rejecting any row that lacks a required column.
    pub fn from_json_rows(rows: &[Value], skill_match_mode: SkillMatchMode) -> Result<Self, DataError> {
        let parsed = rows
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let object = value.as_object().ok_or_else(|| DataError::InvalidRow {
                    row,
                    reason: "expected a JSON object".into(),
                })?;
                if let Some(column) = REQUIRED_COLUMNS.iter().find(|c| !object.contains_key(**c)) {
                    return Err(DataError::MissingColumn { column: *column, row });
                }
                serde_json::from_value(value.clone()).map_err(|err| DataError::InvalidRow {
                    row,
                    reason: err.to_string(),
                })
            })
            .collect::<Result<Vec<CandidateFeatures>, DataError>>()?;

        Ok(Self::from_rows(parsed, skill_match_mode))
    }

    pub fn rows(&self) -> &[CandidateFeatures] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&CandidateFeatures> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.candidate_text.as_str()).collect()
    }
}

pub fn mentions_qualifications(text: &str) -> bool {
    QUALIFICATION_RE.is_match(text)
}

fn resume_mentions_qualifications(candidate: &Candidate) -> bool {
    candidate.resume.as_deref().is_some_and(mentions_qualifications)
}
