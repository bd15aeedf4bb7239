use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::candidates::CandidateFeatures;
use crate::corrections::{ProficiencyLevel, SeniorityLevel};
use crate::extraction::{extract_years, skill_set};
use crate::matching::skills::{match_skills, SkillMatchResult};
use crate::normalize::job_text;
use crate::skill_catalog::SkillMatchMode;
use crate::Job;

pub const FEATURE_COUNT: usize = 7;

/// Column order shared by training exports and inference. Changing it invalidates
/// every stored model.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "text_similarity",
    "english_match",
    "spanish_match",
    "sap_match",
    "experience_match",
    "skills_match_score",
    "seniority_match",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub text_similarity: f64,
    pub english_match: u8,
    pub spanish_match: u8,
    pub sap_match: u8,
    pub experience_match: u8,
    pub skills_match_score: f64,
    pub seniority_match: u8,
}

impl FeatureVector {
    /// Values in [`FEATURE_COLUMNS`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.text_similarity,
            f64::from(self.english_match),
            f64::from(self.spanish_match),
            f64::from(self.sap_match),
            f64::from(self.experience_match),
            self.skills_match_score,
            f64::from(self.seniority_match),
        ]
    }
}

/// Rows of feature values plus the column names they were built with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn from_vectors(vectors: &[FeatureVector]) -> Self {
        Self {
            columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: vectors.iter().map(|v| v.to_array().to_vec()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What a job asks for, derived once per ranking call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    pub job_id: String,
    pub job_text: String,
    pub required_skills: BTreeSet<String>,
    pub required_years: u32,
    pub seniority: SeniorityLevel,
    pub english_level: ProficiencyLevel,
    pub spanish_level: ProficiencyLevel,
    pub sap_required: bool,
}

impl JobRequirements {
    pub fn derive(job: &Job, mode: SkillMatchMode) -> Self {
        let text = job_text(job);

        Self {
            job_id: job.id.clone(),
            required_skills: skill_set(&text, mode),
            required_years: extract_years(&text),
            seniority: SeniorityLevel::from_text(job.seniority.as_deref()),
            english_level: ProficiencyLevel::from_label(job.english_level.as_deref()),
            spanish_level: ProficiencyLevel::from_label(job.spanish_level.as_deref()),
            sap_required: job.sap_required,
            job_text: text,
        }
    }
}

/// Feature vector for one job/candidate pair, plus the skill overlap it was scored from.
pub fn build_feature_vector(
    requirements: &JobRequirements,
    candidate: &CandidateFeatures,
    text_similarity: f64,
) -> (FeatureVector, SkillMatchResult) {
    let skills = match_skills(&requirements.required_skills, &candidate.skill_set);

    let features = FeatureVector {
        text_similarity,
        english_match: u8::from(candidate.english_level.meets(requirements.english_level)),
        spanish_match: u8::from(candidate.spanish_level.meets(requirements.spanish_level)),
        sap_match: u8::from(!requirements.sap_required || candidate.sap_mentioned),
        experience_match: u8::from(candidate.years_experience >= requirements.required_years),
        skills_match_score: skills.score,
        seniority_match: u8::from(candidate.seniority.meets(requirements.seniority)),
    };

    (features, skills)
}
