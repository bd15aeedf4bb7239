use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::explanation::{explain, Explanation};
use super::features::{build_feature_vector, FeatureTable, FeatureVector, JobRequirements};
use super::skills::SkillMatchResult;
use crate::artifacts::{check_alignment, ScoringResources};
use crate::candidates::CandidateTable;
use crate::classifier::{ensure_schema, Classifier};
use crate::config::ScoringConfig;
use crate::error::{ClassifierError, RankError};
use crate::run_id;
use crate::tfidf::{TfidfMatrix, TfidfVectorizer};
use crate::Job;

/// One ranked candidate for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(flatten)]
    pub features: FeatureVector,
    pub required_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub extra_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub vaga_anos_exp_val: u32,
    pub candidato_anos_exp_val: u32,
    pub explanation: Explanation,
}

/// Scores every candidate in `candidates` against `job` and returns the best `top_n`,
/// highest score first. Ties keep candidate-table order.
pub fn rank(
    job: &Job,
    candidates: &CandidateTable,
    classifier: &dyn Classifier,
    vectorizer: &TfidfVectorizer,
    matrix: &TfidfMatrix,
    top_n: usize,
) -> Result<Vec<RankingResult>, RankError> {
    check_alignment(candidates, vectorizer, matrix)?;

    let expected_columns: Vec<String> = super::features::FEATURE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .collect();
    ensure_schema(classifier.feature_names(), &expected_columns)?;

    if candidates.is_empty() || top_n == 0 {
        return Ok(Vec::new());
    }

    let requirements = JobRequirements::derive(job, candidates.skill_match_mode);
    let query = vectorizer.transform(&requirements.job_text);
    let similarities = matrix.cosine_similarity_many(&query);

    let (vectors, skills): (Vec<FeatureVector>, Vec<SkillMatchResult>) = candidates
        .rows()
        .iter()
        .zip(&similarities)
        .map(|(candidate, similarity)| build_feature_vector(&requirements, candidate, *similarity))
        .unzip();

    let table = FeatureTable::from_vectors(&vectors);
    let scores = classifier.predict_proba(&table)?;
    if scores.len() != table.len() {
        return Err(ClassifierError::OutputLength {
            returned: scores.len(),
            rows: table.len(),
        }
        .into());
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order.truncate(top_n);

    let required_skills: Vec<String> = requirements.required_skills.iter().cloned().collect();
    let results = order
        .into_iter()
        .map(|i| {
            let candidate = &candidates.rows()[i];
            RankingResult {
                id: candidate.id.clone(),
                name: candidate.name.clone(),
                score: scores[i],
                features: vectors[i],
                required_skills: required_skills.clone(),
                matched_skills: skills[i].matched.clone(),
                extra_skills: skills[i].extra.clone(),
                missing_skills: skills[i].missing.clone(),
                vaga_anos_exp_val: requirements.required_years,
                candidato_anos_exp_val: candidate.years_experience,
                explanation: explain(&requirements, candidate),
            }
        })
        .collect();

    Ok(results)
}

/// Output of one [`RankingEngine::rank_job`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRun {
    pub run_id: String,
    pub job_id: String,
    pub ranked_at: DateTime<Utc>,
    pub candidates_scored: usize,
    pub results: Vec<RankingResult>,
}

/// Shared, read-only ranking state. Cheap to clone.
#[derive(Clone)]
pub struct RankingEngine {
    resources: Arc<ScoringResources>,
    classifier: Arc<dyn Classifier>,
    config: ScoringConfig,
}

impl RankingEngine {
    pub fn new(
        resources: Arc<ScoringResources>,
        classifier: Arc<dyn Classifier>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            resources,
            classifier,
            config,
        }
    }

    pub fn resources(&self) -> &ScoringResources {
        &self.resources
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn rank_job(&self, job: &Job, top_n: Option<usize>) -> Result<RankingRun, RankError> {
        let top_n = top_n.unwrap_or(self.config.top_n);
        let run_id = run_id::ranking_run_id();

        let results = rank(
            job,
            &self.resources.candidates,
            self.classifier.as_ref(),
            &self.resources.vectorizer,
            &self.resources.matrix,
            top_n,
        )
        .inspect_err(|err| {
            tracing::warn!(%run_id, job_id = %job.id, error = %err, "ranking failed");
        })?;

        tracing::info!(
            %run_id,
            job_id = %job.id,
            classifier = self.classifier.name(),
            candidates = self.resources.candidates.len(),
            returned = results.len(),
            top_score = results.first().map(|r| r.score),
            "ranked candidates"
        );

        Ok(RankingRun {
            run_id,
            job_id: job.id.clone(),
            ranked_at: Utc::now(),
            candidates_scored: self.resources.candidates.len(),
            results,
        })
    }
}
