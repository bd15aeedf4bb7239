use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Overlap between a job's required skills and a candidate's skills.
/// All lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchResult {
    pub matched: Vec<String>,
    pub extra: Vec<String>,
    pub missing: Vec<String>,
    /// |required ∩ candidate| / |required|; 1.0 when nothing is required.
    pub score: f64,
}

pub fn match_skills(required: &BTreeSet<String>, candidate: &BTreeSet<String>) -> SkillMatchResult {
    let matched: Vec<String> = required.intersection(candidate).cloned().collect();
    let extra = candidate.difference(required).cloned().collect();
    let missing = required.difference(candidate).cloned().collect();

    let score = if required.is_empty() {
        1.0
    } else {
        matched.len() as f64 / required.len() as f64
    };

    SkillMatchResult {
        matched,
        extra,
        missing,
        score,
    }
}
