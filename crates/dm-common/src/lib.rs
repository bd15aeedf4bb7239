pub mod artifacts;
pub mod candidates;
pub mod classifier;
pub mod config;
pub mod corrections;
pub mod error;
pub mod evaluation;
pub mod extraction;
pub mod logging;
pub mod matching;
pub mod normalize;
pub mod records;
pub mod run_id;
pub mod skill_catalog;
pub mod tfidf;

use serde::{Deserialize, Serialize};

// Canonical records. Everything downstream of `records` sees only these shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: Option<String>,
    pub activities: Option<String>,
    pub competencies: Option<String>,
    pub english_level: Option<String>,
    pub spanish_level: Option<String>,
    pub sap_required: bool,
    pub seniority: Option<String>,
    pub client: Option<String>,
    pub company_division: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: Option<String>,
    pub resume: Option<String>,
    pub technical_knowledge: Option<String>,
    pub area_of_expertise: Option<String>,
    pub qualifications: Option<String>,
    pub english_level: Option<String>,
    pub spanish_level: Option<String>,
    pub professional_level: Option<String>,
}
