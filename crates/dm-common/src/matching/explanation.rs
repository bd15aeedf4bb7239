use serde::{Deserialize, Serialize};

use super::features::JobRequirements;
use crate::candidates::CandidateFeatures;

/// Side-by-side labels for showing a recruiter why a candidate scored as they did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(rename = "vaga_req_ingles")]
    pub job_english: String,
    #[serde(rename = "candidato_tem_ingles")]
    pub candidate_english: String,
    #[serde(rename = "vaga_req_espanhol")]
    pub job_spanish: String,
    #[serde(rename = "candidato_tem_espanhol")]
    pub candidate_spanish: String,
    #[serde(rename = "vaga_req_sap")]
    pub job_sap: String,
    #[serde(rename = "candidato_tem_sap")]
    pub candidate_sap: String,
    #[serde(rename = "vaga_senioridade")]
    pub job_seniority: String,
    #[serde(rename = "candidato_senioridade")]
    pub candidate_seniority: String,
    #[serde(rename = "vaga_anos_exp")]
    pub job_years: u32,
    #[serde(rename = "candidato_anos_exp")]
    pub candidate_years: u32,
}

fn yes_no(flag: bool) -> String {
    if flag { "Sim" } else { "Não" }.to_string()
}

pub fn explain(requirements: &JobRequirements, candidate: &CandidateFeatures) -> Explanation {
    Explanation {
        job_english: requirements.english_level.label().to_string(),
        candidate_english: candidate.english_level.label().to_string(),
        job_spanish: requirements.spanish_level.label().to_string(),
        candidate_spanish: candidate.spanish_level.label().to_string(),
        job_sap: yes_no(requirements.sap_required),
        candidate_sap: yes_no(candidate.sap_mentioned),
        job_seniority: requirements.seniority.label().to_string(),
        candidate_seniority: candidate.seniority.label().to_string(),
        job_years: requirements.required_years,
        candidate_years: candidate.years_experience,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrections::{ProficiencyLevel, SeniorityLevel};

    #[test]
    fn labels_both_sides() {
        let requirements = JobRequirements {
            english_level: ProficiencyLevel::Advanced,
            sap_required: true,
            seniority: SeniorityLevel::Senior,
            required_years: 3,
            ..Default::default()
        };
        let candidate = CandidateFeatures {
            english_level: ProficiencyLevel::Fluent,
            sap_mentioned: false,
            years_experience: 7,
            ..Default::default()
        };

        let e = explain(&requirements, &candidate);
        assert_eq!(e.job_english, "Avançado");
        assert_eq!(e.candidate_english, "Fluente");
        assert_eq!(e.job_spanish, "Nenhum");
        assert_eq!(e.job_sap, "Sim");
        assert_eq!(e.candidate_sap, "Não");
        assert_eq!(e.job_seniority, "Sênior");
        assert_eq!(e.candidate_seniority, "Não Informado");
        assert_eq!((e.job_years, e.candidate_years), (3, 7));
    }

    #[test]
    fn serializes_with_display_keys() {
        let e = explain(&JobRequirements::default(), &CandidateFeatures::default());
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["vaga_req_ingles"], "Nenhum");
        assert_eq!(value["candidato_anos_exp"], 0);
    }
}
