use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::corrections::ProficiencyLevel;
use crate::normalize::job_text;
use crate::Job;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
pub enum SapFilter {
    #[default]
    #[strum(to_string = "Indiferente", serialize = "any")]
    #[serde(rename = "Indiferente", alias = "any")]
    Any,
    #[strum(to_string = "Sim", serialize = "yes")]
    #[serde(rename = "Sim", alias = "yes")]
    Required,
    /// Jobs with no SAP value at all are treated as not requiring SAP.
    #[strum(to_string = "Não", serialize = "no")]
    #[serde(rename = "Não", alias = "no")]
    NotRequired,
}

/// Recruiter-side narrowing of the job list. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFilter {
    pub client: Option<String>,
    pub areas: Vec<String>,
    pub divisions: Vec<String>,
    /// Every listed skill must appear (substring) in the job text.
    pub skills: Vec<String>,
    pub sap: SapFilter,
    pub min_english: ProficiencyLevel,
    pub min_spanish: ProficiencyLevel,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(client) = &self.client {
            if job.client.as_deref() != Some(client.as_str()) {
                return false;
            }
        }
        if !in_list(&self.areas, job.area.as_deref()) || !in_list(&self.divisions, job.company_division.as_deref()) {
            return false;
        }

        match self.sap {
            SapFilter::Any => {}
            SapFilter::Required if !job.sap_required => return false,
            SapFilter::NotRequired if job.sap_required => return false,
            _ => {}
        }

        if ProficiencyLevel::from_label(job.english_level.as_deref()) < self.min_english
            || ProficiencyLevel::from_label(job.spanish_level.as_deref()) < self.min_spanish
        {
            return false;
        }

        if self.skills.is_empty() {
            return true;
        }
        let text = job_text(job);
        self.skills
            .iter()
            .all(|skill| text.contains(&skill.to_lowercase()))
    }

    pub fn apply<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.matches(job)).collect()
    }
}

fn in_list(allowed: &[String], value: Option<&str>) -> bool {
    allowed.is_empty() || value.is_some_and(|v| allowed.iter().any(|a| a == v))
}
