use crate::{Candidate, Job};

/// Job fields concatenated into the job's search text, in this order.
pub const JOB_TEXT_FIELDS: &[&str] = &["title", "activities", "competencies"];

/// Candidate fields concatenated into the candidate's search text, in this order.
pub const CANDIDATE_TEXT_FIELDS: &[&str] = &[
    "resume",
    "technical_knowledge",
    "area_of_expertise",
    "qualifications",
];

/// Read access to a record's free-text fields by name.
pub trait TextFields {
    fn text_field(&self, name: &str) -> Option<&str>;
}

impl TextFields for Job {
    fn text_field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => self.title.as_deref(),
            "activities" => self.activities.as_deref(),
            "competencies" => self.competencies.as_deref(),
            _ => None,
        }
    }
}

impl TextFields for Candidate {
    fn text_field(&self, name: &str) -> Option<&str> {
        match name {
            "resume" => self.resume.as_deref(),
            "technical_knowledge" => self.technical_knowledge.as_deref(),
            "area_of_expertise" => self.area_of_expertise.as_deref(),
            "qualifications" => self.qualifications.as_deref(),
            _ => None,
        }
    }
}

/// Lowercases and space-joins the named fields.
///
/// Missing or blank fields are skipped, so no field ever contributes a dangling
/// separator. Field contents are otherwise kept as-is.
pub fn normalize_text<R: TextFields + ?Sized>(record: &R, fields: &[&str]) -> String {
    fields
        .iter()
        .filter_map(|name| record.text_field(name))
        .filter(|value| !value.trim().is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn job_text(job: &Job) -> String {
    normalize_text(job, JOB_TEXT_FIELDS)
}

pub fn candidate_text(candidate: &Candidate) -> String {
    normalize_text(candidate, CANDIDATE_TEXT_FIELDS)
}
