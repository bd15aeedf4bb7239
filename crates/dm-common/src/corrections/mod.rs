pub mod proficiency;
pub mod seniority;

pub use proficiency::{proficiency_level, ProficiencyLevel};
pub use seniority::{seniority_level, SeniorityLevel};
