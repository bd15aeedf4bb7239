use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Canonical technology tokens recognised in job and candidate text.
///
/// Tokens are lowercase and matched against already-lowercased text, so detection is
/// effectively case-insensitive. Order is only cosmetic; detection returns a sorted set.
pub const SKILL_CATALOG: &[&str] = &[
    // languages
    "python", "java", "javascript", "typescript", "c#", "c++", "php", "ruby", "go", "swift",
    "kotlin", "sql", "pl/sql",
    // frameworks
    "react", "angular", "vue", "svelte", "jquery", "node.js", "django", "flask", "spring",
    "ruby on rails", ".net", "laravel",
    // cloud and databases
    "aws", "azure", "google cloud", "gcp", "oracle cloud", "oci", "mysql", "postgresql",
    "mongodb", "redis", "oracle", "sql server", "dynamodb",
    // tooling and practices
    "docker", "kubernetes", "jenkins", "git", "github", "gitlab", "ansible", "terraform",
    "ci/cd", "agile", "scrum", "kanban", "api", "rest", "graphql", "microservices", "linux",
    "unix", "html", "css", "sap",
];

/// How catalog tokens are located in text.
///
/// `Substring` is the historical behaviour and stays the default: short tokens such as
/// "go" or "api" also fire inside longer words ("google", "rapidez"). `WordBoundary`
/// only accepts hits whose neighbours are not alphanumeric.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SkillMatchMode {
    #[default]
    Substring,
    WordBoundary,
}

/// Returns every catalog token found in `text`.
///
/// `text` must already be lowercased (see `normalize`); the catalog is not re-cased.
pub fn detect_skills(text: &str, mode: SkillMatchMode) -> BTreeSet<String> {
    SKILL_CATALOG
        .iter()
        .filter(|token| contains_token(text, token, mode))
        .map(|token| (*token).to_string())
        .collect()
}

fn contains_token(text: &str, token: &str, mode: SkillMatchMode) -> bool {
    match mode {
        SkillMatchMode::Substring => text.contains(token),
        SkillMatchMode::WordBoundary => text
            .match_indices(token)
            .any(|(start, hit)| is_isolated(text, start, start + hit.len())),
    }
}

fn is_isolated(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_tokens_are_lowercase_and_unique() {
        let unique: BTreeSet<_> = SKILL_CATALOG.iter().collect();
        assert_eq!(unique.len(), SKILL_CATALOG.len());
        assert!(SKILL_CATALOG.iter().all(|t| t.to_lowercase() == *t));
    }

    #[test]
    fn substring_mode_matches_inside_words() {
        let skills = detect_skills("experiência com google analytics", SkillMatchMode::Substring);
        assert!(skills.contains("go"));
    }

    #[test]
    fn word_boundary_mode_rejects_embedded_hits() {
        let skills = detect_skills("experiência com google analytics", SkillMatchMode::WordBoundary);
        assert!(!skills.contains("go"));

        let skills = detect_skills("backend em go e c++, deploy com ci/cd", SkillMatchMode::WordBoundary);
        assert!(skills.contains("go"));
        assert!(skills.contains("c++"));
        assert!(skills.contains("ci/cd"));
    }

    #[test]
    fn multi_word_tokens_are_detected() {
        let skills = detect_skills(
            "banco sql server e projetos ruby on rails",
            SkillMatchMode::Substring,
        );
        assert!(skills.contains("sql server"));
        assert!(skills.contains("ruby on rails"));
        assert!(skills.contains("sql"));
        assert!(skills.contains("ruby"));
    }

    #[test]
    fn detection_is_case_sensitive_on_unnormalized_text() {
        assert!(detect_skills("Python", SkillMatchMode::Substring).is_empty());
        assert!(detect_skills("python", SkillMatchMode::Substring).contains("python"));
    }

    #[test]
    fn mode_parses_from_env_style_strings() {
        assert_eq!("substring".parse::<SkillMatchMode>().unwrap(), SkillMatchMode::Substring);
        assert_eq!(
            "WORD_BOUNDARY".parse::<SkillMatchMode>().unwrap(),
            SkillMatchMode::WordBoundary
        );
        assert!("fuzzy".parse::<SkillMatchMode>().is_err());
    }
}
