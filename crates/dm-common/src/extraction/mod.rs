use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::skill_catalog::{detect_skills, SkillMatchMode};

lazy_static! {
    // "5 anos", "1 ano", "10 years", "3 años"; number up to two digits
    static ref YEARS_RE: Regex =
        Regex::new(r"(?i)\b([0-9]{1,2})\s+(?:anos?|years?|años?)\b").unwrap();
}

/// Largest "N anos" figure mentioned in `text`, or 0 when there is none.
pub fn extract_years(text: &str) -> u32 {
    YEARS_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

/// Plain substring check for "sap", case-insensitive.
pub fn sap_mentioned(text: &str) -> bool {
    text.to_lowercase().contains("sap")
}

/// Catalog skills present in already-normalized `text`.
pub fn skill_set(text: &str, mode: SkillMatchMode) -> BTreeSet<String> {
    detect_skills(text, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_maximum_year_figure() {
        assert_eq!(
            extract_years("tenho 5 anos de experiência e 2 anos em gestão"),
            5
        );
        assert_eq!(extract_years("3 years of python, 12 anos na área"), 12);
        assert_eq!(extract_years("1 ano em suporte"), 1);
    }

    #[test]
    fn zero_when_no_year_figure() {
        assert_eq!(extract_years("sem experiência"), 0);
        assert_eq!(extract_years(""), 0);
    }

    #[test]
    fn ignores_numbers_not_followed_by_years() {
        assert_eq!(extract_years("equipe de 15 pessoas, 2 anotações"), 0);
        assert_eq!(extract_years("projeto de 2019 anos"), 0);
    }

    #[test]
    fn sap_check_is_case_insensitive_substring() {
        assert!(sap_mentioned("Consultor SAP FI"));
        assert!(sap_mentioned("sap"));
        assert!(!sap_mentioned("desenvolvedor java"));
    }

    #[test]
    fn skill_set_uses_catalog() {
        let skills = skill_set("python, django, docker, apis rest", SkillMatchMode::Substring);
        // "go" fires inside "django" in substring mode
        let expected: BTreeSet<String> = ["api", "django", "docker", "go", "python", "rest"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(skills, expected);
    }
}
