use serde::{Deserialize, Serialize};

use crate::skill_catalog::SkillMatchMode;

pub const DEFAULT_TOP_N: usize = 10;

pub const TOP_N_ENV: &str = "DM_TOP_N";
pub const SKILL_MATCH_MODE_ENV: &str = "DM_SKILL_MATCH_MODE";
pub const QUALIFICATION_FILTER_ENV: &str = "DM_QUALIFICATION_FILTER";

/// Knobs that change what the ranking pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub top_n: usize,
    pub skill_match_mode: SkillMatchMode,
    /// Keep only candidates whose text mentions "qualificação"/"qualificações".
    pub qualification_filter: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            skill_match_mode: SkillMatchMode::default(),
            qualification_filter: true,
        }
    }
}

impl ScoringConfig {
    /// Reads `DM_TOP_N`, `DM_SKILL_MATCH_MODE` and `DM_QUALIFICATION_FILTER`.
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let top_n = lookup(TOP_N_ENV)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.top_n);

        let skill_match_mode = match lookup(SKILL_MATCH_MODE_ENV) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "unknown {SKILL_MATCH_MODE_ENV}; using substring");
                defaults.skill_match_mode
            }),
            None => defaults.skill_match_mode,
        };

        let qualification_filter = lookup(QUALIFICATION_FILTER_ENV)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.qualification_filter);

        Self {
            top_n,
            skill_match_mode,
            qualification_filter,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
