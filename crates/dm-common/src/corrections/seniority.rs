use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use unicode_normalization::UnicodeNormalization;

/// Career level derived from free-text titles such as "Analista Sênior".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum SeniorityLevel {
    #[default]
    Unspecified = 0,
    Junior = 1,
    Mid = 2,
    Senior = 3,
    Specialist = 4,
    Manager = 5,
}

/// Probed in this order; the first keyword contained in the text decides the level.
/// Higher levels come first so "Sênior Pleno" reads as senior, and the generic
/// "analista" is last so "Analista Júnior" stays junior.
pub const SENIORITY_KEYWORDS: &[(&str, SeniorityLevel)] = &[
    ("gerente", SeniorityLevel::Manager),
    ("coordenador", SeniorityLevel::Specialist),
    ("especialista", SeniorityLevel::Specialist),
    ("sênior", SeniorityLevel::Senior),
    ("senior", SeniorityLevel::Senior),
    ("pleno", SeniorityLevel::Mid),
    ("júnior", SeniorityLevel::Junior),
    ("junior", SeniorityLevel::Junior),
    ("analista", SeniorityLevel::Mid),
];

impl SeniorityLevel {
    pub fn from_text(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::Unspecified;
        };
        let lowered = text.nfc().collect::<String>().to_lowercase();

        SENIORITY_KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, level)| *level)
            .unwrap_or_default()
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unspecified => "Não Informado",
            Self::Junior => "Júnior",
            Self::Mid => "Pleno",
            Self::Senior => "Sênior",
            Self::Specialist => "Especialista",
            Self::Manager => "Gerente",
        }
    }

    pub fn meets(self, required: SeniorityLevel) -> bool {
        self >= required
    }
}

impl From<SeniorityLevel> for u8 {
    fn from(level: SeniorityLevel) -> Self {
        level.ordinal()
    }
}

impl TryFrom<u8> for SeniorityLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::iter()
            .find(|level| level.ordinal() == value)
            .ok_or_else(|| format!("seniority ordinal out of range: {value}"))
    }
}

pub fn seniority_level(text: Option<&str>) -> u8 {
    SeniorityLevel::from_text(text).ordinal()
}
