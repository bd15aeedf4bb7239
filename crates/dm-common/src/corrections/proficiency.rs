use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use unicode_normalization::UnicodeNormalization;

/// Language proficiency scale used on both sides of a match.
///
/// Ordinals: Nenhum 0, Básico 1, Intermediário 2, Técnico 3, Avançado 4, Fluente 5.
/// Serialized as the ordinal so precomputed tables stay compact.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProficiencyLevel {
    #[default]
    #[strum(serialize = "Nenhum")]
    None = 0,
    #[strum(serialize = "Básico")]
    Basic = 1,
    #[strum(serialize = "Intermediário")]
    Intermediate = 2,
    #[strum(serialize = "Técnico")]
    Technical = 3,
    #[strum(serialize = "Avançado")]
    Advanced = 4,
    #[strum(serialize = "Fluente")]
    Fluent = 5,
}

impl ProficiencyLevel {
    /// Unknown, blank or absent labels are level 0.
    pub fn from_label(label: Option<&str>) -> Self {
        label.and_then(Self::parse_label).unwrap_or_default()
    }

    /// Strict lookup: `None` for anything that is not one of the six labels.
    /// Surrounding whitespace, letter case and Unicode composition are ignored.
    pub fn parse_label(label: &str) -> Option<Self> {
        let wanted = label.trim().nfc().collect::<String>().to_lowercase();
        Self::iter().find(|level| level.label().to_lowercase() == wanted)
    }

    pub fn label(self) -> &'static str {
        self.into()
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(value: u8) -> Option<Self> {
        Self::iter().find(|level| level.ordinal() == value)
    }

    /// `true` when this level satisfies `required`.
    pub fn meets(self, required: ProficiencyLevel) -> bool {
        self >= required
    }
}

impl From<ProficiencyLevel> for u8 {
    fn from(level: ProficiencyLevel) -> Self {
        level.ordinal()
    }
}

impl TryFrom<u8> for ProficiencyLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(value).ok_or_else(|| format!("proficiency ordinal out of range: {value}"))
    }
}

/// Ordinal of a proficiency label; see [`ProficiencyLevel::from_label`].
pub fn proficiency_level(label: Option<&str>) -> u8 {
    ProficiencyLevel::from_label(label).ordinal()
}
