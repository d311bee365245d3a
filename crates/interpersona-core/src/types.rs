use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub type ThemeId = u16;
pub type StyleId = u16;
pub type SectionId = u16;

/// A floating-point value constrained to [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct UnitFloat(f64);

impl UnitFloat {
    pub fn new(v: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&v) {
            Some(Self(v))
        } else {
            None
        }
    }

    /// Clamp into range. NaN maps to 0.5, the neutral percentile.
    pub fn saturating(v: f64) -> Self {
        if v.is_nan() {
            Self(0.5)
        } else {
            Self(v.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for UnitFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for UnitFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UnitFloat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(deserializer)?;
        UnitFloat::new(v).ok_or_else(|| serde::de::Error::custom(format!("{v} not in [0.0, 1.0]")))
    }
}

/// Personality-type code: theme followed by the two-digit style, read as an
/// integer (theme 3, style 5 is `305`). `-1` is the graph wildcard node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleCode(i32);

impl StyleCode {
    pub const WILDCARD: StyleCode = StyleCode(-1);

    pub fn new(theme: ThemeId, style: StyleId) -> Self {
        Self(i32::from(theme) * 100 + i32::from(style))
    }

    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn is_wildcard(self) -> bool {
        self.0 < 0
    }

    pub fn theme(self) -> Option<ThemeId> {
        if self.is_wildcard() {
            None
        } else {
            ThemeId::try_from(self.0 / 100).ok()
        }
    }

    pub fn style(self) -> Option<StyleId> {
        if self.is_wildcard() {
            None
        } else {
            StyleId::try_from(self.0 % 100).ok()
        }
    }
}

impl fmt::Display for StyleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse the categorical input value. Anything but male/female is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Model encoding: +1 male, -1 female.
    pub fn numeric(self) -> f64 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => -1.0,
        }
    }
}

/// Which flavour of individual report to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportVariant {
    /// Every assigned style, story-ordered, no budget.
    Individual,
    /// Budget-filtered into current and extended content, with summaries.
    #[default]
    IndividualFiltered,
}

impl fmt::Display for ReportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportVariant::Individual => write!(f, "individual"),
            ReportVariant::IndividualFiltered => write!(f, "individual_filtered"),
        }
    }
}

/// Kind of authored text a content lookup resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "section", rename_all = "snake_case")]
pub enum TextKind {
    /// Body text of a style inside a report section.
    Section(SectionId),
    /// Opening text of a report section, keyed by the overview theme's style.
    Overview(SectionId),
    /// Per-theme text of the pair report.
    Interpersonal,
}
