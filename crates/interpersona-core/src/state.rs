use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::ReportPayload;
use crate::types::{ReportVariant, SectionId};

/// Lifecycle of an individual report.
///
/// `NoReport -> Computed -> Reduced -> Filtered -> Persisted`; the
/// unfiltered variant skips `Filtered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStage {
    NoReport,
    Computed,
    Reduced,
    Filtered,
    Persisted,
}

impl ReportStage {
    pub fn can_advance_to(self, next: ReportStage, variant: ReportVariant) -> bool {
        use ReportStage::*;
        matches!(
            (self, next, variant),
            (NoReport, Computed, _)
                | (NoReport, Persisted, _)
                | (Computed, Reduced, _)
                | (Reduced, Filtered, ReportVariant::IndividualFiltered)
                | (Reduced, Persisted, ReportVariant::Individual)
                | (Filtered, Persisted, ReportVariant::IndividualFiltered)
        )
    }
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportStage::NoReport => "no_report",
            ReportStage::Computed => "computed",
            ReportStage::Reduced => "reduced",
            ReportStage::Filtered => "filtered",
            ReportStage::Persisted => "persisted",
        };
        f.write_str(s)
    }
}

/// Identity of a cached report: one per user and request shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    pub user_id: String,
    pub variant: ReportVariant,
    pub self_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionId>,
    pub language: u16,
}

impl ReportKey {
    /// File-name-safe identifier.
    pub fn cache_id(&self) -> String {
        let user: String = self
            .user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let viewer = if self.self_user { "self" } else { "other" };
        let section = self
            .section
            .map_or_else(|| "all".to_string(), |s| format!("s{s}"));
        format!(
            "{user}.{}.{viewer}.{section}.l{}",
            self.variant, self.language
        )
    }
}

/// A report that reached `Persisted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedReport {
    pub key: ReportKey,
    pub stage: ReportStage,
    /// Fingerprint of the reference data the report was computed from.
    pub reference_fingerprint: String,
    pub payload: ReportPayload,
    pub created_at: DateTime<Utc>,
}

impl PersistedReport {
    pub fn new(key: ReportKey, reference_fingerprint: String, payload: ReportPayload) -> Self {
        Self {
            key,
            stage: ReportStage::Persisted,
            reference_fingerprint,
            payload,
            created_at: Utc::now(),
        }
    }
}
