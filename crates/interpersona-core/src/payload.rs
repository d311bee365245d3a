use serde::{Deserialize, Serialize};

use crate::types::{SectionId, StyleCode, ThemeId};

/// One emitted report record.
///
/// Content rows carry every field. Summary and overview records carry only
/// the style code, section, story and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    pub number: StyleCode,
    pub section: SectionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 1-based story position; 0 for summary and overview records.
    pub story: usize,
    pub content: String,
}

/// Individual report as returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub current_report_content: Vec<ReportItem>,
    #[serde(default)]
    pub extended_report_content: Vec<ReportItem>,
    #[serde(default)]
    pub summary_report_content: Vec<ReportItem>,
    /// One call to action per section; self viewers of the filtered report only.
    #[serde(default)]
    pub share_module_report_content: Vec<ReportItem>,
}

/// One theme of a pair report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairThemeRow {
    pub theme: ThemeId,
    pub theme_name: String,
    pub user_1_style: StyleCode,
    pub user_2_style: StyleCode,
    /// `None` when no score is authored for the pair.
    pub difference_score: Option<i32>,
    pub comparison: String,
    pub user_1_text: String,
    pub user_2_text: String,
}

/// Interpersonal report of two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairReport {
    pub user_1: String,
    pub user_2: String,
    /// Trait similarity on a 0..=100 scale; `None` when undefined.
    pub similarity_score: Option<u32>,
    pub themes: Vec<PairThemeRow>,
}
