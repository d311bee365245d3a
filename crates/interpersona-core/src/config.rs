use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::ReportError;
use crate::reference::ReferenceData;
use crate::types::{SectionId, ThemeId};

/// Default location of workspace configuration.
pub const CONFIG_PATH: &str = ".interpersona/config.json";

/// Raw age range mapped linearly onto the model's target range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeScale {
    pub raw_min: f64,
    pub raw_max: f64,
    pub scaled_min: f64,
    pub scaled_max: f64,
}

impl Default for AgeScale {
    fn default() -> Self {
        Self {
            raw_min: 0.0,
            raw_max: 100.0,
            scaled_min: -1.0,
            scaled_max: 1.0,
        }
    }
}

/// Theme/section pair the budget filter never moves out of the current report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedContent {
    pub theme: ThemeId,
    pub section: SectionId,
}

/// Summary subset thresholds.
///
/// The kept count is `max(min(high, min_count), max_count)` where `high` is
/// the number of candidates whose value reaches `high_value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryLimits {
    pub high_value: f64,
    pub min_count: usize,
    pub max_count: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            high_value: 4.0,
            min_count: 5,
            max_count: 3,
        }
    }
}

/// Immutable report configuration, built once and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub age_scale: AgeScale,
    /// Word budget per section; a section at or over its target is oversize.
    pub section_targets: BTreeMap<SectionId, u32>,
    /// Preference order when picking the section to move content out of.
    pub section_order: Vec<SectionId>,
    pub protected: Option<ProtectedContent>,
    /// Illustrated candidates are spared while a section has more than this many.
    pub min_illustrations: u32,
    pub summary: SummaryLimits,
    /// Theme whose style picks the per-section overview text.
    pub overview_theme: Option<ThemeId>,
    /// Theme order of the pair report.
    pub theme_order: Vec<ThemeId>,
    pub name_placeholder: String,
    pub missing_content: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            age_scale: AgeScale::default(),
            section_targets: BTreeMap::from([(1, 600), (2, 900), (3, 600), (4, 500), (5, 500)]),
            section_order: vec![1, 2, 3, 4, 5],
            protected: Some(ProtectedContent {
                theme: 11,
                section: 1,
            }),
            min_illustrations: 2,
            summary: SummaryLimits::default(),
            overview_theme: Some(14),
            theme_order: (1..=14).collect(),
            name_placeholder: "{name}".to_string(),
            missing_content: "content not available".to_string(),
        }
    }
}

impl ReportConfig {
    /// Load from an explicit path, else the workspace file, else defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None if Path::new(CONFIG_PATH).exists() => CONFIG_PATH,
            None => return Ok(Self::default()),
        };
        let content =
            std::fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
        let config: Self =
            serde_json::from_str(&content).with_context(|| format!("{path}: invalid config JSON"))?;
        config.validate()?;
        tracing::debug!(path, "report config loaded");
        Ok(config)
    }

    /// Internal consistency, independent of reference data.
    pub fn validate(&self) -> Result<(), ReportError> {
        let a = &self.age_scale;
        if !(a.raw_max - a.raw_min).is_normal() {
            return Err(ReportError::config(format!(
                "age range {}..{} is empty",
                a.raw_min, a.raw_max
            )));
        }
        if self.name_placeholder.is_empty() {
            return Err(ReportError::config("name placeholder must not be empty"));
        }
        Ok(())
    }

    /// Every section the budget filter may inspect needs a word target.
    pub fn validate_for(&self, reference: &ReferenceData) -> Result<(), ReportError> {
        self.validate()?;
        if let Some(missing) = reference
            .section_ids()
            .find(|s| !self.section_targets.contains_key(s))
        {
            return Err(ReportError::config(format!(
                "section {missing} has no word target"
            )));
        }
        Ok(())
    }

    pub fn target_for(&self, section: SectionId) -> Result<u32, ReportError> {
        self.section_targets
            .get(&section)
            .copied()
            .ok_or_else(|| ReportError::config(format!("section {section} has no word target")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ReportConfig::default();
        assert_eq!(c.section_targets[&2], 900);
        assert_eq!(c.section_targets.len(), 5);
        assert_eq!(c.min_illustrations, 2);
        assert_eq!(c.theme_order.len(), 14);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c: ReportConfig =
            serde_json::from_str(r#"{"section_order": [2, 1], "overview_theme": null}"#).unwrap();
        assert_eq!(c.section_order, vec![2, 1]);
        assert_eq!(c.overview_theme, None);
        assert_eq!(c.summary, SummaryLimits::default());
    }

    #[test]
    fn empty_age_range_is_rejected() {
        let mut c = ReportConfig::default();
        c.age_scale.raw_max = c.age_scale.raw_min;
        assert!(matches!(c.validate(), Err(ReportError::Configuration(_))));
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"min_illustrations": 4}"#).unwrap();
        let c = ReportConfig::load(path.to_str()).unwrap();
        assert_eq!(c.min_illustrations, 4);
    }

    #[test]
    fn missing_target_fails_for_reference() {
        let mut bundle = crate::reference::fixtures::small_bundle();
        bundle["content"][0]["section"] = serde_json::json!(9);
        let data = ReferenceData::from_json(&serde_json::to_vec(&bundle).unwrap()).unwrap();
        let err = ReportConfig::default().validate_for(&data).unwrap_err();
        assert!(err.to_string().contains("section 9"));
    }
}
